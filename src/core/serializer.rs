//! # MessagePack Serializer
//!
//! This module translates between the generic binary value tree
//! ([`rmpv::Value`]) and raw bytes, abstracting the message model away
//! from the concrete MessagePack marker layout.
//!
//! ## Format Variants
//! Two encodings are supported, selected once per connection during
//! transport negotiation:
//! - **V5** (default): current MessagePack. Strings use the `str` family,
//!   binary blobs use the `bin` family.
//! - **Legacy**: pre-2.0 MessagePack. Strings *and* binary blobs are both
//!   emitted with the raw markers (`fixraw`/`raw16`/`raw32`); the `str8`,
//!   `bin*` and `ext*` markers never appear on the wire.
//!
//! Both variants are decoded by the same reader: legacy raw data arrives
//! as a string value (possibly non-UTF-8), and the message model accepts
//! string-or-binary wherever the protocol allows raw payloads.
//!
//! ## Errors
//! Truncated or type-invalid input fails with
//! [`WampError::CorruptEncoding`], as does trailing garbage after a
//! complete value. Field-level violations are diagnosed later, by the
//! message model, over a structurally valid tree.

use crate::config::CodecConfig;
use crate::error::{Result, WampError};
use crate::protocol::message::Message;
use rmpv::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;

/// Legacy raw markers (shared by v4 strings and binary)
const FIXRAW: u8 = 0xa0;
const RAW16: u8 = 0xda;
const RAW32: u8 = 0xdb;

/// MessagePack encoding variant, fixed per logical connection.
///
/// Changing the variant mid-stream is a protocol violation; the variant
/// is therefore only consumed at [`Serializer`] construction time and the
/// serializer exposes no mutator for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatVariant {
    /// Pre-2.0 MessagePack: raw markers for strings and binary alike
    Legacy,
    /// Current MessagePack: distinct str/bin families
    #[default]
    V5,
}

impl FormatVariant {
    /// Get human-readable name
    pub fn name(self) -> &'static str {
        match self {
            FormatVariant::Legacy => "legacy",
            FormatVariant::V5 => "v5",
        }
    }
}

impl fmt::Display for FormatVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encode a value tree into MessagePack bytes using the given variant.
pub fn encode_value(value: &Value, variant: FormatVariant) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    match variant {
        FormatVariant::V5 => {
            rmpv::encode::write_value(&mut buf, value).map_err(enc_err)?;
        }
        FormatVariant::Legacy => write_legacy(&mut buf, value)?,
    }
    Ok(buf)
}

/// Decode MessagePack bytes into a value tree.
///
/// Accepts both format variants. Exactly one value must be present;
/// trailing bytes are rejected because a frame carries a single message.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let mut cursor = Cursor::new(bytes);
    let value = rmpv::decode::read_value(&mut cursor)
        .map_err(|e| WampError::CorruptEncoding(e.to_string()))?;

    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(WampError::CorruptEncoding(format!(
            "{} trailing bytes after value",
            bytes.len() - consumed
        )));
    }

    Ok(value)
}

fn enc_err<E: fmt::Display>(e: E) -> WampError {
    WampError::Encode(e.to_string())
}

/// Legacy encoding walk. Scalars and container headers share their
/// markers with v5 and go through `rmp`; strings and binary take the
/// raw-marker path.
fn write_legacy(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Nil => rmp::encode::write_nil(buf).map_err(enc_err)?,
        Value::Boolean(b) => rmp::encode::write_bool(buf, *b).map_err(enc_err)?,
        Value::Integer(n) => {
            if let Some(i) = n.as_i64() {
                rmp::encode::write_sint(buf, i).map_err(enc_err)?;
            } else if let Some(u) = n.as_u64() {
                rmp::encode::write_uint(buf, u).map_err(enc_err)?;
            } else {
                return Err(WampError::Encode(format!("unrepresentable integer: {n}")));
            }
        }
        Value::F32(x) => rmp::encode::write_f32(buf, *x).map_err(enc_err)?,
        Value::F64(x) => rmp::encode::write_f64(buf, *x).map_err(enc_err)?,
        Value::String(s) => write_legacy_raw(buf, s.as_bytes())?,
        Value::Binary(b) => write_legacy_raw(buf, b)?,
        Value::Array(items) => {
            let len = u32::try_from(items.len())
                .map_err(|_| WampError::Encode("array exceeds msgpack limits".into()))?;
            rmp::encode::write_array_len(buf, len).map_err(enc_err)?;
            for item in items {
                write_legacy(buf, item)?;
            }
        }
        Value::Map(entries) => {
            let len = u32::try_from(entries.len())
                .map_err(|_| WampError::Encode("map exceeds msgpack limits".into()))?;
            rmp::encode::write_map_len(buf, len).map_err(enc_err)?;
            for (key, val) in entries {
                write_legacy(buf, key)?;
                write_legacy(buf, val)?;
            }
        }
        Value::Ext(tag, _) => {
            return Err(WampError::Encode(format!(
                "ext type {tag} is not representable in the legacy format"
            )));
        }
    }
    Ok(())
}

fn write_legacy_raw(buf: &mut Vec<u8>, data: &[u8]) -> Result<()> {
    let len = data.len();
    if len <= 31 {
        buf.push(FIXRAW | len as u8);
    } else if len <= 0xffff {
        buf.push(RAW16);
        buf.extend_from_slice(&(len as u16).to_be_bytes());
    } else if len <= 0xffff_ffff {
        buf.push(RAW32);
        buf.extend_from_slice(&(len as u32).to_be_bytes());
    } else {
        return Err(WampError::Encode(format!(
            "raw of {len} bytes exceeds msgpack limits"
        )));
    }
    buf.extend_from_slice(data);
    Ok(())
}

/// Stateless message serializer bound to one encoding variant.
///
/// Construction is the only point where the variant can be chosen;
/// concurrent readers may share a `Serializer` freely since every call is
/// a pure transformation.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    variant: FormatVariant,
}

impl Serializer {
    pub fn new(variant: FormatVariant) -> Self {
        Self { variant }
    }

    pub fn from_config(config: &CodecConfig) -> Self {
        Self::new(config.format_variant)
    }

    /// The connection's encoding variant
    pub fn variant(&self) -> FormatVariant {
        self.variant
    }

    /// Encode a message into its wire payload (unframed).
    pub fn serialize(&self, message: &Message) -> Result<Vec<u8>> {
        encode_value(&message.to_wire(), self.variant)
    }

    /// Decode a wire payload (unframed) into a typed message.
    pub fn deserialize(&self, payload: &[u8]) -> Result<Message> {
        Message::from_wire(&decode_value(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_variant_is_v5() {
        assert_eq!(FormatVariant::default(), FormatVariant::V5);
        assert_eq!(Serializer::default().variant(), FormatVariant::V5);
    }

    #[test]
    fn variant_names() {
        assert_eq!(FormatVariant::Legacy.name(), "legacy");
        assert_eq!(FormatVariant::V5.name(), "v5");
    }

    #[test]
    fn binary_markers_differ_by_variant() {
        let blob = Value::Binary(b"throw me away".to_vec());

        let legacy = encode_value(&blob, FormatVariant::Legacy).expect("encode");
        let v5 = encode_value(&blob, FormatVariant::V5).expect("encode");

        // 13 bytes: fixraw marker in legacy, bin8 in v5
        assert_eq!(legacy[0], 0xa0 | 13);
        assert_eq!(v5[0], 0xc4);
        assert_eq!(&legacy[1..], b"throw me away");
    }

    #[test]
    fn legacy_never_emits_str8() {
        // 100 bytes forces str8 in v5 but raw16 in legacy
        let text = Value::from("x".repeat(100));

        let legacy = encode_value(&text, FormatVariant::Legacy).expect("encode");
        let v5 = encode_value(&text, FormatVariant::V5).expect("encode");

        assert_eq!(legacy[0], 0xda);
        assert_eq!(&legacy[1..3], &100u16.to_be_bytes());
        assert_eq!(v5[0], 0xd9);
    }

    #[test]
    fn scalars_are_identical_across_variants() {
        let value = Value::Array(vec![
            Value::from(1u64),
            Value::from(-42i64),
            Value::F64(1.5),
            Value::Boolean(true),
            Value::Nil,
        ]);

        let legacy = encode_value(&value, FormatVariant::Legacy).expect("encode");
        let v5 = encode_value(&value, FormatVariant::V5).expect("encode");
        assert_eq!(legacy, v5);
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = encode_value(&Value::from(7u64), FormatVariant::V5).expect("encode");
        bytes.push(0x00);

        let err = decode_value(&bytes).expect_err("trailing byte must fail");
        assert!(matches!(err, WampError::CorruptEncoding(_)));
    }

    #[test]
    fn truncated_input_rejected() {
        // array header promising one element, element missing
        let err = decode_value(&[0x91]).expect_err("truncated input must fail");
        assert!(matches!(err, WampError::CorruptEncoding(_)));
    }

    #[test]
    fn ext_rejected_in_legacy() {
        let value = Value::Ext(4, vec![1, 2, 3]);
        let err = encode_value(&value, FormatVariant::Legacy).expect_err("ext must fail");
        assert!(matches!(err, WampError::Encode(_)));
    }

    #[test]
    fn value_roundtrip_preserves_identity() {
        let value = Value::Map(vec![
            (Value::from("seq"), Value::from(u64::MAX)),
            (Value::from("neg"), Value::from(i64::MIN)),
            (Value::from("pi"), Value::F64(std::f64::consts::PI)),
            (
                Value::from("nested"),
                Value::Array(vec![Value::Binary(vec![0, 159, 146, 150])]),
            ),
        ]);

        let bytes = encode_value(&value, FormatVariant::V5).expect("encode");
        let decoded = decode_value(&bytes).expect("decode");
        assert_eq!(decoded, value);
    }
}
