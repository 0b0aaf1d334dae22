//! Property-based tests using proptest
//!
//! These tests validate codec invariants across a wide range of
//! randomly generated inputs: framing round-trips, value-tree
//! round-trips, and deterministic encoding.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use rmpv::Value;
use wamp_protocol::config::MAX_ID;
use wamp_protocol::core::framing::Framing;
use wamp_protocol::core::serializer::{decode_value, encode_value, FormatVariant, Serializer};
use wamp_protocol::error::WampError;
use wamp_protocol::protocol::message::Message;

/// Value trees without NaN (payload equality) and without ext types.
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Boolean),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        prop::num::f64::NORMAL.prop_map(Value::F64),
        ".{0,40}".prop_map(Value::from),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Binary),
    ];

    leaf.prop_recursive(3, 24, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map(".{0,12}", inner, 0..6).prop_map(|m| {
                Value::Map(
                    m.into_iter()
                        .map(|(k, v)| (Value::from(k.as_str()), v))
                        .collect(),
                )
            }),
        ]
    })
}

proptest! {
    // Property: any payload up to the limit frames and unframes exactly
    #[test]
    fn prop_framing_roundtrip(payload in prop::collection::vec(any::<u8>(), 0..10_000)) {
        let framing = Framing::new(16 * 1024);

        let mut stream = Vec::new();
        framing.write_frame(&mut stream, &payload).expect("write");
        let recovered = framing.read_frame(&mut stream.as_slice()).expect("read");

        prop_assert_eq!(recovered, payload);
    }
}

proptest! {
    // Property: the prefix always states the exact payload length
    #[test]
    fn prop_prefix_states_exact_length(payload in prop::collection::vec(any::<u8>(), 0..4096)) {
        let framing = Framing::new(16 * 1024);

        let mut stream = Vec::new();
        framing.write_frame(&mut stream, &payload).expect("write");

        let mut prefix = [0u8; 4];
        prefix.copy_from_slice(&stream[..4]);
        prop_assert_eq!(u32::from_be_bytes(prefix) as usize, payload.len());
        prop_assert_eq!(stream.len(), 4 + payload.len());
    }
}

proptest! {
    // Property: v5 encoding round-trips arbitrary value trees
    #[test]
    fn prop_value_roundtrip_v5(value in arb_value()) {
        let bytes = encode_value(&value, FormatVariant::V5).expect("encode");
        let decoded = decode_value(&bytes).expect("decode");
        prop_assert_eq!(decoded, value);
    }
}

proptest! {
    // Property: encoding is deterministic in both variants
    #[test]
    fn prop_encoding_deterministic(value in arb_value()) {
        for variant in [FormatVariant::Legacy, FormatVariant::V5] {
            let first = encode_value(&value, variant).expect("encode");
            let second = encode_value(&value, variant).expect("encode");
            prop_assert_eq!(first, second);
        }
    }
}

proptest! {
    // Property: heartbeats survive both variants byte-for-byte
    #[test]
    fn prop_heartbeat_roundtrip(
        incoming in any::<u64>(),
        outgoing in any::<u64>(),
        discard in prop::option::of(prop::collection::vec(any::<u8>(), 0..256)),
    ) {
        let message = Message::Heartbeat {
            incoming_seq: incoming,
            outgoing_seq: outgoing,
            discard,
        };

        for variant in [FormatVariant::Legacy, FormatVariant::V5] {
            let serializer = Serializer::new(variant);
            let bytes = serializer.serialize(&message).expect("serialize");
            let recovered = serializer.deserialize(&bytes).expect("deserialize");
            prop_assert_eq!(&message, &recovered);
        }
    }
}

proptest! {
    // Property: id-bearing acknowledgements round-trip within [0, 2^53]
    #[test]
    fn prop_published_roundtrip(request in 0..=MAX_ID, publication in 0..=MAX_ID) {
        let message = Message::Published { request, publication };
        let serializer = Serializer::default();

        let bytes = serializer.serialize(&message).expect("serialize");
        prop_assert_eq!(serializer.deserialize(&bytes).expect("deserialize"), message);
    }
}

proptest! {
    // Property: truncating an encoded value never yields a value
    #[test]
    fn prop_truncation_never_succeeds(value in arb_value(), cut in 0.0f64..1.0) {
        let bytes = encode_value(&value, FormatVariant::V5).expect("encode");
        if bytes.len() > 1 {
            let k = 1 + ((bytes.len() - 2) as f64 * cut) as usize;
            let result = decode_value(&bytes[..k]);
            prop_assert!(matches!(result, Err(WampError::CorruptEncoding(_))));
        }
    }
}
