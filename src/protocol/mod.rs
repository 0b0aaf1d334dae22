//! # WAMP Message Model
//!
//! Typed representation of the WAMP message catalog and its wire mapping.
//!
//! Every message travels as an ordered sequence whose head is an integer
//! type code; the modules here construct those sequences and validate
//! them on the way back in. No bytes are touched at this layer - the
//! serializer owns the byte representation.
//!
//! ## Components
//! - **Message**: the closed catalog of message variants
//! - **Roles**: client/router capability sets announced at session start

use rmpv::Value;
use std::collections::BTreeMap;

pub mod message;
pub mod roles;

#[cfg(test)]
mod tests;

/// WAMP dicts are string-keyed, open-valued mappings
pub type Dict = BTreeMap<String, Value>;

/// WAMP lists are heterogeneous value sequences
pub type List = Vec<Value>;

/// Convert a wire map into a [`Dict`]. Returns `None` for non-map
/// values, non-string keys, or duplicate keys.
pub(crate) fn value_to_dict(value: &Value) -> Option<Dict> {
    let entries = value.as_map()?;
    let mut dict = Dict::new();
    for (key, val) in entries {
        let key = key.as_str()?;
        if dict.insert(key.to_owned(), val.clone()).is_some() {
            return None;
        }
    }
    Some(dict)
}

/// Convert a [`Dict`] into its wire map, keys in deterministic order.
pub(crate) fn dict_to_value(dict: &Dict) -> Value {
    Value::Map(
        dict.iter()
            .map(|(k, v)| (Value::from(k.as_str()), v.clone()))
            .collect(),
    )
}
