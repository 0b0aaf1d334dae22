//! Session role announcements.
//!
//! A peer advertises its capabilities during session establishment as a
//! mapping keyed by role name, each role carrying an open feature dict.
//! Role order carries no meaning; the sets here compare and serialize
//! independently of insertion order.

use super::{dict_to_value, value_to_dict, Dict};
use rmpv::Value;
use std::collections::BTreeMap;

/// Client-side roles announced in HELLO
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Role {
    Publisher,
    Subscriber,
    Caller,
    Callee,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Publisher, Role::Subscriber, Role::Caller, Role::Callee];

    pub fn name(self) -> &'static str {
        match self {
            Role::Publisher => "publisher",
            Role::Subscriber => "subscriber",
            Role::Caller => "caller",
            Role::Callee => "callee",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "publisher" => Some(Role::Publisher),
            "subscriber" => Some(Role::Subscriber),
            "caller" => Some(Role::Caller),
            "callee" => Some(Role::Callee),
            _ => None,
        }
    }
}

/// Router-side roles announced in WELCOME
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RouterRole {
    Broker,
    Dealer,
}

impl RouterRole {
    pub fn name(self) -> &'static str {
        match self {
            RouterRole::Broker => "broker",
            RouterRole::Dealer => "dealer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "broker" => Some(RouterRole::Broker),
            "dealer" => Some(RouterRole::Dealer),
            _ => None,
        }
    }
}

/// Feature dict advertised for one role, stored exactly as sent.
///
/// An empty dict is a valid announcement (the role is supported with no
/// optional features) and serializes as an empty mapping, never as an
/// absent one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoleFeatures {
    pub features: Dict,
}

impl RoleFeatures {
    pub fn new() -> Self {
        Self::default()
    }
}

impl From<Dict> for RoleFeatures {
    fn from(features: Dict) -> Self {
        Self { features }
    }
}

/// The set of roles a client announces in HELLO.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientRoles {
    roles: BTreeMap<Role, RoleFeatures>,
}

impl ClientRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// All four client roles with empty feature dicts.
    pub fn all() -> Self {
        let mut set = Self::new();
        for role in Role::ALL {
            set.insert(role, RoleFeatures::new());
        }
        set
    }

    pub fn with_role(mut self, role: Role, features: RoleFeatures) -> Self {
        self.insert(role, features);
        self
    }

    pub fn insert(&mut self, role: Role, features: RoleFeatures) {
        self.roles.insert(role, features);
    }

    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains_key(&role)
    }

    pub fn get(&self, role: Role) -> Option<&RoleFeatures> {
        self.roles.get(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &RoleFeatures)> {
        self.roles.iter().map(|(role, features)| (*role, features))
    }

    pub(crate) fn to_wire(&self) -> Value {
        Value::Map(
            self.roles
                .iter()
                .map(|(role, features)| {
                    (Value::from(role.name()), dict_to_value(&features.features))
                })
                .collect(),
        )
    }

    /// Parse a `{"role name": feature dict}` wire mapping. The error is
    /// the expectation text for the caller's field diagnostics.
    pub(crate) fn from_wire(value: &Value) -> Result<Self, &'static str> {
        let entries = value.as_map().ok_or("a roles dict")?;
        let mut set = Self::new();
        for (name, features) in entries {
            let name = name.as_str().ok_or("string role names")?;
            let role = Role::from_name(name).ok_or("a known client role name")?;
            let features = value_to_dict(features).ok_or("a feature dict per role")?;
            set.insert(role, RoleFeatures { features });
        }
        Ok(set)
    }
}

/// The set of roles a router announces in WELCOME.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouterRoles {
    roles: BTreeMap<RouterRole, RoleFeatures>,
}

impl RouterRoles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broker and dealer with empty feature dicts.
    pub fn all() -> Self {
        let mut set = Self::new();
        set.insert(RouterRole::Broker, RoleFeatures::new());
        set.insert(RouterRole::Dealer, RoleFeatures::new());
        set
    }

    pub fn with_role(mut self, role: RouterRole, features: RoleFeatures) -> Self {
        self.insert(role, features);
        self
    }

    pub fn insert(&mut self, role: RouterRole, features: RoleFeatures) {
        self.roles.insert(role, features);
    }

    pub fn contains(&self, role: RouterRole) -> bool {
        self.roles.contains_key(&role)
    }

    pub fn get(&self, role: RouterRole) -> Option<&RoleFeatures> {
        self.roles.get(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub(crate) fn to_wire(&self) -> Value {
        Value::Map(
            self.roles
                .iter()
                .map(|(role, features)| {
                    (Value::from(role.name()), dict_to_value(&features.features))
                })
                .collect(),
        )
    }

    pub(crate) fn from_wire(value: &Value) -> Result<Self, &'static str> {
        let entries = value.as_map().ok_or("a roles dict")?;
        let mut set = Self::new();
        for (name, features) in entries {
            let name = name.as_str().ok_or("string role names")?;
            let role = RouterRole::from_name(name).ok_or("a known router role name")?;
            let features = value_to_dict(features).ok_or("a feature dict per role")?;
            set.insert(role, RoleFeatures { features });
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_name(role.name()), Some(role));
        }
        assert_eq!(Role::from_name("broker"), None);
        assert_eq!(RouterRole::from_name("broker"), Some(RouterRole::Broker));
    }

    #[test]
    fn role_set_ignores_insertion_order() {
        let forward = ClientRoles::new()
            .with_role(Role::Publisher, RoleFeatures::new())
            .with_role(Role::Callee, RoleFeatures::new());
        let reverse = ClientRoles::new()
            .with_role(Role::Callee, RoleFeatures::new())
            .with_role(Role::Publisher, RoleFeatures::new());

        assert_eq!(forward, reverse);
        assert_eq!(forward.to_wire(), reverse.to_wire());
    }

    #[test]
    fn unknown_role_name_rejected() {
        let wire = Value::Map(vec![(Value::from("observer"), Value::Map(vec![]))]);
        assert!(ClientRoles::from_wire(&wire).is_err());
    }

    #[test]
    fn empty_feature_dict_survives() {
        let wire = ClientRoles::all().to_wire();
        let parsed = ClientRoles::from_wire(&wire).expect("parse");
        assert_eq!(parsed.len(), 4);
        for role in Role::ALL {
            assert!(parsed.get(role).expect("present").features.is_empty());
        }
    }
}
