// test-only module included via protocol/mod.rs
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::protocol::message::{Message, MessageType};
use crate::protocol::roles::{ClientRoles, Role, RoleFeatures, RouterRole, RouterRoles};
use crate::protocol::Dict;
use rmpv::Value;

#[test]
fn test_hello_wire_shape() {
    let hello = Message::Hello {
        realm: "realm1".to_string(),
        roles: ClientRoles::all(),
    };

    let wire = hello.to_wire();
    let items = wire.as_array().expect("sequence");

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_u64(), Some(1));
    assert_eq!(items[1].as_str(), Some("realm1"));

    // details dict must contain the roles mapping keyed by role name
    let details = items[2].as_map().expect("details dict");
    let (key, roles) = &details[0];
    assert_eq!(key.as_str(), Some("roles"));
    let roles = roles.as_map().expect("roles dict");
    let names: Vec<&str> = roles.iter().filter_map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["publisher", "subscriber", "caller", "callee"]);
}

#[test]
fn test_hello_roundtrip_is_order_independent() {
    let forward = Message::Hello {
        realm: "realm1".to_string(),
        roles: ClientRoles::new()
            .with_role(Role::Caller, RoleFeatures::new())
            .with_role(Role::Publisher, RoleFeatures::new()),
    };
    let reverse = Message::Hello {
        realm: "realm1".to_string(),
        roles: ClientRoles::new()
            .with_role(Role::Publisher, RoleFeatures::new())
            .with_role(Role::Caller, RoleFeatures::new()),
    };

    assert_eq!(forward, reverse);
    assert_eq!(
        Message::from_wire(&forward.to_wire()).expect("decode"),
        Message::from_wire(&reverse.to_wire()).expect("decode"),
    );
}

#[test]
fn test_welcome_announces_router_roles() {
    let welcome = Message::Welcome {
        session: 9_129_137_332,
        roles: RouterRoles::all(),
    };

    let decoded = Message::from_wire(&welcome.to_wire()).expect("decode");
    let Message::Welcome { session, roles } = decoded else {
        panic!("expected Welcome");
    };
    assert_eq!(session, 9_129_137_332);
    assert!(roles.contains(RouterRole::Broker));
    assert!(roles.contains(RouterRole::Dealer));
}

#[test]
fn test_challenge_roundtrip() {
    let challenge = Message::Challenge {
        auth_method: "cookie".to_string(),
        extra: Dict::new(),
    };

    let wire = challenge.to_wire();
    let items = wire.as_array().expect("sequence");
    assert_eq!(items[0].as_u64(), Some(4));
    assert_eq!(items[1].as_str(), Some("cookie"));
    // extra must be present as an empty mapping, not absent
    assert_eq!(items[2], Value::Map(vec![]));

    assert_eq!(Message::from_wire(&wire).expect("decode"), challenge);
}

#[test]
fn test_heartbeat_with_discard() {
    let heartbeat = Message::Heartbeat {
        incoming_seq: 3,
        outgoing_seq: 7,
        discard: Some(b"throw me away".to_vec()),
    };

    let decoded = Message::from_wire(&heartbeat.to_wire()).expect("decode");
    let Message::Heartbeat {
        incoming_seq,
        outgoing_seq,
        discard,
    } = decoded
    else {
        panic!("expected Heartbeat");
    };

    assert_eq!(incoming_seq, 3);
    assert_eq!(outgoing_seq, 7);
    assert_eq!(discard.as_deref(), Some(&b"throw me away"[..]));
}

#[test]
fn test_heartbeat_discard_is_optional() {
    let heartbeat = Message::Heartbeat {
        incoming_seq: 0,
        outgoing_seq: 1,
        discard: None,
    };

    let wire = heartbeat.to_wire();
    assert_eq!(wire.as_array().expect("sequence").len(), 3);
    assert_eq!(Message::from_wire(&wire).expect("decode"), heartbeat);
}

#[test]
fn test_heartbeat_accepts_string_discard() {
    // a legacy-format peer sends the discard payload as a raw string
    let wire = Value::Array(vec![
        Value::from(7u64),
        Value::from(3u64),
        Value::from(7u64),
        Value::from("throw me away"),
    ]);

    let decoded = Message::from_wire(&wire).expect("decode");
    let Message::Heartbeat { discard, .. } = decoded else {
        panic!("expected Heartbeat");
    };
    assert_eq!(discard.as_deref(), Some(&b"throw me away"[..]));
}

#[test]
fn test_error_carries_request_type() {
    let error = Message::Error {
        request_type: MessageType::Call,
        request: 7717,
        details: Dict::new(),
        error: "wamp.error.no_such_procedure".to_string(),
        args: None,
        kwargs: None,
    };

    let wire = error.to_wire();
    let items = wire.as_array().expect("sequence");
    assert_eq!(items[1].as_u64(), Some(48));
    assert_eq!(Message::from_wire(&wire).expect("decode"), error);
}

#[test]
fn test_unknown_request_type_in_error_rejected() {
    let wire = Value::Array(vec![
        Value::from(8u64),
        Value::from(42u64), // not a catalog code
        Value::from(7717u64),
        Value::Map(vec![]),
        Value::from("wamp.error.canceled"),
    ]);

    let err = Message::from_wire(&wire).expect_err("must reject");
    assert!(matches!(
        err,
        crate::error::WampError::MalformedFields { code: 8, index: 1, .. }
    ));
}
