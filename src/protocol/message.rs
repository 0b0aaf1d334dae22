//! WAMP message catalog and its wire mapping.
//!
//! Every message is an ordered sequence `[TYPE, field, field, ...]`
//! whose head is the variant's integer type code. [`Message::to_wire`]
//! builds that sequence; [`Message::from_wire`] validates it field by
//! field and reconstructs the typed variant, reporting the first
//! offending field on mismatch.
//!
//! Arity checking is strict: trailing elements beyond a variant's
//! documented maximum are rejected, not truncated.
//!
//! Empty `args` lists and `kwargs` dicts normalize to absent on decode,
//! matching the reference stacks; an absent `args` is emitted as an
//! empty list when `kwargs` is present, since payload fields are
//! positional.
//!
//! ```rust
//! use wamp_protocol::protocol::message::Message;
//! use wamp_protocol::protocol::roles::ClientRoles;
//!
//! let hello = Message::Hello {
//!     realm: "realm1".into(),
//!     roles: ClientRoles::all(),
//! };
//! let wire = hello.to_wire();
//! assert_eq!(Message::from_wire(&wire).unwrap(), hello);
//! ```

use super::roles::{ClientRoles, RouterRoles};
use super::{dict_to_value, value_to_dict, Dict, List};
use crate::config::MAX_ID;
use crate::error::{Result, WampError};
use rmpv::Value;
use std::fmt;

/// Message type codes as assigned by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u64)]
pub enum MessageType {
    Hello = 1,
    Welcome = 2,
    Abort = 3,
    Challenge = 4,
    Authenticate = 5,
    Goodbye = 6,
    Heartbeat = 7,
    Error = 8,
    Publish = 16,
    Published = 17,
    Subscribe = 32,
    Subscribed = 33,
    Unsubscribe = 34,
    Unsubscribed = 35,
    Event = 36,
    Call = 48,
    Cancel = 49,
    Result = 50,
    Register = 64,
    Registered = 65,
    Unregister = 66,
    Unregistered = 67,
    Invocation = 68,
    Interrupt = 69,
    Yield = 70,
}

impl MessageType {
    /// The integer code carried as the head of the wire sequence
    pub fn code(self) -> u64 {
        self as u64
    }

    /// Look up a code; `None` means the catalog has no such variant
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(MessageType::Hello),
            2 => Some(MessageType::Welcome),
            3 => Some(MessageType::Abort),
            4 => Some(MessageType::Challenge),
            5 => Some(MessageType::Authenticate),
            6 => Some(MessageType::Goodbye),
            7 => Some(MessageType::Heartbeat),
            8 => Some(MessageType::Error),
            16 => Some(MessageType::Publish),
            17 => Some(MessageType::Published),
            32 => Some(MessageType::Subscribe),
            33 => Some(MessageType::Subscribed),
            34 => Some(MessageType::Unsubscribe),
            35 => Some(MessageType::Unsubscribed),
            36 => Some(MessageType::Event),
            48 => Some(MessageType::Call),
            49 => Some(MessageType::Cancel),
            50 => Some(MessageType::Result),
            64 => Some(MessageType::Register),
            65 => Some(MessageType::Registered),
            66 => Some(MessageType::Unregister),
            67 => Some(MessageType::Unregistered),
            68 => Some(MessageType::Invocation),
            69 => Some(MessageType::Interrupt),
            70 => Some(MessageType::Yield),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MessageType::Hello => "HELLO",
            MessageType::Welcome => "WELCOME",
            MessageType::Abort => "ABORT",
            MessageType::Challenge => "CHALLENGE",
            MessageType::Authenticate => "AUTHENTICATE",
            MessageType::Goodbye => "GOODBYE",
            MessageType::Heartbeat => "HEARTBEAT",
            MessageType::Error => "ERROR",
            MessageType::Publish => "PUBLISH",
            MessageType::Published => "PUBLISHED",
            MessageType::Subscribe => "SUBSCRIBE",
            MessageType::Subscribed => "SUBSCRIBED",
            MessageType::Unsubscribe => "UNSUBSCRIBE",
            MessageType::Unsubscribed => "UNSUBSCRIBED",
            MessageType::Event => "EVENT",
            MessageType::Call => "CALL",
            MessageType::Cancel => "CANCEL",
            MessageType::Result => "RESULT",
            MessageType::Register => "REGISTER",
            MessageType::Registered => "REGISTERED",
            MessageType::Unregister => "UNREGISTER",
            MessageType::Unregistered => "UNREGISTERED",
            MessageType::Invocation => "INVOCATION",
            MessageType::Interrupt => "INTERRUPT",
            MessageType::Yield => "YIELD",
        }
    }

    /// Permitted wire element counts, head included
    fn arity(self) -> (usize, usize) {
        match self {
            MessageType::Hello
            | MessageType::Welcome
            | MessageType::Abort
            | MessageType::Challenge
            | MessageType::Authenticate
            | MessageType::Goodbye
            | MessageType::Published
            | MessageType::Subscribed
            | MessageType::Unsubscribe
            | MessageType::Cancel
            | MessageType::Registered
            | MessageType::Unregister
            | MessageType::Interrupt => (3, 3),
            MessageType::Heartbeat => (3, 4),
            MessageType::Error => (5, 7),
            MessageType::Publish | MessageType::Event | MessageType::Call | MessageType::Invocation => (4, 6),
            MessageType::Subscribe | MessageType::Register => (4, 4),
            MessageType::Unsubscribed | MessageType::Unregistered => (2, 2),
            MessageType::Result | MessageType::Yield => (3, 5),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A WAMP protocol message.
///
/// Closed catalog: decoding matches exhaustively on the type code, so a
/// future catalog extension is a compile-visible change here rather
/// than an open-ended lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Hello {
        realm: String,
        roles: ClientRoles,
    },
    Welcome {
        session: u64,
        roles: RouterRoles,
    },
    Abort {
        details: Dict,
        reason: String,
    },
    Challenge {
        auth_method: String,
        extra: Dict,
    },
    Authenticate {
        signature: String,
        extra: Dict,
    },
    Goodbye {
        details: Dict,
        reason: String,
    },
    Heartbeat {
        incoming_seq: u64,
        outgoing_seq: u64,
        discard: Option<Vec<u8>>,
    },
    Error {
        request_type: MessageType,
        request: u64,
        details: Dict,
        error: String,
        args: Option<List>,
        kwargs: Option<Dict>,
    },
    Publish {
        request: u64,
        options: Dict,
        topic: String,
        args: Option<List>,
        kwargs: Option<Dict>,
    },
    Published {
        request: u64,
        publication: u64,
    },
    Subscribe {
        request: u64,
        options: Dict,
        topic: String,
    },
    Subscribed {
        request: u64,
        subscription: u64,
    },
    Unsubscribe {
        request: u64,
        subscription: u64,
    },
    Unsubscribed {
        request: u64,
    },
    Event {
        subscription: u64,
        publication: u64,
        details: Dict,
        args: Option<List>,
        kwargs: Option<Dict>,
    },
    Call {
        request: u64,
        options: Dict,
        procedure: String,
        args: Option<List>,
        kwargs: Option<Dict>,
    },
    Cancel {
        request: u64,
        options: Dict,
    },
    Result {
        request: u64,
        details: Dict,
        args: Option<List>,
        kwargs: Option<Dict>,
    },
    Register {
        request: u64,
        options: Dict,
        procedure: String,
    },
    Registered {
        request: u64,
        registration: u64,
    },
    Unregister {
        request: u64,
        registration: u64,
    },
    Unregistered {
        request: u64,
    },
    Invocation {
        request: u64,
        registration: u64,
        details: Dict,
        args: Option<List>,
        kwargs: Option<Dict>,
    },
    Interrupt {
        request: u64,
        options: Dict,
    },
    Yield {
        request: u64,
        options: Dict,
        args: Option<List>,
        kwargs: Option<Dict>,
    },
}

impl Message {
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Hello { .. } => MessageType::Hello,
            Message::Welcome { .. } => MessageType::Welcome,
            Message::Abort { .. } => MessageType::Abort,
            Message::Challenge { .. } => MessageType::Challenge,
            Message::Authenticate { .. } => MessageType::Authenticate,
            Message::Goodbye { .. } => MessageType::Goodbye,
            Message::Heartbeat { .. } => MessageType::Heartbeat,
            Message::Error { .. } => MessageType::Error,
            Message::Publish { .. } => MessageType::Publish,
            Message::Published { .. } => MessageType::Published,
            Message::Subscribe { .. } => MessageType::Subscribe,
            Message::Subscribed { .. } => MessageType::Subscribed,
            Message::Unsubscribe { .. } => MessageType::Unsubscribe,
            Message::Unsubscribed { .. } => MessageType::Unsubscribed,
            Message::Event { .. } => MessageType::Event,
            Message::Call { .. } => MessageType::Call,
            Message::Cancel { .. } => MessageType::Cancel,
            Message::Result { .. } => MessageType::Result,
            Message::Register { .. } => MessageType::Register,
            Message::Registered { .. } => MessageType::Registered,
            Message::Unregister { .. } => MessageType::Unregister,
            Message::Unregistered { .. } => MessageType::Unregistered,
            Message::Invocation { .. } => MessageType::Invocation,
            Message::Interrupt { .. } => MessageType::Interrupt,
            Message::Yield { .. } => MessageType::Yield,
        }
    }

    /// Build the wire sequence `[TYPE, field, ...]` for this message.
    pub fn to_wire(&self) -> Value {
        let mut fields = vec![Value::from(self.message_type().code())];

        match self {
            Message::Hello { realm, roles } => {
                fields.push(Value::from(realm.as_str()));
                fields.push(roles_details(roles.to_wire()));
            }
            Message::Welcome { session, roles } => {
                fields.push(Value::from(*session));
                fields.push(roles_details(roles.to_wire()));
            }
            Message::Abort { details, reason } | Message::Goodbye { details, reason } => {
                fields.push(dict_to_value(details));
                fields.push(Value::from(reason.as_str()));
            }
            Message::Challenge { auth_method, extra } => {
                fields.push(Value::from(auth_method.as_str()));
                fields.push(dict_to_value(extra));
            }
            Message::Authenticate { signature, extra } => {
                fields.push(Value::from(signature.as_str()));
                fields.push(dict_to_value(extra));
            }
            Message::Heartbeat {
                incoming_seq,
                outgoing_seq,
                discard,
            } => {
                fields.push(Value::from(*incoming_seq));
                fields.push(Value::from(*outgoing_seq));
                if let Some(discard) = discard {
                    fields.push(Value::Binary(discard.clone()));
                }
            }
            Message::Error {
                request_type,
                request,
                details,
                error,
                args,
                kwargs,
            } => {
                fields.push(Value::from(request_type.code()));
                fields.push(Value::from(*request));
                fields.push(dict_to_value(details));
                fields.push(Value::from(error.as_str()));
                push_payload(&mut fields, args, kwargs);
            }
            Message::Publish {
                request,
                options,
                topic,
                args,
                kwargs,
            } => {
                fields.push(Value::from(*request));
                fields.push(dict_to_value(options));
                fields.push(Value::from(topic.as_str()));
                push_payload(&mut fields, args, kwargs);
            }
            Message::Published {
                request,
                publication,
            } => {
                fields.push(Value::from(*request));
                fields.push(Value::from(*publication));
            }
            Message::Subscribe {
                request,
                options,
                topic,
            } => {
                fields.push(Value::from(*request));
                fields.push(dict_to_value(options));
                fields.push(Value::from(topic.as_str()));
            }
            Message::Subscribed {
                request,
                subscription,
            } => {
                fields.push(Value::from(*request));
                fields.push(Value::from(*subscription));
            }
            Message::Unsubscribe {
                request,
                subscription,
            } => {
                fields.push(Value::from(*request));
                fields.push(Value::from(*subscription));
            }
            Message::Unsubscribed { request } => {
                fields.push(Value::from(*request));
            }
            Message::Event {
                subscription,
                publication,
                details,
                args,
                kwargs,
            } => {
                fields.push(Value::from(*subscription));
                fields.push(Value::from(*publication));
                fields.push(dict_to_value(details));
                push_payload(&mut fields, args, kwargs);
            }
            Message::Call {
                request,
                options,
                procedure,
                args,
                kwargs,
            } => {
                fields.push(Value::from(*request));
                fields.push(dict_to_value(options));
                fields.push(Value::from(procedure.as_str()));
                push_payload(&mut fields, args, kwargs);
            }
            Message::Cancel { request, options } | Message::Interrupt { request, options } => {
                fields.push(Value::from(*request));
                fields.push(dict_to_value(options));
            }
            Message::Result {
                request,
                details,
                args,
                kwargs,
            } => {
                fields.push(Value::from(*request));
                fields.push(dict_to_value(details));
                push_payload(&mut fields, args, kwargs);
            }
            Message::Register {
                request,
                options,
                procedure,
            } => {
                fields.push(Value::from(*request));
                fields.push(dict_to_value(options));
                fields.push(Value::from(procedure.as_str()));
            }
            Message::Registered {
                request,
                registration,
            } => {
                fields.push(Value::from(*request));
                fields.push(Value::from(*registration));
            }
            Message::Unregister {
                request,
                registration,
            } => {
                fields.push(Value::from(*request));
                fields.push(Value::from(*registration));
            }
            Message::Unregistered { request } => {
                fields.push(Value::from(*request));
            }
            Message::Invocation {
                request,
                registration,
                details,
                args,
                kwargs,
            } => {
                fields.push(Value::from(*request));
                fields.push(Value::from(*registration));
                fields.push(dict_to_value(details));
                push_payload(&mut fields, args, kwargs);
            }
            Message::Yield {
                request,
                options,
                args,
                kwargs,
            } => {
                fields.push(Value::from(*request));
                fields.push(dict_to_value(options));
                push_payload(&mut fields, args, kwargs);
            }
        }

        Value::Array(fields)
    }

    /// Validate a wire sequence and reconstruct the typed message.
    pub fn from_wire(value: &Value) -> Result<Message> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(WampError::UnknownMessageType(format!(
                    "message is not a sequence: {other}"
                )))
            }
        };
        let head = items
            .first()
            .ok_or_else(|| WampError::UnknownMessageType("empty sequence".into()))?;
        let code = head.as_u64().ok_or_else(|| {
            WampError::UnknownMessageType(format!("non-integer type tag: {head}"))
        })?;
        let message_type = MessageType::from_code(code)
            .ok_or_else(|| WampError::UnknownMessageType(code.to_string()))?;

        let fields = Fields { code, items };
        fields.expect_arity(message_type.arity())?;

        let message = match message_type {
            MessageType::Hello => Message::Hello {
                realm: fields.uri(1)?,
                roles: fields.client_roles(2)?,
            },
            MessageType::Welcome => Message::Welcome {
                session: fields.id(1)?,
                roles: fields.router_roles(2)?,
            },
            MessageType::Abort => Message::Abort {
                details: fields.dict(1)?,
                reason: fields.uri(2)?,
            },
            MessageType::Challenge => Message::Challenge {
                auth_method: fields.string(1)?,
                extra: fields.dict(2)?,
            },
            MessageType::Authenticate => Message::Authenticate {
                signature: fields.string(1)?,
                extra: fields.dict(2)?,
            },
            MessageType::Goodbye => Message::Goodbye {
                details: fields.dict(1)?,
                reason: fields.uri(2)?,
            },
            MessageType::Heartbeat => Message::Heartbeat {
                incoming_seq: fields.sequence(1)?,
                outgoing_seq: fields.sequence(2)?,
                discard: fields.opt_raw(3)?,
            },
            MessageType::Error => {
                let (args, kwargs) = fields.payload(5)?;
                Message::Error {
                    request_type: fields.request_type(1)?,
                    request: fields.id(2)?,
                    details: fields.dict(3)?,
                    error: fields.uri(4)?,
                    args,
                    kwargs,
                }
            }
            MessageType::Publish => {
                let (args, kwargs) = fields.payload(4)?;
                Message::Publish {
                    request: fields.id(1)?,
                    options: fields.dict(2)?,
                    topic: fields.uri(3)?,
                    args,
                    kwargs,
                }
            }
            MessageType::Published => Message::Published {
                request: fields.id(1)?,
                publication: fields.id(2)?,
            },
            MessageType::Subscribe => Message::Subscribe {
                request: fields.id(1)?,
                options: fields.dict(2)?,
                topic: fields.uri(3)?,
            },
            MessageType::Subscribed => Message::Subscribed {
                request: fields.id(1)?,
                subscription: fields.id(2)?,
            },
            MessageType::Unsubscribe => Message::Unsubscribe {
                request: fields.id(1)?,
                subscription: fields.id(2)?,
            },
            MessageType::Unsubscribed => Message::Unsubscribed {
                request: fields.id(1)?,
            },
            MessageType::Event => {
                let (args, kwargs) = fields.payload(4)?;
                Message::Event {
                    subscription: fields.id(1)?,
                    publication: fields.id(2)?,
                    details: fields.dict(3)?,
                    args,
                    kwargs,
                }
            }
            MessageType::Call => {
                let (args, kwargs) = fields.payload(4)?;
                Message::Call {
                    request: fields.id(1)?,
                    options: fields.dict(2)?,
                    procedure: fields.uri(3)?,
                    args,
                    kwargs,
                }
            }
            MessageType::Cancel => Message::Cancel {
                request: fields.id(1)?,
                options: fields.dict(2)?,
            },
            MessageType::Result => {
                let (args, kwargs) = fields.payload(3)?;
                Message::Result {
                    request: fields.id(1)?,
                    details: fields.dict(2)?,
                    args,
                    kwargs,
                }
            }
            MessageType::Register => Message::Register {
                request: fields.id(1)?,
                options: fields.dict(2)?,
                procedure: fields.uri(3)?,
            },
            MessageType::Registered => Message::Registered {
                request: fields.id(1)?,
                registration: fields.id(2)?,
            },
            MessageType::Unregister => Message::Unregister {
                request: fields.id(1)?,
                registration: fields.id(2)?,
            },
            MessageType::Unregistered => Message::Unregistered {
                request: fields.id(1)?,
            },
            MessageType::Invocation => {
                let (args, kwargs) = fields.payload(4)?;
                Message::Invocation {
                    request: fields.id(1)?,
                    registration: fields.id(2)?,
                    details: fields.dict(3)?,
                    args,
                    kwargs,
                }
            }
            MessageType::Interrupt => Message::Interrupt {
                request: fields.id(1)?,
                options: fields.dict(2)?,
            },
            MessageType::Yield => {
                let (args, kwargs) = fields.payload(3)?;
                Message::Yield {
                    request: fields.id(1)?,
                    options: fields.dict(2)?,
                    args,
                    kwargs,
                }
            }
        };

        Ok(message)
    }
}

/// Wrap a roles mapping into the session details dict
fn roles_details(roles: Value) -> Value {
    Value::Map(vec![(Value::from("roles"), roles)])
}

/// Append trailing payload fields. `args` must be emitted (possibly
/// empty) whenever `kwargs` is present, since the fields are positional.
fn push_payload(fields: &mut Vec<Value>, args: &Option<List>, kwargs: &Option<Dict>) {
    match (args, kwargs) {
        (None, None) => {}
        (Some(args), None) => fields.push(Value::Array(args.clone())),
        (args, Some(kwargs)) => {
            fields.push(Value::Array(args.clone().unwrap_or_default()));
            fields.push(dict_to_value(kwargs));
        }
    }
}

/// Positional field accessors with uniform diagnostics.
struct Fields<'a> {
    code: u64,
    items: &'a [Value],
}

impl Fields<'_> {
    fn expect_arity(&self, (min, max): (usize, usize)) -> Result<()> {
        let actual = self.items.len();
        if actual < min || actual > max {
            return Err(WampError::ArityMismatch {
                code: self.code,
                min,
                max,
                actual,
            });
        }
        Ok(())
    }

    fn err(&self, index: usize, expected: &'static str) -> WampError {
        WampError::MalformedFields {
            code: self.code,
            index,
            expected,
        }
    }

    /// A WAMP ID, bounded by 2^53
    fn id(&self, index: usize) -> Result<u64> {
        let id = self.items[index]
            .as_u64()
            .ok_or_else(|| self.err(index, "an id in [0, 2^53]"))?;
        if id > MAX_ID {
            return Err(self.err(index, "an id in [0, 2^53]"));
        }
        Ok(id)
    }

    /// An unbounded non-negative counter
    fn sequence(&self, index: usize) -> Result<u64> {
        self.items[index]
            .as_u64()
            .ok_or_else(|| self.err(index, "a non-negative integer"))
    }

    fn string(&self, index: usize) -> Result<String> {
        self.items[index]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.err(index, "a string"))
    }

    fn uri(&self, index: usize) -> Result<String> {
        self.items[index]
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.err(index, "a uri string"))
    }

    fn dict(&self, index: usize) -> Result<Dict> {
        value_to_dict(&self.items[index]).ok_or_else(|| self.err(index, "a dict with string keys"))
    }

    /// Trailing raw payload: a string or binary blob, bytes kept as-is
    fn opt_raw(&self, index: usize) -> Result<Option<Vec<u8>>> {
        match self.items.get(index) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_bytes().to_vec())),
            Some(Value::Binary(b)) => Ok(Some(b.clone())),
            Some(_) => Err(self.err(index, "a string or binary payload")),
        }
    }

    fn request_type(&self, index: usize) -> Result<MessageType> {
        self.items[index]
            .as_u64()
            .and_then(MessageType::from_code)
            .ok_or_else(|| self.err(index, "a known message type code"))
    }

    fn client_roles(&self, index: usize) -> Result<ClientRoles> {
        let details = self.dict(index)?;
        let roles = details
            .get("roles")
            .ok_or_else(|| self.err(index, "a details dict announcing roles"))?;
        ClientRoles::from_wire(roles).map_err(|expected| self.err(index, expected))
    }

    fn router_roles(&self, index: usize) -> Result<RouterRoles> {
        let details = self.dict(index)?;
        let roles = details
            .get("roles")
            .ok_or_else(|| self.err(index, "a details dict announcing roles"))?;
        RouterRoles::from_wire(roles).map_err(|expected| self.err(index, expected))
    }

    /// Trailing `args`/`kwargs` starting at `index`. Empty payloads
    /// normalize to absent.
    fn payload(&self, index: usize) -> Result<(Option<List>, Option<Dict>)> {
        let args = match self.items.get(index) {
            None => return Ok((None, None)),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(self.err(index, "an arguments list")),
        };
        let kwargs = match self.items.get(index + 1) {
            None => Dict::new(),
            Some(value) => value_to_dict(value)
                .ok_or_else(|| self.err(index + 1, "a keyword-arguments dict"))?,
        };

        let args = if args.is_empty() { None } else { Some(args) };
        let kwargs = if kwargs.is_empty() { None } else { Some(kwargs) };
        Ok((args, kwargs))
    }
}
