//! Wire-level types shared by the codec, the connection core and the
//! generated-by-hand command registry (`corvid_cdp`).
//!
//! Nothing in this crate knows about WebSockets, targets or sessions; it only
//! describes the shape of a CDP message as specified in `spec.md` §3.

use std::borrow::Cow;
use std::fmt;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A command envelope ready to be written to the socket.
///
/// `id` is assigned by the codec from a per-connection counter; `sessionId`
/// is stamped by the Target/Session Manager and is absent for commands
/// addressed to the browser itself.
#[derive(Serialize, Debug, PartialEq)]
pub struct MethodCall {
    pub id: CallId,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub method: Cow<'static, str>,
    pub params: serde_json::Value,
}

/// Unique, monotonically assigned identifier for an outstanding command.
///
/// Invariant (spec §3): no two outstanding commands on the same connection
/// share an id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(usize);

impl CallId {
    pub fn new(id: usize) -> Self {
        CallId(id)
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallId({})", self.0)
    }
}

/// A typed CDP command: carries its own wire method name (via [`Method`]) and
/// names the shape of the result the browser will send back.
pub trait Command: serde::ser::Serialize + Method {
    type Response: DeserializeOwned + fmt::Debug;
}

/// The result of a completed [`Command`], still tagged with the `id` and
/// method that produced it.
#[derive(Debug)]
pub struct CommandResponse<T>
where
    T: fmt::Debug,
{
    pub id: CallId,
    pub result: T,
    pub method: Cow<'static, str>,
}

pub type CommandResult<T> = Result<CommandResponse<T>, Error>;

impl<T: fmt::Debug> Deref for CommandResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.result
    }
}

/// Anything identified by a `"Domain.method"` wire string: commands, events,
/// and the internal command-message wrappers that carry one to the socket.
pub trait Method {
    /// The whole string identifier for this method, e.g. `DOM.removeNode`.
    fn identifier(&self) -> Cow<'static, str>;

    /// The name of the domain this method belongs to, e.g. `DOM`.
    fn domain_name(&self) -> Cow<'static, str> {
        self.split().0
    }

    /// The standalone identifier of the method inside the domain, e.g.
    /// `removeNode`.
    fn method_name(&self) -> Cow<'static, str> {
        self.split().1
    }

    /// Tuple of (`domain_name`, `method_name`): (`DOM`, `removeNode`).
    fn split(&self) -> (Cow<'static, str>, Cow<'static, str>) {
        match self.identifier() {
            Cow::Borrowed(id) => {
                let mut iter = id.split('.');
                (iter.next().unwrap().into(), iter.next().unwrap().into())
            }
            Cow::Owned(id) => {
                let mut iter = id.split('.');
                (
                    Cow::Owned(iter.next().unwrap().into()),
                    Cow::Owned(iter.next().unwrap().into()),
                )
            }
        }
    }
}

/// An event produced by the browser and decoded generically: `method` names
/// the event, `params` is the still-unparsed payload, `session_id` scopes it
/// to a target per spec §3 ("Events carrying a `sessionId`...").
#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct CdpEventMessage {
    pub method: Cow<'static, str>,
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
    pub params: serde_json::Value,
}

impl Method for CdpEventMessage {
    fn identifier(&self) -> Cow<'static, str> {
        self.method.clone()
    }
}

impl Event for CdpEventMessage {
    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

/// Marker for a type that can ride in the `Message::Event` arm of the codec.
pub trait Event: Method + DeserializeOwned {
    fn session_id(&self) -> Option<&str>;
}

/// A response envelope from the browser, still correlated by `id` only; the
/// Connection core decides whether `result`/`error` means success or failure.
#[derive(Deserialize, Debug, PartialEq, Clone)]
pub struct Response {
    pub id: CallId,
    pub result: Option<serde_json::Value>,
    pub error: Option<Error>,
}

/// Either half of what an inbound frame can decode to (spec §4.A): a
/// response correlated to an outstanding command, or an unsolicited event.
/// `#[serde(untagged)]` on the shared `id` field is what the Message Codec
/// relies on to classify frames without a discriminant.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum Message<T = CdpEventMessage> {
    Response(Response),
    Event(T),
}

/// The browser's `{code, message}` error shape (spec §3 Response envelope).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Error {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CDP error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Ping;

    impl Method for Ping {
        fn identifier(&self) -> Cow<'static, str> {
            "Target.ping".into()
        }
    }

    #[test]
    fn splits_domain_and_method() {
        let p = Ping;
        assert_eq!(p.domain_name(), "Target");
        assert_eq!(p.method_name(), "ping");
    }

    #[test]
    fn decodes_response_vs_event() {
        let resp: Message = serde_json::from_str(r#"{"id":1,"result":{}}"#).unwrap();
        assert!(matches!(resp, Message::Response(_)));

        let ev: Message = serde_json::from_str(
            r#"{"method":"Page.loadEventFired","params":{},"sessionId":"S1"}"#,
        )
        .unwrap();
        assert!(matches!(ev, Message::Event(_)));
    }
}
