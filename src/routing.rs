//! The `(handler, sessionId)` pair every command-issuing object in this
//! crate resolves before it can talk to the browser (spec §4.G "Routing
//! resolution"). `Tab` always routes to its own session; `WebElement`
//! resolves through up to three layers (its own iframe context, an
//! inherited parent iframe, or its tab) before falling back to this.

use futures::channel::mpsc::Sender;

use corvid_cdp::browser_protocol::target::{SessionId, TargetId};
use corvid_types::{Command, CommandResponse};

use crate::error::Result;
use crate::handler::HandlerMessage;

/// Everything a command needs to reach the right session on the right
/// connection. Cloning is cheap — `Sender` is a reference-counted handle.
#[derive(Debug, Clone)]
pub(crate) struct Routing {
    handler_tx: Sender<HandlerMessage>,
    session_id: Option<SessionId>,
    target_id: TargetId,
    debug_ws_url: String,
}

impl Routing {
    pub fn new(
        handler_tx: Sender<HandlerMessage>,
        session_id: Option<SessionId>,
        target_id: TargetId,
        debug_ws_url: String,
    ) -> Self {
        Self {
            handler_tx,
            session_id,
            target_id,
            debug_ws_url,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session_id.clone()
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    pub fn debug_ws_url(&self) -> &str {
        &self.debug_ws_url
    }

    pub fn handler_tx(&self) -> Sender<HandlerMessage> {
        self.handler_tx.clone()
    }

    /// Re-points this routing at a different (child) session, the way an
    /// iframe's `IFrameContext` carries its own `sessionId` once resolved.
    pub fn with_session(&self, session_id: SessionId) -> Self {
        Self {
            handler_tx: self.handler_tx.clone(),
            session_id: Some(session_id),
            target_id: self.target_id.clone(),
            debug_ws_url: self.debug_ws_url.clone(),
        }
    }

    pub async fn execute<C: Command>(&self, cmd: C) -> Result<CommandResponse<C::Response>> {
        let mut tx = self.handler_tx.clone();
        crate::handler::execute(&mut tx, cmd, self.session_id.clone()).await
    }
}
