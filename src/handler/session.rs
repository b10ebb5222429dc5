use corvid_cdp::browser_protocol::target::{SessionId, TargetId};

/// A CDP session: the routing key flattened mode uses to address a command
/// at a specific attached target (spec §3 Session).
#[derive(Debug, Clone)]
pub(crate) struct Session {
    id: SessionId,
    target_id: TargetId,
}

impl Session {
    pub fn new(id: SessionId, target_id: TargetId) -> Self {
        Self { id, target_id }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    pub fn target_id(&self) -> &TargetId {
        &self.target_id
    }
}
