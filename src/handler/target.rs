//! Per-target state the Handler keeps for every attached target: which CDP
//! domains are enabled (spec §4.F idempotent enable/disable), the frame
//! tree cache the Frame Resolver consults, and that target's Network Log
//! Store.

use std::collections::HashMap;

use corvid_cdp::browser_protocol::page::{Frame, FrameId};
use corvid_cdp::browser_protocol::target::{SessionId, TargetId, TargetInfo};

use crate::handler::network::NetworkLogStore;

/// Idempotent domain-enable bookkeeping: re-enabling is cheap, disabling
/// only sends the CDP `disable` once, matching spec §4.F exactly.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct EnabledDomains {
    pub page: bool,
    pub network: bool,
    pub dom: bool,
    pub runtime: bool,
    pub fetch: bool,
}

#[derive(Debug)]
pub(crate) struct TargetState {
    info: TargetInfo,
    session_id: Option<SessionId>,
    enabled: EnabledDomains,
    network_log: NetworkLogStore,
    frames: HashMap<FrameId, Frame>,
    root_frame: Option<FrameId>,
    fetch_handle_auth: bool,
}

impl TargetState {
    pub fn new(info: TargetInfo) -> Self {
        Self {
            info,
            session_id: None,
            enabled: EnabledDomains::default(),
            network_log: NetworkLogStore::new(),
            frames: HashMap::new(),
            root_frame: None,
            fetch_handle_auth: false,
        }
    }

    pub fn target_id(&self) -> &TargetId {
        &self.info.target_id
    }

    pub fn info(&self) -> &TargetInfo {
        &self.info
    }

    pub fn set_info(&mut self, info: TargetInfo) {
        self.info = info;
    }

    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    pub fn set_session_id(&mut self, id: Option<SessionId>) {
        self.session_id = id;
    }

    pub fn enabled_mut(&mut self) -> &mut EnabledDomains {
        &mut self.enabled
    }

    pub fn network_log(&self) -> &NetworkLogStore {
        &self.network_log
    }

    pub fn network_log_mut(&mut self) -> &mut NetworkLogStore {
        &mut self.network_log
    }

    pub fn fetch_handle_auth(&self) -> bool {
        self.fetch_handle_auth
    }

    pub fn set_fetch_handle_auth(&mut self, handle_auth: bool) {
        self.fetch_handle_auth = handle_auth;
    }

    /// Replaces the cached frame tree after a fresh `Page.getFrameTree`
    /// round-trip, used to seed/refresh the Frame Resolver's owner lookups.
    pub fn set_frame_tree(&mut self, root: FrameId, frames: HashMap<FrameId, Frame>) {
        self.root_frame = Some(root);
        self.frames = frames;
    }

    pub fn frame(&self, id: &FrameId) -> Option<&Frame> {
        self.frames.get(id)
    }

    pub fn upsert_frame(&mut self, frame: Frame) {
        self.frames.insert(frame.id.clone(), frame);
    }

    pub fn remove_frame(&mut self, id: &FrameId) {
        self.frames.remove(id);
    }
}
