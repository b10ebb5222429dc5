//! `Target` domain: target discovery, attachment in flattened mode, and
//! browser-context partitioning (spec §3 Target/Session, §4.E).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub String);

impl From<String> for TargetId {
    fn from(s: String) -> Self {
        TargetId(s)
    }
}

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        SessionId(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrowserContextId(pub String);

impl From<String> for BrowserContextId {
    fn from(s: String) -> Self {
        BrowserContextId(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub target_id: TargetId,
    pub r#type: String,
    pub title: String,
    pub url: String,
    pub attached: bool,
    pub opener_id: Option<TargetId>,
    #[serde(default)]
    pub can_access_opener: bool,
    pub browser_context_id: Option<BrowserContextId>,
    pub subtype: Option<String>,
}

impl TargetInfo {
    /// `true` for targets a `find`/navigation/screenshot call can treat as a
    /// top-level page rather than an iframe or worker (spec §4.F
    /// `TopLevelTargetRequired`).
    pub fn is_page(&self) -> bool {
        matches!(self.r#type.as_str(), "page" | "background_page")
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTargetsParams {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTargetsReturns {
    pub target_infos: Vec<TargetInfo>,
}

impl Method for GetTargetsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.getTargets".into()
    }
}
impl Command for GetTargetsParams {
    type Response = GetTargetsReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDiscoverTargetsParams {
    pub discover: bool,
}

impl SetDiscoverTargetsParams {
    pub fn new(discover: bool) -> Self {
        Self { discover }
    }
}

impl Method for SetDiscoverTargetsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.setDiscoverTargets".into()
    }
}
impl Command for SetDiscoverTargetsParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetParams {
    pub target_id: TargetId,
    pub flatten: Option<bool>,
}

impl AttachToTargetParams {
    /// Attach in flattened mode, the only mode this core ever uses (spec
    /// §1 "attaches to them in *flattened* mode").
    pub fn flattened(target_id: TargetId) -> Self {
        Self {
            target_id,
            flatten: Some(true),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetReturns {
    pub session_id: SessionId,
}

impl Method for AttachToTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.attachToTarget".into()
    }
}
impl Command for AttachToTargetParams {
    type Response = AttachToTargetReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetachFromTargetParams {
    pub session_id: Option<SessionId>,
    pub target_id: Option<TargetId>,
}

impl Method for DetachFromTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.detachFromTarget".into()
    }
}
impl Command for DetachFromTargetParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetParams {
    pub url: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub browser_context_id: Option<BrowserContextId>,
    pub new_window: Option<bool>,
    pub background: Option<bool>,
}

impl CreateTargetParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
            browser_context_id: None,
            new_window: None,
            background: None,
        }
    }

    pub fn in_context(mut self, ctx: BrowserContextId) -> Self {
        self.browser_context_id = Some(ctx);
        self
    }
}

impl Default for CreateTargetParams {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

impl<T: Into<String>> From<T> for CreateTargetParams {
    fn from(url: T) -> Self {
        CreateTargetParams::new(url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetReturns {
    pub target_id: TargetId,
}

impl Method for CreateTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.createTarget".into()
    }
}
impl Command for CreateTargetParams {
    type Response = CreateTargetReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTargetParams {
    pub target_id: TargetId,
}

impl CloseTargetParams {
    pub fn new(target_id: TargetId) -> Self {
        Self { target_id }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTargetReturns {
    pub success: bool,
}

impl Method for CloseTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.closeTarget".into()
    }
}
impl Command for CloseTargetParams {
    type Response = CloseTargetReturns;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrowserContextParams {
    pub dispose_on_detach: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBrowserContextReturns {
    pub browser_context_id: BrowserContextId,
}

impl Method for CreateBrowserContextParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.createBrowserContext".into()
    }
}
impl Command for CreateBrowserContextParams {
    type Response = CreateBrowserContextReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposeBrowserContextParams {
    pub browser_context_id: BrowserContextId,
}

impl DisposeBrowserContextParams {
    pub fn new(browser_context_id: BrowserContextId) -> Self {
        Self { browser_context_id }
    }
}

impl Method for DisposeBrowserContextParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.disposeBrowserContext".into()
    }
}
impl Command for DisposeBrowserContextParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAutoAttachParams {
    pub auto_attach: bool,
    pub wait_for_debugger_on_start: bool,
    pub flatten: Option<bool>,
}

impl Method for SetAutoAttachParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.setAutoAttach".into()
    }
}
impl Command for SetAutoAttachParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateTargetParams {
    pub target_id: TargetId,
}

impl ActivateTargetParams {
    pub fn new(target_id: TargetId) -> Self {
        Self { target_id }
    }
}

impl Method for ActivateTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Target.activateTarget".into()
    }
}
impl Command for ActivateTargetParams {
    type Response = serde_json::Value;
}

// --- events --------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetCreated {
    pub target_info: TargetInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetInfoChanged {
    pub target_info: TargetInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetDestroyed {
    pub target_id: TargetId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetCrashed {
    pub target_id: TargetId,
    pub status: String,
    pub error_code: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttachedToTarget {
    pub session_id: SessionId,
    pub target_info: TargetInfo,
    pub waiting_for_debugger: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetachedFromTarget {
    pub session_id: SessionId,
    pub target_id: Option<TargetId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_target_params_round_trip() {
        let p = CreateTargetParams::new("https://example.com");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["url"], "https://example.com");
    }
}
