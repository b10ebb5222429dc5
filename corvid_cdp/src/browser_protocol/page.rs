//! `Page` domain: frame tree, navigation, isolated worlds, lifecycle events
//! and rendering (spec §4.F, §4.I).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};

use super::network::LoaderId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(pub String);

impl From<String> for FrameId {
    fn from(s: String) -> Self {
        FrameId(s)
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionContextId(pub i64);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: FrameId,
    pub parent_id: Option<FrameId>,
    pub loader_id: LoaderId,
    pub name: Option<String>,
    pub url: String,
    pub security_origin: Option<String>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTree {
    pub frame: Frame,
    #[serde(default)]
    pub child_frames: Vec<FrameTree>,
}

impl FrameTree {
    /// Depth-first walk of this frame and every descendant, the shape the
    /// Frame Resolver uses to seed its `frameId -> parent` map on attach.
    pub fn flatten(&self) -> Vec<&Frame> {
        let mut out = vec![&self.frame];
        for child in &self.child_frames {
            out.extend(child.flatten());
        }
        out
    }
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub scale: f64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.enable".into()
    }
}
impl Command for EnableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableParams {}

impl Method for DisableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.disable".into()
    }
}
impl Command for DisableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateParams {
    pub url: String,
    pub referrer: Option<String>,
    pub transition_type: Option<String>,
    pub frame_id: Option<FrameId>,
}

impl NavigateParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            referrer: None,
            transition_type: None,
            frame_id: None,
        }
    }
}

impl<T: Into<String>> From<T> for NavigateParams {
    fn from(url: T) -> Self {
        NavigateParams::new(url)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateReturns {
    pub frame_id: FrameId,
    pub loader_id: Option<LoaderId>,
    pub error_text: Option<String>,
}

impl Method for NavigateParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.navigate".into()
    }
}
impl Command for NavigateParams {
    type Response = NavigateReturns;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadParams {
    pub ignore_cache: Option<bool>,
    pub script_to_evaluate_on_load: Option<String>,
}

impl Method for ReloadParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.reload".into()
    }
}
impl Command for ReloadParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFrameTreeParams {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFrameTreeReturns {
    pub frame_tree: FrameTree,
}

impl Method for GetFrameTreeParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.getFrameTree".into()
    }
}
impl Command for GetFrameTreeParams {
    type Response = GetFrameTreeReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLifecycleEventsEnabledParams {
    pub enabled: bool,
}

impl SetLifecycleEventsEnabledParams {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Method for SetLifecycleEventsEnabledParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.setLifecycleEventsEnabled".into()
    }
}
impl Command for SetLifecycleEventsEnabledParams {
    type Response = serde_json::Value;
}

/// Creates the `pydoll::iframe::<frameId>` isolated world an OOPIF's
/// injected script runs in, named exactly as the resolver contract
/// requires so a caller matching on the string sees the same name an
/// attached DevTools session would.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIsolatedWorldParams {
    pub frame_id: FrameId,
    pub world_name: Option<String>,
    pub grant_univeral_access: Option<bool>,
}

impl CreateIsolatedWorldParams {
    pub fn for_frame(frame_id: FrameId) -> Self {
        Self {
            world_name: Some(format!("pydoll::iframe::{}", frame_id)),
            frame_id,
            grant_univeral_access: Some(true),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIsolatedWorldReturns {
    pub execution_context_id: ExecutionContextId,
}

impl Method for CreateIsolatedWorldParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.createIsolatedWorld".into()
    }
}
impl Command for CreateIsolatedWorldParams {
    type Response = CreateIsolatedWorldReturns;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotParams {
    pub format: Option<String>,
    pub quality: Option<i64>,
    pub clip: Option<Viewport>,
    pub from_surface: Option<bool>,
    pub capture_beyond_viewport: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureScreenshotReturns {
    pub data: String,
}

impl Method for CaptureScreenshotParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.captureScreenshot".into()
    }
}
impl Command for CaptureScreenshotParams {
    type Response = CaptureScreenshotReturns;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintToPdfParams {
    pub landscape: Option<bool>,
    pub print_background: Option<bool>,
    pub scale: Option<f64>,
    pub paper_width: Option<f64>,
    pub paper_height: Option<f64>,
    pub prefer_css_page_size: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintToPdfReturns {
    pub data: String,
}

impl Method for PrintToPdfParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.printToPDF".into()
    }
}
impl Command for PrintToPdfParams {
    type Response = PrintToPdfReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleJavaScriptDialogParams {
    pub accept: bool,
    pub prompt_text: Option<String>,
}

impl HandleJavaScriptDialogParams {
    pub fn accept(prompt_text: Option<String>) -> Self {
        Self {
            accept: true,
            prompt_text,
        }
    }

    pub fn dismiss() -> Self {
        Self {
            accept: false,
            prompt_text: None,
        }
    }
}

impl Method for HandleJavaScriptDialogParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Page.handleJavaScriptDialog".into()
    }
}
impl Command for HandleJavaScriptDialogParams {
    type Response = serde_json::Value;
}

// --- events ----------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameAttached {
    pub frame_id: FrameId,
    pub parent_frame_id: FrameId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameNavigated {
    pub frame: Frame,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameDetached {
    pub frame_id: FrameId,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameStoppedLoading {
    pub frame_id: FrameId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNavigatedWithinDocument {
    pub frame_id: FrameId,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLifecycleEvent {
    pub frame_id: FrameId,
    pub loader_id: LoaderId,
    pub name: String,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoadEventFired {
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDomContentEventFired {
    pub timestamp: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventJavascriptDialogOpening {
    pub url: String,
    pub message: String,
    pub r#type: String,
    #[serde(default)]
    pub has_browser_handler: bool,
    pub default_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventJavascriptDialogClosed {
    pub result: bool,
    pub user_input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_world_name_matches_resolver_contract() {
        let p = CreateIsolatedWorldParams::for_frame(FrameId("F1".into()));
        assert_eq!(p.world_name.as_deref(), Some("pydoll::iframe::F1"));
    }

    #[test]
    fn frame_tree_flattens_depth_first() {
        let leaf = FrameTree {
            frame: Frame {
                id: FrameId("child".into()),
                parent_id: Some(FrameId("root".into())),
                loader_id: LoaderId("L2".into()),
                name: None,
                url: "about:blank".into(),
                security_origin: None,
                mime_type: None,
            },
            child_frames: vec![],
        };
        let tree = FrameTree {
            frame: Frame {
                id: FrameId("root".into()),
                parent_id: None,
                loader_id: LoaderId("L1".into()),
                name: None,
                url: "https://example.com".into(),
                security_origin: None,
                mime_type: None,
            },
            child_frames: vec![leaf],
        };
        let flat = tree.flatten();
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].id, FrameId("root".into()));
        assert_eq!(flat[1].id, FrameId("child".into()));
    }
}
