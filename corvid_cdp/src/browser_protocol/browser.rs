//! `Browser` domain: process-wide version info and window placement, the
//! handful of commands that target the browser endpoint itself rather than
//! a session (spec §4.A, no `sessionId`).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVersionParams {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVersionReturns {
    pub protocol_version: String,
    pub product: String,
    pub revision: String,
    pub user_agent: String,
    pub js_version: String,
}

impl Method for GetVersionParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Browser.getVersion".into()
    }
}
impl Command for GetVersionParams {
    type Response = GetVersionReturns;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowId(pub i64);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWindowForTargetParams {
    pub target_id: Option<super::target::TargetId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub left: Option<i64>,
    pub top: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub window_state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWindowForTargetReturns {
    pub window_id: WindowId,
    pub bounds: Bounds,
}

impl Method for GetWindowForTargetParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Browser.getWindowForTarget".into()
    }
}
impl Command for GetWindowForTargetParams {
    type Response = GetWindowForTargetReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWindowBoundsParams {
    pub window_id: WindowId,
    pub bounds: SetBounds,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBounds {
    pub left: Option<i64>,
    pub top: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub window_state: Option<String>,
}

impl Method for SetWindowBoundsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Browser.setWindowBounds".into()
    }
}
impl Command for SetWindowBoundsParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseParams {}

impl Method for CloseParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Browser.close".into()
    }
}
impl Command for CloseParams {
    type Response = serde_json::Value;
}
