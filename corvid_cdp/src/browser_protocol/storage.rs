//! `Storage` domain: browser-context-scoped cookie and cache clearing used
//! when a context is disposed (spec §4.E `BrowserContext::dispose`).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::Serialize;

use super::target::BrowserContextId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearCookiesParams {
    pub browser_context_id: Option<BrowserContextId>,
}

impl ClearCookiesParams {
    pub fn new(browser_context_id: Option<BrowserContextId>) -> Self {
        Self { browser_context_id }
    }
}

impl Method for ClearCookiesParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Storage.clearCookies".into()
    }
}
impl Command for ClearCookiesParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearDataForOriginParams {
    pub origin: String,
    pub storage_types: String,
}

impl ClearDataForOriginParams {
    pub fn all(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            storage_types: "all".into(),
        }
    }
}

impl Method for ClearDataForOriginParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Storage.clearDataForOrigin".into()
    }
}
impl Command for ClearDataForOriginParams {
    type Response = serde_json::Value;
}
