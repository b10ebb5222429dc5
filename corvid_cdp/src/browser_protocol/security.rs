//! `Security` domain: certificate-error handling, enabled only when a
//! `BrowserConfig` asks to ignore HTTPS errors (spec §4.F).

use std::borrow::Cow;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Security.enable".into()
    }
}
impl Command for EnableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetIgnoreCertificateErrorsParams {
    pub ignore: bool,
}

impl SetIgnoreCertificateErrorsParams {
    pub fn new(ignore: bool) -> Self {
        Self { ignore }
    }
}

impl Method for SetIgnoreCertificateErrorsParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Security.setIgnoreCertificateErrors".into()
    }
}
impl Command for SetIgnoreCertificateErrorsParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleCertificateErrorParams {
    pub event_id: i64,
    pub action: String,
}

impl HandleCertificateErrorParams {
    pub fn ignore(event_id: i64) -> Self {
        Self {
            event_id,
            action: "continue".into(),
        }
    }
}

impl Method for HandleCertificateErrorParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Security.handleCertificateError".into()
    }
}
impl Command for HandleCertificateErrorParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCertificateError {
    pub event_id: i64,
    pub error_type: String,
    pub request_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventVisibleSecurityStateChanged {
    pub visible_security_state: serde_json::Value,
}
