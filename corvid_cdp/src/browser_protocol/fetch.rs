//! `Fetch` domain: request interception (spec §4.J). Every command here
//! only makes sense once a `RequestPaused` event has handed the interceptor
//! a `requestId`; trying to act on a different one is a caller bug the
//! Fetch Interceptor rejects before it reaches the wire.

use std::borrow::Cow;
use std::collections::HashMap;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};

use super::network::{NetResponse, Request, RequestId};
use super::page::FrameId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RequestStage {
    Request,
    Response,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    pub url_pattern: Option<String>,
    pub resource_type: Option<String>,
    pub request_stage: Option<RequestStage>,
}

impl RequestPattern {
    pub fn any() -> Self {
        Self {
            url_pattern: None,
            resource_type: None,
            request_stage: None,
        }
    }

    pub fn matching(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn at_stage(mut self, stage: RequestStage) -> Self {
        self.request_stage = Some(stage);
        self
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
    pub patterns: Vec<RequestPattern>,
    pub handle_auth_requests: Option<bool>,
}

impl EnableParams {
    pub fn new(patterns: Vec<RequestPattern>) -> Self {
        Self {
            patterns,
            handle_auth_requests: None,
        }
    }

    pub fn handling_auth(mut self) -> Self {
        self.handle_auth_requests = Some(true);
        self
    }
}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Fetch.enable".into()
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
        "Fetch.disable".into()
    }
}
impl Command for DisableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueRequestParams {
    pub request_id: RequestId,
    pub url: Option<String>,
    pub method: Option<String>,
    pub post_data: Option<String>,
    pub headers: Option<Vec<HeaderEntry>>,
}

impl ContinueRequestParams {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            url: None,
            method: None,
            post_data: None,
            headers: None,
        }
    }
}

impl Method for ContinueRequestParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Fetch.continueRequest".into()
    }
}
impl Command for ContinueRequestParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailRequestParams {
    pub request_id: RequestId,
    pub error_reason: String,
}

impl FailRequestParams {
    pub fn new(request_id: RequestId, error_reason: impl Into<String>) -> Self {
        Self {
            request_id,
            error_reason: error_reason.into(),
        }
    }
}

impl Method for FailRequestParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Fetch.failRequest".into()
    }
}
impl Command for FailRequestParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRequestParams {
    pub request_id: RequestId,
    pub response_code: i64,
    #[serde(default)]
    pub response_headers: Vec<HeaderEntry>,
    pub body: Option<String>,
    pub response_phrase: Option<String>,
}

impl FulfillRequestParams {
    pub fn new(request_id: RequestId, response_code: i64) -> Self {
        Self {
            request_id,
            response_code,
            response_headers: Vec::new(),
            body: None,
            response_phrase: None,
        }
    }

    pub fn with_body(mut self, body_base64: impl Into<String>) -> Self {
        self.body = Some(body_base64.into());
        self
    }
}

impl Method for FulfillRequestParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Fetch.fulfillRequest".into()
    }
}
impl Command for FulfillRequestParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueWithAuthParams {
    pub request_id: RequestId,
    pub auth_challenge_response: AuthChallengeResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthChallengeResponse {
    pub response: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthChallengeResponse {
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            response: "ProvideCredentials".into(),
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }

    pub fn cancel() -> Self {
        Self {
            response: "CancelAuth".into(),
            username: None,
            password: None,
        }
    }

    pub fn default_auth() -> Self {
        Self {
            response: "Default".into(),
            username: None,
            password: None,
        }
    }
}

impl Method for ContinueWithAuthParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Fetch.continueWithAuth".into()
    }
}
impl Command for ContinueWithAuthParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBodyParams {
    pub request_id: RequestId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBodyReturns {
    pub body: String,
    pub base64_encoded: bool,
}

impl Method for GetResponseBodyParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Fetch.getResponseBody".into()
    }
}
impl Command for GetResponseBodyParams {
    type Response = GetResponseBodyReturns;
}

// --- events ------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestPaused {
    pub request_id: RequestId,
    pub request: Request,
    pub frame_id: FrameId,
    pub resource_type: String,
    pub response_error_reason: Option<String>,
    pub response_status_code: Option<i64>,
    #[serde(default)]
    pub response_headers: Vec<HeaderEntry>,
    pub network_id: Option<RequestId>,
}

impl EventRequestPaused {
    pub fn stage(&self) -> RequestStage {
        if self.response_status_code.is_some() || self.response_error_reason.is_some() {
            RequestStage::Response
        } else {
            RequestStage::Request
        }
    }

    pub fn synthetic_response(&self) -> Option<NetResponse> {
        self.response_status_code.map(|status| NetResponse {
            url: self.request.url.clone(),
            status,
            status_text: String::new(),
            headers: self
                .response_headers
                .iter()
                .map(|h| (h.name.clone(), h.value.clone()))
                .collect(),
            mime_type: String::new(),
            request_headers: None,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAuthRequired {
    pub request_id: RequestId,
    pub request: Request,
    pub frame_id: FrameId,
    pub resource_type: String,
    pub auth_challenge: AuthChallenge,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthChallenge {
    pub source: Option<String>,
    pub origin: String,
    pub scheme: String,
    pub realm: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_paused_without_status_is_request_stage() {
        let ev = EventRequestPaused {
            request_id: RequestId("1".into()),
            request: Request {
                url: "https://example.com".into(),
                method: "GET".into(),
                headers: HashMap::new(),
                post_data: None,
                has_post_data: false,
            },
            frame_id: FrameId("F1".into()),
            resource_type: "Document".into(),
            response_error_reason: None,
            response_status_code: None,
            response_headers: vec![],
            network_id: None,
        };
        assert_eq!(ev.stage(), RequestStage::Request);
    }
}
