//! `Network` domain: the passive request/response log (spec §4.K) plus the
//! cookie jar operations the Tab controller exposes.

use std::borrow::Cow;
use std::collections::HashMap;

use corvid_types::{Command, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::page::FrameId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoaderId(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub post_data: Option<String>,
    #[serde(default)]
    pub has_post_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetResponse {
    pub url: String,
    pub status: i64,
    pub status_text: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub mime_type: String,
    pub request_headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub expires: f64,
    pub size: i64,
    pub http_only: bool,
    pub secure: bool,
    pub session: bool,
    pub same_site: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieParam {
    pub name: String,
    pub value: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: Option<bool>,
    pub http_only: Option<bool>,
    pub same_site: Option<String>,
    pub expires: Option<f64>,
}

impl CookieParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableParams {
    pub max_total_buffer_size: Option<i64>,
    pub max_resource_buffer_size: Option<i64>,
    pub max_post_data_size: Option<i64>,
}

impl Method for EnableParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.enable".into()
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
        "Network.disable".into()
    }
}
impl Command for DisableParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCookiesParams {
    pub cookies: Vec<CookieParam>,
}

impl SetCookiesParams {
    pub fn new(cookies: Vec<CookieParam>) -> Self {
        Self { cookies }
    }
}

impl Method for SetCookiesParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.setCookies".into()
    }
}
impl Command for SetCookiesParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCookiesParams {
    pub urls: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCookiesReturns {
    pub cookies: Vec<Cookie>,
}

impl Method for GetCookiesParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.getCookies".into()
    }
}
impl Command for GetCookiesParams {
    type Response = GetCookiesReturns;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCookiesParams {
    pub name: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub path: Option<String>,
}

impl DeleteCookiesParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            domain: None,
            path: None,
        }
    }

    pub fn from_cookie(param: &CookieParam) -> Self {
        DeleteCookiesParams {
            name: param.name.clone(),
            url: param.url.clone(),
            domain: param.domain.clone(),
            path: param.path.clone(),
        }
    }
}

impl Method for DeleteCookiesParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.deleteCookies".into()
    }
}
impl Command for DeleteCookiesParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearBrowserCookiesParams {}

impl Method for ClearBrowserCookiesParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.clearBrowserCookies".into()
    }
}
impl Command for ClearBrowserCookiesParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetUserAgentOverrideParams {
    pub user_agent: String,
    pub accept_language: Option<String>,
    pub platform: Option<String>,
}

impl<T: Into<String>> From<T> for SetUserAgentOverrideParams {
    fn from(user_agent: T) -> Self {
        Self {
            user_agent: user_agent.into(),
            accept_language: None,
            platform: None,
        }
    }
}

impl Method for SetUserAgentOverrideParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.setUserAgentOverride".into()
    }
}
impl Command for SetUserAgentOverrideParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetExtraHttpHeadersParams {
    pub headers: HashMap<String, String>,
}

impl SetExtraHttpHeadersParams {
    pub fn new(headers: HashMap<String, String>) -> Self {
        Self { headers }
    }
}

impl Method for SetExtraHttpHeadersParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.setExtraHTTPHeaders".into()
    }
}
impl Command for SetExtraHttpHeadersParams {
    type Response = serde_json::Value;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBodyParams {
    pub request_id: RequestId,
}

impl GetResponseBodyParams {
    pub fn new(request_id: RequestId) -> Self {
        Self { request_id }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponseBodyReturns {
    pub body: String,
    pub base64_encoded: bool,
}

impl Method for GetResponseBodyParams {
    fn identifier(&self) -> Cow<'static, str> {
        "Network.getResponseBody".into()
    }
}
impl Command for GetResponseBodyParams {
    type Response = GetResponseBodyReturns;
}

// --- events ---------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestWillBeSent {
    pub request_id: RequestId,
    pub loader_id: LoaderId,
    pub document_url: String,
    pub request: Request,
    pub timestamp: f64,
    pub wall_time: f64,
    pub initiator: Value,
    pub redirect_response: Option<Value>,
    pub r#type: Option<String>,
    pub frame_id: Option<FrameId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponseReceived {
    pub request_id: RequestId,
    pub loader_id: LoaderId,
    pub timestamp: f64,
    pub r#type: Option<String>,
    pub response: NetResponse,
    pub frame_id: Option<FrameId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoadingFinished {
    pub request_id: RequestId,
    pub timestamp: f64,
    pub encoded_data_length: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLoadingFailed {
    pub request_id: RequestId,
    pub timestamp: f64,
    pub r#type: Option<String>,
    pub error_text: String,
    #[serde(default)]
    pub canceled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestServedFromCache {
    pub request_id: RequestId,
}
