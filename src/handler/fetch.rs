//! Fetch Interceptor helpers (spec §4.J): builds the `Fetch.enable` pattern
//! list from the closed resource-type/stage vocabulary and wraps each
//! resolution command (`continueRequest`/`failRequest`/`fulfillRequest`/
//! `continueWithAuth`) behind a typed, single-purpose call so `Tab` never
//! constructs a raw `corvid_cdp` params struct itself.

use futures::channel::mpsc::Sender;

use corvid_cdp::browser_protocol::fetch::{
    AuthChallengeResponse, ContinueRequestParams, ContinueWithAuthParams, DisableParams,
    EnableParams, FailRequestParams, FulfillRequestParams, HeaderEntry, RequestPattern,
    RequestStage,
};
use corvid_cdp::browser_protocol::network::RequestId;
use corvid_cdp::browser_protocol::target::SessionId;

use crate::error::Result;
use crate::handler::{execute, HandlerMessage};

/// The closed resource-type vocabulary `Fetch.enable` patterns accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Document,
    Stylesheet,
    Image,
    Media,
    Font,
    Script,
    TextTrack,
    Xhr,
    Fetch,
    EventSource,
    WebSocket,
    Manifest,
    Other,
}

impl ResourceType {
    fn as_wire(self) -> &'static str {
        match self {
            ResourceType::Document => "Document",
            ResourceType::Stylesheet => "Stylesheet",
            ResourceType::Image => "Image",
            ResourceType::Media => "Media",
            ResourceType::Font => "Font",
            ResourceType::Script => "Script",
            ResourceType::TextTrack => "TextTrack",
            ResourceType::Xhr => "XHR",
            ResourceType::Fetch => "Fetch",
            ResourceType::EventSource => "EventSource",
            ResourceType::WebSocket => "WebSocket",
            ResourceType::Manifest => "Manifest",
            ResourceType::Other => "Other",
        }
    }
}

/// The closed error-reason vocabulary `Fetch.failRequest` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    Failed,
    Aborted,
    TimedOut,
    AccessDenied,
    ConnectionClosed,
    ConnectionReset,
    ConnectionRefused,
    NameNotResolved,
    InternetDisconnected,
    BlockedByClient,
    BlockedByResponse,
}

impl ErrorReason {
    fn as_wire(self) -> &'static str {
        match self {
            ErrorReason::Failed => "Failed",
            ErrorReason::Aborted => "Aborted",
            ErrorReason::TimedOut => "TimedOut",
            ErrorReason::AccessDenied => "AccessDenied",
            ErrorReason::ConnectionClosed => "ConnectionClosed",
            ErrorReason::ConnectionReset => "ConnectionReset",
            ErrorReason::ConnectionRefused => "ConnectionRefused",
            ErrorReason::NameNotResolved => "NameNotResolved",
            ErrorReason::InternetDisconnected => "InternetDisconnected",
            ErrorReason::BlockedByClient => "BlockedByClient",
            ErrorReason::BlockedByResponse => "BlockedByResponse",
        }
    }
}

pub(crate) fn enable_params(
    resource_type: Option<ResourceType>,
    stage: Option<RequestStage>,
    handle_auth: bool,
) -> EnableParams {
    let mut pattern = RequestPattern::any();
    if let Some(rt) = resource_type {
        pattern = pattern.matching(rt.as_wire());
    }
    if let Some(stage) = stage {
        pattern = pattern.at_stage(stage);
    }
    let mut params = EnableParams::new(vec![pattern]);
    if handle_auth {
        params = params.handling_auth();
    }
    params
}

pub(crate) async fn enable(
    handler_tx: &mut Sender<HandlerMessage>,
    session_id: SessionId,
    resource_type: Option<ResourceType>,
    stage: Option<RequestStage>,
    handle_auth: bool,
) -> Result<()> {
    execute(
        handler_tx,
        enable_params(resource_type, stage, handle_auth),
        Some(session_id),
    )
    .await?;
    Ok(())
}

pub(crate) async fn disable(handler_tx: &mut Sender<HandlerMessage>, session_id: SessionId) -> Result<()> {
    execute(handler_tx, DisableParams::default(), Some(session_id)).await?;
    Ok(())
}

pub(crate) async fn continue_request(
    handler_tx: &mut Sender<HandlerMessage>,
    session_id: SessionId,
    request_id: RequestId,
    url: Option<String>,
    method: Option<String>,
    headers: Vec<HeaderEntry>,
    post_data: Option<String>,
) -> Result<()> {
    let mut params = ContinueRequestParams::new(request_id);
    params.url = url;
    params.method = method;
    params.post_data = post_data;
    params.headers = if headers.is_empty() { None } else { Some(headers) };
    execute(handler_tx, params, Some(session_id)).await?;
    Ok(())
}

pub(crate) async fn fail_request(
    handler_tx: &mut Sender<HandlerMessage>,
    session_id: SessionId,
    request_id: RequestId,
    reason: ErrorReason,
) -> Result<()> {
    execute(
        handler_tx,
        FailRequestParams::new(request_id, reason.as_wire()),
        Some(session_id),
    )
    .await?;
    Ok(())
}

pub(crate) async fn fulfill_request(
    handler_tx: &mut Sender<HandlerMessage>,
    session_id: SessionId,
    request_id: RequestId,
    response_code: i64,
    response_headers: Vec<HeaderEntry>,
    body_base64: Option<String>,
) -> Result<()> {
    let mut params = FulfillRequestParams::new(request_id, response_code);
    params.response_headers = response_headers;
    if let Some(body) = body_base64 {
        params = params.with_body(body);
    }
    execute(handler_tx, params, Some(session_id)).await?;
    Ok(())
}

pub(crate) async fn continue_with_auth(
    handler_tx: &mut Sender<HandlerMessage>,
    session_id: SessionId,
    request_id: RequestId,
    response: AuthChallengeResponse,
) -> Result<()> {
    execute(
        handler_tx,
        ContinueWithAuthParams {
            request_id,
            auth_challenge_response: response,
        },
        Some(session_id),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enable_params_sets_single_pattern_and_auth_flag() {
        let params = enable_params(Some(ResourceType::Xhr), Some(RequestStage::Request), true);
        assert_eq!(params.patterns.len(), 1);
        assert_eq!(params.patterns[0].resource_type.as_deref(), Some("XHR"));
        assert_eq!(params.handle_auth_requests, Some(true));
    }
}
