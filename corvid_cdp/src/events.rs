//! Fully-typed event dispatch: turns the wire-level [`corvid_types::CdpEventMessage`]
//! into one arm of [`CdpEvent`], matched on the method's domain and name
//! the way the teacher's `handler` module dispatches on `CdpEvent` (spec
//! §4.D Event Router).

use corvid_types::Method;
use serde_json::Error as JsonError;

pub use corvid_types::CdpEventMessage;

use crate::browser_protocol::{dom, fetch, network, page, security, target};
use crate::js_protocol::runtime;

/// Every event this core understands, still carrying the `sessionId` it
/// arrived with so the Event Router can look up which `Tab` owns it.
#[derive(Debug, Clone)]
pub enum CdpEvent {
    TargetCreated(target::EventTargetCreated),
    TargetInfoChanged(target::EventTargetInfoChanged),
    TargetDestroyed(target::EventTargetDestroyed),
    TargetCrashed(target::EventTargetCrashed),
    AttachedToTarget(target::EventAttachedToTarget),
    DetachedFromTarget(target::EventDetachedFromTarget),

    FrameAttached(page::EventFrameAttached),
    FrameNavigated(page::EventFrameNavigated),
    FrameDetached(page::EventFrameDetached),
    FrameStoppedLoading(page::EventFrameStoppedLoading),
    NavigatedWithinDocument(page::EventNavigatedWithinDocument),
    LifecycleEvent(page::EventLifecycleEvent),
    LoadEventFired(page::EventLoadEventFired),
    DomContentEventFired(page::EventDomContentEventFired),
    JavascriptDialogOpening(page::EventJavascriptDialogOpening),
    JavascriptDialogClosed(page::EventJavascriptDialogClosed),

    DocumentUpdated(dom::EventDocumentUpdated),
    SetChildNodes(dom::EventSetChildNodes),
    AttributeModified(dom::EventAttributeModified),

    ExecutionContextCreated(runtime::EventExecutionContextCreated),
    ExecutionContextDestroyed(runtime::EventExecutionContextDestroyed),
    ExecutionContextsCleared(runtime::EventExecutionContextsCleared),

    RequestWillBeSent(network::EventRequestWillBeSent),
    ResponseReceived(network::EventResponseReceived),
    LoadingFinished(network::EventLoadingFinished),
    LoadingFailed(network::EventLoadingFailed),
    RequestServedFromCache(network::EventRequestServedFromCache),

    RequestPaused(fetch::EventRequestPaused),
    AuthRequired(fetch::EventAuthRequired),

    CertificateError(security::EventCertificateError),
    VisibleSecurityStateChanged(security::EventVisibleSecurityStateChanged),

    /// A well-formed event this registry has no typed arm for yet. The
    /// Event Router drops these after a debug log rather than treating
    /// them as a parse failure.
    Other(String),
}

impl CdpEvent {
    /// Parses a raw event envelope into its typed arm, or `Other` if the
    /// method has no registered handler. Errors only for a method this
    /// registry knows about whose `params` fail to deserialize into the
    /// shape CDP's own documentation promises — a genuine protocol-version
    /// mismatch, not a missing feature.
    pub fn parse(message: &CdpEventMessage) -> Result<Self, JsonError> {
        let params = message.params.clone();
        Ok(match message.identifier().as_ref() {
            "Target.targetCreated" => CdpEvent::TargetCreated(serde_json::from_value(params)?),
            "Target.targetInfoChanged" => {
                CdpEvent::TargetInfoChanged(serde_json::from_value(params)?)
            }
            "Target.targetDestroyed" => {
                CdpEvent::TargetDestroyed(serde_json::from_value(params)?)
            }
            "Target.targetCrashed" => CdpEvent::TargetCrashed(serde_json::from_value(params)?),
            "Target.attachedToTarget" => {
                CdpEvent::AttachedToTarget(serde_json::from_value(params)?)
            }
            "Target.detachedFromTarget" => {
                CdpEvent::DetachedFromTarget(serde_json::from_value(params)?)
            }

            "Page.frameAttached" => CdpEvent::FrameAttached(serde_json::from_value(params)?),
            "Page.frameNavigated" => CdpEvent::FrameNavigated(serde_json::from_value(params)?),
            "Page.frameDetached" => CdpEvent::FrameDetached(serde_json::from_value(params)?),
            "Page.frameStoppedLoading" => {
                CdpEvent::FrameStoppedLoading(serde_json::from_value(params)?)
            }
            "Page.navigatedWithinDocument" => {
                CdpEvent::NavigatedWithinDocument(serde_json::from_value(params)?)
            }
            "Page.lifecycleEvent" => CdpEvent::LifecycleEvent(serde_json::from_value(params)?),
            "Page.loadEventFired" => CdpEvent::LoadEventFired(serde_json::from_value(params)?),
            "Page.domContentEventFired" => {
                CdpEvent::DomContentEventFired(serde_json::from_value(params)?)
            }
            "Page.javascriptDialogOpening" => {
                CdpEvent::JavascriptDialogOpening(serde_json::from_value(params)?)
            }
            "Page.javascriptDialogClosed" => {
                CdpEvent::JavascriptDialogClosed(serde_json::from_value(params)?)
            }

            "DOM.documentUpdated" => CdpEvent::DocumentUpdated(serde_json::from_value(params)?),
            "DOM.setChildNodes" => CdpEvent::SetChildNodes(serde_json::from_value(params)?),
            "DOM.attributeModified" => {
                CdpEvent::AttributeModified(serde_json::from_value(params)?)
            }

            "Runtime.executionContextCreated" => {
                CdpEvent::ExecutionContextCreated(serde_json::from_value(params)?)
            }
            "Runtime.executionContextDestroyed" => {
                CdpEvent::ExecutionContextDestroyed(serde_json::from_value(params)?)
            }
            "Runtime.executionContextsCleared" => {
                CdpEvent::ExecutionContextsCleared(serde_json::from_value(params)?)
            }

            "Network.requestWillBeSent" => {
                CdpEvent::RequestWillBeSent(serde_json::from_value(params)?)
            }
            "Network.responseReceived" => {
                CdpEvent::ResponseReceived(serde_json::from_value(params)?)
            }
            "Network.loadingFinished" => {
                CdpEvent::LoadingFinished(serde_json::from_value(params)?)
            }
            "Network.loadingFailed" => CdpEvent::LoadingFailed(serde_json::from_value(params)?),
            "Network.requestServedFromCache" => {
                CdpEvent::RequestServedFromCache(serde_json::from_value(params)?)
            }

            "Fetch.requestPaused" => CdpEvent::RequestPaused(serde_json::from_value(params)?),
            "Fetch.authRequired" => CdpEvent::AuthRequired(serde_json::from_value(params)?),

            "Security.certificateError" => {
                CdpEvent::CertificateError(serde_json::from_value(params)?)
            }
            "Security.visibleSecurityStateChanged" => {
                CdpEvent::VisibleSecurityStateChanged(serde_json::from_value(params)?)
            }

            other => CdpEvent::Other(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn message(method: &str, params: serde_json::Value) -> CdpEventMessage {
        CdpEventMessage {
            method: Cow::Owned(method.to_string()),
            session_id: Some("S1".into()),
            params,
        }
    }

    #[test]
    fn parses_known_event() {
        let msg = message(
            "Page.frameStoppedLoading",
            serde_json::json!({ "frameId": "F1" }),
        );
        let ev = CdpEvent::parse(&msg).unwrap();
        assert!(matches!(ev, CdpEvent::FrameStoppedLoading(_)));
    }

    #[test]
    fn unknown_method_becomes_other() {
        let msg = message("Animation.animationStarted", serde_json::json!({}));
        let ev = CdpEvent::parse(&msg).unwrap();
        assert!(matches!(ev, CdpEvent::Other(m) if m == "Animation.animationStarted"));
    }
}
