//! Tab Controller (spec §4.F): the per-target facade wrapping one attached
//! session — navigation, script evaluation, screenshots, cookies, and the
//! idempotent domain-enable bookkeeping spec §4.F calls for.
//!
//! Grounded on the teacher's `Arc<TabInner>`/`Tab` split (`tab.rs`): cheap to
//! clone, every clone sharing the same underlying session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use corvid_cdp::browser_protocol::dom::{EnableParams as DomEnableParams, GetDocumentParams};
use corvid_cdp::browser_protocol::fetch::RequestStage;
use corvid_cdp::browser_protocol::network::{
    ClearBrowserCookiesParams, Cookie, CookieParam, DeleteCookiesParams, EnableParams as NetEnableParams,
    GetCookiesParams, GetResponseBodyParams, SetCookiesParams, SetExtraHttpHeadersParams,
};
use corvid_cdp::browser_protocol::page::{
    CaptureScreenshotParams, EnableParams as PageEnableParams, GetFrameTreeParams, NavigateParams,
    PrintToPdfParams, ReloadParams, Viewport,
};
use corvid_cdp::browser_protocol::target::{
    AttachToTargetParams, CloseTargetParams, GetTargetsParams, SessionId, TargetId, TargetInfo,
};
use corvid_cdp::events::CdpEvent;
use corvid_cdp::js_protocol::runtime::{CallArgument, CallFunctionOnParams, EvaluateParams};
use futures::channel::mpsc::{Sender, UnboundedReceiver};

use crate::browser::{BrowserConfig, WaitUntil};
use crate::element::Element;
use crate::error::{CdpError, Result};
use crate::finder::{find, AttributeBag, FindBy};
use crate::handler::event_router::CallbackId;
use crate::handler::fetch::{self, ErrorReason, ResourceType};
use crate::handler::network::NetworkLogEntry;
use crate::handler::HandlerMessage;
use crate::routing::Routing;

#[derive(Default)]
struct EnabledFlags {
    page: AtomicBool,
    network: AtomicBool,
    dom: AtomicBool,
    runtime: AtomicBool,
    fetch: AtomicBool,
    fetch_handle_auth: AtomicBool,
}

struct TabInner {
    routing: Routing,
    config: BrowserConfig,
    enabled: EnabledFlags,
}

/// A handle to one attached page target. Cheap to clone — every clone talks
/// to the same session through the same [`Routing`].
#[derive(Clone)]
pub struct Tab {
    inner: Arc<TabInner>,
}

impl Tab {
    /// Attaches to `target_id` in flattened mode and wraps the resulting
    /// session (spec §4.E/§4.F).
    pub(crate) async fn attach(
        mut handler_tx: Sender<HandlerMessage>,
        debug_ws_url: String,
        target_id: TargetId,
        config: BrowserConfig,
    ) -> Result<Tab> {
        let attached = crate::handler::execute(
            &mut handler_tx,
            AttachToTargetParams::flattened(target_id.clone()),
            None,
        )
        .await?;

        let routing = Routing::new(
            handler_tx,
            Some(attached.result.session_id),
            target_id,
            debug_ws_url,
        );

        let tab = Tab {
            inner: Arc::new(TabInner {
                routing,
                config,
                enabled: EnabledFlags::default(),
            }),
        };
        tab.enable_runtime().await?;
        tab.enable_page().await?;
        Ok(tab)
    }

    pub fn target_id(&self) -> &TargetId {
        self.inner.routing.target_id()
    }

    pub fn session_id(&self) -> SessionId {
        self.inner
            .routing
            .session_id()
            .expect("an attached Tab always carries a session id")
    }

    fn routing(&self) -> &Routing {
        &self.inner.routing
    }

    // --- idempotent domain enable/disable (spec §4.F) ----------------------

    pub async fn enable_page(&self) -> Result<()> {
        if !self.inner.enabled.page.swap(true, Ordering::SeqCst) {
            self.routing().execute(PageEnableParams::default()).await?;
        }
        Ok(())
    }

    pub async fn disable_page(&self) -> Result<()> {
        if self.inner.enabled.page.swap(false, Ordering::SeqCst) {
            self.routing()
                .execute(corvid_cdp::browser_protocol::page::DisableParams::default())
                .await?;
        }
        Ok(())
    }

    pub async fn enable_network(&self) -> Result<()> {
        if !self.inner.enabled.network.swap(true, Ordering::SeqCst) {
            self.routing().execute(NetEnableParams::default()).await?;
        }
        Ok(())
    }

    pub async fn disable_network(&self) -> Result<()> {
        if self.inner.enabled.network.swap(false, Ordering::SeqCst) {
            self.routing()
                .execute(corvid_cdp::browser_protocol::network::DisableParams::default())
                .await?;
        }
        Ok(())
    }

    pub async fn enable_dom(&self) -> Result<()> {
        if !self.inner.enabled.dom.swap(true, Ordering::SeqCst) {
            self.routing().execute(DomEnableParams::default()).await?;
        }
        Ok(())
    }

    pub async fn enable_runtime(&self) -> Result<()> {
        if !self.inner.enabled.runtime.swap(true, Ordering::SeqCst) {
            self.routing()
                .execute(corvid_cdp::js_protocol::runtime::EnableParams::default())
                .await?;
        }
        Ok(())
    }

    /// Enables `Fetch` with the given pattern scope (spec §4.J). A caller
    /// that wants to see paused requests should `subscribe` *before* calling
    /// this, so the Handler's safety net never gets a chance to auto-resolve
    /// them first.
    pub async fn enable_fetch_events(
        &self,
        resource_type: Option<ResourceType>,
        stage: Option<RequestStage>,
        handle_auth: bool,
    ) -> Result<()> {
        fetch::enable(
            &mut self.routing().handler_tx(),
            self.session_id(),
            resource_type,
            stage,
            handle_auth,
        )
        .await?;
        self.inner.enabled.fetch.store(true, Ordering::SeqCst);
        self.inner.enabled.fetch_handle_auth.store(handle_auth, Ordering::SeqCst);
        crate::handler::set_fetch_handle_auth(&mut self.routing().handler_tx(), self.target_id().clone(), handle_auth)
            .await;
        Ok(())
    }

    pub async fn disable_fetch_events(&self) -> Result<()> {
        if self.inner.enabled.fetch.swap(false, Ordering::SeqCst) {
            self.inner.enabled.fetch_handle_auth.store(false, Ordering::SeqCst);
            fetch::disable(&mut self.routing().handler_tx(), self.session_id()).await?;
        }
        Ok(())
    }

    pub async fn continue_request(&self, request_id: corvid_cdp::browser_protocol::network::RequestId) -> Result<()> {
        fetch::continue_request(
            &mut self.routing().handler_tx(),
            self.session_id(),
            request_id,
            None,
            None,
            Vec::new(),
            None,
        )
        .await
    }

    pub async fn fail_request(
        &self,
        request_id: corvid_cdp::browser_protocol::network::RequestId,
        reason: ErrorReason,
    ) -> Result<()> {
        fetch::fail_request(&mut self.routing().handler_tx(), self.session_id(), request_id, reason).await
    }

    /// Answers a paused request with a synthetic response instead of letting
    /// it reach the network.
    pub async fn fulfill_request(
        &self,
        request_id: corvid_cdp::browser_protocol::network::RequestId,
        response_code: i64,
        response_headers: Vec<corvid_cdp::browser_protocol::fetch::HeaderEntry>,
        body_base64: Option<String>,
    ) -> Result<()> {
        fetch::fulfill_request(
            &mut self.routing().handler_tx(),
            self.session_id(),
            request_id,
            response_code,
            response_headers,
            body_base64,
        )
        .await
    }

    /// Resolves a `Fetch.authRequired` challenge. Only meaningful after
    /// `enable_fetch_events(.., handle_auth: true)` — without that, the
    /// Handler's safety net already answers `Default` on the caller's behalf
    /// the moment the challenge arrives, so there is nothing left to resolve.
    pub async fn continue_with_auth(
        &self,
        request_id: corvid_cdp::browser_protocol::network::RequestId,
        response: corvid_cdp::browser_protocol::fetch::AuthChallengeResponse,
    ) -> Result<()> {
        if !self.inner.enabled.fetch_handle_auth.load(Ordering::SeqCst) {
            return Err(CdpError::AuthRequired);
        }
        fetch::continue_with_auth(&mut self.routing().handler_tx(), self.session_id(), request_id, response).await
    }

    // --- navigation (spec §4.F) ---------------------------------------------

    /// Navigates to `url` and waits for `wait_until` (or the tab's
    /// configured default) before returning.
    pub async fn go_to(&self, url: impl Into<String>, wait_until: Option<WaitUntil>) -> Result<()> {
        self.enable_page().await?;
        self.routing().execute(NavigateParams::new(url)).await?;
        self.wait_for_load(wait_until.unwrap_or(self.inner.config.wait_until))
            .await
    }

    pub async fn refresh(&self, wait_until: Option<WaitUntil>) -> Result<()> {
        self.enable_page().await?;
        self.routing().execute(ReloadParams::default()).await?;
        self.wait_for_load(wait_until.unwrap_or(self.inner.config.wait_until))
            .await
    }

    async fn wait_for_load(&self, gate: WaitUntil) -> Result<()> {
        let ready_state = match gate {
            WaitUntil::DomContentLoaded => "interactive",
            WaitUntil::Load | WaitUntil::NetworkIdle0 | WaitUntil::NetworkIdle2 => "complete",
        };

        let deadline = Instant::now() + self.inner.config.request_timeout;
        loop {
            let resp = self
                .routing()
                .execute(EvaluateParams::new("document.readyState"))
                .await?;
            let state = resp.result.result.value.and_then(|v| v.as_str().map(String::from));
            let reached = match state.as_deref() {
                Some("complete") => true,
                Some("interactive") => ready_state == "interactive",
                _ => false,
            };
            if reached {
                break;
            }
            if Instant::now() >= deadline {
                return Err(CdpError::PageLoadTimeout);
            }
            crate::utils::sleep(Duration::from_millis(100)).await;
        }

        if matches!(gate, WaitUntil::NetworkIdle0 | WaitUntil::NetworkIdle2) {
            self.wait_for_network_idle(gate, deadline).await?;
        }
        Ok(())
    }

    async fn wait_for_network_idle(&self, gate: WaitUntil, deadline: Instant) -> Result<()> {
        let allowed_inflight = if gate == WaitUntil::NetworkIdle2 { 2 } else { 0 };
        self.enable_network().await?;
        loop {
            let logs = crate::handler::get_network_logs(
                &mut self.routing().handler_tx(),
                self.target_id().clone(),
                None,
            )
            .await?;
            let inflight = inflight_requests(&logs);
            if inflight <= allowed_inflight {
                crate::utils::sleep(Duration::from_millis(500)).await;
                let logs_after = crate::handler::get_network_logs(
                    &mut self.routing().handler_tx(),
                    self.target_id().clone(),
                    None,
                )
                .await?;
                if inflight_requests(&logs_after) <= allowed_inflight {
                    return Ok(());
                }
            }
            if Instant::now() >= deadline {
                return Err(CdpError::PageLoadTimeout);
            }
            crate::utils::sleep(Duration::from_millis(200)).await;
        }
    }

    pub async fn current_url(&self) -> Result<String> {
        let resp = self
            .routing()
            .execute(EvaluateParams::new("document.location.href"))
            .await?;
        Ok(resp
            .result
            .result
            .value
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default())
    }

    pub async fn page_source(&self) -> Result<String> {
        let resp = self
            .routing()
            .execute(EvaluateParams::new("document.documentElement.outerHTML"))
            .await?;
        Ok(resp
            .result
            .result
            .value
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default())
    }

    /// Evaluates `expression` in the page's main world, or against `on` when
    /// given (spec §4.F "element-bound execution").
    pub async fn execute_script(&self, expression: &str, on: Option<&Element>) -> Result<serde_json::Value> {
        let value = match on {
            None => {
                let resp = self.routing().execute(EvaluateParams::new(expression)).await?;
                resp.result.result.value
            }
            Some(el) => {
                let resp = self
                    .routing()
                    .execute(CallFunctionOnParams::on_object(el.object_id().clone(), expression).with_arguments(
                        vec![CallArgument::from(serde_json::json!(null))],
                    ))
                    .await?;
                resp.result.result.value
            }
        };
        Ok(value.unwrap_or(serde_json::Value::Null))
    }

    // --- rendering (spec §4.F) ----------------------------------------------

    async fn require_page_target(&self) -> Result<TargetInfo> {
        let targets = self
            .routing()
            .execute(GetTargetsParams::default())
            .await?;
        let info = targets
            .result
            .target_infos
            .into_iter()
            .find(|t| t.target_id == *self.target_id())
            .ok_or(CdpError::TopLevelTargetRequired)?;
        if !info.is_page() {
            return Err(CdpError::TopLevelTargetRequired);
        }
        Ok(info)
    }

    /// Captures the whole viewport (or `clip`, when given), per spec §4.F's
    /// `takeScreenshot(path|base64, format, quality, clip?)`. A `Path`
    /// output whose extension doesn't match `format` is rejected before any
    /// command is sent.
    pub async fn take_screenshot(
        &self,
        output: ScreenshotOutput,
        format: ScreenshotFormat,
        quality: Option<i64>,
        clip: Option<Viewport>,
    ) -> Result<Option<Vec<u8>>> {
        self.require_page_target().await?;
        if let ScreenshotOutput::Path(path) = &output {
            validate_extension(path, format.extensions())?;
        }

        let resp = self
            .routing()
            .execute(CaptureScreenshotParams {
                format: Some(format.as_wire().to_string()),
                quality,
                clip,
                ..Default::default()
            })
            .await?;
        let bytes = decode_base64(&resp.result.data)?;
        write_output(output, bytes)
    }

    /// `Page.printToPDF`, with the same path-or-base64 output contract as
    /// [`Tab::take_screenshot`] (spec §4.F).
    pub async fn print_to_pdf(&self, output: PdfOutput) -> Result<Option<Vec<u8>>> {
        self.require_page_target().await?;
        if let PdfOutput::Path(path) = &output {
            validate_extension(path, &["pdf"])?;
        }
        let resp = self.routing().execute(PrintToPdfParams::default()).await?;
        let bytes = decode_base64(&resp.result.data)?;
        write_output(output, bytes)
    }

    // --- cookies (spec §4.F) ------------------------------------------------

    pub async fn set_cookie(&self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.set_cookies(vec![CookieParam::new(name, value)]).await
    }

    pub async fn set_cookies(&self, cookies: Vec<CookieParam>) -> Result<()> {
        self.enable_network().await?;
        self.routing().execute(SetCookiesParams::new(cookies)).await?;
        Ok(())
    }

    pub async fn get_cookies(&self) -> Result<Vec<Cookie>> {
        self.enable_network().await?;
        let resp = self.routing().execute(GetCookiesParams::default()).await?;
        Ok(resp.result.cookies)
    }

    pub async fn delete_cookie(&self, name: impl Into<String>) -> Result<()> {
        self.enable_network().await?;
        self.routing()
            .execute(DeleteCookiesParams::new(name))
            .await?;
        Ok(())
    }

    pub async fn delete_cookies(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.delete_cookie(*name).await?;
        }
        Ok(())
    }

    pub async fn clear_cookies(&self) -> Result<()> {
        self.enable_network().await?;
        self.routing()
            .execute(ClearBrowserCookiesParams::default())
            .await?;
        Ok(())
    }

    pub async fn set_extra_headers(&self, headers: std::collections::HashMap<String, String>) -> Result<()> {
        self.enable_network().await?;
        self.routing()
            .execute(SetExtraHttpHeadersParams::new(headers))
            .await?;
        Ok(())
    }

    // --- network log / fetch (spec §4.K / §4.J) -----------------------------

    pub async fn set_network_logging(&self, enabled: bool) {
        crate::handler::set_network_logging(&mut self.routing().handler_tx(), self.target_id().clone(), enabled)
            .await;
    }

    pub async fn get_network_logs(&self, filter: Option<String>) -> Result<Vec<NetworkLogEntry>> {
        crate::handler::get_network_logs(&mut self.routing().handler_tx(), self.target_id().clone(), filter).await
    }

    pub async fn get_response_body(&self, request_id: corvid_cdp::browser_protocol::network::RequestId) -> Result<(String, bool)> {
        let resp = self.routing().execute(GetResponseBodyParams::new(request_id)).await?;
        Ok((resp.result.body, resp.result.base64_encoded))
    }

    // --- events (spec §4.D) --------------------------------------------------

    /// Subscribes to this tab's events. The returned id unsubscribes via
    /// [`Tab::off`]; the stream ends when the tab detaches.
    pub async fn on(&self) -> Result<(CallbackId, UnboundedReceiver<CdpEvent>)> {
        crate::handler::subscribe(
            &mut self.routing().handler_tx(),
            Some(self.target_id().clone()),
            false,
        )
        .await
    }

    pub async fn off(&self, id: CallbackId) {
        crate::handler::unsubscribe(&mut self.routing().handler_tx(), id).await;
    }

    // --- element finding (spec §4.H) -----------------------------------------

    async fn document_root(&self) -> Result<corvid_cdp::browser_protocol::dom::NodeId> {
        self.enable_dom().await?;
        let resp = self.routing().execute(GetDocumentParams::default()).await?;
        Ok(resp.result.root.node_id)
    }

    async fn root_frame_id(&self) -> Result<corvid_cdp::browser_protocol::page::FrameId> {
        self.enable_page().await?;
        let resp = self.routing().execute(GetFrameTreeParams::default()).await?;
        Ok(resp.result.frame_tree.frame.id)
    }

    pub async fn find_element(
        &self,
        by: FindBy,
        timeout: Duration,
        raise_exc: bool,
    ) -> Result<Option<Element>> {
        let root = self.document_root().await?;
        let frame_id = self.root_frame_id().await?;
        let mut results = find(
            self.routing(),
            root,
            by,
            false,
            timeout,
            raise_exc,
            crate::element::IFrameBinding(frame_id),
            self.inner.config.element_poll_interval,
        )
        .await?;
        Ok(if results.is_empty() { None } else { Some(results.remove(0)) })
    }

    pub async fn find_elements(&self, by: FindBy, timeout: Duration) -> Result<Vec<Element>> {
        let root = self.document_root().await?;
        let frame_id = self.root_frame_id().await?;
        find(
            self.routing(),
            root,
            by,
            true,
            timeout,
            false,
            crate::element::IFrameBinding(frame_id),
            self.inner.config.element_poll_interval,
        )
        .await
    }

    pub async fn find_by_attributes(&self, bag: AttributeBag, timeout: Duration, raise_exc: bool) -> Result<Option<Element>> {
        self.find_element(FindBy::Attributes(bag), timeout, raise_exc).await
    }

    /// The tab's `window.fetch`-backed HTTP client (SPEC_FULL §3).
    pub fn request(&self) -> crate::request::RequestClient {
        crate::request::RequestClient::new(self.inner.routing.clone())
    }

    /// Closes this tab's target (spec §4.E).
    pub async fn close(&self) -> Result<()> {
        self.routing()
            .execute(CloseTargetParams::new(self.target_id().clone()))
            .await?;
        Ok(())
    }
}

fn inflight_requests(logs: &[NetworkLogEntry]) -> usize {
    let mut inflight = std::collections::HashSet::new();
    for entry in logs {
        match entry {
            NetworkLogEntry::RequestWillBeSent(ev) => {
                inflight.insert(ev.request_id.clone());
            }
            NetworkLogEntry::LoadingFinished(ev) => {
                inflight.remove(&ev.request_id);
            }
            NetworkLogEntry::LoadingFailed(ev) => {
                inflight.remove(&ev.request_id);
            }
            NetworkLogEntry::ResponseReceived(_) => {}
        }
    }
    inflight.len()
}

/// Where `Tab::take_screenshot`/`Tab::print_to_pdf`'s encoded bytes end up.
#[derive(Debug, Clone)]
pub enum OutputTarget {
    /// Return the decoded bytes to the caller.
    Base64,
    /// Write the decoded bytes to this path and return `None`.
    Path(String),
}

pub type ScreenshotOutput = OutputTarget;
pub type PdfOutput = OutputTarget;

/// The image encodings `Page.captureScreenshot` accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotFormat {
    Png,
    Jpeg,
    Webp,
}

impl ScreenshotFormat {
    fn as_wire(self) -> &'static str {
        match self {
            ScreenshotFormat::Png => "png",
            ScreenshotFormat::Jpeg => "jpeg",
            ScreenshotFormat::Webp => "webp",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            ScreenshotFormat::Png => &["png"],
            ScreenshotFormat::Jpeg => &["jpg", "jpeg"],
            ScreenshotFormat::Webp => &["webp"],
        }
    }
}

impl Default for ScreenshotFormat {
    fn default() -> Self {
        ScreenshotFormat::Png
    }
}

fn validate_extension(path: &str, allowed: &[&str]) -> Result<()> {
    let ext = path.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    if allowed.iter().any(|a| *a == ext) {
        Ok(())
    } else {
        Err(CdpError::InvalidFileExtension(ext))
    }
}

fn write_output(output: OutputTarget, bytes: Vec<u8>) -> Result<Option<Vec<u8>>> {
    match output {
        OutputTarget::Base64 => Ok(Some(bytes)),
        OutputTarget::Path(path) => {
            std::fs::write(&path, &bytes)?;
            Ok(None)
        }
    }
}

fn decode_base64(data: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| CdpError::InvalidCommand(format!("invalid base64 payload: {e}")))
}
