//! Browser façade (spec §4.E, SPEC_FULL §2.4): owns the debugging WebSocket
//! URL, spawns the background [`Handler`] that drives the [`Connection`],
//! and is the entry point for creating tabs and browser contexts.
//!
//! Where the teacher hands the caller a separate `CdpFuture` to spawn
//! themselves, this core spawns the [`Handler`] internally on construction —
//! there is no browser-process lifecycle for a caller to coordinate the
//! future's lifetime against, so there is nothing gained by exposing it.

use std::time::Duration;

use futures::channel::mpsc::{channel, Sender};
use futures::StreamExt;

use corvid_cdp::browser_protocol::target::{
    BrowserContextId, CreateBrowserContextParams, CreateTargetParams,
};

use crate::conn::Connection;
use crate::error::Result;
use crate::handler::{execute, BrowserContext, Handler, HandlerMessage};
use crate::tab::Tab;

/// The page-load readiness gate `Tab::go_to`/`refresh` wait for (SPEC_FULL
/// §3, supplementing spec §4.F's binary `"interactive"|"complete"` check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// `document.readyState == "interactive"` — the spec's original gate.
    DomContentLoaded,
    /// `document.readyState == "complete"` — the default.
    Load,
    /// `Load`, then wait until the Network Log Store has seen no new
    /// in-flight request for 500ms.
    NetworkIdle0,
    /// Like `NetworkIdle0` but tolerates up to two concurrent connections,
    /// matching the common "idle enough" heuristic other automation tools use.
    NetworkIdle2,
}

impl Default for WaitUntil {
    fn default() -> Self {
        WaitUntil::Load
    }
}

/// Tunables for the core's own operation (SPEC_FULL §2.4). Deliberately does
/// not carry CLI flags, a browser binary path, or launch arguments — those
/// describe the browser process, which is out of scope per spec §1/§6.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// How long a single command may sit unanswered before
    /// [`crate::error::CdpError::CommandTimeout`] (spec §4.C). Defaults to
    /// [`crate::handler::REQUEST_TIMEOUT`].
    pub request_timeout: Duration,
    /// The default page-load gate `go_to`/`refresh` wait for when the caller
    /// doesn't pick one explicitly.
    pub wait_until: WaitUntil,
    /// How long to keep the WebSocket open after the last command/event,
    /// mirroring the teacher's `idle_browser_timeout`.
    pub idle_browser_timeout: Duration,
    /// Cadence of the Element Finder's polling loop (spec §4.H "~500ms").
    pub element_poll_interval: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            request_timeout: crate::handler::REQUEST_TIMEOUT,
            wait_until: WaitUntil::default(),
            idle_browser_timeout: Duration::from_secs(300),
            element_poll_interval: Duration::from_millis(500),
        }
    }
}

/// Turns `(host, port)` into the browser-level debugging WebSocket URL by
/// GETting `/json/version`, the one in-scope sliver of process lifecycle
/// named in spec §6 ("Browser process (collaborator, not implemented here)").
pub async fn discover_debugging_ws_url(host: &str, port: u16) -> Result<String> {
    #[derive(serde::Deserialize)]
    struct VersionInfo {
        #[serde(rename = "webSocketDebuggerUrl")]
        web_socket_debugger_url: String,
    }

    let url = format!("http://{host}:{port}/json/version");
    let info: VersionInfo = reqwest::get(url).await?.json().await?;
    Ok(info.web_socket_debugger_url)
}

/// Entry point: one `Browser` per debugging WebSocket, handing out `Tab`s
/// and `BrowserContext`s that all funnel commands through the same
/// background [`Handler`].
pub struct Browser {
    handler_tx: Sender<HandlerMessage>,
    debug_ws_url: String,
    config: BrowserConfig,
}

impl Browser {
    /// Connects to an already-running browser's debugging WebSocket and
    /// spawns the background task that drives it.
    pub async fn connect(debug_ws_url: impl Into<String>) -> Result<Self> {
        Self::connect_with_config(debug_ws_url, BrowserConfig::default()).await
    }

    pub async fn connect_with_config(
        debug_ws_url: impl Into<String>,
        config: BrowserConfig,
    ) -> Result<Self> {
        let debug_ws_url = debug_ws_url.into();
        let conn = Connection::connect(&debug_ws_url).await?;
        let (tx, rx) = channel(1);
        let handler = Handler::new(conn, rx);

        crate::utils::spawn(async move {
            let mut handler = handler;
            while let Some(res) = handler.next().await {
                if let Err(err) = res {
                    tracing::error!(%err, "handler task ended with an error");
                    break;
                }
            }
            tracing::debug!("handler task ended");
        });

        Ok(Self {
            handler_tx: tx,
            debug_ws_url,
            config,
        })
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Creates a new top-level tab navigated to `url`, attaching to it in
    /// flattened mode (spec §4.E).
    pub async fn new_tab(&self, url: impl Into<String>) -> Result<Tab> {
        self.new_tab_in_context(url, None).await
    }

    pub async fn new_blank_tab(&self) -> Result<Tab> {
        self.new_tab("about:blank").await
    }

    /// Like [`Browser::new_tab`], but the created target is partitioned
    /// into `context` when given (spec §4.E "Browser contexts").
    pub async fn new_tab_in_context(
        &self,
        url: impl Into<String>,
        context: Option<&BrowserContextId>,
    ) -> Result<Tab> {
        let mut params = CreateTargetParams::new(url);
        if let Some(ctx) = context {
            params = params.in_context(ctx.clone());
        }
        let mut handler_tx = self.handler_tx.clone();
        let resp = execute(&mut handler_tx, params, None).await?;
        Tab::attach(
            handler_tx,
            self.debug_ws_url.clone(),
            resp.result.target_id,
            self.config.clone(),
        )
        .await
    }

    /// Partitions future targets from this one by cookies, storage and
    /// permissions (spec §4.E). The returned handle best-effort disposes the
    /// context on drop (SPEC_FULL §3).
    pub async fn create_browser_context(&self) -> Result<BrowserContext> {
        let mut handler_tx = self.handler_tx.clone();
        let resp = execute(
            &mut handler_tx,
            CreateBrowserContextParams::default(),
            None,
        )
        .await?;
        Ok(BrowserContext::new(
            resp.result.browser_context_id,
            handler_tx,
        ))
    }

    pub(crate) fn handler_tx(&self) -> Sender<HandlerMessage> {
        self.handler_tx.clone()
    }

    pub(crate) fn debug_ws_url(&self) -> &str {
        &self.debug_ws_url
    }
}
