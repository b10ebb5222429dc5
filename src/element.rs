//! Element Handle (spec §4.G): a resolved DOM node — remote object, node id
//! and a flat attribute snapshot — plus the actions and reads that take a
//! remote object id as their root (`DOM.*`, `Input.*`, `Runtime.callFunctionOn`).
//!
//! Grounded on the teacher's `element.rs` (`describeNode` → `resolveNode` →
//! build), generalized to also carry the frame this node lives in, so a
//! `find` called on an `<iframe>` element can cross into its content
//! document (spec §4.I "Propagation").

use std::time::Duration;

use futures::lock::Mutex;

use corvid_cdp::browser_protocol::dom::{
    BackendNodeId, DescribeNodeParams, EnableParams as DomEnableParams, GetBoxModelParams,
    GetOuterHTMLParams, NodeId, ScrollIntoViewIfNeededParams, SetFileInputFilesParams,
};
use corvid_cdp::browser_protocol::page::{FrameId, Viewport};
use corvid_cdp::browser_protocol::input::DispatchMouseEventParams;
use corvid_cdp::js_protocol::runtime::{CallArgument, CallFunctionOnParams, RemoteObjectId};

use crate::error::{CdpError, Result};
use crate::finder::{find, AttributeBag, FindBy};
use crate::handler::frame::IFrameContext;
use crate::routing::Routing;

/// The frame a node lives in, carried alongside it so a later `find` called
/// on that node (if it turns out to be an `<iframe>`) knows which frame to
/// hand `frame::resolve` as the parent.
#[derive(Debug, Clone)]
pub(crate) struct IFrameBinding(pub FrameId);

/// A resolved DOM node. Cloning is cheap and safe — every handle shares the
/// same routing and lazily-resolved iframe cache.
#[derive(Clone)]
pub struct Element {
    routing: Routing,
    node_id: NodeId,
    backend_node_id: BackendNodeId,
    object_id: RemoteObjectId,
    attributes: Vec<(String, String)>,
    tag_name: String,
    is_iframe: bool,
    own_frame: IFrameBinding,
    poll_interval: Duration,
    iframe_ctx: std::sync::Arc<Mutex<Option<IFrameContext>>>,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("tag_name", &self.tag_name)
            .field("node_id", &self.node_id)
            .field("attributes", &self.attributes)
            .finish()
    }
}

impl Element {
    pub(crate) fn from_query(
        routing: Routing,
        node_id: NodeId,
        backend_node_id: BackendNodeId,
        object_id: RemoteObjectId,
        attributes: Vec<(String, String)>,
        tag_name: String,
        is_iframe: bool,
        own_frame: IFrameBinding,
    ) -> Self {
        Self {
            routing,
            node_id,
            backend_node_id,
            object_id,
            attributes,
            tag_name: tag_name.to_ascii_lowercase(),
            is_iframe,
            own_frame,
            poll_interval: Duration::from_millis(500),
            iframe_ctx: std::sync::Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn object_id(&self) -> &RemoteObjectId {
        &self.object_id
    }

    /// The attribute snapshot taken at resolution time (spec §4.G). Use
    /// [`Element::attribute_live`] for a fresh read.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Re-reads `name` from the live DOM rather than the resolution-time
    /// snapshot.
    pub async fn attribute_live(&self, name: &str) -> Result<Option<String>> {
        let resp = self
            .routing
            .execute(
                CallFunctionOnParams::on_object(
                    self.object_id.clone(),
                    "function(n){ return this.getAttribute(n); }",
                )
                .with_arguments(vec![CallArgument::from(serde_json::json!(name))]),
            )
            .await?;
        Ok(resp.result.result.value.and_then(|v| v.as_str().map(String::from)))
    }

    /// `element.innerText`, trimmed the way a human reading the rendered
    /// page would see it.
    pub async fn text(&self) -> Result<String> {
        let resp = self
            .routing
            .execute(CallFunctionOnParams::on_object(
                self.object_id.clone(),
                "function(){ return this.innerText; }",
            ))
            .await?;
        Ok(resp
            .result
            .result
            .value
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default())
    }

    pub async fn outer_html(&self) -> Result<String> {
        let resp = self
            .routing
            .execute(GetOuterHTMLParams::for_node(self.node_id))
            .await?;
        Ok(resp.result.outer_html)
    }

    /// The element's border-box rectangle in viewport coordinates, as CSS
    /// pixels — the basis for both click targeting and the screenshot clip.
    pub async fn bounds(&self) -> Result<Rect> {
        let resp = self
            .routing
            .execute(GetBoxModelParams::for_node(self.node_id))
            .await?;
        Rect::from_quad(&resp.result.model.content)
    }

    /// Whether the node currently renders with nonzero size and isn't
    /// hidden via CSS (spec §4.G "visibility check" ahead of click/type).
    pub async fn is_visible(&self) -> Result<bool> {
        let resp = self
            .routing
            .execute(CallFunctionOnParams::on_object(
                self.object_id.clone(),
                "function(){ \
                    const r = this.getBoundingClientRect(); \
                    const s = getComputedStyle(this); \
                    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; \
                }",
            ))
            .await?;
        Ok(resp.result.result.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Clicks the element's visible center. `<option>` elements are set
    /// directly through their `selected` property and a synthetic `change`
    /// event instead of a synthetic mouse click, which CDP does not deliver
    /// usefully to native `<select>` popups.
    pub async fn click(&self) -> Result<()> {
        if self.tag_name == "option" {
            self.routing
                .execute(CallFunctionOnParams::on_object(
                    self.object_id.clone(),
                    "function(){ \
                        this.selected = true; \
                        this.dispatchEvent(new Event('change', { bubbles: true })); \
                    }",
                ))
                .await?;
            return Ok(());
        }

        if !self.is_visible().await? {
            return Err(CdpError::ElementNotVisible);
        }

        self.routing
            .execute(ScrollIntoViewIfNeededParams::for_node(self.node_id))
            .await?;

        let rect = self.bounds().await?;
        let (x, y) = rect.center();

        if rect.width <= 0.0 || rect.height <= 0.0 {
            return Err(CdpError::ElementNotInteractable);
        }

        let hit_test = self
            .routing
            .execute(
                CallFunctionOnParams::on_object(
                    self.object_id.clone(),
                    "function(x, y) { \
                        const el = document.elementFromPoint(x, y); \
                        return el === this || this.contains(el); \
                    }",
                )
                .with_arguments(vec![
                    CallArgument::from(serde_json::json!(x)),
                    CallArgument::from(serde_json::json!(y)),
                ]),
            )
            .await?;
        if !hit_test.result.result.value.and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(CdpError::ClickIntercepted);
        }

        self.routing
            .execute(DispatchMouseEventParams::moved(x, y))
            .await?;
        self.routing
            .execute(DispatchMouseEventParams::pressed(x, y))
            .await?;
        crate::utils::sleep(Duration::from_millis(40)).await;
        self.routing
            .execute(DispatchMouseEventParams::released(x, y))
            .await?;
        Ok(())
    }

    /// Types `text` into a focused, editable element. `fast` uses
    /// `Input.insertText` (one call, no per-key events); the slower path
    /// dispatches a `char` event per rune for sites that inspect individual
    /// keystrokes.
    pub async fn type_text(&self, text: &str, fast: bool) -> Result<()> {
        self.routing
            .execute(corvid_cdp::browser_protocol::dom::FocusParams::for_node(
                self.node_id,
            ))
            .await?;

        if fast {
            self.routing
                .execute(corvid_cdp::browser_protocol::input::InsertTextParams::new(text))
                .await?;
        } else {
            for ch in text.chars() {
                self.routing
                    .execute(corvid_cdp::browser_protocol::input::DispatchKeyEventParams::char_event(ch))
                    .await?;
                crate::utils::sleep(Duration::from_millis(20)).await;
            }
        }
        Ok(())
    }

    /// Sets the files an `<input type="file">` will report, per spec §4.G.
    pub async fn set_input_files(&self, files: Vec<String>) -> Result<()> {
        self.routing
            .execute(SetFileInputFilesParams::new(self.node_id, files))
            .await?;
        Ok(())
    }

    /// A viewport-relative screenshot of just this element (spec §4.G "works
    /// in iframe targets" — `self.routing` is already pointed at the right
    /// session when this handle came from inside one).
    pub async fn screenshot(&self) -> Result<Vec<u8>> {
        self.routing
            .execute(ScrollIntoViewIfNeededParams::for_node(self.node_id))
            .await?;
        let rect = self.bounds().await?;
        let resp = self
            .routing
            .execute(corvid_cdp::browser_protocol::page::CaptureScreenshotParams {
                clip: Some(Viewport {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    scale: 1.0,
                }),
                ..Default::default()
            })
            .await?;
        base64_decode(&resp.result.data)
    }

    /// Finds a single descendant. See [`crate::finder`] for the strategy
    /// table; `<iframe>` elements resolve into their content document first.
    pub async fn find_element(&self, by: FindBy, timeout: Duration, raise_exc: bool) -> Result<Option<Element>> {
        let mut results = self.find_all(by, timeout, raise_exc, false).await?;
        Ok(if results.is_empty() { None } else { Some(results.remove(0)) })
    }

    pub async fn find_elements(&self, by: FindBy, timeout: Duration) -> Result<Vec<Element>> {
        self.find_all(by, timeout, false, true).await
    }

    async fn find_all(
        &self,
        by: FindBy,
        timeout: Duration,
        raise_exc: bool,
        find_all: bool,
    ) -> Result<Vec<Element>> {
        if self.is_iframe {
            let (routing, root, frame_id) = self.enter_frame().await?;
            find(
                &routing,
                root,
                by,
                find_all,
                timeout,
                raise_exc,
                IFrameBinding(frame_id),
                self.poll_interval,
            )
            .await
        } else {
            find(
                &self.routing,
                self.node_id,
                by,
                find_all,
                timeout,
                raise_exc,
                self.own_frame.clone(),
                self.poll_interval,
            )
            .await
        }
    }

    pub async fn find_by_attributes(
        &self,
        bag: AttributeBag,
        timeout: Duration,
        raise_exc: bool,
    ) -> Result<Option<Element>> {
        self.find_element(FindBy::Attributes(bag), timeout, raise_exc).await
    }

    /// Resolves (lazily, once) the routing, root node id and frame id of
    /// this `<iframe>` element's content document (spec §4.I).
    async fn enter_frame(&self) -> Result<(Routing, NodeId, FrameId)> {
        let mut guard = self.iframe_ctx.lock().await;
        if guard.is_none() {
            let mut tx = self.routing.handler_tx();
            let parent_session = self
                .routing
                .session_id()
                .ok_or_else(|| CdpError::InvalidIFrame("element has no session to resolve from".into()))?;
            let ctx = crate::handler::frame::resolve(
                &mut tx,
                self.routing.debug_ws_url(),
                parent_session,
                self.own_frame.0.clone(),
                self.object_id.clone(),
            )
            .await?;
            *guard = Some(ctx);
        }
        let ctx = guard.clone().expect("just populated");
        drop(guard);

        let child_routing = self.routing.with_session(ctx.session_id.clone());
        child_routing.execute(DomEnableParams::default()).await?;
        let described = child_routing
            .execute(DescribeNodeParams {
                object_id: Some(ctx.document_object_id.clone()),
                ..Default::default()
            })
            .await?;
        Ok((child_routing, described.result.node.node_id, ctx.frame_id.clone()))
    }
}

/// Lightweight rectangle, distinct from CDP's `Viewport` (which also carries
/// a zoom `scale`) — everything in this crate that reasons about where an
/// element is on screen uses this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// `DOM.getBoxModel`'s `content` quad is 4 `(x, y)` corners in clockwise
    /// order starting top-left; this folds them into a rectangle.
    fn from_quad(quad: &[f64]) -> Result<Self> {
        if quad.len() != 8 {
            return Err(CdpError::InvalidCommand(
                "DOM.getBoxModel returned a malformed content quad".into(),
            ));
        }
        let xs = [quad[0], quad[2], quad[4], quad[6]];
        let ys = [quad[1], quad[3], quad[5], quad[7]];
        let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min_y = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_y = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Ok(Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

fn base64_decode(data: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(data)
        .map_err(|e| CdpError::InvalidCommand(format!("invalid base64 screenshot payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_quad_folds_into_rect() {
        let quad = vec![10.0, 20.0, 110.0, 20.0, 110.0, 70.0, 10.0, 70.0];
        let rect = Rect::from_quad(&quad).unwrap();
        assert_eq!(rect, Rect { x: 10.0, y: 20.0, width: 100.0, height: 50.0 });
        assert_eq!(rect.center(), (60.0, 45.0));
    }

    #[test]
    fn malformed_quad_is_rejected() {
        assert!(Rect::from_quad(&[1.0, 2.0]).is_err());
    }
}
