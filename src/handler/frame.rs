//! Frame Resolver (spec §4.I): turns an `<iframe>` WebElement's remote
//! object into a fully populated [`IFrameContext`] — the frame id, isolated
//! world, and pinned `documentElement` a later `find`/`query` call routes
//! its commands through.
//!
//! Same-process iframes resolve entirely on the tab's own session. Isolated
//! (out-of-process) iframes need a second, short-lived WebSocket to the
//! browser so `Target.getTargets`/`attachToTarget` can run without
//! disturbing the tab's own session — spec §5 calls this the "secondary
//! browser-level WebSocket".

use futures::channel::mpsc::Sender;
use futures::StreamExt;

use corvid_cdp::browser_protocol::dom::{BackendNodeId, DescribeNodeParams, GetFrameOwnerParams};
use corvid_cdp::browser_protocol::page::{CreateIsolatedWorldParams, FrameId, GetFrameTreeParams};
use corvid_cdp::browser_protocol::target::{AttachToTargetParams, GetTargetsParams, SessionId};
use corvid_cdp::js_protocol::runtime::{EvaluateParams, ExecutionContextId, RemoteObjectId};
use corvid_types::{Command, CommandResponse, Message, Method};

use crate::conn::Connection;
use crate::error::{CdpError, Result};
use crate::handler::{execute, HandlerMessage};

/// Everything later DOM/Runtime calls rooted in this iframe need, cached on
/// the WebElement it was resolved for.
#[derive(Debug, Clone)]
pub(crate) struct IFrameContext {
    pub session_id: SessionId,
    pub frame_id: FrameId,
    pub execution_context_id: ExecutionContextId,
    pub document_object_id: RemoteObjectId,
}

/// Resolves `object_id` (the iframe element's remote object, in `session_id`)
/// into an [`IFrameContext`], following the pipeline in order and falling
/// back to out-of-process resolution only once same-process owner matching
/// is exhausted.
pub(crate) async fn resolve(
    handler_tx: &mut Sender<HandlerMessage>,
    debug_ws_url: &str,
    session_id: SessionId,
    parent_frame_id: FrameId,
    object_id: RemoteObjectId,
) -> Result<IFrameContext> {
    let describe = execute(
        handler_tx,
        DescribeNodeParams::for_object(object_id),
        Some(session_id.clone()),
    )
    .await
    .map_err(|e| invalid("DOM.describeNode", e))?;

    let node = describe.result.node;
    let backend_node_id = node.backend_node_id;
    let candidate = node
        .content_document
        .as_ref()
        .and_then(|doc| doc.frame_id.clone());

    let (resolved_session, frame_id) = if let Some(frame_id) = candidate {
        (session_id.clone(), frame_id)
    } else if let Some(frame_id) =
        find_owned_frame(handler_tx, session_id.clone(), backend_node_id).await?
    {
        (session_id.clone(), frame_id)
    } else {
        resolve_oopif(
            handler_tx,
            debug_ws_url,
            session_id.clone(),
            parent_frame_id,
            backend_node_id,
        )
        .await?
    };

    let isolated = execute(
        handler_tx,
        CreateIsolatedWorldParams::for_frame(frame_id.clone()),
        Some(resolved_session.clone()),
    )
    .await
    .map_err(|e| invalid("Page.createIsolatedWorld", e))?;

    let execution_context_id = ExecutionContextId(isolated.result.execution_context_id.0);

    let evaluated = execute(
        handler_tx,
        EvaluateParams::new("document.documentElement").in_context(execution_context_id.clone()),
        Some(resolved_session.clone()),
    )
    .await
    .map_err(|e| invalid("Runtime.evaluate", e))?;

    let document_object_id = evaluated
        .result
        .result
        .object_id
        .ok_or_else(|| CdpError::InvalidIFrame("Runtime.evaluate returned no objectId for documentElement".into()))?;

    Ok(IFrameContext {
        session_id: resolved_session,
        frame_id,
        execution_context_id,
        document_object_id,
    })
}

/// Step 3: walk the current target's frame tree and ask each frame who
/// owns it until one's owner backend node matches ours.
async fn find_owned_frame(
    handler_tx: &mut Sender<HandlerMessage>,
    session_id: SessionId,
    backend_node_id: BackendNodeId,
) -> Result<Option<FrameId>> {
    let tree = execute(handler_tx, GetFrameTreeParams::default(), Some(session_id.clone()))
        .await
        .map_err(|e| invalid("Page.getFrameTree", e))?;

    for frame in tree.result.frame_tree.flatten() {
        let owner = execute(
            handler_tx,
            GetFrameOwnerParams::new(frame.id.clone()),
            Some(session_id.clone()),
        )
        .await;
        if let Ok(owner) = owner {
            if owner.result.backend_node_id == backend_node_id {
                return Ok(Some(frame.id.clone()));
            }
        }
    }
    Ok(None)
}

/// Step 3b: the iframe's content is rendered by a different target. A
/// short-lived side connection lets us enumerate and attach to targets
/// without disturbing the tab's own session.
async fn resolve_oopif(
    handler_tx: &mut Sender<HandlerMessage>,
    debug_ws_url: &str,
    main_session_id: SessionId,
    parent_frame_id: FrameId,
    backend_node_id: BackendNodeId,
) -> Result<(SessionId, FrameId)> {
    let mut side = Connection::connect(debug_ws_url)
        .await
        .map_err(|e| invalid("side connection", e))?;

    let targets = side_execute(&mut side, GetTargetsParams::default(), None)
        .await
        .map_err(|e| invalid("Target.getTargets", e))?;

    for info in targets.result.target_infos {
        if !(info.r#type == "iframe" || info.is_page()) {
            continue;
        }

        let attached = side_execute(
            &mut side,
            AttachToTargetParams::flattened(info.target_id.clone()),
            None,
        )
        .await;
        let Ok(attached) = attached else { continue };
        let candidate_session = attached.result.session_id;

        let tree = side_execute(&mut side, GetFrameTreeParams::default(), Some(candidate_session.clone())).await;
        let Ok(tree) = tree else { continue };
        let frame_tree = tree.result.frame_tree;

        // (a) does the candidate target's root frame belong to our element?
        // `DOM.getFrameOwner` is asked on the *main* session, since the
        // owning `<iframe>` tag lives in our document, not the child
        // target's.
        let owner = execute(
            handler_tx,
            GetFrameOwnerParams::new(frame_tree.frame.id.clone()),
            Some(main_session_id.clone()),
        )
        .await;
        if let Ok(owner) = owner {
            if owner.result.backend_node_id == backend_node_id {
                return Ok((candidate_session, frame_tree.frame.id.clone()));
            }
        }

        // (b) intermediate-frame carrier: some frame in this target's tree
        // claims our frame as its parent.
        if let Some(frame) = frame_tree
            .flatten()
            .into_iter()
            .find(|f| f.parent_id.as_ref() == Some(&parent_frame_id))
        {
            return Ok((candidate_session, frame.id.clone()));
        }
    }

    Err(CdpError::InvalidIFrame(
        "exhausted every candidate target without finding the iframe's content frame".into(),
    ))
}

/// A side connection is used serially by exactly one caller, so a simple
/// submit-then-wait loop (no Handler, no pending-command table) is enough:
/// unrelated responses can't appear because nothing else is driving it.
async fn side_execute<C: Command>(
    conn: &mut Connection<corvid_cdp::events::CdpEventMessage>,
    cmd: C,
    session_id: Option<SessionId>,
) -> Result<CommandResponse<C::Response>> {
    let method = cmd.identifier();
    let params = serde_json::to_value(cmd)?;
    let call_id = conn.submit_command(method.clone(), session_id, params);

    loop {
        match conn.next().await {
            Some(Ok(Message::Response(resp))) if resp.id == call_id => {
                return crate::handler::to_command_response::<C>(resp, method);
            }
            Some(Ok(_)) => continue,
            Some(Err(err)) => return Err(err),
            None => return Err(CdpError::ConnectionClosed),
        }
    }
}

fn invalid(step: &str, err: CdpError) -> CdpError {
    CdpError::InvalidIFrame(format!("{step}: {err}"))
}
