//! The Handler actor (spec §4.C): owns the single [`Connection`] to the
//! browser and every piece of state that connection's events keep current —
//! attached targets, sessions, the Event Router, and each target's Network
//! Log Store. Everything else in this crate (`Browser`, `Tab`, `Element`)
//! only ever talks to it through a [`HandlerMessage`] channel, the same
//! separation the teacher draws between its `Browser`/`Page` façade and its
//! background `Handler`/`CdpFuture`.

use std::collections::HashMap;
use std::collections::HashSet;
use std::pin::Pin;
use std::time::{Duration, Instant};

use fnv::FnvHashMap;
use futures::channel::mpsc::{Receiver, Sender};
use futures::channel::oneshot;
use futures::stream::{Fuse, Stream, StreamExt};
use futures::task::{Context, Poll};
use futures::SinkExt;

use corvid_cdp::browser_protocol::fetch::ContinueRequestParams;
use corvid_cdp::browser_protocol::target::{
    BrowserContextId, SessionId, SetDiscoverTargetsParams, TargetId,
};
use corvid_cdp::events::{CdpEvent, CdpEventMessage};
use corvid_types::{CallId, Command, CommandResponse, Method, Response};

use crate::error::{CdpError, Result};
use crate::handler::event_router::{CallbackId, EventRouter, RouterKey};
use crate::handler::job::PeriodicJob;
use crate::handler::session::Session;
use crate::handler::target::TargetState;

pub(crate) mod browser_context;
pub(crate) mod event_router;
pub(crate) mod fetch;
pub(crate) mod frame;
mod job;
pub(crate) mod network;
mod session;
pub(crate) mod target;

pub(crate) use browser_context::BrowserContext;

/// How long a command may sit unanswered before it is evicted with
/// [`CdpError::CommandTimeout`] (spec §4.C).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One outbound command still waiting on the wire, carried from the public
/// API down to the Handler.
pub(crate) struct CommandMessage {
    pub method: std::borrow::Cow<'static, str>,
    pub session_id: Option<SessionId>,
    pub params: serde_json::Value,
    pub sender: oneshot::Sender<Response>,
}

impl CommandMessage {
    fn new<C: Command>(
        cmd: C,
        session_id: Option<SessionId>,
        sender: oneshot::Sender<Response>,
    ) -> Result<Self> {
        Ok(Self {
            method: cmd.identifier(),
            session_id,
            params: serde_json::to_value(cmd)?,
            sender,
        })
    }
}

/// Messages the public API sends to the background Handler task.
pub(crate) enum HandlerMessage {
    Command(CommandMessage),
    Subscribe {
        key: RouterKey,
        one_shot: bool,
        reply: oneshot::Sender<(CallbackId, futures::channel::mpsc::UnboundedReceiver<CdpEvent>)>,
    },
    Unsubscribe(CallbackId),
    SetNetworkLogging {
        target_id: TargetId,
        enabled: bool,
    },
    GetNetworkLogs {
        target_id: TargetId,
        filter: Option<String>,
        reply: oneshot::Sender<Vec<network::NetworkLogEntry>>,
    },
    SetFetchHandleAuth {
        target_id: TargetId,
        enabled: bool,
    },
}

/// Sends `cmd` to the Handler and awaits its typed response — the single
/// choke point every public-facing command call in this crate funnels
/// through, mirroring the teacher's `Browser::execute`.
pub(crate) async fn execute<C: Command>(
    handler_tx: &mut Sender<HandlerMessage>,
    cmd: C,
    session_id: Option<SessionId>,
) -> Result<CommandResponse<C::Response>> {
    let (tx, rx) = oneshot::channel();
    let method = cmd.identifier();
    let msg = CommandMessage::new(cmd, session_id, tx)?;
    handler_tx
        .send(HandlerMessage::Command(msg))
        .await
        .map_err(crate::error::ChannelError::from)?;
    let resp = rx.await?;
    to_command_response::<C>(resp, method)
}

/// Subscribes to events scoped to `key` (`None` = browser-wide) through the
/// Handler, returning the id to later `unsubscribe` with and the stream of
/// delivered events.
pub(crate) async fn subscribe(
    handler_tx: &mut Sender<HandlerMessage>,
    key: RouterKey,
    one_shot: bool,
) -> Result<(CallbackId, futures::channel::mpsc::UnboundedReceiver<CdpEvent>)> {
    let (reply, rx) = oneshot::channel();
    handler_tx
        .send(HandlerMessage::Subscribe {
            key,
            one_shot,
            reply,
        })
        .await
        .map_err(crate::error::ChannelError::from)?;
    Ok(rx.await?)
}

pub(crate) async fn unsubscribe(handler_tx: &mut Sender<HandlerMessage>, id: CallbackId) {
    let _ = handler_tx.send(HandlerMessage::Unsubscribe(id)).await;
}

pub(crate) async fn set_network_logging(
    handler_tx: &mut Sender<HandlerMessage>,
    target_id: TargetId,
    enabled: bool,
) {
    let _ = handler_tx
        .send(HandlerMessage::SetNetworkLogging { target_id, enabled })
        .await;
}

pub(crate) async fn get_network_logs(
    handler_tx: &mut Sender<HandlerMessage>,
    target_id: TargetId,
    filter: Option<String>,
) -> Result<Vec<network::NetworkLogEntry>> {
    let (reply, rx) = oneshot::channel();
    handler_tx
        .send(HandlerMessage::GetNetworkLogs {
            target_id,
            filter,
            reply,
        })
        .await
        .map_err(crate::error::ChannelError::from)?;
    Ok(rx.await?)
}

pub(crate) async fn set_fetch_handle_auth(
    handler_tx: &mut Sender<HandlerMessage>,
    target_id: TargetId,
    enabled: bool,
) {
    let _ = handler_tx
        .send(HandlerMessage::SetFetchHandleAuth { target_id, enabled })
        .await;
}

pub(crate) fn to_command_response<T: Command>(
    resp: Response,
    method: std::borrow::Cow<'static, str>,
) -> Result<CommandResponse<T::Response>> {
    if let Some(res) = resp.result {
        let result = serde_json::from_value(res)?;
        Ok(CommandResponse {
            id: resp.id,
            result,
            method,
        })
    } else if let Some(err) = resp.error {
        Err(CdpError::Protocol(err))
    } else {
        Err(CdpError::ConnectionClosed)
    }
}

pub(crate) struct Handler {
    pending_commands: FnvHashMap<CallId, (oneshot::Sender<Response>, Instant)>,
    targets: HashMap<TargetId, TargetState>,
    sessions: HashMap<SessionId, Session>,
    contexts: HashSet<BrowserContextId>,
    router: EventRouter,
    conn: crate::conn::Connection<CdpEventMessage>,
    from_client: Fuse<Receiver<HandlerMessage>>,
    evict_command_timeout: PeriodicJob,
}

impl Handler {
    pub(crate) fn new(mut conn: crate::conn::Connection<CdpEventMessage>, rx: Receiver<HandlerMessage>) -> Self {
        let discover = SetDiscoverTargetsParams::new(true);
        let method = discover.identifier();
        if let Ok(params) = serde_json::to_value(discover) {
            conn.submit_command(method, None, params);
        }

        Self {
            pending_commands: Default::default(),
            targets: Default::default(),
            sessions: Default::default(),
            contexts: Default::default(),
            router: Default::default(),
            conn,
            from_client: rx.fuse(),
            evict_command_timeout: PeriodicJob::new(Duration::from_secs(1)),
        }
    }

    fn submit_command(&mut self, msg: CommandMessage) {
        let call_id = self.conn.submit_command(msg.method, msg.session_id, msg.params);
        self.pending_commands
            .insert(call_id, (msg.sender, Instant::now()));
    }

    fn on_response(&mut self, resp: Response) {
        if let Some((tx, _)) = self.pending_commands.remove(&resp.id) {
            let _ = tx.send(resp);
        }
    }

    fn evict_timed_out(&mut self) {
        let now = Instant::now();
        let expired: Vec<CallId> = self
            .pending_commands
            .iter()
            .filter(|(_, (_, started))| now.duration_since(*started) > REQUEST_TIMEOUT)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            if let Some((tx, _)) = self.pending_commands.remove(&id) {
                tracing::warn!(?id, "command timed out waiting for a response");
                let _ = tx.send(Response {
                    id,
                    result: None,
                    error: Some(corvid_types::Error {
                        code: -32000,
                        message: CdpError::CommandTimeout.to_string(),
                    }),
                });
            }
        }
    }

    fn on_event(&mut self, message: CdpEventMessage) {
        let event = match CdpEvent::parse(&message) {
            Ok(ev) => ev,
            Err(err) => {
                tracing::warn!(%err, method = %message.identifier(), "dropping event with an unexpected payload shape");
                return;
            }
        };

        let target_id = message
            .session_id
            .as_ref()
            .and_then(|s| self.sessions.get(&SessionId(s.clone())))
            .map(|session| session.target_id().clone());

        self.apply_bookkeeping(&target_id, &event);

        let key: RouterKey = target_id;
        self.router.dispatch(&key, &event);
    }

    fn apply_bookkeeping(&mut self, target_id: &Option<TargetId>, event: &CdpEvent) {
        match event {
            CdpEvent::TargetCreated(ev) => {
                self.targets
                    .entry(ev.target_info.target_id.clone())
                    .or_insert_with(|| TargetState::new(ev.target_info.clone()));
                if let Some(ctx) = &ev.target_info.browser_context_id {
                    self.contexts.insert(ctx.clone());
                }
            }
            CdpEvent::TargetInfoChanged(ev) => {
                if let Some(t) = self.targets.get_mut(&ev.target_info.target_id) {
                    t.set_info(ev.target_info.clone());
                }
            }
            CdpEvent::TargetDestroyed(ev) => {
                if let Some(t) = self.targets.remove(&ev.target_id) {
                    if let Some(sid) = t.session_id() {
                        self.sessions.remove(sid);
                    }
                }
                self.sessions.retain(|_, s| s.target_id() != &ev.target_id);
                self.router.clear(&Some(ev.target_id.clone()));
            }
            CdpEvent::AttachedToTarget(ev) => {
                self.sessions.insert(
                    ev.session_id.clone(),
                    Session::new(ev.session_id.clone(), ev.target_info.target_id.clone()),
                );
                let t = self
                    .targets
                    .entry(ev.target_info.target_id.clone())
                    .or_insert_with(|| TargetState::new(ev.target_info.clone()));
                t.set_session_id(Some(ev.session_id.clone()));
            }
            CdpEvent::DetachedFromTarget(ev) => {
                if let Some(session) = self.sessions.remove(&ev.session_id) {
                    if let Some(t) = self.targets.get_mut(session.target_id()) {
                        t.set_session_id(None);
                    }
                }
            }
            CdpEvent::FrameAttached(_) => {}
            CdpEvent::FrameNavigated(ev) => {
                if let Some(tid) = target_id {
                    if let Some(t) = self.targets.get_mut(tid) {
                        t.upsert_frame(ev.frame.clone());
                    }
                }
            }
            CdpEvent::FrameDetached(ev) => {
                if let Some(tid) = target_id {
                    if let Some(t) = self.targets.get_mut(tid) {
                        t.remove_frame(&ev.frame_id);
                    }
                }
            }
            CdpEvent::RequestWillBeSent(ev) => {
                if let Some(tid) = target_id {
                    if let Some(t) = self.targets.get_mut(tid) {
                        t.network_log_mut()
                            .push(network::NetworkLogEntry::RequestWillBeSent(ev.clone()));
                    }
                }
            }
            CdpEvent::ResponseReceived(ev) => {
                if let Some(tid) = target_id {
                    if let Some(t) = self.targets.get_mut(tid) {
                        t.network_log_mut()
                            .push(network::NetworkLogEntry::ResponseReceived(ev.clone()));
                    }
                }
            }
            CdpEvent::LoadingFinished(ev) => {
                if let Some(tid) = target_id {
                    if let Some(t) = self.targets.get_mut(tid) {
                        t.network_log_mut()
                            .push(network::NetworkLogEntry::LoadingFinished(ev.clone()));
                    }
                }
            }
            CdpEvent::LoadingFailed(ev) => {
                if let Some(tid) = target_id {
                    if let Some(t) = self.targets.get_mut(tid) {
                        t.network_log_mut()
                            .push(network::NetworkLogEntry::LoadingFailed(ev.clone()));
                    }
                }
            }
            CdpEvent::AuthRequired(ev) => {
                // Safety net (SPEC_FULL §3): a proxy challenge nobody subscribed
                // to `Fetch.authRequired` for would otherwise hang the request
                // forever, so the Handler answers `Default` on their behalf once
                // and logs it — a caller that *does* want to supply proxy
                // credentials should subscribe before enabling interception.
                let has_subscriber = target_id
                    .as_ref()
                    .map(|tid| self.targets.get(tid).map(|t| t.fetch_handle_auth()).unwrap_or(false))
                    .unwrap_or(false);
                if !has_subscriber {
                    tracing::warn!(
                        request_id = %ev.request_id.0,
                        scheme = %ev.auth_challenge.scheme,
                        "Fetch.authRequired with no registered handler, replying Default once"
                    );
                    let params = corvid_cdp::browser_protocol::fetch::ContinueWithAuthParams {
                        request_id: ev.request_id.clone(),
                        auth_challenge_response:
                            corvid_cdp::browser_protocol::fetch::AuthChallengeResponse::default_auth(),
                    };
                    let method = params.identifier();
                    if let Ok(value) = serde_json::to_value(params) {
                        let session_id = target_id
                            .as_ref()
                            .and_then(|tid| self.targets.get(tid))
                            .and_then(|t| t.session_id())
                            .cloned();
                        self.conn.submit_command(method, session_id, value);
                    }
                }
            }
            CdpEvent::RequestPaused(ev) => {
                // Same safety net for plain request interception: if Fetch is
                // enabled but nothing is listening, don't let the page hang.
                let has_subscriber = target_id.is_some()
                    && self
                        .router
                        .has_subscribers(&target_id.clone());
                if !has_subscriber {
                    let params = ContinueRequestParams::new(ev.request_id.clone());
                    let method = params.identifier();
                    if let Ok(value) = serde_json::to_value(params) {
                        let session_id = target_id
                            .as_ref()
                            .and_then(|tid| self.targets.get(tid))
                            .and_then(|t| t.session_id())
                            .cloned();
                        self.conn.submit_command(method, session_id, value);
                    }
                }
            }
            _ => {}
        }
    }
}

impl Stream for Handler {
    type Item = Result<()>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let pin = self.get_mut();

        while let Poll::Ready(Some(msg)) = Pin::new(&mut pin.from_client).poll_next(cx) {
            match msg {
                HandlerMessage::Command(cmd) => pin.submit_command(cmd),
                HandlerMessage::Subscribe {
                    key,
                    one_shot,
                    reply,
                } => {
                    let (id, rx) = pin.router.subscribe(key, one_shot);
                    let _ = reply.send((id, rx));
                }
                HandlerMessage::Unsubscribe(id) => pin.router.unsubscribe(id),
                HandlerMessage::SetNetworkLogging { target_id, enabled } => {
                    if let Some(t) = pin.targets.get_mut(&target_id) {
                        t.network_log_mut().set_enabled(enabled);
                    }
                }
                HandlerMessage::GetNetworkLogs {
                    target_id,
                    filter,
                    reply,
                } => {
                    let entries = pin
                        .targets
                        .get(&target_id)
                        .map(|t| {
                            t.network_log()
                                .filter(filter.as_deref())
                                .into_iter()
                                .cloned()
                                .collect()
                        })
                        .unwrap_or_default();
                    let _ = reply.send(entries);
                }
                HandlerMessage::SetFetchHandleAuth { target_id, enabled } => {
                    if let Some(t) = pin.targets.get_mut(&target_id) {
                        t.set_fetch_handle_auth(enabled);
                    }
                }
            }
        }

        if pin.evict_command_timeout.is_ready(cx) {
            pin.evict_timed_out();
        }

        loop {
            match Pin::new(&mut pin.conn).poll_next(cx) {
                Poll::Ready(Some(Ok(corvid_types::Message::Response(resp)))) => {
                    pin.on_response(resp);
                }
                Poll::Ready(Some(Ok(corvid_types::Message::Event(ev)))) => {
                    pin.on_event(ev);
                }
                Poll::Ready(Some(Err(err))) => return Poll::Ready(Some(Err(err))),
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => break,
            }
        }

        Poll::Pending
    }
}
