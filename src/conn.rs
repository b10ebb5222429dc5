//! Message Codec + Connection Core (spec §4.A, §4.C): one WebSocket per
//! browser, serializing outbound commands with auto-assigned ids and
//! classifying inbound frames as a response or an event.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::pin::Pin;

use async_tungstenite::tungstenite::Message as WsMessage;
use async_tungstenite::WebSocketStream;
use futures::stream::Stream;
use futures::task::{Context, Poll};
use futures::Sink;

use corvid_cdp::browser_protocol::target::SessionId;
use corvid_types::{CallId, Event, Message, MethodCall};

use crate::error::{CdpError, Result};

cfg_if::cfg_if! {
    if #[cfg(feature = "async-std-runtime")] {
        type ConnStream = async_tungstenite::async_std::ConnectStream;

        async fn connect(url: &str) -> Result<WebSocketStream<ConnStream>> {
            let (ws, _) = async_tungstenite::async_std::connect_async(url).await?;
            Ok(ws)
        }
    } else if #[cfg(feature = "tokio-runtime")] {
        type ConnStream = async_tungstenite::tokio::TokioAdapter<tokio::net::TcpStream>;

        async fn connect(url: &str) -> Result<WebSocketStream<ConnStream>> {
            let (ws, _) = async_tungstenite::tokio::connect_async(url).await?;
            Ok(ws)
        }
    }
}

/// A duplex multiplexer over the browser's single debugging WebSocket.
///
/// Implements both ends of spec §4.A/§4.C: `submit_command` enqueues an
/// outbound call and hands back the `id` the caller should correlate a
/// response by; polling the stream drives writes out, reads frames in, and
/// classifies each as [`Message::Response`] or [`Message::Event`].
#[must_use = "a Connection does nothing unless polled"]
pub struct Connection<T: Event = corvid_cdp::events::CdpEventMessage> {
    pending_commands: VecDeque<MethodCall>,
    ws: WebSocketStream<ConnStream>,
    next_id: usize,
    needs_flush: bool,
    pending_flush: Option<MethodCall>,
    _marker: PhantomData<T>,
}

impl<T: Event + Unpin> Connection<T> {
    pub async fn connect(debug_ws_url: impl AsRef<str>) -> Result<Self> {
        let ws = connect(debug_ws_url.as_ref()).await?;
        Ok(Self {
            pending_commands: Default::default(),
            ws,
            next_id: 0,
            needs_flush: false,
            pending_flush: None,
            _marker: PhantomData,
        })
    }
}

impl<T: Event> Connection<T> {
    fn next_call_id(&mut self) -> CallId {
        let id = CallId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Queues a command for the next poll to flush, returning the `id` it
    /// was assigned so the caller can correlate the eventual response.
    pub fn submit_command(
        &mut self,
        method: Cow<'static, str>,
        session_id: Option<SessionId>,
        params: serde_json::Value,
    ) -> CallId {
        tracing::debug!(%method, "submit command");
        let id = self.next_call_id();
        self.pending_commands.push_back(MethodCall {
            id,
            method,
            session_id: session_id.map(|s| s.0),
            params,
        });
        id
    }

    fn start_send_next(&mut self, cx: &mut Context<'_>) -> Result<()> {
        if self.needs_flush {
            if let Poll::Ready(Ok(())) = Sink::poll_flush(Pin::new(&mut self.ws), cx) {
                self.needs_flush = false;
            }
        }
        if self.pending_flush.is_none() && !self.needs_flush {
            if let Some(cmd) = self.pending_commands.pop_front() {
                let msg = serde_json::to_string(&cmd)?;
                Sink::start_send(Pin::new(&mut self.ws), WsMessage::text(msg))?;
                self.pending_flush = Some(cmd);
            }
        }
        Ok(())
    }
}

impl<T: Event + Unpin> Stream for Connection<T> {
    type Item = Result<Message<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let pin = self.get_mut();

        if let Err(err) = pin.start_send_next(cx) {
            return Poll::Ready(Some(Err(err)));
        }

        if let Some(call) = pin.pending_flush.take() {
            if Sink::poll_ready(Pin::new(&mut pin.ws), cx).is_ready() {
                pin.needs_flush = true;
            } else {
                pin.pending_flush = Some(call);
            }
        }

        match Stream::poll_next(Pin::new(&mut pin.ws), cx) {
            Poll::Ready(Some(Ok(WsMessage::Text(text)))) => {
                match serde_json::from_str::<Message<T>>(&text) {
                    Ok(msg) => return Poll::Ready(Some(Ok(msg))),
                    Err(err) => {
                        tracing::warn!(%err, frame = %text, "dropping malformed frame");
                        return Poll::Pending;
                    }
                }
            }
            Poll::Ready(Some(Ok(WsMessage::Close(_)))) | Poll::Ready(None) => {
                return Poll::Ready(None);
            }
            Poll::Ready(Some(Ok(WsMessage::Binary(_)))) => {
                tracing::error!("unexpected binary websocket frame, closing connection");
                return Poll::Ready(Some(Err(CdpError::ConnectionClosed)));
            }
            Poll::Ready(Some(Ok(_))) => {
                // ping/pong/frame control messages carry no protocol content
            }
            Poll::Ready(Some(Err(err))) => {
                return Poll::Ready(Some(Err(CdpError::Ws(err))));
            }
            Poll::Pending => {}
        }
        Poll::Pending
    }
}
