use std::io;

use async_tungstenite::tungstenite;
use futures::channel::mpsc::SendError;
use futures::channel::oneshot::Canceled;
use thiserror::Error;

/// The error taxonomy this crate raises. Transport-level variants propagate
/// unchanged; domain errors name the component and operation that failed
/// rather than re-interpreting what the browser reported.
#[derive(Debug, Error)]
pub enum CdpError {
    #[error("{0}")]
    Ws(#[from] tungstenite::Error),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    ChannelSendError(#[from] ChannelError),
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("command failed structural validation: {0}")]
    InvalidCommand(String),
    #[error("no response received within the call deadline")]
    CommandTimeout,
    #[error("the connection closed before a response arrived")]
    ConnectionClosed,
    #[error("{0}")]
    Protocol(#[from] corvid_types::Error),
    #[error("no element matched the given query")]
    ElementNotFound,
    #[error("polling for the element timed out")]
    WaitElementTimeout,
    #[error("the element is not visible")]
    ElementNotVisible,
    #[error("the element exists but is not interactable at its computed position")]
    ElementNotInteractable,
    #[error("a different element occupies the point this click targeted")]
    ClickIntercepted,
    #[error("could not resolve an iframe's frame id, isolated world or document: {0}")]
    InvalidIFrame(String),
    #[error("navigation did not reach the configured ready state before the deadline")]
    PageLoadTimeout,
    #[error("operation requires a top-level page target, not an iframe/worker target")]
    TopLevelTargetRequired,
    #[error("unsupported output file extension: {0}")]
    InvalidFileExtension(String),
    #[error("network transport failure: {0}")]
    NetworkError(String),
    #[error("an authentication challenge went unhandled")]
    AuthRequired,
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("{0}")]
    Send(#[from] SendError),
    #[error("{0}")]
    Canceled(#[from] Canceled),
}

impl From<Canceled> for CdpError {
    fn from(err: Canceled) -> Self {
        ChannelError::from(err).into()
    }
}

impl From<SendError> for CdpError {
    fn from(err: SendError) -> Self {
        ChannelError::from(err).into()
    }
}

pub type Result<T, E = CdpError> = std::result::Result<T, E>;
