//! A client for driving Chromium-family browsers directly over the Chrome
//! DevTools Protocol, without a WebDriver intermediary.
//!
//! [`Browser`] connects to an already-running browser's debugging
//! WebSocket, hands out [`Tab`]s and [`browser::BrowserContext`]s, and
//! drives the connection through a single background [`Handler`] actor.
//! Everything downstream — navigation, script evaluation, [`Element`]
//! lookup, the network log, request interception — funnels through that
//! one actor over an internal message channel, never touching the
//! WebSocket directly.

pub mod browser;
pub mod conn;
pub mod element;
pub mod error;
pub mod finder;
pub(crate) mod handler;
pub mod request;
pub(crate) mod routing;
pub mod tab;
pub(crate) mod utils;

pub use browser::{discover_debugging_ws_url, Browser, BrowserConfig, WaitUntil};
pub use element::Element;
pub use error::{CdpError, Result};
pub use finder::{AttributeBag, FindBy};
pub use handler::BrowserContext;
pub use request::{RequestClient, RequestParams, Response as HttpResponse};
pub use tab::Tab;

pub use corvid_cdp as cdp;
pub use corvid_types as types;
