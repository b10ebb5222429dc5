//! The Command Registry (spec §4.B): one typed params/result pair per CDP
//! method this core actually drives, organized by domain the way the
//! protocol itself is, plus a tagged [`events::CdpEvent`] enum the handler
//! matches on.
//!
//! This crate is hand-authored rather than generated from Chromium's `.pdl`
//! protocol files at build time (contrast the teacher's `chromiumoxide_cdp`,
//! built by `chromiumoxide_pdl`): those files are not available in this
//! environment. See `DESIGN.md` for the reasoning. The shape callers see is
//! the same either way — one struct per command, implementing
//! `corvid_types::{Command, Method}`.

pub mod browser_protocol;
pub mod events;
pub mod js_protocol;

pub use events::{CdpEvent, CdpEventMessage};
