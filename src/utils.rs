//! Runtime-abstraction shims so the rest of the crate never names
//! `async-std` or `tokio` directly (spec §5: single-threaded cooperative
//! scheduling, backend-agnostic).

use std::future::Future;
use std::time::Duration;

/// Spawns a future onto the selected runtime and detaches it; used for the
/// Handler's background pump task and for fire-and-forget event-handler
/// wrapping (spec §4.D).
pub fn spawn<F>(fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    cfg_if::cfg_if! {
        if #[cfg(feature = "async-std-runtime")] {
            async_std::task::spawn(fut);
        } else if #[cfg(feature = "tokio-runtime")] {
            tokio::task::spawn(fut);
        }
    }
}

/// Suspends the current task for `dur`, used by the element-wait poll loop
/// (spec §4.H) and the page-load readiness gate (spec §4.F).
pub async fn sleep(dur: Duration) {
    cfg_if::cfg_if! {
        if #[cfg(feature = "async-std-runtime")] {
            async_std::task::sleep(dur).await;
        } else if #[cfg(feature = "tokio-runtime")] {
            tokio::time::sleep(dur).await;
        }
    }
}
