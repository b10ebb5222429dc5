use futures::channel::mpsc::Sender;

use corvid_cdp::browser_protocol::target::{BrowserContextId, DisposeBrowserContextParams};

use crate::handler::HandlerMessage;

/// A partition of cookies/storage/permissions inside one browser process
/// (spec §4.E "Browser contexts"). Owned by the caller, not the Handler;
/// dropping it best-effort disposes the context so a caller that forgets to
/// call `dispose()` explicitly still cleans up (spec §5 "Resource scoping").
pub struct BrowserContext {
    id: BrowserContextId,
    handler_tx: Sender<HandlerMessage>,
    disposed: bool,
}

impl BrowserContext {
    pub(crate) fn new(id: BrowserContextId, handler_tx: Sender<HandlerMessage>) -> Self {
        Self {
            id,
            handler_tx,
            disposed: false,
        }
    }

    pub fn id(&self) -> &BrowserContextId {
        &self.id
    }

    /// Explicitly disposes the context, waiting for the browser to
    /// acknowledge it. After this, every target that was bound to `self`
    /// fails its next command (spec §8 property 10).
    pub async fn dispose(mut self) -> crate::error::Result<()> {
        self.disposed = true;
        crate::handler::execute(
            &mut self.handler_tx,
            DisposeBrowserContextParams::new(self.id.clone()),
            None,
        )
        .await?;
        Ok(())
    }
}

impl Drop for BrowserContext {
    fn drop(&mut self) {
        if self.disposed {
            return;
        }
        let params = DisposeBrowserContextParams::new(self.id.clone());
        let mut tx = self.handler_tx.clone();
        crate::utils::spawn(async move {
            let _ = crate::handler::execute(&mut tx, params, None).await;
        });
    }
}
