use crate::config::ReentryPolicy;
use crate::events::{EventKind, WheelEvent};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

pub type Handler<T> = Rc<dyn Fn(&WheelEvent<T>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What happened to a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Published from inside a structural dispatch and discarded.
    Dropped,
    /// Published from inside a structural dispatch and deferred.
    Queued,
}

struct Subscriber<T> {
    id: SubscriptionId,
    kind: Option<EventKind>,
    handler: Handler<T>,
}

/// Single-threaded publish/subscribe channel.
///
/// Structural events (everything but hover) run under one lock: publishing a
/// structural event from inside a structural handler is dropped, or queued
/// until the outer dispatch ends, depending on the [`ReentryPolicy`].
pub struct EventBus<T> {
    subscribers: RefCell<Vec<Subscriber<T>>>,
    next_id: Cell<u64>,
    locked: Cell<bool>,
    policy: ReentryPolicy,
    pending: RefCell<VecDeque<WheelEvent<T>>>,
}

struct LockGuard<'a>(&'a Cell<bool>);

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<T> EventBus<T> {
    pub fn new(policy: ReentryPolicy) -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            locked: Cell::new(false),
            policy,
            pending: RefCell::new(VecDeque::new()),
        }
    }

    fn add(&self, kind: Option<EventKind>, handler: Handler<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers
            .borrow_mut()
            .push(Subscriber { id, kind, handler });
        id
    }

    pub fn subscribe(&self, handler: impl Fn(&WheelEvent<T>) + 'static) -> SubscriptionId {
        self.add(None, Rc::new(handler))
    }

    pub fn subscribe_kind(
        &self,
        kind: EventKind,
        handler: impl Fn(&WheelEvent<T>) + 'static,
    ) -> SubscriptionId {
        self.add(Some(kind), Rc::new(handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        subs.len() != before
    }

    /// Detaches every subscriber and forgets queued events.
    pub fn clear(&self) {
        self.subscribers.borrow_mut().clear();
        self.pending.borrow_mut().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_dispatching(&self) -> bool {
        self.locked.get()
    }

    pub fn publish(&self, event: WheelEvent<T>) -> Delivery {
        if !event.is_structural() {
            self.dispatch(&event);
            return Delivery::Delivered;
        }

        if self.locked.get() {
            return match self.policy {
                ReentryPolicy::Drop => {
                    log::debug!("[EventBus] dropped nested {}", event.kind());
                    Delivery::Dropped
                }
                ReentryPolicy::Queue => {
                    self.pending.borrow_mut().push_back(event);
                    Delivery::Queued
                }
            };
        }

        self.locked.set(true);
        let _guard = LockGuard(&self.locked);
        self.dispatch(&event);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(queued) => self.dispatch(&queued),
                None => break,
            }
        }
        Delivery::Delivered
    }

    fn dispatch(&self, event: &WheelEvent<T>) {
        let kind = event.kind();
        // handlers may subscribe or unsubscribe while we iterate
        let handlers: Vec<Handler<T>> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.kind.is_none_or(|k| k == kind))
            .map(|s| Rc::clone(&s.handler))
            .collect();

        for handler in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                log::error!("[EventBus] subscriber panicked while handling {}", kind);
            }
        }
    }
}
