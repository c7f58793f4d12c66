//! Explicit change subscriptions.

use crate::state::{StoreEvent, TimelineState};

/// Handle returned by [`crate::TimelineStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Observer = Box<dyn FnMut(&TimelineState, &StoreEvent)>;

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl ObserverRegistry {
    pub(crate) fn add(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Deliver each event to every observer, in subscription order.
    pub(crate) fn notify(&mut self, state: &TimelineState, events: &[StoreEvent]) {
        for event in events {
            for (_, observer) in self.observers.iter_mut() {
                observer(state, event);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.observers.len())
            .finish()
    }
}
