use super::selection::Selection;
use super::viewer::ViewerState;
use slotmap::{SlotMap, new_key_type};
use std::fmt;
use std::ops::Range;

new_key_type! {
    pub struct SubscriptionId;
}

/// A change notification emitted by a session after a successful mutation.
///
/// Rejected operations never emit events.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StructuresAdded { range: Range<usize> },
    StructureRemoved { index: usize, id: String },
    /// A job-backed structure received (or replaced) its geometry.
    StructureResolved { index: usize },
    FilesAdded { range: Range<usize> },
    FileRemoved { index: usize },
    FileUpdated { index: usize },
    SelectionChanged { selection: Option<Selection> },
    ViewerStateChanged { state: ViewerState },
}

pub type Subscriber = Box<dyn Fn(&SessionEvent) + Send + Sync>;

/// Explicit observer registry for [`SessionEvent`]s.
///
/// Subscribers are invoked synchronously on the thread that performed the mutation.
#[derive(Default)]
pub struct EventBus {
    subscribers: SlotMap<SubscriptionId, Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        self.subscribers.insert(subscriber)
    }

    /// Removes a subscriber.
    ///
    /// # Return
    ///
    /// `true` if the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    pub fn emit(&self, event: &SessionEvent) {
        for (_, subscriber) in &self.subscribers {
            subscriber(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
