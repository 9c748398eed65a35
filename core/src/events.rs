//! Lifecycle events and listener registries.
//!
//! A lifecycle step notifies two registries: the one on the model type, then
//! the one on the instance. Type listeners therefore observe every instance
//! of the type. Listeners run synchronously in registration order and receive
//! the instance the event is about.

use std::fmt;
use std::sync::Arc;

use crate::model::Instance;

/// Notifications emitted around a persistence round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Before a create or update request is sent.
    Saving,
    /// After a create or update succeeded.
    Save,
    /// Before a delete request is sent.
    Removing,
    /// After a delete succeeded.
    Remove,
}

impl LifecycleEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::Saving => "saving",
            LifecycleEvent::Save => "save",
            LifecycleEvent::Removing => "removing",
            LifecycleEvent::Remove => "remove",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type Listener = Arc<dyn Fn(&Instance) + Send + Sync>;

struct Entry {
    event: LifecycleEvent,
    once: bool,
    listener: Listener,
}

#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<Entry>,
}

impl Listeners {
    pub(crate) fn on(&mut self, event: LifecycleEvent, listener: Listener) {
        self.entries.push(Entry {
            event,
            once: false,
            listener,
        });
    }

    pub(crate) fn once(&mut self, event: LifecycleEvent, listener: Listener) {
        self.entries.push(Entry {
            event,
            once: true,
            listener,
        });
    }

    /// Listeners due for `event`, in registration order. One-shot listeners
    /// are unregistered by this call.
    pub(crate) fn take(&mut self, event: LifecycleEvent) -> Vec<Listener> {
        let mut due = Vec::new();
        self.entries.retain(|entry| {
            if entry.event != event {
                return true;
            }
            due.push(Arc::clone(&entry.listener));
            !entry.once
        });
        due
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}
