//! Read-only listeners on a running match.
//!
//! Observers are called synchronously after every applied change. Whatever an
//! observer does wrong, error or panic, stays with that observer: the rest of
//! the listeners still run and the match carries on.

use crate::actions::GameEvent;
use crate::collaborator::CollaboratorError;
use crate::game::ObservableGameState;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

pub trait GameObserver: Send + Sync {
    fn on_event(
        &self,
        event: &GameEvent,
        state: &ObservableGameState,
    ) -> Result<(), CollaboratorError>;
}

/// Handle returned by [`ObserverRegistry::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ObserverId, Arc<dyn GameObserver>)>,
}

/// Shared list of observers. Clones refer to the same list, so observers can
/// be added or removed from anywhere while a match runs.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    listeners: Arc<RwLock<Listeners>>,
}

impl fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("observers", &self.len())
            .finish()
    }
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn GameObserver>) -> ObserverId {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = ObserverId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, observer));
        id
    }

    /// Returns whether the observer was still subscribed
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.entries.len();
        listeners.entries.retain(|(existing, _)| *existing != id);
        listeners.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every observer subscribed at the moment of the call
    pub fn broadcast(&self, event: &GameEvent, state: &ObservableGameState) {
        // Released before calling out, so observers may (un)subscribe
        let entries = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone();
        for (id, observer) in entries {
            let outcome =
                std::panic::catch_unwind(AssertUnwindSafe(|| observer.on_event(event, state)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => debug!(?id, %error, "observer failed"),
                Err(_) => warn!(?id, "observer panicked"),
            }
        }
    }
}
