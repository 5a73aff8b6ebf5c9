//! Controller-owned state container.
//!
//! # Data Flow
//! ```text
//! dispatch(name, payload)
//!     → reducer lookup (built-in UPDATE_STATE + controller actions)
//!     → apply to working state (visible to get_state immediately)
//!     → mark notification pending
//!
//! end of task (host calls flush)
//!     → one notification carrying the final state
//!     → listeners (client re-render, subscribers)
//! ```
//!
//! # Design Decisions
//! - The batching window is one task: everything dispatched between two
//!   `flush` calls is coalesced. The client runtime flushes after every task
//!   it runs; the server never needs notifications
//! - Unknown actions are logged and counted, never fatal
//! - Snapshots are `Arc<Value>`: readers cannot mutate the state

pub mod actions;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use thiserror::Error;

use crate::observability::metrics;

pub use actions::{Action, Reducer, UPDATE_STATE};

/// Errors reported by [`Store::try_dispatch`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("store has been destroyed")]
    Destroyed,
}

/// Handle returned by [`Store::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Arc<Value>) + Send + Sync>;

struct Inner {
    state: Arc<Value>,
    pending: bool,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    destroyed: bool,
}

/// State container with named reducers and batched notifications.
pub struct Store {
    owner: &'static str,
    actions: &'static [Action],
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("owner", &self.owner)
            .field("state", &self.get_state())
            .finish()
    }
}

impl Store {
    /// Create an empty store for the controller named `owner`.
    pub fn new(owner: &'static str, actions: &'static [Action]) -> Self {
        Self {
            owner,
            actions,
            inner: Mutex::new(Inner {
                state: Arc::new(Value::Object(Default::default())),
                pending: false,
                listeners: Vec::new(),
                next_listener: 0,
                destroyed: false,
            }),
        }
    }

    /// Current state snapshot.
    pub fn get_state(&self) -> Arc<Value> {
        self.lock().state.clone()
    }

    /// Replace the whole state without notifying. Used for seeding.
    pub(crate) fn seed(&self, state: Value) {
        let mut inner = self.lock();
        inner.state = Arc::new(state);
        inner.pending = false;
    }

    /// Apply the named action, logging and ignoring unknown names.
    pub fn dispatch(&self, action: &str, payload: Value) {
        if let Err(error) = self.try_dispatch(action, payload) {
            tracing::warn!(
                controller = self.owner,
                action = action,
                error = %error,
                "Dispatch ignored"
            );
            if matches!(error, StoreError::UnknownAction(_)) {
                metrics::record_unknown_action(self.owner);
            }
        }
    }

    /// Apply the named action. The state is untouched on error.
    pub fn try_dispatch(&self, action: &str, payload: Value) -> Result<(), StoreError> {
        let reducer = self
            .reducer(action)
            .ok_or_else(|| StoreError::UnknownAction(action.to_string()))?;

        let mut inner = self.lock();
        if inner.destroyed {
            return Err(StoreError::Destroyed);
        }
        let next = reducer(&inner.state, &payload);
        inner.state = Arc::new(next);
        inner.pending = true;
        Ok(())
    }

    /// Whether a notification is waiting for the end of the task.
    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Deliver the pending notification, if any.
    ///
    /// Returns the state that was announced. Listeners run outside the lock
    /// and may read the store.
    pub fn flush(&self) -> Option<Arc<Value>> {
        let (state, listeners) = {
            let mut inner = self.lock();
            if !inner.pending || inner.destroyed {
                return None;
            }
            inner.pending = false;
            let listeners: Vec<Listener> = inner
                .listeners
                .iter()
                .map(|(_, listener)| listener.clone())
                .collect();
            (inner.state.clone(), listeners)
        };

        for listener in listeners {
            listener(&state);
        }
        Some(state)
    }

    /// Register a listener for batched notifications.
    pub fn subscribe(&self, listener: impl Fn(&Arc<Value>) + Send + Sync + 'static) -> ListenerId {
        let mut inner = self.lock();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        inner.listeners.len() != before
    }

    /// Names of every action this store accepts.
    pub fn action_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(UPDATE_STATE).chain(self.actions.iter().map(|action| action.name))
    }

    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    /// Drop listeners and refuse further dispatches.
    pub(crate) fn destroy(&self) {
        let mut inner = self.lock();
        inner.destroyed = true;
        inner.pending = false;
        inner.listeners.clear();
    }

    fn reducer(&self, name: &str) -> Option<Reducer> {
        if name == UPDATE_STATE {
            return Some(actions::update_state);
        }
        self.actions
            .iter()
            .find(|action| action.name == name)
            .map(|action| action.reduce)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn increment(state: &Value, _payload: &Value) -> Value {
        let count = state["count"].as_i64().unwrap_or(0);
        json!({ "count": count + 1 })
    }

    static COUNTER_ACTIONS: &[Action] = &[Action::new("INCREMENT", increment)];

    fn counter_store() -> Store {
        let store = Store::new("counter", COUNTER_ACTIONS);
        store.seed(json!({ "count": 0 }));
        store
    }

    #[test]
    fn test_dispatches_in_one_task_notify_once() {
        let store = counter_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |state| sink.lock().unwrap().push(state["count"].clone()));

        store.dispatch("INCREMENT", Value::Null);
        store.dispatch("INCREMENT", Value::Null);
        assert!(store.is_pending());
        assert!(seen.lock().unwrap().is_empty());

        let announced = store.flush().unwrap();
        assert_eq!(*announced, json!({ "count": 2 }));
        assert_eq!(*seen.lock().unwrap(), vec![json!(2)]);

        // Nothing left to announce.
        assert!(store.flush().is_none());
    }

    #[test]
    fn test_reads_see_working_state() {
        let store = counter_store();
        store.dispatch(UPDATE_STATE, json!({ "count": store.get_state()["count"].as_i64().unwrap() + 1 }));
        store.dispatch(UPDATE_STATE, json!({ "count": store.get_state()["count"].as_i64().unwrap() + 1 }));
        assert_eq!(store.get_state()["count"], json!(2));
    }

    #[test]
    fn test_unknown_action_is_ignored() {
        let store = counter_store();
        assert_eq!(
            store.try_dispatch("NOPE", Value::Null),
            Err(StoreError::UnknownAction("NOPE".into()))
        );
        store.dispatch("NOPE", Value::Null);
        assert_eq!(*store.get_state(), json!({ "count": 0 }));
        assert!(!store.is_pending());
    }

    #[test]
    fn test_unsubscribe() {
        let store = counter_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(store.unsubscribe(id));
        store.dispatch("INCREMENT", Value::Null);
        store.flush();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_destroyed_store_refuses_dispatch() {
        let store = counter_store();
        store.destroy();
        assert_eq!(
            store.try_dispatch("INCREMENT", Value::Null),
            Err(StoreError::Destroyed)
        );
        assert!(store.flush().is_none());
    }

    #[test]
    fn test_action_names() {
        let store = counter_store();
        let names: Vec<_> = store.action_names().collect();
        assert_eq!(names, vec![UPDATE_STATE, "INCREMENT"]);
    }
}
