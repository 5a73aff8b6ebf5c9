//! Named reducers.

use serde_json::Value;

/// Pure reducer: `(state, payload) → next state`.
pub type Reducer = fn(&Value, &Value) -> Value;

/// Built-in action every store accepts.
pub const UPDATE_STATE: &str = "UPDATE_STATE";

/// A reducer registered under a name.
#[derive(Clone, Copy)]
pub struct Action {
    pub name: &'static str,
    pub reduce: Reducer,
}

impl Action {
    pub const fn new(name: &'static str, reduce: Reducer) -> Self {
        Self { name, reduce }
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Action").field(&self.name).finish()
    }
}

/// Shallow-merge an object payload into an object state.
///
/// Non-object payloads leave the state as it was.
pub(crate) fn update_state(state: &Value, payload: &Value) -> Value {
    match (state, payload) {
        (Value::Object(current), Value::Object(changes)) => {
            let mut next = current.clone();
            for (key, value) in changes {
                next.insert(key.clone(), value.clone());
            }
            Value::Object(next)
        }
        (_, Value::Object(changes)) => Value::Object(changes.clone()),
        _ => state.clone(),
    }
}
