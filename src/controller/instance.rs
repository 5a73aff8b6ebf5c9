//! Live controller instances.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use uuid::Uuid;

use crate::context::Context;
use crate::controller::{ControllerDef, InitialState, LifecycleError, LifecycleState};
use crate::routing::Location;
use crate::store::Store;
use crate::view::{ErrorPhase, RenderError, RenderScope, View};

/// A controller bound to one location, one context and one store.
pub struct Controller<T: 'static> {
    id: Uuid,
    def: &'static ControllerDef<T>,
    location: Location,
    context: Arc<Context>,
    store: Store,
    state: Mutex<LifecycleState>,
    hydrating: AtomicBool,
}

impl<T: 'static> Controller<T> {
    /// Construct a controller. The instance starts in `Created`.
    pub fn new(def: &'static ControllerDef<T>, location: Location, context: Arc<Context>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(
            controller = def.name,
            controller_id = %id,
            pattern = %location.pattern,
            server = context.is_server(),
            "Controller created"
        );

        Self {
            id,
            def,
            location,
            context,
            store: Store::new(def.name, def.actions),
            state: Mutex::new(LifecycleState::Created),
            hydrating: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn definition(&self) -> &'static ControllerDef<T> {
        self.def
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Shorthand for `store().dispatch(..)`.
    pub fn dispatch(&self, action: &str, payload: Value) {
        self.store.dispatch(action, payload);
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        *self.lock_state()
    }

    /// True between seeding from a server snapshot and the first render.
    pub fn is_hydrating(&self) -> bool {
        self.hydrating.load(Ordering::SeqCst)
    }

    /// Resolve the initial state.
    ///
    /// With a `snapshot` (client hydration) the snapshot is used verbatim and
    /// the initial-state capability is not consulted. On the server the
    /// preload hook runs first and seals the context's preload bag.
    pub async fn seed(&self, snapshot: Option<Value>) -> Result<(), LifecycleError> {
        self.check(LifecycleState::StateSeeded)?;

        if self.context.is_server() && !self.context.preload().is_sealed() {
            let preload = match self.def.preload {
                Some(collect) => collect(&self.location, &self.context)
                    .await
                    .map_err(LifecycleError::Preload)?,
                None => Default::default(),
            };
            self.context.preload().seal(preload)?;
        }

        match snapshot {
            Some(state) => {
                self.store.seed(state);
                self.hydrating.store(true, Ordering::SeqCst);
            }
            None => {
                let state = match self.def.initial_state {
                    InitialState::Value(make) => make(),
                    InitialState::Compute(compute) => compute(&self.location, &self.context)
                        .map_err(LifecycleError::InitialState)?,
                    InitialState::Resolve(resolve) => resolve(&self.location, &self.context)
                        .await
                        .map_err(LifecycleError::InitialState)?,
                };
                self.store.seed(state);
            }
        }

        self.transition(LifecycleState::StateSeeded)?;
        tracing::debug!(
            controller = self.name(),
            hydrating = self.is_hydrating(),
            "Controller state seeded"
        );
        Ok(())
    }

    /// Ask the controller for its view.
    ///
    /// Moves a seeded controller into `Rendering`; active controllers
    /// re-render in place.
    pub fn begin_render(&self) -> Result<View<T>, LifecycleError> {
        if self.lifecycle_state() != LifecycleState::Active {
            self.transition(LifecycleState::Rendering)?;
        }
        Ok((self.def.view)(self))
    }

    /// Record that the view reached its target.
    pub fn finish_render(&self) -> Result<(), LifecycleError> {
        if self.lifecycle_state() != LifecycleState::Active {
            self.transition(LifecycleState::Rendered)?;
        }
        self.hydrating.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Client only: keep the controller alive after its first render.
    pub fn activate(&self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Active)?;
        if let Some(did_mount) = self.def.did_mount {
            did_mount(self);
        }
        Ok(())
    }

    /// Tear the controller down. Runs the teardown hook at most once.
    pub fn destroy(&self) {
        {
            let mut state = self.lock_state();
            if *state == LifecycleState::Destroyed {
                return;
            }
            *state = LifecycleState::Destroyed;
        }

        if let Some(teardown) = self.def.destroy {
            teardown(self);
        }
        self.store.destroy();
        tracing::debug!(controller = self.name(), controller_id = %self.id, "Controller destroyed");
    }

    /// Build the render scope for a state snapshot.
    pub fn scope<'a>(&'a self, state: &'a Value) -> RenderScope<'a> {
        RenderScope::new(self.def.name, &self.location, &self.context, state)
    }

    pub(crate) fn error_did_catch(&self, error: &RenderError, phase: ErrorPhase) {
        if let Some(capture) = self.def.error_did_catch {
            capture(self, error, phase);
        }
    }

    pub(crate) fn view_fallback(&self, phase: ErrorPhase) -> Option<View<T>> {
        self.def.get_view_fallback.map(|provider| provider(self, phase))
    }

    fn check(&self, next: LifecycleState) -> Result<(), LifecycleError> {
        let from = self.lifecycle_state();
        if from.can_transition(next) {
            Ok(())
        } else {
            Err(LifecycleError::InvalidTransition { from, to: next })
        }
    }

    fn transition(&self, next: LifecycleState) -> Result<(), LifecycleError> {
        let mut state = self.lock_state();
        if !state.can_transition(next) {
            return Err(LifecycleError::InvalidTransition {
                from: *state,
                to: next,
            });
        }
        *state = next;
        Ok(())
    }

    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: 'static> Drop for Controller<T> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T: 'static> std::fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("name", &self.def.name)
            .field("id", &self.id)
            .field("state", &self.lifecycle_state())
            .field("location", &self.location.raw)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Preload, Settings, Transport};
    use crate::controller::ControllerError;
    use crate::routing::location::RawUrl;
    use futures_util::future::BoxFuture;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;

    static DESTROYED: AtomicUsize = AtomicUsize::new(0);

    fn view(controller: &Controller<String>) -> View<String> {
        View::Tree(format!("count={}", controller.store().get_state()["count"]))
    }

    fn counter() -> Value {
        json!({ "count": 0 })
    }

    fn on_destroy(_controller: &Controller<String>) {
        DESTROYED.fetch_add(1, Ordering::SeqCst);
    }

    fn failing<'a>(_: &'a Location, _: &'a Context) -> BoxFuture<'a, Result<Value, ControllerError>> {
        Box::pin(async { Err(ControllerError::new("backend down")) })
    }

    fn stylesheet<'a>(_: &'a Location, _: &'a Context) -> BoxFuture<'a, Result<Preload, ControllerError>> {
        Box::pin(async {
            let mut preload = Preload::new();
            preload.insert("css".into(), "body{}".into());
            Ok(preload)
        })
    }

    static COUNTER: ControllerDef<String> = ControllerDef::new("counter", view)
        .initial_state(InitialState::Value(counter))
        .preload(stylesheet);

    static TEARDOWN: ControllerDef<String> = ControllerDef::new("teardown", view).on_destroy(on_destroy);

    static BROKEN: ControllerDef<String> =
        ControllerDef::new("broken", view).initial_state(InitialState::Resolve(failing));

    fn location() -> Location {
        Location::new(RawUrl::parse("/counter", ""), "/counter", BTreeMap::new())
    }

    fn server_context() -> Arc<Context> {
        Arc::new(Context::for_server(&Settings::default(), Transport::get("t", "/counter")))
    }

    #[tokio::test]
    async fn test_server_lifecycle() {
        let controller = Controller::new(&COUNTER, location(), server_context());
        assert_eq!(controller.lifecycle_state(), LifecycleState::Created);

        controller.seed(None).await.unwrap();
        assert_eq!(controller.lifecycle_state(), LifecycleState::StateSeeded);
        assert_eq!(controller.context().preload().get("css"), Some("body{}"));
        assert!(!controller.is_hydrating());

        let view = controller.begin_render().unwrap();
        assert_eq!(view, View::Tree("count=0".to_string()));
        controller.finish_render().unwrap();
        assert_eq!(controller.lifecycle_state(), LifecycleState::Rendered);
    }

    #[tokio::test]
    async fn test_client_snapshot_is_used_verbatim() {
        let context = Arc::new(Context::for_client(&Settings::default(), None));
        let controller = Controller::new(&BROKEN, location(), context);

        // The failing resolver is never consulted.
        controller.seed(Some(json!({ "count": 7 }))).await.unwrap();
        assert!(controller.is_hydrating());
        assert_eq!(controller.store().get_state()["count"], json!(7));

        controller.begin_render().unwrap();
        controller.finish_render().unwrap();
        assert!(!controller.is_hydrating());
        controller.activate().unwrap();
        assert_eq!(controller.lifecycle_state(), LifecycleState::Active);

        // Active controllers re-render in place.
        controller.begin_render().unwrap();
        controller.finish_render().unwrap();
        assert_eq!(controller.lifecycle_state(), LifecycleState::Active);
    }

    #[tokio::test]
    async fn test_initial_state_failure_propagates() {
        let controller = Controller::new(&BROKEN, location(), server_context());
        let err = controller.seed(None).await.unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InitialState(ControllerError::new("backend down"))
        );
        assert_eq!(controller.lifecycle_state(), LifecycleState::Created);
    }

    #[tokio::test]
    async fn test_render_before_seed_is_rejected() {
        let controller = Controller::new(&COUNTER, location(), server_context());
        assert!(matches!(
            controller.begin_render(),
            Err(LifecycleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_destroy_runs_once() {
        let controller = Controller::new(&TEARDOWN, location(), server_context());
        controller.destroy();
        controller.destroy();
        assert!(controller.store().is_destroyed());
        drop(controller);
        assert_eq!(DESTROYED.load(Ordering::SeqCst), 1);
    }
}
