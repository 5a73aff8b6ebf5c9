//! Controllers bundled with the server binary.
//!
//! They cover the shapes a real application uses: static views, preloaded
//! styles, async state from route params, client-only pages, batched
//! updates, redirects and view fallbacks.

use futures_util::future::BoxFuture;
use serde_json::{json, Value};

use imvc_runtime::context::Preload;
use imvc_runtime::controller::{Controller, ControllerDef, ControllerError, InitialState};
use imvc_runtime::markup::Markup;
use imvc_runtime::routing::LoaderRegistry;
use imvc_runtime::store::Action;
use imvc_runtime::view::{ErrorPhase, RenderError, View};
use imvc_runtime::{Context, Location};

pub fn registry() -> LoaderRegistry<Markup> {
    let mut registry = LoaderRegistry::new();
    registry
        .controller(&HOME)
        .controller(&STYLE)
        .controller(&COUNTER)
        .controller(&ITEM)
        .controller(&CLIENT_ONLY)
        .controller(&LEGACY)
        .controller(&BROKEN);
    registry
}

fn home_view(_: &Controller<Markup>) -> View<Markup> {
    View::Tree(Markup::element(
        "div",
        vec![
            Markup::element("h1", vec![Markup::text("imvc-runtime")]),
            Markup::element("p", vec![Markup::text("Server rendered, client hydrated.")]),
        ],
    )
    .attr("id", "home"))
}

pub static HOME: ControllerDef<Markup> = ControllerDef::new("home", home_view);

fn style_preload<'a>(_: &'a Location, _: &'a Context) -> BoxFuture<'a, Result<Preload, ControllerError>> {
    Box::pin(async {
        let mut preload = Preload::new();
        preload.insert("css".into(), "#style .box{color:#c00}".into());
        Ok(preload)
    })
}

fn style_view(_: &Controller<Markup>) -> View<Markup> {
    View::Tree(
        Markup::element(
            "div",
            vec![
                Markup::element("style", vec![Markup::Preload("css".into())]),
                Markup::element("div", vec![Markup::text("styled")]).attr("class", "box"),
                Markup::element("img", vec![]).attr("src", "/static/react.png"),
            ],
        )
        .attr("id", "style"),
    )
}

pub static STYLE: ControllerDef<Markup> = ControllerDef::new("style", style_view).preload(style_preload);

fn counter_state() -> Value {
    json!({ "count": 0 })
}

fn increment(state: &Value, _payload: &Value) -> Value {
    let mut next = state.clone();
    next["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1);
    next
}

static COUNTER_ACTIONS: [Action; 1] = [Action::new("INCREMENT", increment)];

fn counter_view(controller: &Controller<Markup>) -> View<Markup> {
    let count = controller.store().get_state()["count"].as_i64().unwrap_or(0);
    View::Tree(
        Markup::element(
            "div",
            vec![Markup::element("div", vec![Markup::text(count.to_string())]).attr("id", "count")],
        )
        .attr("id", "batch-refresh"),
    )
}

pub static COUNTER: ControllerDef<Markup> = ControllerDef::new("batch-refresh", counter_view)
    .initial_state(InitialState::Value(counter_state))
    .actions(&COUNTER_ACTIONS);

fn item_state<'a>(location: &'a Location, _: &'a Context) -> BoxFuture<'a, Result<Value, ControllerError>> {
    Box::pin(async move {
        let id = location
            .param("id")
            .ok_or_else(|| ControllerError::new("missing item id"))?;
        Ok::<_, ControllerError>(json!({
            "id": id,
            "name": format!("Item {}", id),
            "html": { "title": format!("Item {}", id), "description": "Item details" }
        }))
    })
}

fn item_view(controller: &Controller<Markup>) -> View<Markup> {
    let state = controller.store().get_state();
    let name = state["name"].as_str().unwrap_or_default().to_string();
    View::Tree(Markup::element("h1", vec![Markup::text(name)]).attr("id", "item"))
}

pub static ITEM: ControllerDef<Markup> =
    ControllerDef::new("item", item_view).initial_state(InitialState::Resolve(item_state));

fn client_only_view(_: &Controller<Markup>) -> View<Markup> {
    View::Html("<div id=\"csr\">rendered in the browser</div>".to_string())
}

pub static CLIENT_ONLY: ControllerDef<Markup> = ControllerDef::new("client-only", client_only_view).client_only();

fn legacy_view(controller: &Controller<Markup>) -> View<Markup> {
    if let Some(transport) = controller.context().transport() {
        transport.response().redirect("/");
    }
    View::Empty
}

pub static LEGACY: ControllerDef<Markup> = ControllerDef::new("legacy", legacy_view);

fn broken_view(_: &Controller<Markup>) -> View<Markup> {
    View::Tree(Markup::element("not a tag", vec![]))
}

fn broken_error(controller: &Controller<Markup>, error: &RenderError, phase: ErrorPhase) {
    tracing::error!(controller = controller.name(), phase = %phase, error = %error, "Caught view error");
}

fn broken_fallback(_: &Controller<Markup>, _: ErrorPhase) -> View<Markup> {
    View::Tree(Markup::element("p", vec![Markup::text("Something went wrong.")]).attr("id", "fallback"))
}

pub static BROKEN: ControllerDef<Markup> = ControllerDef::new("broken", broken_view)
    .on_error(broken_error)
    .fallback(broken_fallback);
