//! Shared fixtures for integration tests: controllers, a route table, a
//! fake DOM container and app builders.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use serde_json::{json, Value};

use imvc_runtime::config::AppConfig;
use imvc_runtime::context::Preload;
use imvc_runtime::controller::{Controller, ControllerDef, ControllerError, InitialState};
use imvc_runtime::hydration::{AssetManifest, DocumentLayout};
use imvc_runtime::markup::{Markup, MarkupRenderer};
use imvc_runtime::routing::{LoaderRegistry, RouteManifest, RouteTable, RouteTableHandle};
use imvc_runtime::view::{
    ChunkSink, DomContainer, ErrorPhase, RenderError, RenderMode, RenderScope, ServerRenderer,
    ServerViewEngine, View,
};
use imvc_runtime::{Context, Location, ServerApp, Settings};

// ---------------------------------------------------------------------------
// Controllers
// ---------------------------------------------------------------------------

/// Number of times the item initial-state resolver ran.
pub static ITEM_RESOLVES: AtomicUsize = AtomicUsize::new(0);

/// Number of counter controllers torn down.
pub static COUNTERS_DESTROYED: AtomicUsize = AtomicUsize::new(0);

/// Hook calls of the fragile controller, in order.
pub static FRAGILE_CALLS: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn item_state<'a>(location: &'a Location, _: &'a Context) -> BoxFuture<'a, Result<Value, ControllerError>> {
    Box::pin(async move {
        ITEM_RESOLVES.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let id = location.param("id").unwrap_or_default().to_string();
        Ok(json!({ "id": id, "html": { "title": format!("Item {}", id) } }))
    })
}

fn item_view(controller: &Controller<Markup>) -> View<Markup> {
    let id = controller.store().get_state()["id"].as_str().unwrap_or_default().to_string();
    View::Tree(Markup::element("h1", vec![Markup::text(format!("Item {}", id))]).attr("id", "item"))
}

pub static ITEM: ControllerDef<Markup> =
    ControllerDef::new("item", item_view).initial_state(InitialState::Resolve(item_state));

fn counter_state() -> Value {
    json!({ "count": 0 })
}

fn counter_view(controller: &Controller<Markup>) -> View<Markup> {
    let count = controller.store().get_state()["count"].as_i64().unwrap_or(0);
    View::Tree(Markup::element("div", vec![Markup::text(count.to_string())]).attr("id", "count"))
}

fn counter_destroyed(_: &Controller<Markup>) {
    COUNTERS_DESTROYED.fetch_add(1, Ordering::SeqCst);
}

pub static COUNTER: ControllerDef<Markup> = ControllerDef::new("counter", counter_view)
    .initial_state(InitialState::Value(counter_state))
    .on_destroy(counter_destroyed);

/// Same state and view as the counter, without the teardown hook.
pub static TALLY: ControllerDef<Markup> =
    ControllerDef::new("tally", counter_view).initial_state(InitialState::Value(counter_state));

fn style_preload<'a>(_: &'a Location, _: &'a Context) -> BoxFuture<'a, Result<Preload, ControllerError>> {
    Box::pin(async {
        let mut preload = Preload::new();
        preload.insert("css".into(), ".a>.b{color:red}".into());
        Ok(preload)
    })
}

fn style_view(_: &Controller<Markup>) -> View<Markup> {
    View::Tree(Markup::element("style", vec![Markup::Preload("css".into())]))
}

pub static STYLE: ControllerDef<Markup> = ControllerDef::new("style", style_view).preload(style_preload);

fn fragile_view(_: &Controller<Markup>) -> View<Markup> {
    View::Tree(Markup::element("bad tag", vec![]))
}

fn fragile_catch(_: &Controller<Markup>, error: &RenderError, phase: ErrorPhase) {
    record(format!("catch:{}:{}", phase, matches!(error, RenderError::View(_))));
}

fn fragile_fallback(_: &Controller<Markup>, phase: ErrorPhase) -> View<Markup> {
    record(format!("fallback:{}", phase));
    View::Tree(Markup::element("p", vec![Markup::text("fallback")]).attr("id", "fallback"))
}

fn record(call: String) {
    FRAGILE_CALLS.lock().unwrap_or_else(|e| e.into_inner()).push(call);
}

pub static FRAGILE: ControllerDef<Markup> = ControllerDef::new("fragile", fragile_view)
    .on_error(fragile_catch)
    .fallback(fragile_fallback);

pub static UNGUARDED: ControllerDef<Markup> = ControllerDef::new("unguarded", fragile_view);

fn csr_view(_: &Controller<Markup>) -> View<Markup> {
    View::Html("<div id=\"csr\">client</div>".to_string())
}

pub static CLIENT_ONLY: ControllerDef<Markup> = ControllerDef::new("csr", csr_view).client_only();

fn moved_view(controller: &Controller<Markup>) -> View<Markup> {
    if let Some(transport) = controller.context().transport() {
        transport.response().redirect("/item/1");
    }
    View::Empty
}

pub static MOVED: ControllerDef<Markup> = ControllerDef::new("moved", moved_view);

pub const ROUTES: &str = r#"
[[route]]
path = "/item/:id"
controller = "item"

[[route]]
path = "/counter"
controller = "counter"

[[route]]
path = "/tally"
controller = "tally"

[[route]]
path = "/style"
controller = "style"

[[route]]
path = "/fragile"
controller = "fragile"

[[route]]
path = "/unguarded"
controller = "unguarded"

[[route]]
path = "/csr"
controller = "csr"

[[route]]
path = "/moved"
controller = "moved"
"#;

pub fn registry() -> LoaderRegistry<Markup> {
    let mut registry = LoaderRegistry::new();
    registry
        .controller(&ITEM)
        .controller(&COUNTER)
        .controller(&TALLY)
        .controller(&STYLE)
        .controller(&FRAGILE)
        .controller(&UNGUARDED)
        .controller(&CLIENT_ONLY)
        .controller(&MOVED);
    registry
}

pub fn table() -> RouteTable<Markup> {
    RouteManifest::from_toml(ROUTES)
        .and_then(|manifest| manifest.compile(&registry()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

pub fn settings() -> Settings {
    Settings {
        public_path: "/static".into(),
        restapi: "/api".into(),
        ..Default::default()
    }
}

pub fn server_app(ssr: bool, mode: RenderMode) -> ServerApp<Markup> {
    ServerApp::new(
        RouteTableHandle::new(table()),
        settings(),
        ServerViewEngine::new(Arc::new(MarkupRenderer), mode),
        DocumentLayout::new("Test", "root", AssetManifest::default()),
        ssr,
    )
}

pub fn app_config(ssr: bool, mode: RenderMode) -> AppConfig {
    let mut config = AppConfig::default();
    config.render.ssr = ssr;
    config.render.mode = mode;
    config.context = settings();
    config
}

// ---------------------------------------------------------------------------
// Fake DOM
// ---------------------------------------------------------------------------

/// A container that renders views to a string with `MarkupRenderer`.
///
/// Hydration fails on any mismatch between the server markup and what the
/// client would render.
#[derive(Debug, Default)]
pub struct FakeDom {
    pub html: String,
    pub server_markup: bool,
    pub hydrations: usize,
    pub mounts: usize,
}

impl FakeDom {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_server_markup(html: &str) -> Self {
        Self {
            html: html.to_string(),
            server_markup: !html.is_empty(),
            ..Default::default()
        }
    }

    fn serialize(view: &View<Markup>, scope: &RenderScope<'_>) -> Result<String, RenderError> {
        let mut sink = ChunkSink::new(None);
        match view {
            View::Empty => {}
            View::Html(html) => sink.push(html.as_str())?,
            View::Tree(tree) => MarkupRenderer.render(tree, scope, &mut sink)?,
        }
        Ok(sink.into_string())
    }
}

impl DomContainer<Markup> for FakeDom {
    fn has_server_markup(&self) -> bool {
        self.server_markup
    }

    fn hydrate(&mut self, view: &View<Markup>, scope: &RenderScope<'_>) -> Result<(), RenderError> {
        let rendered = Self::serialize(view, scope)?;
        if rendered != self.html {
            return Err(RenderError::Target(format!(
                "hydration mismatch: server `{}`, client `{}`",
                self.html, rendered
            )));
        }
        self.hydrations += 1;
        self.server_markup = false;
        Ok(())
    }

    fn mount(&mut self, view: &View<Markup>, scope: &RenderScope<'_>) -> Result<(), RenderError> {
        self.html = Self::serialize(view, scope)?;
        self.server_markup = false;
        self.mounts += 1;
        Ok(())
    }
}
