//! Concurrent renders, client disconnects and route table swaps.

use std::sync::atomic::Ordering;

use axum::http::{HeaderMap, Method, Uri};
use futures_util::future::join_all;
use serde_json::json;

use imvc_runtime::context::AbortSignal;
use imvc_runtime::error::RuntimeError;
use imvc_runtime::routing::RouteManifest;
use imvc_runtime::view::RenderMode;
use imvc_runtime::{Page, RenderResult, Transport, UPDATE_STATE};

mod common;
use common::COUNTERS_DESTROYED;

fn rendered<T: 'static>(page: Page<T>) -> RenderResult<T> {
    match page {
        Page::Rendered(result) => result,
        Page::Shell(_) => panic!("expected a rendered page"),
    }
}

fn transport(request_id: &str, url: &str, abort: AbortSignal) -> Transport {
    let uri: Uri = url.parse().unwrap();
    Transport::new(request_id, Method::GET, uri, HeaderMap::new(), abort)
}

#[tokio::test]
async fn test_concurrent_renders_do_not_share_state() {
    let app = common::server_app(true, RenderMode::String);

    let renders = (0..24).map(|i| {
        let app = app.clone();
        async move {
            let url = format!("/item/{}", i);
            let page = app.render(&url, Transport::get(format!("req-{}", i), &url)).await;
            (i, rendered(page.unwrap()))
        }
    });
    let results = join_all(renders).await;

    assert_eq!(app.registry().len(), 24);
    assert_eq!(app.registry().controller_of("req-7"), Some("item"));

    for (i, result) in results {
        assert_eq!(result.controller.location().param("id"), Some(i.to_string().as_str()));
        let html = result.into_html();
        assert!(html.contains(&format!("<title>Item {}</title>", i)));
        assert!(html.contains(&format!("<h1 id=\"item\">Item {}</h1>", i)));
        assert!(html.contains(&format!("\"id\":\"{}\"", i)));
    }
    assert!(app.registry().is_empty());
}

#[tokio::test]
async fn test_store_changes_stay_in_their_request() {
    let app = common::server_app(true, RenderMode::String);
    let (first, second) = tokio::join!(
        app.render("/tally", Transport::get("req-a", "/tally")),
        app.render("/tally", Transport::get("req-b", "/tally")),
    );
    let first = rendered(first.unwrap());
    let second = rendered(second.unwrap());

    first.controller.dispatch(UPDATE_STATE, json!({ "count": 5 }));
    first.controller.store().flush();

    assert_eq!(*first.controller.store().get_state(), json!({ "count": 5 }));
    assert_eq!(*second.controller.store().get_state(), json!({ "count": 0 }));
    assert_ne!(first.controller.id(), second.controller.id());
    assert!(second.into_html().contains("<div id=\"count\">0</div>"));
}

#[tokio::test]
async fn test_closed_transport_aborts_render() {
    let app = common::server_app(true, RenderMode::Stream);
    let abort = AbortSignal::new();
    abort.abort();

    let error = app
        .render("/style", transport("req-gone", "/style", abort))
        .await
        .unwrap_err();
    assert!(matches!(error, RuntimeError::Aborted));
    assert_eq!(error.status_code().as_u16(), 499);
    assert!(app.registry().is_empty());
}

// Both cases count counter teardowns, so they share one test.
#[tokio::test]
async fn test_page_stream_lifecycle() {
    let app = common::server_app(true, RenderMode::Stream);

    let abort = AbortSignal::new();
    let page = app
        .render("/counter", transport("req-drop", "/counter", abort.clone()))
        .await
        .unwrap();
    let destroyed = COUNTERS_DESTROYED.load(Ordering::SeqCst);

    let mut stream = rendered(page).into_stream();
    assert!(stream.next_chunk().unwrap().starts_with("<!DOCTYPE html>"));
    assert!(stream.remaining() > 0);
    assert!(app.registry().contains("req-drop"));

    drop(stream);
    assert!(abort.is_aborted());
    assert!(app.registry().is_empty());
    assert_eq!(COUNTERS_DESTROYED.load(Ordering::SeqCst), destroyed + 1);

    let abort = AbortSignal::new();
    let page = app
        .render("/counter", transport("req-full", "/counter", abort.clone()))
        .await
        .unwrap();
    let mut stream = rendered(page).into_stream();
    let mut body = String::new();
    while let Some(chunk) = stream.next_chunk() {
        body.push_str(&chunk);
    }
    assert!(body.contains("<div id=\"count\">0</div>"));
    assert!(app.registry().is_empty());

    drop(stream);
    assert!(!abort.is_aborted());
    assert_eq!(COUNTERS_DESTROYED.load(Ordering::SeqCst), destroyed + 2);
}

#[tokio::test]
async fn test_abort_during_delivery_stops_writes() {
    let app = common::server_app(true, RenderMode::Stream);
    let abort = AbortSignal::new();
    let page = app
        .render("/tally", transport("req-mid", "/tally", abort.clone()))
        .await
        .unwrap();

    let mut stream = rendered(page).into_stream();
    assert!(stream.next_chunk().is_some());
    assert!(stream.remaining() > 0);

    abort.abort();
    assert_eq!(stream.next_chunk(), None);
    assert_eq!(stream.remaining(), 0);
    assert!(app.registry().contains("req-mid"));

    drop(stream);
    assert!(app.registry().is_empty());
}

#[tokio::test]
async fn test_route_swap_applies_to_new_requests() {
    let app = common::server_app(true, RenderMode::String);
    let before = app.routes().snapshot();
    assert_eq!(app.routes().generation(), 0);

    let manifest = RouteManifest::from_toml(
        r#"
        [[route]]
        path = "/goods/:id"
        controller = "item"
        "#,
    )
    .unwrap();
    app.routes().swap(manifest.compile(&common::registry()).unwrap());
    assert_eq!(app.routes().generation(), 1);

    let error = app
        .render("/item/1", Transport::get("req-old", "/item/1"))
        .await
        .unwrap_err();
    assert!(matches!(error, RuntimeError::RouteUnmatched(_)));

    let html = rendered(
        app.render("/goods/3", Transport::get("req-new", "/goods/3"))
            .await
            .unwrap(),
    )
    .into_html();
    assert!(html.contains("Item 3"));

    // A snapshot taken before the swap keeps resolving against the old table.
    assert!(matches!(
        before.resolve("/item/1", ""),
        imvc_runtime::routing::RouteMatch::Matched { .. }
    ));
}
