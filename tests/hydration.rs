//! Server render followed by client bootstrap over the same document.

use std::sync::atomic::Ordering;

use imvc_runtime::hydration::{HtmlDocument, PayloadSource};
use imvc_runtime::routing::RouteTableHandle;
use imvc_runtime::view::{Attach, RenderMode};
use imvc_runtime::{ClientApp, Page, Transport};

mod common;
use common::{FakeDom, ITEM_RESOLVES};

async fn server_document(url: &str) -> (HtmlDocument, serde_json::Value) {
    let app = common::server_app(true, RenderMode::String);
    let page = app.render(url, Transport::get("req-hydrate", url)).await.unwrap();
    let Page::Rendered(result) = page else {
        panic!("expected a rendered page for {}", url);
    };
    let state = (*result.controller.store().get_state()).clone();
    (HtmlDocument::new(result.into_html()), state)
}

#[tokio::test]
async fn test_item_round_trip_reuses_server_state() {
    let (document, server_state) = server_document("/item/42").await;
    assert_eq!(server_state["id"], "42");
    assert!(document.as_str().contains("<title>Item 42</title>"));

    let resolves = ITEM_RESOLVES.load(Ordering::SeqCst);
    let markup = document.element_inner_html("root").unwrap();
    assert_eq!(markup, "<h1 id=\"item\">Item 42</h1>");

    let (client, attach) = ClientApp::bootstrap(
        RouteTableHandle::new(common::table()),
        &document,
        FakeDom::with_server_markup(markup),
        "/item/42",
    )
    .await
    .unwrap();

    assert_eq!(attach, Attach::Hydrated);
    assert_eq!(client.container().hydrations, 1);
    assert_eq!(client.container().mounts, 0);
    assert_eq!(ITEM_RESOLVES.load(Ordering::SeqCst), resolves);

    let client_state = client.controller().unwrap().store().get_state();
    assert_eq!(*client_state, server_state);
    assert_eq!(client.settings().public_path, "/static");
}

#[tokio::test]
async fn test_payload_survives_script_breakout() {
    let (document, server_state) = server_document("/item/%3C%2Fscript%3E%3Cb%3E").await;
    assert_eq!(server_state["id"], "</script><b>");
    assert!(!document.as_str().contains("</script><b>"));

    let payload = document.payload().unwrap().unwrap();
    assert_eq!(payload.state, Some(server_state));
}

#[tokio::test]
async fn test_navigate_mounts_fresh_controller() {
    let (document, _) = server_document("/counter").await;
    let markup = document.element_inner_html("root").unwrap().to_string();

    let (mut client, attach) = ClientApp::bootstrap(
        RouteTableHandle::new(common::table()),
        &document,
        FakeDom::with_server_markup(&markup),
        "/counter",
    )
    .await
    .unwrap();
    assert_eq!(attach, Attach::Hydrated);

    let attach = client.navigate("/style").await.unwrap();
    assert_eq!(attach, Attach::Mounted);
    assert_eq!(client.controller().unwrap().name(), "style");
    assert!(client.controller().unwrap().context().preload().is_empty());
    assert_eq!(client.container().html, "<style></style>");
}

#[tokio::test]
async fn test_preload_markers_feed_first_render() {
    let (document, _) = server_document("/style").await;
    assert_eq!(document.preload().get("css").map(String::as_str), Some(".a>.b{color:red}"));

    let markup = document.element_inner_html("root").unwrap().to_string();
    let (client, attach) = ClientApp::bootstrap(
        RouteTableHandle::new(common::table()),
        &document,
        FakeDom::with_server_markup(&markup),
        "/style",
    )
    .await
    .unwrap();

    assert_eq!(attach, Attach::Hydrated);
    let controller = client.controller().unwrap();
    assert!(controller.context().preload().is_sealed());
    assert_eq!(controller.context().preload().get("css"), Some(".a>.b{color:red}"));
}

#[tokio::test]
async fn test_client_only_shell_mounts() {
    let app = common::server_app(true, RenderMode::Stream);
    let page = app.render("/csr", Transport::get("req-csr", "/csr")).await.unwrap();
    let Page::Shell(html) = page else {
        panic!("client-only route must produce a shell");
    };
    assert!(app.registry().is_empty());

    let document = HtmlDocument::new(html);
    assert_eq!(document.element_inner_html("root"), Some(""));

    let (client, attach) = ClientApp::bootstrap(
        RouteTableHandle::new(common::table()),
        &document,
        FakeDom::empty(),
        "/csr",
    )
    .await
    .unwrap();

    assert_eq!(attach, Attach::Mounted);
    assert_eq!(client.container().html, "<div id=\"csr\">client</div>");
    assert_eq!(client.settings().public_path, "/static");
}
