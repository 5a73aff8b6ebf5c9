//! The server (origin-form request target) and the client (absolute browser
//! URL) must derive the same location for the same address.

use proptest::prelude::*;

use imvc_runtime::routing::{RawUrl, RouteMatch};
use imvc_runtime::Location;

mod common;

fn resolve(url: &str, basename: &str) -> Option<Location> {
    match common::table().resolve(url, basename) {
        RouteMatch::Matched { location, .. } => Some(location),
        RouteMatch::Unmatched(_) => None,
    }
}

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-zA-Z0-9'\"_-]{1,6}",
        1 => Just(".".to_string()),
        1 => Just("..".to_string()),
        1 => "%[0-9A-F]{2}",
    ]
}

fn query_string() -> impl Strategy<Value = String> {
    prop::collection::vec(("[a-z]{1,5}", "([a-z0-9'\"]|%[0-9A-F]{2}){0,5}"), 0..4).prop_map(|pairs| {
        if pairs.is_empty() {
            return String::new();
        }
        let joined: Vec<String> = pairs.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("?{}", joined.join("&"))
    })
}

proptest! {
    #[test]
    fn item_location_matches_on_both_sides(id in "[a-zA-Z0-9'\"_-]{1,12}", query in query_string()) {
        let origin = format!("/item/{}{}", id, query);
        let absolute = format!("https://shop.example.com{}", origin);

        let server = resolve(&origin, "").unwrap();
        let client = resolve(&absolute, "").unwrap();
        prop_assert_eq!(&server, &client);
        prop_assert_eq!(server.param("id"), Some(id.as_str()));
        prop_assert_eq!(server.pattern.as_str(), "/item/:id");
    }

    #[test]
    fn basename_is_transparent(id in "[a-z0-9]{1,8}", query in query_string()) {
        let bare = resolve(&format!("/item/{}{}", id, query), "").unwrap();
        let mounted = resolve(&format!("/shop/item/{}{}", id, query), "/shop").unwrap();
        let absolute = resolve(&format!("http://localhost:3000/shop/item/{}{}", id, query), "/shop/").unwrap();
        prop_assert_eq!(&bare, &mounted);
        prop_assert_eq!(&bare, &absolute);
    }

    #[test]
    fn raw_url_parity(segments in prop::collection::vec(segment(), 0..5), query in query_string()) {
        let path = format!("/{}", segments.join("/"));
        let origin = format!("{}{}", path, query);
        let absolute = format!("http://example.com{}#frag", origin);

        let server = RawUrl::parse(&origin, "");
        let client = RawUrl::parse(&absolute, "");
        prop_assert_eq!(&server, &client);
        prop_assert_eq!(server.query(), imvc_runtime::routing::parse_query(&query));
        prop_assert!(!server.pathname.split('/').any(|part| part == "." || part == ".."));
    }

    #[test]
    fn dot_segments_route_the_same(id in "[a-z0-9]{1,8}", prefix in segment()) {
        let origin = format!("/{}/../item/{}", prefix, id);
        let server = resolve(&origin, "");
        let client = resolve(&format!("http://localhost:3000{}", origin), "");
        prop_assert_eq!(&server, &client);
    }
}
