//! Route lookup.
//!
//! # Responsibilities
//! - Flatten nested route trees in traversal order
//! - Look up the first route whose pattern accepts the pathname
//! - Return the matched route or an explicit unmatched result
//!
//! # Design Decisions
//! - Immutable after construction (shared through `RouteTableHandle`)
//! - First registered match wins, even when a later pattern is more specific
//! - O(n) scan; route tables are small

use crate::controller::Loader;
use crate::routing::location::{Location, RawUrl};
use crate::routing::matcher::PathPattern;

/// A pattern bound to a loader.
pub struct Route<T: 'static> {
    pattern: PathPattern,
    loader: Loader<T>,
}

impl<T: 'static> Route<T> {
    pub fn new(pattern: PathPattern, loader: Loader<T>) -> Self {
        Self { pattern, loader }
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn loader(&self) -> &Loader<T> {
        &self.loader
    }
}

impl<T: 'static> Clone for Route<T> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            loader: self.loader,
        }
    }
}

impl<T: 'static> std::fmt::Debug for Route<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("loader", &self.loader)
            .finish()
    }
}

/// A route tree as supplied by the application.
pub enum RouteNode<T: 'static> {
    Route(Route<T>),
    Group(Vec<RouteNode<T>>),
}

/// Flatten a route tree depth-first, preserving order.
pub fn flatten<T: 'static>(nodes: Vec<RouteNode<T>>) -> Vec<Route<T>> {
    let mut routes = Vec::new();
    for node in nodes {
        match node {
            RouteNode::Route(route) => routes.push(route),
            RouteNode::Group(children) => routes.extend(flatten(children)),
        }
    }
    routes
}

/// Result of a route lookup.
#[derive(Debug)]
pub enum RouteMatch<'a, T: 'static> {
    Matched {
        location: Location,
        route: &'a Route<T>,
    },
    Unmatched(RawUrl),
}

/// An ordered, flat list of routes.
#[derive(Debug)]
pub struct RouteTable<T: 'static> {
    routes: Vec<Route<T>>,
}

impl<T: 'static> Default for RouteTable<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T: 'static> RouteTable<T> {
    pub fn new(routes: Vec<Route<T>>) -> Self {
        Self { routes }
    }

    pub fn from_tree(nodes: Vec<RouteNode<T>>) -> Self {
        Self::new(flatten(nodes))
    }

    pub fn routes(&self) -> &[Route<T>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve `url` (origin-form or absolute) under `basename`.
    pub fn resolve(&self, url: &str, basename: &str) -> RouteMatch<'_, T> {
        let raw = RawUrl::parse(url, basename);

        for route in &self.routes {
            if let Some(params) = route.pattern.matches(&raw.pathname) {
                let location = Location::new(raw, route.pattern.as_str(), params);
                return RouteMatch::Matched { location, route };
            }
        }

        RouteMatch::Unmatched(raw)
    }
}
