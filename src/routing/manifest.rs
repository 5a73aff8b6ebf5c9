//! Route manifests and the static loader registry.
//!
//! # Responsibilities
//! - Hold every loader the application registered at startup, by name
//! - Parse route manifests (TOML) that map patterns to loader names
//! - Compile a manifest into a `RouteTable`, reporting every problem
//!
//! # Manifest format
//! ```toml
//! [[route]]
//! path = "/item/:id"
//! controller = "item"
//!
//! [[route]]                 # a group, flattened in place
//! [[route.routes]]
//! path = "/docs/:page?"
//! controller = "docs"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::controller::{ControllerDef, Loader};
use crate::routing::matcher::{PathPattern, PatternError};
use crate::routing::router::{Route, RouteNode, RouteTable};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read route manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse route manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("route manifest is invalid: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

/// One manifest entry: either a route or a group of entries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestEntry {
    pub path: Option<String>,
    pub controller: Option<String>,
    pub routes: Vec<ManifestEntry>,
}

/// A declarative route table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteManifest {
    #[serde(rename = "route")]
    pub routes: Vec<ManifestEntry>,
}

impl RouteManifest {
    pub fn from_toml(source: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml(&source)
    }

    /// Compile against `registry`. Every invalid entry is reported.
    pub fn compile<T: 'static>(&self, registry: &LoaderRegistry<T>) -> Result<RouteTable<T>, ManifestError> {
        let mut problems = Vec::new();
        let nodes = compile_entries(&self.routes, registry, &mut problems);
        if problems.is_empty() {
            Ok(RouteTable::from_tree(nodes))
        } else {
            Err(ManifestError::Invalid(problems))
        }
    }
}

fn compile_entries<T: 'static>(
    entries: &[ManifestEntry],
    registry: &LoaderRegistry<T>,
    problems: &mut Vec<String>,
) -> Vec<RouteNode<T>> {
    let mut nodes = Vec::new();
    for entry in entries {
        match (&entry.path, &entry.controller) {
            (Some(path), Some(controller)) => {
                let pattern = PathPattern::parse(path).map_err(|e: PatternError| e.to_string());
                let loader = registry
                    .get(controller)
                    .ok_or_else(|| format!("route `{}` references unknown controller `{}`", path, controller));
                match (pattern, loader) {
                    (Ok(pattern), Ok(loader)) => nodes.push(RouteNode::Route(Route::new(pattern, loader))),
                    (pattern, loader) => {
                        problems.extend(pattern.err());
                        problems.extend(loader.err());
                    }
                }
                if !entry.routes.is_empty() {
                    problems.push(format!("route `{}` cannot also declare nested routes", path));
                }
            }
            (None, None) => {
                nodes.push(RouteNode::Group(compile_entries(&entry.routes, registry, problems)));
            }
            (Some(path), None) => problems.push(format!("route `{}` has no controller", path)),
            (None, Some(controller)) => {
                problems.push(format!("controller `{}` is listed without a path", controller))
            }
        }
    }
    nodes
}

/// Every loader the application can route to, registered at startup.
pub struct LoaderRegistry<T: 'static> {
    loaders: BTreeMap<String, Loader<T>>,
}

impl<T: 'static> Default for LoaderRegistry<T> {
    fn default() -> Self {
        Self {
            loaders: BTreeMap::new(),
        }
    }
}

impl<T: 'static> LoaderRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader under `name`, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, loader: Loader<T>) -> &mut Self {
        self.loaders.insert(name.into(), loader);
        self
    }

    /// Register a controller under its own name.
    pub fn controller(&mut self, def: &'static ControllerDef<T>) -> &mut Self {
        self.register(def.name, Loader::Static(def))
    }

    pub fn get(&self, name: &str) -> Option<Loader<T>> {
        self.loaders.get(name).copied()
    }

    /// Registered loader names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::routing::RouteMatch;
    use crate::view::View;

    fn view(_: &Controller<()>) -> View<()> {
        View::Empty
    }

    static HOME: ControllerDef<()> = ControllerDef::new("home", view);
    static ITEM: ControllerDef<()> = ControllerDef::new("item", view);

    fn registry() -> LoaderRegistry<()> {
        let mut registry = LoaderRegistry::new();
        registry.controller(&HOME).controller(&ITEM);
        registry
    }

    #[test]
    fn test_compile_nested_manifest() {
        let manifest = RouteManifest::from_toml(
            r#"
            [[route]]
            path = "/"
            controller = "home"

            [[route]]
            [[route.routes]]
            path = "/item/:id"
            controller = "item"
            "#,
        )
        .unwrap();

        let table = manifest.compile(&registry()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(matches!(table.resolve("/item/9", ""), RouteMatch::Matched { .. }));
    }

    #[test]
    fn test_reports_every_problem() {
        let manifest = RouteManifest::from_toml(
            r#"
            [[route]]
            path = "/a"
            controller = "missing"

            [[route]]
            path = "/*/b"
            controller = "home"

            [[route]]
            path = "/c"
            "#,
        )
        .unwrap();

        match manifest.compile(&registry()) {
            Err(ManifestError::Invalid(problems)) => assert_eq!(problems.len(), 3),
            other => panic!("expected invalid manifest, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_registry_names() {
        let names: Vec<_> = registry().names().map(str::to_string).collect();
        assert_eq!(names, vec!["home", "item"]);
    }
}
