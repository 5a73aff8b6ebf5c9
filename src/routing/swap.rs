//! Atomically replaceable route table.
//!
//! Readers take a snapshot (`Arc<RouteTable>`) at the start of a render and
//! keep it for the whole render. A swap only affects later snapshots.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;

use crate::observability::metrics;
use crate::routing::manifest::{LoaderRegistry, RouteManifest};
use crate::routing::router::RouteTable;

/// Shared handle to the route table in use.
pub struct RouteTableHandle<T: 'static> {
    current: Arc<ArcSwap<RouteTable<T>>>,
    generation: Arc<AtomicU64>,
}

impl<T: 'static> Clone for RouteTableHandle<T> {
    fn clone(&self) -> Self {
        Self {
            current: self.current.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<T: 'static> RouteTableHandle<T> {
    pub fn new(table: RouteTable<T>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(table)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The table to use for one render.
    pub fn snapshot(&self) -> Arc<RouteTable<T>> {
        self.current.load_full()
    }

    /// Number of swaps performed so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Replace the table for future renders.
    pub fn swap(&self, table: RouteTable<T>) {
        let routes = table.len();
        self.current.store(Arc::new(table));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_route_swap();
        tracing::info!(routes, generation, "Route table swapped");
    }
}

/// Compile and swap in every manifest received on `updates`.
///
/// A manifest that fails to compile is logged; the current table stays.
/// Returns once the sending side is dropped.
pub async fn apply_updates<T: 'static>(
    handle: RouteTableHandle<T>,
    registry: Arc<LoaderRegistry<T>>,
    mut updates: mpsc::UnboundedReceiver<RouteManifest>,
) {
    while let Some(manifest) = updates.recv().await {
        match manifest.compile(&registry) {
            Ok(table) => handle.swap(table),
            Err(e) => {
                tracing::error!(error = %e, "Rejected route manifest. Keeping current routes.");
            }
        }
    }
    tracing::debug!("Route update channel closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{Controller, ControllerDef};
    use crate::routing::RouteMatch;
    use crate::view::View;

    fn view(_: &Controller<()>) -> View<()> {
        View::Empty
    }

    static HOME: ControllerDef<()> = ControllerDef::new("home", view);

    fn registry() -> Arc<LoaderRegistry<()>> {
        let mut registry = LoaderRegistry::new();
        registry.controller(&HOME);
        Arc::new(registry)
    }

    #[test]
    fn test_snapshot_survives_swap() {
        let handle: RouteTableHandle<()> = RouteTableHandle::new(RouteTable::default());
        let before = handle.snapshot();

        let manifest = RouteManifest::from_toml("[[route]]\npath = \"/\"\ncontroller = \"home\"").unwrap();
        handle.swap(manifest.compile(&registry()).unwrap());

        assert!(before.is_empty());
        assert_eq!(handle.snapshot().len(), 1);
        assert_eq!(handle.generation(), 1);
        assert!(matches!(handle.snapshot().resolve("/", ""), RouteMatch::Matched { .. }));
    }

    #[tokio::test]
    async fn test_invalid_manifest_keeps_table() {
        let handle: RouteTableHandle<()> = RouteTableHandle::new(RouteTable::default());
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(RouteManifest::from_toml("[[route]]\npath = \"/\"\ncontroller = \"home\"").unwrap())
            .unwrap();
        tx.send(RouteManifest::from_toml("[[route]]\npath = \"/x\"\ncontroller = \"nope\"").unwrap())
            .unwrap();
        drop(tx);

        apply_updates(handle.clone(), registry(), rx).await;
        assert_eq!(handle.generation(), 1);
        assert_eq!(handle.snapshot().routes()[0].pattern().as_str(), "/");
    }
}
