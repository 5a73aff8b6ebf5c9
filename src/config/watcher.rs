//! Route manifest watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::routing::RouteManifest;

/// A watcher that monitors the route manifest for changes.
pub struct ManifestWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouteManifest>,
}

impl ManifestWatcher {
    /// Create a new ManifestWatcher.
    ///
    /// Returns the watcher and a receiver for parsed manifests.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouteManifest>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Route manifest change detected, reloading...");
                        match RouteManifest::load(&path) {
                            Ok(manifest) => {
                                let _ = tx.send(manifest);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload route manifest: {}. Keeping current routes.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Route manifest watcher started");
        Ok(watcher)
    }
}
