//! Write-once preload bag.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use thiserror::Error;

/// Opaque name → content pairs computed on the server for the first render.
pub type Preload = BTreeMap<String, String>;

static EMPTY: Preload = BTreeMap::new();

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreloadError {
    #[error("preload bag was already sealed")]
    AlreadySealed,
}

/// A preload map that becomes visible all at once.
///
/// Readers see nothing until the bag is sealed, then the complete map.
/// A bag is sealed at most once.
#[derive(Debug, Default)]
pub struct PreloadBag {
    cell: OnceLock<Preload>,
}

impl PreloadBag {
    /// A bag that will be sealed later.
    pub fn pending() -> Self {
        Self::default()
    }

    /// A bag sealed with `entries`.
    pub fn sealed(entries: Preload) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(entries);
        Self { cell }
    }

    pub(crate) fn seal(&self, entries: Preload) -> Result<(), PreloadError> {
        self.cell.set(entries).map_err(|_| PreloadError::AlreadySealed)
    }

    pub fn is_sealed(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries().get(name).map(String::as_str)
    }

    /// The sealed entries, or an empty map while pending.
    pub fn entries(&self) -> &Preload {
        self.cell.get().unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_bag_reads_empty() {
        let bag = PreloadBag::pending();
        assert!(!bag.is_sealed());
        assert!(bag.get("css").is_none());
        assert!(bag.is_empty());
    }

    #[test]
    fn test_seal_once() {
        let bag = PreloadBag::pending();
        let mut entries = Preload::new();
        entries.insert("css".into(), "body{}".into());
        bag.seal(entries.clone()).unwrap();
        assert_eq!(bag.get("css"), Some("body{}"));
        assert_eq!(bag.seal(entries), Err(PreloadError::AlreadySealed));
    }
}
