use std::sync::Arc;

use arc_swap::ArcSwap;

use super::ConfigIndex;

/// Shared, atomically replaceable reference to the current [`ConfigIndex`].
///
/// Readers take a snapshot with [`load`](Self::load) and keep using it for
/// the whole request, even if a rebuild is published meanwhile.
#[derive(Debug)]
pub struct IndexHandle {
    current: ArcSwap<ConfigIndex>,
}

impl IndexHandle {
    pub fn new(index: ConfigIndex) -> Self {
        Self {
            current: ArcSwap::from_pointee(index),
        }
    }

    /// The index currently published.
    pub fn load(&self) -> Arc<ConfigIndex> {
        self.current.load_full()
    }

    /// Replaces the published index, returning the previous one.
    pub fn publish(&self, index: ConfigIndex) -> Arc<ConfigIndex> {
        self.current.swap(Arc::new(index))
    }
}

impl Default for IndexHandle {
    fn default() -> Self {
        Self::new(ConfigIndex::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_snapshot_survives_publish() {
        let handle = IndexHandle::new(ConfigIndex::from_paths("/a", [PathBuf::from("app.yml")]));
        let before = handle.load();

        let previous = handle.publish(ConfigIndex::empty("/b"));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(before.len(), 1);
        assert!(handle.load().is_empty());
        assert_eq!(handle.load().root(), std::path::Path::new("/b"));
    }

    #[test]
    fn test_load_without_publish_is_stable() {
        let handle = IndexHandle::default();
        assert!(Arc::ptr_eq(&handle.load(), &handle.load()));
    }
}
