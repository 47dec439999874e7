//! Dataset cache keyed by source identity.
//!
//! A source is identified by its canonical path and modification time.
//! Entries stay valid until [`DatasetCache::reload`] is called for the path.

use super::{load_dataset, Dataset, DatasetError, LoadOptions};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl SourceKey {
    fn for_path(path: &Path) -> Result<Self, DatasetError> {
        let io_error = |source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        };

        let canonical = fs::canonicalize(path).map_err(io_error)?;
        let metadata = fs::metadata(&canonical).map_err(io_error)?;

        Ok(Self {
            path: canonical,
            modified: metadata.modified().ok(),
        })
    }
}

/// Memoized dataset loads shared by reference.
pub struct DatasetCache {
    options: LoadOptions,
    entries: HashMap<SourceKey, Arc<Dataset>>,
    loads: usize,
}

impl DatasetCache {
    /// Create an empty cache that loads with `options`.
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
            loads: 0,
        }
    }

    /// Return the cached dataset for `path`, loading it on a miss.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Dataset>, DatasetError> {
        let key = SourceKey::for_path(path)?;

        if let Some(dataset) = self.entries.get(&key) {
            debug!("Dataset cache hit: {}", key.path.display());
            return Ok(Arc::clone(dataset));
        }

        debug!("Dataset cache miss: {}", key.path.display());
        let dataset = Arc::new(load_dataset(path, &self.options)?);
        self.loads += 1;

        // Older versions of the same file are stale once it changed
        self.entries.retain(|cached, _| cached.path != key.path);
        self.entries.insert(key, Arc::clone(&dataset));

        Ok(dataset)
    }

    /// Drop every cached version of `path` and load it again.
    pub fn reload(&mut self, path: &Path) -> Result<Arc<Dataset>, DatasetError> {
        let key = SourceKey::for_path(path)?;
        self.entries.retain(|cached, _| cached.path != key.path);
        info!("Reloading dataset: {}", path.display());
        self.get_or_load(path)
    }

    /// Number of loads actually performed.
    pub fn loads(&self) -> usize {
        self.loads
    }

    #[allow(dead_code)] // Introspection utility
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)] // Introspection utility
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    const CSV: &str = "title,type,date_added,cast\nA,Movie,2020-01-02,\"X, Y\"\n";

    fn write_dataset(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("titles.csv");
        std::fs::write(&path, CSV).unwrap();
        path
    }

    #[test]
    fn test_second_lookup_hits_cache() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir);
        let mut cache = DatasetCache::new(LoadOptions::default());

        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reload_forces_new_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir);
        let mut cache = DatasetCache::new(LoadOptions::default());

        let first = cache.get_or_load(&path).unwrap();
        let reloaded = cache.reload(&path).unwrap();

        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(cache.loads(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_modified_file_is_a_new_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_dataset(&temp_dir);
        let mut cache = DatasetCache::new(LoadOptions::default());

        cache.get_or_load(&path).unwrap();

        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        cache.get_or_load(&path).unwrap();
        assert_eq!(cache.loads(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = DatasetCache::new(LoadOptions::default());

        let err = cache
            .get_or_load(&temp_dir.path().join("missing.csv"))
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(cache.is_empty());
    }
}
