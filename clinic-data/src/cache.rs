//! Process-lifetime memoization of parsed reference tables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::trace;

/// Caches one parsed value per file path until explicitly invalidated.
///
/// Callers receive `Arc` snapshots; invalidating a path never affects
/// snapshots already handed out.
#[derive(Debug)]
pub struct TableCache<T> {
    entries: Mutex<HashMap<PathBuf, Arc<T>>>,
}

impl<T> TableCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `path`, running `load` on a miss.
    /// Failed loads are not cached.
    pub fn get_or_load<E>(
        &self,
        path: &Path,
        load: impl FnOnce(&Path) -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        if let Some(hit) = self.entries().get(path) {
            trace!(path = %path.display(), "Reference table cache hit");
            return Ok(Arc::clone(hit));
        }

        let value = Arc::new(load(path)?);
        self.entries()
            .insert(path.to_path_buf(), Arc::clone(&value));
        Ok(value)
    }

    /// Drops the cached value for `path`. Returns whether one was cached.
    pub fn invalidate(
        &self,
        path: &Path,
    ) -> bool {
        self.entries().remove(path).is_some()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for TableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
