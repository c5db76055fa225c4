//! Parsed-template cache.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use quill_parser::Template;

/// Least-recently-used cache from template source to parsed [`Template`].
///
/// Entries are kept in recency order inside an [`IndexMap`]: the front is
/// the next to evict. A capacity of zero disables caching. Storage grows with
/// use; the capacity is only an upper bound.
#[derive(Debug)]
pub struct TemplateCache {
    capacity: usize,
    entries: Mutex<IndexMap<String, Arc<Template>>>,
}

impl TemplateCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(IndexMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Look up a template and mark it most recently used.
    pub fn get(&self, source: &str) -> Option<Arc<Template>> {
        let mut entries = self.lock();
        let index = entries.get_index_of(source)?;
        let last = entries.len() - 1;
        entries.move_index(index, last);
        entries.get_index(last).map(|(_, template)| Arc::clone(template))
    }

    pub fn insert(&self, source: &str, template: Arc<Template>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        entries.shift_remove(source);
        entries.insert(source.to_string(), template);
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                tracing::trace!(bytes = evicted.len(), "evicted template from cache");
            }
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Templates are immutable, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, IndexMap<String, Arc<Template>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
