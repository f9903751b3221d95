use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result, StorageUnit};

/// A simple in-memory storage unit.
///
/// - Data lives in a `HashMap<K, V>` behind a reader/writer lock.
/// - Cloning the unit is cheap; clones share the same map.
/// - Intended for tests, local development, and as the reference
///   implementation of the [`StorageUnit`] capability.
///
/// Operations complete immediately, so the cancellation token is accepted
/// but never consulted.
pub struct MemoryUnit<K, V> {
    inner: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> MemoryUnit<K, V> {
    /// Create a new empty in-memory unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an in-memory unit from an existing map.
    pub fn from_map(map: HashMap<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Returns the number of stored items.
    pub fn len(&self) -> usize {
        self.inner.read().expect("poisoned lock").len()
    }

    /// Returns true if there are no stored items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all items.
    pub fn clear(&self) {
        self.inner.write().expect("poisoned lock").clear();
    }
}

impl<K: Eq + Hash, V> MemoryUnit<K, V> {
    /// Whether an item is stored under `query`.
    pub fn contains(&self, query: &K) -> bool {
        self.inner.read().expect("poisoned lock").contains_key(query)
    }
}

impl<K: Eq + Hash, V: Clone> MemoryUnit<K, V> {
    /// Get a copy of the item stored under `query` (useful for tests).
    pub fn value(&self, query: &K) -> Option<V> {
        self.inner.read().expect("poisoned lock").get(query).cloned()
    }
}

impl<K, V> Default for MemoryUnit<K, V> {
    fn default() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> Clone for MemoryUnit<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> fmt::Debug for MemoryUnit<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Avoid dumping potentially large in-memory contents.
        f.debug_struct("MemoryUnit").field("len", &self.len()).finish()
    }
}

impl<K, V> StorageUnit<K, V> for MemoryUnit<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn save<'a>(
        &'a self,
        _token: &'a CancellationToken,
        query: &'a K,
        item: &'a V,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.inner
                .write()
                .expect("poisoned lock")
                .insert(query.clone(), item.clone());
            Ok(())
        })
    }

    fn get<'a>(&'a self, _token: &'a CancellationToken, query: &'a K) -> BoxFuture<'a, Result<V>> {
        Box::pin(async move {
            self.inner
                .read()
                .expect("poisoned lock")
                .get(query)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("{query:?}")))
        })
    }

    fn delete<'a>(
        &'a self,
        _token: &'a CancellationToken,
        query: &'a K,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.inner.write().expect("poisoned lock").remove(query);
            Ok(())
        })
    }
}
