//! The orchestration engine: unit registry, option resolution, and
//! strategy dispatch.
//!
//! An [`Orchestrator`] makes N independent key-value backends look like one
//! logical store. Writes fan out (ordered or concurrent), reads walk the
//! tiers nearest-first and promote what they find, deletes walk the tiers
//! in order.
//!
//! ```
//! use std::sync::Arc;
//! use tierage::{MemoryUnit, Orchestrator};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator: Orchestrator<String, String> = Orchestrator::new();
//! orchestrator.add_unit("cache", Arc::new(MemoryUnit::new()));
//! orchestrator.add_unit("db", Arc::new(MemoryUnit::new()));
//! orchestrator.set_standard_order(["cache", "db"])?;
//!
//! let saved = orchestrator
//!     .save(&"user:1".to_string(), &"ada".to_string())
//!     .await?;
//! assert_eq!(saved, vec!["cache".to_string(), "db".to_string()]);
//!
//! let hit = orchestrator.get(&"user:1".to_string()).await?;
//! assert_eq!(hit.value, "ada");
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::options::{DeleteMode, DeleteOptions, GetMode, GetOptions, SaveMode, SaveOptions};
use crate::strategies::{
    CacheFallbackGet, DeleteStrategy, GetStrategy, Lookup, ParallelSave, SaveError, SaveStrategy,
    SequentialDelete, SequentialSave, UnitMap,
};
use crate::{Error, Result, StorageUnit};

/// Coordinates save/get/delete across an arbitrary number of registered
/// storage units.
///
/// The registry and the standard order are the only mutable state, both
/// behind reader/writer locks; the strategies themselves are stateless, so
/// one orchestrator is safe to share across arbitrarily many concurrent
/// calls. `save`/`get`/`delete` never mutate orchestrator state (they do
/// mutate unit state through the strategies).
pub struct Orchestrator<K, V> {
    units: RwLock<UnitMap<K, V>>,
    standard_order: RwLock<Vec<String>>,
    sequential_save: SequentialSave,
    parallel_save: ParallelSave,
    cache_get: CacheFallbackGet,
    sequential_delete: SequentialDelete,
}

impl<K, V> Orchestrator<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an orchestrator with an empty registry and no standard order.
    pub fn new() -> Self {
        Self {
            units: RwLock::new(UnitMap::new()),
            standard_order: RwLock::new(Vec::new()),
            sequential_save: SequentialSave,
            parallel_save: ParallelSave,
            cache_get: CacheFallbackGet,
            sequential_delete: SequentialDelete,
        }
    }

    /// Register a unit under `name`, overwriting any previous registration.
    pub fn add_unit(&self, name: impl Into<String>, unit: Arc<dyn StorageUnit<K, V>>) {
        self.units
            .write()
            .expect("poisoned lock")
            .insert(name.into(), unit);
    }

    /// Look up a registered unit by name.
    pub fn get_unit(&self, name: &str) -> Result<Arc<dyn StorageUnit<K, V>>> {
        self.units
            .read()
            .expect("poisoned lock")
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnitNotFound(name.to_string()))
    }

    /// A shallow copy of the registry: a new map holding the same unit
    /// references. Mutating it does not touch the orchestrator.
    pub fn units(&self) -> UnitMap<K, V> {
        self.units.read().expect("poisoned lock").clone()
    }

    /// Replace the default target order.
    ///
    /// Every name must already be registered; on the first unknown name the
    /// call fails with [`Error::UnknownUnit`] and the previous order is
    /// left untouched.
    pub fn set_standard_order<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        {
            let units = self.units.read().expect("poisoned lock");
            for name in &names {
                if !units.contains_key(name) {
                    return Err(Error::UnknownUnit(name.clone()));
                }
            }
        }
        *self.standard_order.write().expect("poisoned lock") = names;
        Ok(())
    }

    /// A copy of the current standard order.
    pub fn standard_order(&self) -> Vec<String> {
        self.standard_order.read().expect("poisoned lock").clone()
    }

    /// Save `item` under `query` across the standard order with default
    /// options (sequential mode, no deadline).
    pub async fn save(
        &self,
        query: &K,
        item: &V,
    ) -> std::result::Result<Vec<String>, SaveError> {
        self.save_with(query, item, |_| {}).await
    }

    /// Save with caller-adjusted options.
    ///
    /// `configure` receives the options pre-seeded with the defaults
    /// (fresh token, standard order, [`SaveMode::Sequential`]); later field
    /// assignments win. Returns the units that confirmed the write; on
    /// failure the partial list rides inside the [`SaveError`].
    pub async fn save_with<F>(
        &self,
        query: &K,
        item: &V,
        configure: F,
    ) -> std::result::Result<Vec<String>, SaveError>
    where
        F: FnOnce(&mut SaveOptions),
    {
        let mut opts = SaveOptions::standard(self.standard_order());
        configure(&mut opts);

        let units = self.units();
        if let Err(source) = check_targets(&units, &opts.targets) {
            return Err(SaveError {
                saved: Vec::new(),
                source,
            });
        }

        let strategy: &dyn SaveStrategy<K, V> = match opts.mode {
            SaveMode::Sequential => &self.sequential_save,
            SaveMode::Parallel => &self.parallel_save,
        };
        strategy
            .save(&opts.token, query, item, &units, &opts.targets)
            .await
    }

    /// Resolve `query` against the standard order with default options
    /// (cache-fallback mode, no deadline).
    pub async fn get(&self, query: &K) -> Result<Lookup<V>> {
        self.get_with(query, |_| {}).await
    }

    /// Get with caller-adjusted options.
    pub async fn get_with<F>(&self, query: &K, configure: F) -> Result<Lookup<V>>
    where
        F: FnOnce(&mut GetOptions),
    {
        let mut opts = GetOptions::standard(self.standard_order());
        configure(&mut opts);

        let units = self.units();
        check_targets(&units, &opts.targets)?;

        match opts.mode {
            // Promotion always goes through the sequential save so backfill
            // ordering is deterministic whatever the configured save mode.
            GetMode::Cache => {
                self.cache_get
                    .get(
                        &opts.token,
                        query,
                        &units,
                        &opts.targets,
                        &self.sequential_save,
                    )
                    .await
            }
            GetMode::Race => Err(Error::Unimplemented("race get")),
        }
    }

    /// Delete `query` across the standard order with default options.
    pub async fn delete(&self, query: &K) -> Result<()> {
        self.delete_with(query, |_| {}).await
    }

    /// Delete with caller-adjusted options.
    pub async fn delete_with<F>(&self, query: &K, configure: F) -> Result<()>
    where
        F: FnOnce(&mut DeleteOptions),
    {
        let mut opts = DeleteOptions::standard(self.standard_order());
        configure(&mut opts);

        let units = self.units();
        check_targets(&units, &opts.targets)?;

        match opts.mode {
            DeleteMode::Sequential => {
                self.sequential_delete
                    .delete(&opts.token, query, &units, &opts.targets)
                    .await
            }
        }
    }
}

impl<K, V> Default for Orchestrator<K, V>
where
    K: Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Orchestrator<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .units
            .read()
            .expect("poisoned lock")
            .keys()
            .cloned()
            .collect();
        names.sort();
        f.debug_struct("Orchestrator")
            .field("units", &names)
            .field(
                "standard_order",
                &*self.standard_order.read().expect("poisoned lock"),
            )
            .finish()
    }
}

fn check_targets<K, V>(units: &UnitMap<K, V>, targets: &[String]) -> Result<()> {
    if targets.is_empty() {
        return Err(Error::UnspecifiedOrder);
    }
    for name in targets {
        if !units.contains_key(name) {
            return Err(Error::UnknownUnit(name.clone()));
        }
    }
    Ok(())
}
