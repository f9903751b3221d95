//! Strategy algorithms for the orchestrator's verbs.
//!
//! Strategies are stateless and hold no registry of their own: each call
//! receives the full unit map and an ordered target list, so one instance
//! is safe to share across arbitrarily many concurrent orchestrator calls.
//!
//! # Available strategies
//!
//! - [`SequentialSave`] - ordered, fail-fast writes preserving the saved prefix
//! - [`ParallelSave`] - one concurrent worker per target, partial success kept
//! - [`CacheFallbackGet`] - first-hit-wins tier scan with cache promotion
//! - [`SequentialDelete`] - ordered, fail-fast deletes, no compensation

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result, StorageUnit};

mod delete;
mod get;
mod save;

pub use delete::SequentialDelete;
pub use get::CacheFallbackGet;
pub use save::{ParallelSave, SequentialSave};

/// Snapshot of the orchestrator's unit registry handed to a strategy.
pub type UnitMap<K, V> = HashMap<String, Arc<dyn StorageUnit<K, V>>>;

/// Failure of a save fan-out.
///
/// `saved` names every unit that confirmed the write before (or, for the
/// parallel strategy, despite) the failure, so callers can reconcile which
/// units actually hold the data.
#[derive(thiserror::Error, Debug)]
#[error("save failed with {} unit(s) written: {source}", .saved.len())]
pub struct SaveError {
    /// Units that confirmed the write.
    pub saved: Vec<String>,
    #[source]
    pub source: Error,
}

/// Outcome of a cache-fallback read.
#[derive(Debug)]
pub struct Lookup<V> {
    /// The value, from the first tier that answered.
    pub value: V,
    /// Name of the tier that answered.
    pub unit: String,
    /// Tiers tried and missed before the hit, in scan order. These are the
    /// tiers the promotion save targeted.
    pub missing: Vec<String>,
    /// Error from the promotion save, if it failed. The value above is
    /// still valid; a backfill failure never retracts a found value.
    pub promotion_error: Option<SaveError>,
}

impl<V> Lookup<V> {
    /// Discard the read-repair bookkeeping and keep the value.
    pub fn into_value(self) -> V {
        self.value
    }

    /// True when every tier either already held the value or was backfilled.
    pub fn is_settled(&self) -> bool {
        self.promotion_error.is_none()
    }
}

/// Write policy capability: fan a save out over `targets`.
///
/// Returns the names of the units that confirmed the write, in an order
/// defined by the strategy; on failure the partial list rides inside
/// [`SaveError`].
pub trait SaveStrategy<K, V>: Send + Sync {
    fn save<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        item: &'a V,
        units: &'a UnitMap<K, V>,
        targets: &'a [String],
    ) -> BoxFuture<'a, std::result::Result<Vec<String>, SaveError>>;
}

/// Read policy capability: resolve a query against `targets`.
///
/// `promote` is the save strategy used for cache promotion; the
/// orchestrator always passes its sequential save so backfill ordering is
/// deterministic regardless of the configured save mode.
pub trait GetStrategy<K, V>: Send + Sync {
    fn get<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        units: &'a UnitMap<K, V>,
        targets: &'a [String],
        promote: &'a dyn SaveStrategy<K, V>,
    ) -> BoxFuture<'a, Result<Lookup<V>>>;
}

/// Delete policy capability: remove a query from `targets`.
pub trait DeleteStrategy<K, V>: Send + Sync {
    fn delete<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        units: &'a UnitMap<K, V>,
        targets: &'a [String],
    ) -> BoxFuture<'a, Result<()>>;
}

pub(crate) fn lookup_unit<'m, K, V>(
    units: &'m UnitMap<K, V>,
    name: &str,
) -> Result<&'m Arc<dyn StorageUnit<K, V>>> {
    units
        .get(name)
        .ok_or_else(|| Error::UnknownUnit(name.to_string()))
}
