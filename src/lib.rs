use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "memory")]
pub use adapters::memory::MemoryUnit;

pub use options::{DeleteMode, DeleteOptions, GetMode, GetOptions, SaveMode, SaveOptions};
pub use orchestrator::Orchestrator;
pub use strategies::{Lookup, SaveError, UnitMap};

pub mod options;
pub mod orchestrator;
pub mod strategies;

/// A specialized Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A unified Error type for orchestrator and storage unit operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Registry lookup miss: no unit registered under this name.
    #[error("unit not found: {0}")]
    UnitNotFound(String),

    /// A target list or standard order named a unit that is not registered.
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    /// The cancellation token was observed cancelled at a check point.
    #[error("operation cancelled")]
    Cancelled,

    /// A storage unit's own operation failed; carries the unit's identity.
    #[error("unit {unit} failed: {cause}")]
    UnitFailed {
        unit: String,
        #[source]
        cause: Box<Error>,
    },

    /// Every tier missed on a cache-fallback get.
    #[error("no unit returned a value")]
    NoUnitReturned,

    /// An operation resolved to an empty target list.
    #[error("no target order specified")]
    UnspecifiedOrder,

    /// A reserved strategy selector with no implementation was requested.
    #[error("not implemented: {0}")]
    Unimplemented(&'static str),

    /// Unit-side: the queried key is not present.
    #[error("key not found: {0}")]
    NotFound(String),

    /// Unit-side: the backing store failed.
    #[error("storage backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Generic storage error.
    #[error("{0}")]
    Generic(String),
}

/// Adapter modules, gated behind Cargo features.
pub mod adapters {
    #[cfg(feature = "memory")]
    pub mod memory;
}

/// The storage unit capability.
///
/// One backing store (a cache tier, a database tier, ...) keyed by a query
/// value of type `K` holding items of type `V`. The orchestrator treats any
/// number of these as one logical store.
///
/// Methods return [`BoxFuture`] so units of different concrete types can
/// live behind `dyn StorageUnit` in one registry.
///
/// A `get` error means "not present or failed", indistinguishably; the
/// orchestrator treats both as a miss on that tier.
///
/// Cancellation is cooperative: the orchestrator checks `token` before each
/// unit call but never interrupts a call in flight. A unit that wants to
/// abort early must watch the token itself.
pub trait StorageUnit<K, V>: Send + Sync {
    /// Store `item` under `query`.
    fn save<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
        item: &'a V,
    ) -> BoxFuture<'a, Result<()>>;

    /// Retrieve the item stored under `query`.
    fn get<'a>(&'a self, token: &'a CancellationToken, query: &'a K) -> BoxFuture<'a, Result<V>>;

    /// Delete the item stored under `query`. Idempotent.
    fn delete<'a>(
        &'a self,
        token: &'a CancellationToken,
        query: &'a K,
    ) -> BoxFuture<'a, Result<()>>;
}

impl<K, V> std::fmt::Debug for dyn StorageUnit<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StorageUnit")
    }
}
