//! Per-call configuration for orchestrator operations.
//!
//! Each verb gets its own options struct. The orchestrator seeds one with
//! its defaults (fresh token, standard order, default mode) and hands it to
//! the caller's configurator closure before dispatch:
//!
//! ```no_run
//! # use tierage::{Orchestrator, SaveMode};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let orchestrator: Orchestrator<String, String> = Orchestrator::new();
//! let saved = orchestrator
//!     .save_with(&"user:1".to_string(), &"ada".to_string(), |opts| {
//!         opts.mode = SaveMode::Parallel;
//!         opts.targets = vec!["cache".into(), "db".into()];
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

use tokio_util::sync::CancellationToken;

/// Write fan-out policy for [`Orchestrator::save`](crate::Orchestrator::save).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Units are written one at a time in target order; the first failure
    /// stops the fan-out.
    #[default]
    Sequential,

    /// One concurrent worker per target; a failure cancels the shared token
    /// but does not abort workers already in flight.
    Parallel,
}

/// Read policy for [`Orchestrator::get`](crate::Orchestrator::get).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GetMode {
    /// Try tiers in target order, first hit wins, then backfill the tiers
    /// that missed.
    #[default]
    Cache,

    /// Reserved: query all tiers concurrently and take the first answer.
    /// Selecting it fails with [`Error::Unimplemented`](crate::Error::Unimplemented).
    Race,
}

/// Delete policy for [`Orchestrator::delete`](crate::Orchestrator::delete).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Units are deleted one at a time in target order; the first failure
    /// stops the fan-out. Units already deleted stay deleted.
    #[default]
    Sequential,
}

/// Options for a single save call.
#[derive(Debug, Clone)]
pub struct SaveOptions {
    /// Cooperative cancellation token; defaults to a fresh, never-cancelled
    /// token (no deadline).
    pub token: CancellationToken,
    /// Units to write, in order. Defaults to the standard order.
    pub targets: Vec<String>,
    /// Fan-out policy. Defaults to [`SaveMode::Sequential`].
    pub mode: SaveMode,
}

/// Options for a single get call.
#[derive(Debug, Clone)]
pub struct GetOptions {
    /// Cooperative cancellation token; defaults to a fresh, never-cancelled
    /// token (no deadline).
    pub token: CancellationToken,
    /// Tiers to read, nearest first. Defaults to the standard order.
    pub targets: Vec<String>,
    /// Read policy. Defaults to [`GetMode::Cache`].
    pub mode: GetMode,
}

/// Options for a single delete call.
#[derive(Debug, Clone)]
pub struct DeleteOptions {
    /// Cooperative cancellation token; defaults to a fresh, never-cancelled
    /// token (no deadline).
    pub token: CancellationToken,
    /// Units to delete from, in order. Defaults to the standard order.
    pub targets: Vec<String>,
    /// Delete policy. Defaults to [`DeleteMode::Sequential`].
    pub mode: DeleteMode,
}

impl SaveOptions {
    pub(crate) fn standard(targets: Vec<String>) -> Self {
        Self {
            token: CancellationToken::new(),
            targets,
            mode: SaveMode::default(),
        }
    }
}

impl GetOptions {
    pub(crate) fn standard(targets: Vec<String>) -> Self {
        Self {
            token: CancellationToken::new(),
            targets,
            mode: GetMode::default(),
        }
    }
}

impl DeleteOptions {
    pub(crate) fn standard(targets: Vec<String>) -> Self {
        Self {
            token: CancellationToken::new(),
            targets,
            mode: DeleteMode::default(),
        }
    }
}
