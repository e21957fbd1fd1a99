//! `syndicate-distribution` — the catalog distribution engine.
//!
//! Keeps a variant's channel assignments, prices, and stock converged
//! across sales channels. One deterministic pass per variant:
//!
//! 1. prune assignments that no longer satisfy eligibility ("ghosts"),
//! 2. repair a missing price row in the triggering channel,
//! 3. if (and only if) the triggering channel owns the variant, propagate
//!    assignments, price, and stock to every valid target channel.
//!
//! There is no locking. Consistency is reached by re-running the same
//! convergence pass — reactively via [`VariantSyncWorker`] and in bulk via
//! [`Reconciler`]. Every write is "set to computed value", so concurrent
//! passes race benignly.

pub mod engine;
pub mod reconcile;
pub mod worker;

pub use engine::{DistributionEngine, DistributionStats, eligible_targets};
pub use reconcile::{RECONCILE_BATCH_SIZE, Reconciler, SyncVariantsResponse};
pub use worker::{DEFAULT_SETTLE_DELAY, VariantSyncWorker, WorkerHandle};
