//! Manual reconciliation: a full convergence sweep over catalog state.
//!
//! Backfill and repair path for everything the event-driven trigger missed
//! (downtime, dropped notifications, out-of-band data fixes). Exposed to
//! administrative callers as the `SyncVariants` RPC.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use syndicate_catalog::{
    CatalogError, CatalogResult, CatalogStore, Channel, ChannelContext, ChannelDirectory, Page,
};
use syndicate_core::ChannelId;

use crate::engine::DistributionEngine;

/// Variants per page when sweeping a channel.
pub const RECONCILE_BATCH_SIZE: usize = 50;

/// Result of a `SyncVariants` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncVariantsResponse {
    pub success: bool,
    pub message: String,
    pub processed_variants: u64,
}

/// Sweeps every channel (or one named source channel) through the engine.
#[derive(Debug)]
pub struct Reconciler<S, D> {
    engine: DistributionEngine<S, D>,
}

impl<S, D> Reconciler<S, D>
where
    S: CatalogStore,
    D: ChannelDirectory,
{
    pub fn new(engine: DistributionEngine<S, D>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &DistributionEngine<S, D> {
        &self.engine
    }

    /// Run a full sweep.
    ///
    /// With `source_channel_id`, only that channel acts as a source;
    /// otherwise every directory channel does, in turn. Per-variant and
    /// per-target failures inside the engine are absorbed there — only a
    /// top-level collapse (directory listing or page fetch) propagates,
    /// and partial progress already written is retained.
    pub fn reconcile(
        &self,
        ctx: &ChannelContext,
        source_channel_id: Option<ChannelId>,
    ) -> CatalogResult<SyncVariantsResponse> {
        let channels = self.engine.directory().list_channels()?;

        let sources: Vec<&Channel> = match source_channel_id {
            Some(id) => {
                let source = channels.iter().find(|c| c.id == id).ok_or_else(|| {
                    CatalogError::not_found(format!("source channel {id} not in directory"))
                })?;
                vec![source]
            }
            None => channels.iter().collect(),
        };

        let mut processed: u64 = 0;
        for source in &sources {
            processed += self.sweep_channel(ctx, source, &channels)?;
        }

        info!(
            channels = sources.len(),
            processed_variants = processed,
            "reconciliation sweep finished"
        );

        Ok(SyncVariantsResponse {
            success: true,
            message: format!("synced variants across {} channel(s)", sources.len()),
            processed_variants: processed,
        })
    }

    /// Page through one source channel's non-deleted variants.
    fn sweep_channel(
        &self,
        ctx: &ChannelContext,
        source: &Channel,
        channels: &[Channel],
    ) -> CatalogResult<u64> {
        let source_ctx = ctx.scoped_to(source);
        let mut processed: u64 = 0;
        let mut skip = 0usize;

        loop {
            let batch = self
                .engine
                .store()
                .find_variants_by_channel(source.id, Page::new(skip, RECONCILE_BATCH_SIZE))?;
            if batch.is_empty() {
                break;
            }

            let stats = self.engine.distribute(&source_ctx, &batch, Some(channels))?;
            debug!(
                channel = %source.code,
                batch = batch.len(),
                processed = stats.processed,
                skipped = stats.skipped,
                "reconciled variant batch"
            );

            processed += batch.len() as u64;
            if batch.len() < RECONCILE_BATCH_SIZE {
                break;
            }
            skip += RECONCILE_BATCH_SIZE;
        }

        Ok(processed)
    }
}
