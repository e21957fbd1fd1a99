//! The per-variant convergence pass.

use tracing::{debug, warn};

use syndicate_catalog::{
    AssignableEntity, CatalogResult, CatalogStore, Channel, ChannelContext, ChannelDirectory,
    Price, Product, Variant, VariantRelations,
};
use syndicate_core::{ChannelId, VariantId};

/// Per-call counters, aggregated by the caller.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DistributionStats {
    /// Variants the pass ran to completion for (or up to the authority check).
    pub processed: u64,
    /// Variants skipped before any work (soft-deleted, relations not hydrated).
    pub skipped: u64,
}

/// Compute the valid target set for a variant.
///
/// A channel is a valid target when it is role-eligible (merchant, not
/// supplier), a member of the product's parent subscription set, and not
/// the source channel itself.
pub fn eligible_targets<'a>(
    channels: &'a [Channel],
    product: &Product,
    source_channel_id: ChannelId,
) -> Vec<&'a Channel> {
    channels
        .iter()
        .filter(|c| c.is_eligible_reseller())
        .filter(|c| product.is_subscribed(c.id))
        .filter(|c| c.id != source_channel_id)
        .collect()
}

/// The distribution engine.
///
/// Holds the two collaborators and nothing else; all state lives in the
/// catalog store. The engine is safe to share and safe to invoke
/// concurrently for the same variant — worst case is a redundant write or
/// an ignorable duplicate-key collision, never corruption.
#[derive(Debug)]
pub struct DistributionEngine<S, D> {
    store: S,
    directory: D,
}

impl<S, D> DistributionEngine<S, D>
where
    S: CatalogStore,
    D: ChannelDirectory,
{
    pub fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Hydrate variants by id and run [`distribute`](Self::distribute) on them.
    ///
    /// Used by the event-driven trigger, which only knows affected IDs.
    pub fn distribute_ids(
        &self,
        ctx: &ChannelContext,
        ids: &[VariantId],
    ) -> CatalogResult<DistributionStats> {
        let variants = self.store.find_variants_by_id(ids, VariantRelations::all())?;
        if variants.is_empty() {
            debug!(requested = ids.len(), "no variants found for distribution");
            return Ok(DistributionStats::default());
        }
        self.distribute(ctx, &variants, None)
    }

    /// Run the convergence pass for each variant in turn.
    ///
    /// `ctx` is the **source** context — the channel whose mutation or
    /// reconciliation sweep triggered this call. `channels` is an optional
    /// pre-fetched directory listing; pass it during batch reconciliation
    /// to avoid re-reading the directory per batch.
    ///
    /// Per-variant and per-target failures are logged and absorbed; only a
    /// failure to list channels (when no cache was passed) propagates.
    pub fn distribute(
        &self,
        ctx: &ChannelContext,
        variants: &[Variant],
        channels: Option<&[Channel]>,
    ) -> CatalogResult<DistributionStats> {
        let fetched;
        let channels: &[Channel] = match channels {
            Some(cached) => cached,
            None => {
                fetched = self.directory.list_channels()?;
                &fetched
            }
        };

        let mut stats = DistributionStats::default();
        for variant in variants {
            if self.distribute_one(ctx, variant, channels) {
                stats.processed += 1;
            } else {
                stats.skipped += 1;
            }
        }
        Ok(stats)
    }

    /// One variant's pass. Returns `false` when the variant was skipped
    /// before any work.
    fn distribute_one(&self, ctx: &ChannelContext, variant: &Variant, channels: &[Channel]) -> bool {
        if variant.is_soft_deleted() {
            debug!(variant = %variant.id, "skipping soft-deleted variant");
            return false;
        }
        let Some(assignments) = variant.channel_ids.as_deref() else {
            warn!(variant = %variant.id, "skipping variant: channel assignments not hydrated");
            return false;
        };
        let Some(product) = variant.product.as_ref() else {
            warn!(variant = %variant.id, "skipping variant: parent product not hydrated");
            return false;
        };
        if product.channel_ids.is_none() {
            // An un-hydrated subscription set reads as "subscribed to
            // nothing" and would prune legitimate assignments.
            warn!(variant = %variant.id, "skipping variant: product channel set not hydrated");
            return false;
        }

        let owner_code = product.owner_code.as_deref();
        let targets = eligible_targets(channels, product, ctx.channel_id);

        self.bust_ghosts(ctx, variant, channels, assignments, owner_code, &targets);

        // Crash repair runs unconditionally, including for non-owner
        // sources: any client reading this variant in the source channel
        // must never hit a missing price.
        let Some(source_price) = self.repair_source_price(ctx, variant, channels) else {
            return true;
        };

        // Authority check: only the owner pushes data outward. Non-owner
        // sources stop after cleaning up their own state.
        if let Some(owner) = owner_code {
            if owner != ctx.channel_code {
                debug!(
                    variant = %variant.id,
                    owner,
                    source = %ctx.channel_code,
                    "source is not the owner, skipping propagation"
                );
                return true;
            }
        }

        self.assign_new_targets(variant, &targets);
        self.sync_prices(variant, &source_price, &targets);
        self.sync_stock(ctx, variant, &targets);
        true
    }

    /// Remove assignments that no longer satisfy eligibility.
    ///
    /// Kept: the default/platform channel, the owner channel, the source
    /// channel, and members of the valid target set. Everything else in
    /// the assignment set is a ghost.
    fn bust_ghosts(
        &self,
        ctx: &ChannelContext,
        variant: &Variant,
        channels: &[Channel],
        assignments: &[ChannelId],
        owner_code: Option<&str>,
        targets: &[&Channel],
    ) {
        let ghosts: Vec<ChannelId> = assignments
            .iter()
            .copied()
            .filter(|&id| {
                if id == ctx.channel_id {
                    return false;
                }
                if targets.iter().any(|t| t.id == id) {
                    return false;
                }
                match channels.iter().find(|c| c.id == id) {
                    Some(c) => !c.is_default && Some(c.code.as_str()) != owner_code,
                    // Not in the directory at all: nothing should keep it.
                    None => true,
                }
            })
            .collect();

        if ghosts.is_empty() {
            return;
        }

        debug!(variant = %variant.id, ghosts = ghosts.len(), "removing ghost assignments");
        if let Err(e) =
            self.directory
                .remove_from_channels(AssignableEntity::Variant, variant.id, &ghosts)
        {
            warn!(variant = %variant.id, error = %e, "ghost removal failed");
        }
    }

    /// Ensure the (variant, source channel) price row exists.
    ///
    /// Returns the authoritative source price for propagation, or `None`
    /// when it could not be read or repaired.
    fn repair_source_price(
        &self,
        ctx: &ChannelContext,
        variant: &Variant,
        channels: &[Channel],
    ) -> Option<Price> {
        let existing = match self.store.find_price(variant.id, ctx.channel_id) {
            Ok(p) => p,
            Err(e) => {
                warn!(variant = %variant.id, channel = %ctx.channel_code, error = %e, "source price lookup failed");
                return None;
            }
        };
        if let Some(price) = existing {
            return Some(price);
        }

        let currency = channels
            .iter()
            .find(|c| c.id == ctx.channel_id)
            .and_then(|c| c.default_currency.clone());
        let placeholder = Price::placeholder(variant.id, ctx.channel_id, currency);

        match self.store.upsert_price(placeholder.clone()) {
            Ok(()) => {
                debug!(variant = %variant.id, channel = %ctx.channel_code, "repaired missing price with zero placeholder");
                Some(placeholder)
            }
            Err(e) if e.is_duplicate_key() => {
                // A concurrent pass created the row between our read and
                // write; re-read it so propagation uses the real value.
                self.store
                    .find_price(variant.id, ctx.channel_id)
                    .ok()
                    .flatten()
                    .or(Some(placeholder))
            }
            Err(e) => {
                warn!(variant = %variant.id, channel = %ctx.channel_code, error = %e, "price repair failed");
                None
            }
        }
    }

    /// Create membership rows for valid targets not yet in the assignment set.
    fn assign_new_targets(&self, variant: &Variant, targets: &[&Channel]) {
        let missing: Vec<ChannelId> = targets
            .iter()
            .filter(|t| !variant.is_assigned_to(t.id))
            .map(|t| t.id)
            .collect();

        if missing.is_empty() {
            return;
        }

        match self
            .directory
            .assign_to_channels(AssignableEntity::Variant, variant.id, &missing)
        {
            Ok(()) => {
                debug!(variant = %variant.id, assigned = missing.len(), "assigned variant to new target channels");
            }
            Err(e) if e.is_duplicate_key() => {}
            Err(e) => {
                warn!(variant = %variant.id, error = %e, "target assignment failed");
            }
        }
    }

    /// Converge every valid target's price toward the source price.
    fn sync_prices(&self, variant: &Variant, source_price: &Price, targets: &[&Channel]) {
        for target in targets {
            let existing = match self.store.find_price(variant.id, target.id) {
                Ok(p) => p,
                Err(e) => {
                    warn!(variant = %variant.id, channel = %target.code, error = %e, "target price lookup failed");
                    continue;
                }
            };

            let update = match existing {
                Some(price) if price.amount == source_price.amount => continue,
                Some(price) => Price {
                    amount: source_price.amount,
                    ..price
                },
                None => Price {
                    variant_id: variant.id,
                    channel_id: target.id,
                    amount: source_price.amount,
                    currency: target
                        .default_currency
                        .clone()
                        .or_else(|| source_price.currency.clone()),
                },
            };

            match self.store.upsert_price(update) {
                Ok(()) => {}
                Err(e) if e.is_duplicate_key() => {}
                Err(e) => {
                    warn!(variant = %variant.id, channel = %target.code, error = %e, "price sync failed");
                }
            }
        }
    }

    /// Converge every valid target's stock row toward the source total.
    ///
    /// Only updates rows in place. A target without a stock row is left
    /// as-is: rows are provisioned separately, never fabricated here.
    fn sync_stock(&self, ctx: &ChannelContext, variant: &Variant, targets: &[&Channel]) {
        let total = match self.store.sum_stock(variant.id, ctx.channel_id) {
            Ok(total) => total,
            Err(e) => {
                warn!(variant = %variant.id, channel = %ctx.channel_code, error = %e, "stock total lookup failed");
                return;
            }
        };

        for target in targets {
            let target_ctx = ctx.scoped_to(target);
            let existing = match self.store.find_stock(variant.id, target_ctx.channel_id) {
                Ok(s) => s,
                Err(e) => {
                    warn!(variant = %variant.id, channel = %target.code, error = %e, "target stock lookup failed");
                    continue;
                }
            };

            let Some(level) = existing else {
                continue;
            };
            if level.stock_on_hand == total {
                continue;
            }

            if let Err(e) =
                self.store
                    .update_stock(variant.id, level.stock_location_id, total)
            {
                warn!(variant = %variant.id, channel = %target.code, error = %e, "stock sync failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syndicate_core::ProductId;

    fn channel(code: &str, is_merchant: bool, is_supplier: bool) -> Channel {
        Channel {
            id: ChannelId::new(),
            code: code.to_string(),
            is_default: false,
            is_merchant,
            is_supplier,
            default_currency: Some("EUR".to_string()),
        }
    }

    fn product(subscribed: &[ChannelId]) -> Product {
        Product {
            id: ProductId::new(),
            name: "Widget".to_string(),
            owner_code: Some("acme".to_string()),
            channel_ids: Some(subscribed.to_vec()),
            deleted_at: None,
        }
    }

    #[test]
    fn targets_require_merchant_role_and_subscription() {
        let merchant = channel("shopco", true, false);
        let supplier = channel("rogue", false, true);
        let unsubscribed = channel("other", true, false);
        let channels = vec![merchant.clone(), supplier.clone(), unsubscribed.clone()];

        let product = product(&[merchant.id, supplier.id]);
        let source = ChannelId::new();

        let targets = eligible_targets(&channels, &product, source);

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].id, merchant.id);
    }

    #[test]
    fn source_channel_is_never_its_own_target() {
        let merchant = channel("shopco", true, false);
        let channels = vec![merchant.clone()];
        let product = product(&[merchant.id]);

        let targets = eligible_targets(&channels, &product, merchant.id);

        assert!(targets.is_empty());
    }

    #[test]
    fn merchant_supplier_hybrid_is_excluded() {
        let hybrid = channel("hybrid", true, true);
        let channels = vec![hybrid.clone()];
        let product = product(&[hybrid.id]);

        let targets = eligible_targets(&channels, &product, ChannelId::new());

        assert!(targets.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: every computed target is a subscribed merchant
            /// non-supplier channel distinct from the source.
            #[test]
            fn targets_always_satisfy_eligibility(
                roles in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 0..12),
                source_index in 0usize..12,
            ) {
                let channels: Vec<Channel> = roles
                    .iter()
                    .enumerate()
                    .map(|(i, &(is_merchant, is_supplier, _))| Channel {
                        id: ChannelId::new(),
                        code: format!("ch-{i}"),
                        is_default: false,
                        is_merchant,
                        is_supplier,
                        default_currency: None,
                    })
                    .collect();

                let subscribed: Vec<ChannelId> = channels
                    .iter()
                    .zip(roles.iter())
                    .filter(|&(_, &(_, _, subscribed))| subscribed)
                    .map(|(c, _)| c.id)
                    .collect();
                let product = product(&subscribed);

                let source = channels
                    .get(source_index % channels.len().max(1))
                    .map(|c| c.id)
                    .unwrap_or_else(ChannelId::new);

                for target in eligible_targets(&channels, &product, source) {
                    prop_assert!(target.is_merchant);
                    prop_assert!(!target.is_supplier);
                    prop_assert!(product.is_subscribed(target.id));
                    prop_assert_ne!(target.id, source);
                }
            }
        }
    }
}
