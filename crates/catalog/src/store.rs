//! Collaborator contracts for the distribution engine.
//!
//! The engine is written against these two traits so real adapters and
//! in-memory fakes are interchangeable. Both are object-safe and get a
//! blanket `Arc` impl so collaborators can be shared across the engine,
//! the event-driven worker, and the reconciler.

use std::sync::Arc;

use syndicate_core::{ChannelId, StockLocationId, VariantId};

use crate::channel::Channel;
use crate::error::CatalogResult;
use crate::price::Price;
use crate::stock::StockLevel;
use crate::variant::{Variant, VariantRelations};

/// Skip/take paging window for batch sweeps.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Page {
    pub skip: usize,
    pub take: usize,
}

impl Page {
    pub fn new(skip: usize, take: usize) -> Self {
        Self { skip, take }
    }
}

/// Entity kinds that can be assigned to channels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssignableEntity {
    Variant,
}

/// Read/write access to catalog state (variants, prices, stock).
///
/// Implementations must make every write idempotent in effect: writing a
/// value that is already present is a no-op, and inserting a row that
/// already exists raises [`CatalogError::DuplicateKey`](crate::CatalogError::DuplicateKey)
/// rather than corrupting state.
pub trait CatalogStore: Send + Sync {
    /// Fetch variants by id, hydrating the requested relations.
    ///
    /// Unknown ids are silently omitted from the result.
    fn find_variants_by_id(
        &self,
        ids: &[VariantId],
        relations: VariantRelations,
    ) -> CatalogResult<Vec<Variant>>;

    /// Page through a channel's non-deleted variants, fully hydrated.
    fn find_variants_by_channel(
        &self,
        channel_id: ChannelId,
        page: Page,
    ) -> CatalogResult<Vec<Variant>>;

    fn find_price(
        &self,
        variant_id: VariantId,
        channel_id: ChannelId,
    ) -> CatalogResult<Option<Price>>;

    /// Insert or update the price row for (variant, channel).
    fn upsert_price(&self, price: Price) -> CatalogResult<()>;

    /// Total stock-on-hand across all stock locations visible to a channel.
    fn sum_stock(&self, variant_id: VariantId, visible_to: ChannelId) -> CatalogResult<i64>;

    /// The stock row a channel sells from, if one was provisioned.
    fn find_stock(
        &self,
        variant_id: VariantId,
        channel_id: ChannelId,
    ) -> CatalogResult<Option<StockLevel>>;

    /// Update an existing stock row in place. Never creates rows.
    fn update_stock(
        &self,
        variant_id: VariantId,
        stock_location_id: StockLocationId,
        stock_on_hand: i64,
    ) -> CatalogResult<()>;
}

/// Channel enumeration and entity-to-channel membership.
pub trait ChannelDirectory: Send + Sync {
    fn list_channels(&self) -> CatalogResult<Vec<Channel>>;

    /// Create membership rows granting `channel_ids` visibility of the entity.
    fn assign_to_channels(
        &self,
        entity: AssignableEntity,
        entity_id: VariantId,
        channel_ids: &[ChannelId],
    ) -> CatalogResult<()>;

    /// Remove membership rows. Removing an absent membership is a no-op.
    fn remove_from_channels(
        &self,
        entity: AssignableEntity,
        entity_id: VariantId,
        channel_ids: &[ChannelId],
    ) -> CatalogResult<()>;
}

impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    fn find_variants_by_id(
        &self,
        ids: &[VariantId],
        relations: VariantRelations,
    ) -> CatalogResult<Vec<Variant>> {
        (**self).find_variants_by_id(ids, relations)
    }

    fn find_variants_by_channel(
        &self,
        channel_id: ChannelId,
        page: Page,
    ) -> CatalogResult<Vec<Variant>> {
        (**self).find_variants_by_channel(channel_id, page)
    }

    fn find_price(
        &self,
        variant_id: VariantId,
        channel_id: ChannelId,
    ) -> CatalogResult<Option<Price>> {
        (**self).find_price(variant_id, channel_id)
    }

    fn upsert_price(&self, price: Price) -> CatalogResult<()> {
        (**self).upsert_price(price)
    }

    fn sum_stock(&self, variant_id: VariantId, visible_to: ChannelId) -> CatalogResult<i64> {
        (**self).sum_stock(variant_id, visible_to)
    }

    fn find_stock(
        &self,
        variant_id: VariantId,
        channel_id: ChannelId,
    ) -> CatalogResult<Option<StockLevel>> {
        (**self).find_stock(variant_id, channel_id)
    }

    fn update_stock(
        &self,
        variant_id: VariantId,
        stock_location_id: StockLocationId,
        stock_on_hand: i64,
    ) -> CatalogResult<()> {
        (**self).update_stock(variant_id, stock_location_id, stock_on_hand)
    }
}

impl<D> ChannelDirectory for Arc<D>
where
    D: ChannelDirectory + ?Sized,
{
    fn list_channels(&self) -> CatalogResult<Vec<Channel>> {
        (**self).list_channels()
    }

    fn assign_to_channels(
        &self,
        entity: AssignableEntity,
        entity_id: VariantId,
        channel_ids: &[ChannelId],
    ) -> CatalogResult<()> {
        (**self).assign_to_channels(entity, entity_id, channel_ids)
    }

    fn remove_from_channels(
        &self,
        entity: AssignableEntity,
        entity_id: VariantId,
        channel_ids: &[ChannelId],
    ) -> CatalogResult<()> {
        (**self).remove_from_channels(entity, entity_id, channel_ids)
    }
}
