//! In-memory catalog for tests/dev.
//!
//! One struct backs both collaborator traits, the same way one database
//! would: channel assignments written through [`ChannelDirectory`] are
//! visible to variant hydration through [`CatalogStore`]. Share it as
//! `Arc<InMemoryCatalog>` — both traits have blanket `Arc` impls.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};

use syndicate_catalog::{
    AssignableEntity, CatalogError, CatalogResult, CatalogStore, Channel, ChannelDirectory, Page,
    Price, Product, StockLevel, StockLocation, Variant, VariantRelations,
};
use syndicate_core::{ChannelId, ProductId, StockLocationId, VariantId};

#[derive(Debug, Clone)]
struct VariantRecord {
    id: VariantId,
    product_id: ProductId,
    sku: String,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct State {
    channels: Vec<Channel>,
    products: HashMap<ProductId, Product>,
    variants: HashMap<VariantId, VariantRecord>,
    /// Channel assignment rows, keyed by variant.
    assignments: HashMap<VariantId, BTreeSet<ChannelId>>,
    prices: HashMap<(VariantId, ChannelId), Price>,
    locations: Vec<StockLocation>,
    stock: HashMap<(VariantId, StockLocationId), i64>,
}

/// In-memory catalog store + channel directory.
///
/// Tracks a count of effective write operations so convergence tests can
/// assert "a second pass writes nothing".
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: RwLock<State>,
    write_ops: AtomicU64,
    fail_channel_queries: AtomicBool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes that actually changed state since construction.
    pub fn write_ops(&self) -> u64 {
        self.write_ops.load(Ordering::SeqCst)
    }

    /// Make channel-scoped variant queries fail (collaborator outage).
    pub fn set_channel_query_failure(&self, fail: bool) {
        self.fail_channel_queries.store(fail, Ordering::SeqCst);
    }

    // --- seeding / inspection -------------------------------------------

    pub fn add_channel(&self, channel: Channel) {
        let mut s = self.state.write().expect("catalog lock poisoned");
        s.channels.push(channel);
    }

    pub fn add_product(&self, product: Product) {
        let mut s = self.state.write().expect("catalog lock poisoned");
        s.products.insert(product.id, product);
    }

    pub fn add_variant(
        &self,
        id: VariantId,
        product_id: ProductId,
        sku: &str,
        assigned: &[ChannelId],
    ) {
        let mut s = self.state.write().expect("catalog lock poisoned");
        s.variants.insert(
            id,
            VariantRecord {
                id,
                product_id,
                sku: sku.to_string(),
                deleted_at: None,
            },
        );
        s.assignments.insert(id, assigned.iter().copied().collect());
    }

    pub fn soft_delete_variant(&self, id: VariantId) {
        let mut s = self.state.write().expect("catalog lock poisoned");
        if let Some(v) = s.variants.get_mut(&id) {
            v.deleted_at = Some(Utc::now());
        }
    }

    /// Seed a price row directly (bypasses write counting).
    pub fn set_price(&self, price: Price) {
        let mut s = self.state.write().expect("catalog lock poisoned");
        s.prices.insert((price.variant_id, price.channel_id), price);
    }

    pub fn add_stock_location(&self, location: StockLocation) {
        let mut s = self.state.write().expect("catalog lock poisoned");
        s.locations.push(location);
    }

    /// Seed a stock row directly (bypasses write counting).
    pub fn set_stock(&self, variant_id: VariantId, location_id: StockLocationId, qty: i64) {
        let mut s = self.state.write().expect("catalog lock poisoned");
        s.stock.insert((variant_id, location_id), qty);
    }

    /// Current assignment set of a variant, sorted.
    pub fn assignments(&self, variant_id: VariantId) -> Vec<ChannelId> {
        let s = self.state.read().expect("catalog lock poisoned");
        s.assignments
            .get(&variant_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn price(&self, variant_id: VariantId, channel_id: ChannelId) -> Option<Price> {
        let s = self.state.read().expect("catalog lock poisoned");
        s.prices.get(&(variant_id, channel_id)).cloned()
    }

    pub fn stock(&self, variant_id: VariantId, location_id: StockLocationId) -> Option<i64> {
        let s = self.state.read().expect("catalog lock poisoned");
        s.stock.get(&(variant_id, location_id)).copied()
    }

    // --- internals -------------------------------------------------------

    fn count_write(&self) {
        self.write_ops.fetch_add(1, Ordering::SeqCst);
    }

    fn hydrate(&self, s: &State, record: &VariantRecord, relations: VariantRelations) -> Variant {
        let channel_ids = relations.channels.then(|| {
            s.assignments
                .get(&record.id)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default()
        });

        let product = if relations.product {
            s.products.get(&record.product_id).cloned().map(|mut p| {
                if !relations.product_channels {
                    // Not hydrated is not the same as empty.
                    p.channel_ids = None;
                }
                p
            })
        } else {
            None
        };

        Variant {
            id: record.id,
            product_id: record.product_id,
            sku: record.sku.clone(),
            deleted_at: record.deleted_at,
            channel_ids,
            product,
        }
    }
}

impl CatalogStore for InMemoryCatalog {
    fn find_variants_by_id(
        &self,
        ids: &[VariantId],
        relations: VariantRelations,
    ) -> CatalogResult<Vec<Variant>> {
        let s = self.state.read().expect("catalog lock poisoned");
        Ok(ids
            .iter()
            .filter_map(|id| s.variants.get(id))
            .map(|record| self.hydrate(&s, record, relations))
            .collect())
    }

    fn find_variants_by_channel(
        &self,
        channel_id: ChannelId,
        page: Page,
    ) -> CatalogResult<Vec<Variant>> {
        if self.fail_channel_queries.load(Ordering::SeqCst) {
            return Err(CatalogError::unavailable("channel variant query failed"));
        }

        let s = self.state.read().expect("catalog lock poisoned");
        let mut records: Vec<&VariantRecord> = s
            .variants
            .values()
            .filter(|v| v.deleted_at.is_none())
            .filter(|v| {
                s.assignments
                    .get(&v.id)
                    .is_some_and(|set| set.contains(&channel_id))
            })
            .collect();
        // Stable order so skip/take paging is consistent across calls.
        records.sort_by_key(|v| *v.id.as_uuid());

        Ok(records
            .into_iter()
            .skip(page.skip)
            .take(page.take)
            .map(|record| self.hydrate(&s, record, VariantRelations::all()))
            .collect())
    }

    fn find_price(
        &self,
        variant_id: VariantId,
        channel_id: ChannelId,
    ) -> CatalogResult<Option<Price>> {
        let s = self.state.read().expect("catalog lock poisoned");
        Ok(s.prices.get(&(variant_id, channel_id)).cloned())
    }

    fn upsert_price(&self, price: Price) -> CatalogResult<()> {
        let mut s = self.state.write().expect("catalog lock poisoned");
        let key = (price.variant_id, price.channel_id);
        let changed = s.prices.get(&key) != Some(&price);
        s.prices.insert(key, price);
        drop(s);
        if changed {
            self.count_write();
        }
        Ok(())
    }

    fn sum_stock(&self, variant_id: VariantId, visible_to: ChannelId) -> CatalogResult<i64> {
        let s = self.state.read().expect("catalog lock poisoned");
        Ok(s.locations
            .iter()
            .filter(|loc| loc.is_visible_to(visible_to))
            .filter_map(|loc| s.stock.get(&(variant_id, loc.id)))
            .sum())
    }

    fn find_stock(
        &self,
        variant_id: VariantId,
        channel_id: ChannelId,
    ) -> CatalogResult<Option<StockLevel>> {
        let s = self.state.read().expect("catalog lock poisoned");
        let mut visible: Vec<&StockLocation> = s
            .locations
            .iter()
            .filter(|loc| loc.is_visible_to(channel_id))
            .collect();
        visible.sort_by_key(|loc| *loc.id.as_uuid());

        Ok(visible.into_iter().find_map(|loc| {
            s.stock
                .get(&(variant_id, loc.id))
                .map(|&qty| StockLevel {
                    variant_id,
                    stock_location_id: loc.id,
                    stock_on_hand: qty,
                })
        }))
    }

    fn update_stock(
        &self,
        variant_id: VariantId,
        stock_location_id: StockLocationId,
        stock_on_hand: i64,
    ) -> CatalogResult<()> {
        let mut s = self.state.write().expect("catalog lock poisoned");
        let key = (variant_id, stock_location_id);
        let Some(existing) = s.stock.get_mut(&key) else {
            return Err(CatalogError::not_found(format!(
                "no stock row for variant {variant_id} at location {stock_location_id}"
            )));
        };
        let changed = *existing != stock_on_hand;
        *existing = stock_on_hand;
        drop(s);
        if changed {
            self.count_write();
        }
        Ok(())
    }
}

impl ChannelDirectory for InMemoryCatalog {
    fn list_channels(&self) -> CatalogResult<Vec<Channel>> {
        let s = self.state.read().expect("catalog lock poisoned");
        let mut channels = s.channels.clone();
        channels.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(channels)
    }

    fn assign_to_channels(
        &self,
        _entity: AssignableEntity,
        entity_id: VariantId,
        channel_ids: &[ChannelId],
    ) -> CatalogResult<()> {
        let mut s = self.state.write().expect("catalog lock poisoned");
        let set = s.assignments.entry(entity_id).or_default();
        let mut inserted = false;
        for id in channel_ids {
            inserted |= set.insert(*id);
        }
        drop(s);

        if inserted {
            self.count_write();
            Ok(())
        } else if channel_ids.is_empty() {
            Ok(())
        } else {
            // Every requested membership already existed: surface the same
            // uniqueness collision a database insert would.
            Err(CatalogError::duplicate_key(format!(
                "variant {entity_id} already assigned to requested channels"
            )))
        }
    }

    fn remove_from_channels(
        &self,
        _entity: AssignableEntity,
        entity_id: VariantId,
        channel_ids: &[ChannelId],
    ) -> CatalogResult<()> {
        let mut s = self.state.write().expect("catalog lock poisoned");
        let Some(set) = s.assignments.get_mut(&entity_id) else {
            return Ok(());
        };
        let mut removed = false;
        for id in channel_ids {
            removed |= set.remove(id);
        }
        drop(s);

        if removed {
            self.count_write();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(code: &str) -> Channel {
        Channel {
            id: ChannelId::new(),
            code: code.to_string(),
            is_default: false,
            is_merchant: true,
            is_supplier: false,
            default_currency: Some("USD".to_string()),
        }
    }

    #[test]
    fn assignments_written_via_directory_are_visible_to_hydration() {
        let catalog = InMemoryCatalog::new();
        let ch = channel("acme");
        catalog.add_channel(ch.clone());

        let product_id = ProductId::new();
        catalog.add_product(Product {
            id: product_id,
            name: "Widget".to_string(),
            owner_code: Some("acme".to_string()),
            channel_ids: Some(vec![]),
            deleted_at: None,
        });

        let variant_id = VariantId::new();
        catalog.add_variant(variant_id, product_id, "SKU-1", &[]);
        catalog
            .assign_to_channels(AssignableEntity::Variant, variant_id, &[ch.id])
            .unwrap();

        let hydrated = catalog
            .find_variants_by_id(&[variant_id], VariantRelations::all())
            .unwrap();
        assert_eq!(hydrated.len(), 1);
        assert!(hydrated[0].is_assigned_to(ch.id));
    }

    #[test]
    fn reassigning_existing_membership_is_a_duplicate_key() {
        let catalog = InMemoryCatalog::new();
        let ch = channel("acme");
        let variant_id = VariantId::new();
        catalog.add_variant(variant_id, ProductId::new(), "SKU-1", &[ch.id]);

        let err = catalog
            .assign_to_channels(AssignableEntity::Variant, variant_id, &[ch.id])
            .unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[test]
    fn update_stock_refuses_to_create_rows() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .update_stock(VariantId::new(), StockLocationId::new(), 5)
            .unwrap_err();
        match err {
            CatalogError::NotFound(_) => {}
            _ => panic!("expected NotFound for absent stock row"),
        }
    }

    #[test]
    fn unchanged_writes_do_not_count() {
        let catalog = InMemoryCatalog::new();
        let price = Price {
            variant_id: VariantId::new(),
            channel_id: ChannelId::new(),
            amount: 100,
            currency: None,
        };

        catalog.upsert_price(price.clone()).unwrap();
        assert_eq!(catalog.write_ops(), 1);

        catalog.upsert_price(price).unwrap();
        assert_eq!(catalog.write_ops(), 1);
    }
}
