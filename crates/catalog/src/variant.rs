use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use syndicate_core::{ChannelId, Entity, ProductId, VariantId};

use crate::product::Product;

/// Which relations to hydrate when fetching variants.
///
/// The engine needs assignments, the parent product, and the product's
/// subscription set; a store may skip hydration it was not asked for, and
/// the engine treats un-hydrated relations as fatal to that variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct VariantRelations {
    pub channels: bool,
    pub product: bool,
    pub product_channels: bool,
}

impl VariantRelations {
    /// Everything the distribution engine requires.
    pub fn all() -> Self {
        Self {
            channels: true,
            product: true,
            product_channels: true,
        }
    }
}

/// A purchasable product variant.
///
/// Relation fields are `Option`: `None` means "not hydrated", which is
/// distinct from "hydrated and empty". The distribution engine skips
/// variants whose required relations were not hydrated rather than
/// guessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Channel assignment set: channels that currently have a row granting
    /// visibility of this variant.
    pub channel_ids: Option<Vec<ChannelId>>,
    /// Parent product (with its subscription set, when hydrated).
    pub product: Option<Product>,
}

impl Variant {
    pub fn is_soft_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn is_assigned_to(&self, channel_id: ChannelId) -> bool {
        self.channel_ids
            .as_deref()
            .is_some_and(|ids| ids.contains(&channel_id))
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn variant() -> Variant {
        Variant {
            id: VariantId::new(),
            product_id: ProductId::new(),
            sku: "SKU-001".to_string(),
            deleted_at: None,
            channel_ids: None,
            product: None,
        }
    }

    #[test]
    fn soft_delete_is_detected() {
        let mut v = variant();
        assert!(!v.is_soft_deleted());
        v.deleted_at = Some(Utc::now());
        assert!(v.is_soft_deleted());
    }

    #[test]
    fn unhydrated_assignments_mean_not_assigned() {
        let mut v = variant();
        let channel = ChannelId::new();
        assert!(!v.is_assigned_to(channel));

        v.channel_ids = Some(vec![channel]);
        assert!(v.is_assigned_to(channel));
        assert!(!v.is_assigned_to(ChannelId::new()));
    }
}
