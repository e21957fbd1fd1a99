use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use syndicate_core::{ChannelId, Entity, ProductId};

/// A catalog product: the parent grouping of one or more variants.
///
/// `channel_ids` is the **parent subscription set** — the channels that
/// subscribed to see this product at all. It is the coarse relationship
/// administrative subscribe/unsubscribe actions maintain; the per-variant
/// assignment set is the narrower, currently-materialized subset the
/// distribution engine reconciles against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Code of the channel that created this product. The owner is the
    /// sole source of truth for price/stock propagation.
    pub owner_code: Option<String>,
    /// Parent channel subscriptions. `None` means the relation was not
    /// hydrated, which is distinct from "subscribed to nothing" — pruning
    /// decisions must not be made against an un-hydrated set.
    pub channel_ids: Option<Vec<ChannelId>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    pub fn is_subscribed(&self, channel_id: ChannelId) -> bool {
        self.channel_ids
            .as_deref()
            .is_some_and(|ids| ids.contains(&channel_id))
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
