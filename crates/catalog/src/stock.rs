use serde::{Deserialize, Serialize};

use syndicate_core::{ChannelId, Entity, StockLocationId, VariantId};

/// A warehouse/location stock can sit at, visible to a set of channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: StockLocationId,
    pub name: String,
    /// Channels that can see (and sell from) this location.
    pub channel_ids: Vec<ChannelId>,
}

impl StockLocation {
    pub fn is_visible_to(&self, channel_id: ChannelId) -> bool {
        self.channel_ids.contains(&channel_id)
    }
}

impl Entity for StockLocation {
    type Id = StockLocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Stock-on-hand of one variant at one location.
///
/// Stock rows are provisioned outside the distribution engine; the engine
/// only ever updates values in place, it never fabricates rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub variant_id: VariantId,
    pub stock_location_id: StockLocationId,
    pub stock_on_hand: i64,
}
