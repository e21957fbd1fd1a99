use serde::{Deserialize, Serialize};

use syndicate_core::{ChannelId, Entity};

/// A sales channel: one tenant/storefront partition of the catalog.
///
/// Role flags decide what a channel may do with catalog items it did not
/// create itself:
/// - **merchant** channels may resell other channels' items,
/// - **supplier** channels may not resell outward,
/// - the **default** (platform) channel is protected and never pruned
///   from a variant's assignment set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// Unique short name, e.g. `"acme"`. Products record their owning
    /// channel by code, not by id.
    pub code: String,
    pub is_default: bool,
    pub is_merchant: bool,
    pub is_supplier: bool,
    /// ISO currency code used when creating price rows in this channel.
    pub default_currency: Option<String>,
}

impl Channel {
    /// Whether this channel is role-eligible to receive resold variants.
    ///
    /// Supplier channels are excluded even when they also carry the
    /// merchant flag.
    pub fn is_eligible_reseller(&self) -> bool {
        self.is_merchant && !self.is_supplier
    }
}

impl Entity for Channel {
    type Id = ChannelId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(is_merchant: bool, is_supplier: bool) -> Channel {
        Channel {
            id: ChannelId::new(),
            code: "test".to_string(),
            is_default: false,
            is_merchant,
            is_supplier,
            default_currency: Some("EUR".to_string()),
        }
    }

    #[test]
    fn merchant_channel_is_eligible_reseller() {
        assert!(channel(true, false).is_eligible_reseller());
    }

    #[test]
    fn supplier_channel_is_never_eligible() {
        assert!(!channel(false, true).is_eligible_reseller());
        // Supplier flag wins even when the merchant flag is also set.
        assert!(!channel(true, true).is_eligible_reseller());
    }

    #[test]
    fn plain_channel_is_not_eligible() {
        assert!(!channel(false, false).is_eligible_reseller());
    }
}
