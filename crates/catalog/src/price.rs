use serde::{Deserialize, Serialize};

use syndicate_core::{ChannelId, VariantId};

/// Per-channel price row for a variant. At most one per (variant, channel).
///
/// `amount` is in the smallest currency unit (e.g. cents). A zero price is
/// a valid, deliberate placeholder: it is what crash repair writes so
/// clients never read a missing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub variant_id: VariantId,
    pub channel_id: ChannelId,
    pub amount: i64,
    /// ISO currency code; `None` falls back to the channel default.
    pub currency: Option<String>,
}

impl Price {
    /// The zero-valued placeholder written by crash repair.
    pub fn placeholder(
        variant_id: VariantId,
        channel_id: ChannelId,
        currency: Option<String>,
    ) -> Self {
        Self {
            variant_id,
            channel_id,
            amount: 0,
            currency,
        }
    }
}
