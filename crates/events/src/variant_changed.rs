use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use syndicate_catalog::ChannelContext;
use syndicate_core::VariantId;

/// What kind of catalog mutation produced the notification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantChangeType {
    Created,
    Updated,
}

/// Notification that one or more variants were created or updated.
///
/// Carries variant IDs only, not entity snapshots — consumers re-read the
/// variants (after a short settle delay) so they act on current state
/// rather than a possibly stale payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantChanged {
    /// Context the triggering mutation ran under. Its channel is treated as
    /// the distribution source.
    pub ctx: ChannelContext,
    pub variant_ids: Vec<VariantId>,
    pub change_type: VariantChangeType,
    pub occurred_at: DateTime<Utc>,
}

impl VariantChanged {
    pub fn new(
        ctx: ChannelContext,
        variant_ids: Vec<VariantId>,
        change_type: VariantChangeType,
    ) -> Self {
        Self {
            ctx,
            variant_ids,
            change_type,
            occurred_at: Utc::now(),
        }
    }
}
