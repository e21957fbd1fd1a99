use serde::{Deserialize, Serialize};

use syndicate_core::ChannelId;

use crate::channel::Channel;

/// Immutable execution context: which channel a read or write is scoped to,
/// plus the session/language it runs under.
///
/// Never shared mutable state — rescoping produces a new value. The engine
/// rescopes whenever it must touch state "as seen by" a channel other than
/// the one that triggered the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelContext {
    pub channel_id: ChannelId,
    pub channel_code: String,
    pub language_code: String,
    pub session_token: Option<String>,
    pub authorized: bool,
}

impl ChannelContext {
    pub fn new(channel: &Channel, language_code: impl Into<String>) -> Self {
        Self {
            channel_id: channel.id,
            channel_code: channel.code.clone(),
            language_code: language_code.into(),
            session_token: None,
            authorized: true,
        }
    }

    pub fn with_session(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Produce an equivalent context scoped to `channel`.
    ///
    /// Session and language carry over; the result is always authorized and
    /// never owner-restricted, so cross-channel reads and writes are not
    /// blocked by the triggering request's permissions.
    pub fn scoped_to(&self, channel: &Channel) -> Self {
        Self {
            channel_id: channel.id,
            channel_code: channel.code.clone(),
            language_code: self.language_code.clone(),
            session_token: self.session_token.clone(),
            authorized: true,
        }
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
    fn scoping_swaps_channel_and_keeps_session() {
        let base = ChannelContext::new(&channel("acme"), "en").with_session("tok-1");
        let target = channel("shopco");

        let scoped = base.scoped_to(&target);

        assert_eq!(scoped.channel_id, target.id);
        assert_eq!(scoped.channel_code, "shopco");
        assert_eq!(scoped.language_code, "en");
        assert_eq!(scoped.session_token.as_deref(), Some("tok-1"));
        assert!(scoped.authorized);

        // The base is untouched.
        assert_eq!(base.channel_code, "acme");
    }
}
