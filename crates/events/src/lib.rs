//! `syndicate-events` — catalog change notifications.
//!
//! A lightweight pub/sub seam between catalog mutations and the
//! distribution engine's event-driven trigger.

pub mod bus;
pub mod in_memory_bus;
pub mod variant_changed;

pub use bus::{NotificationBus, Subscription};
pub use in_memory_bus::{InMemoryBusError, InMemoryNotificationBus};
pub use variant_changed::{VariantChangeType, VariantChanged};
