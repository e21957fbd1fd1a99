//! `syndicate-catalog` — catalog records and collaborator contracts.
//!
//! Domain records (channels, products, variants, prices, stock) plus the
//! two collaborator traits the distribution engine is written against:
//! [`CatalogStore`] and [`ChannelDirectory`]. Implementations live in
//! `syndicate-infra` (in-memory) or behind a real database adapter.

pub mod channel;
pub mod context;
pub mod error;
pub mod price;
pub mod product;
pub mod stock;
pub mod store;
pub mod variant;

pub use channel::Channel;
pub use context::ChannelContext;
pub use error::{CatalogError, CatalogResult};
pub use price::Price;
pub use product::Product;
pub use stock::{StockLevel, StockLocation};
pub use store::{AssignableEntity, CatalogStore, ChannelDirectory, Page};
pub use variant::{Variant, VariantRelations};
