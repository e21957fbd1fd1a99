//! Infrastructure layer: catalog store / channel directory adapters.
//!
//! Currently ships the in-memory implementation used by tests and dev
//! setups. A database-backed adapter implements the same two traits.

pub mod memory;


pub use memory::InMemoryCatalog;
