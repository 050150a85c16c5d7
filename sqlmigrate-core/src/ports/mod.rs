//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The migrator
//! depends only on these traits, not on concrete implementations.

mod store;

pub use store::MigrationStore;
