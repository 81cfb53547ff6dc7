//! Infrastructure layer: persistence, configuration, seed data.

pub mod config;
pub mod seed;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StoreError, StoreResult};
