//! HTTP client for the Shelfwise API with an optimistic shelf cache.
//!
//! The floor-plan editor moves a shelf locally first and reconciles with the
//! server afterwards; [`update_shelf_optimistic`] is that round trip.

pub mod api;
pub mod cache;
pub mod error;
pub mod optimistic;

pub use api::{ApiClient, ShelfApi, ShelfSnapshot, WarehouseSnapshot};
pub use cache::{MutationContext, WarehouseCache};
pub use error::ClientError;
pub use optimistic::{refresh, update_shelf_optimistic};
