//! Shared domain building blocks: typed ids, errors and the entity trait.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldError};
pub use id::{ItemId, ShelfId, WarehouseId};
