//! Shelf capacity rules.
//!
//! A shelf's *load* is the sum of the quantities of the items on it. No write
//! may push a shelf's load above its capacity. Persistence adapters call these
//! functions inside the same lock/transaction that performs the write.

use chrono::{DateTime, Utc};

use shelfwise_core::{DomainError, DomainResult, ItemId};

use crate::item::Item;
use crate::shelf::Shelf;

/// Sum of item quantities.
pub fn shelf_load<'a>(items: impl IntoIterator<Item = &'a Item>) -> i64 {
    items.into_iter().map(|i| i.quantity).sum()
}

/// Fail when adding `quantity` to a shelf already holding `load` exceeds `capacity`.
pub fn ensure_fits(capacity: i64, load: i64, quantity: i64) -> DomainResult<()> {
    match load.checked_add(quantity) {
        Some(total) if total <= capacity => Ok(()),
        _ => Err(DomainError::invariant("shelf capacity exceeded")),
    }
}

/// Fail when a shelf's capacity is reduced below what it already holds.
pub fn ensure_capacity_covers_load(capacity: i64, load: i64) -> DomainResult<()> {
    if load > capacity {
        return Err(DomainError::invariant(format!(
            "capacity {capacity} is below current shelf load {load}"
        )));
    }
    Ok(())
}

/// Compute the quantity after applying `adjustment` to `item`.
///
/// `other_load` is the load of the item's shelf excluding the item itself.
pub fn plan_adjustment(item: &Item, shelf: &Shelf, other_load: i64, adjustment: i64) -> DomainResult<i64> {
    let quantity = item
        .quantity
        .checked_add(adjustment)
        .ok_or_else(|| DomainError::validation("adjustment out of range"))?;
    if quantity < 0 {
        return Err(DomainError::invariant("quantity cannot be negative"));
    }
    ensure_fits(shelf.capacity, other_load, quantity)?;
    Ok(quantity)
}

/// What a move does to the stored items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovePlan {
    /// The whole item changes shelf.
    Relocate,
    /// Part of the stock moves; `remaining` stays on the source item.
    Split {
        moved: i64,
        remaining: i64,
        destination: SplitDestination,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitDestination {
    /// The target shelf already stocks this product; bump that item.
    MergeInto { item_id: ItemId, quantity: i64 },
    /// Create a new item on the target shelf.
    Create { sku: String },
}

const SPLIT_MARKER: &str = "-split-";

/// The SKU an item was split from (`"ABC-split-1700000000000"` -> `"ABC"`).
pub fn base_sku(sku: &str) -> &str {
    match sku.rfind(SPLIT_MARKER) {
        Some(pos) => {
            let suffix = &sku[pos + SPLIT_MARKER.len()..];
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                &sku[..pos]
            } else {
                sku
            }
        }
        None => sku,
    }
}

/// Plan moving `requested` units (default: all) of `item` onto `target`.
///
/// `target_items` are the items currently on the target shelf.
pub fn plan_move(
    item: &Item,
    target: &Shelf,
    target_items: &[Item],
    requested: Option<i64>,
    now: DateTime<Utc>,
) -> DomainResult<MovePlan> {
    if item.shelf_id == target.id {
        return Err(DomainError::validation("item is already on the target shelf"));
    }

    let quantity = requested.unwrap_or(item.quantity);
    if quantity > item.quantity {
        return Err(DomainError::invariant("cannot move more than available quantity"));
    }
    if quantity <= 0 {
        return Err(DomainError::invariant("move quantity must be positive"));
    }

    let target_load = shelf_load(target_items);
    ensure_fits(target.capacity, target_load, quantity)
        .map_err(|_| DomainError::invariant("target shelf capacity exceeded"))?;

    if quantity == item.quantity {
        return Ok(MovePlan::Relocate);
    }

    let base = base_sku(&item.sku);
    let destination = match target_items.iter().find(|i| base_sku(&i.sku) == base) {
        Some(existing) => SplitDestination::MergeInto {
            item_id: existing.id,
            quantity: existing.quantity + quantity,
        },
        None => SplitDestination::Create {
            sku: format!("{base}{SPLIT_MARKER}{}", now.timestamp_millis()),
        },
    };

    Ok(MovePlan::Split {
        moved: quantity,
        remaining: item.quantity - quantity,
        destination,
    })
}
