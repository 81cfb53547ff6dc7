use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use shelfwise_core::{DomainError, DomainResult, Entity, ItemId, ShelfId};

use crate::validate;

pub const DEFAULT_CATEGORY: &str = "General";

/// Inventory item: a SKU-identified stock record on one shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub shelf_id: ShelfId,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Item {
    type Id = ItemId;
    const KIND: &'static str = "Item";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input: create an item on an existing shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    pub shelf_id: ShelfId,
}

impl CreateItem {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        validate::text(&mut errors, "name", &self.name, "Name is required");
        validate::text(&mut errors, "sku", &self.sku, "SKU is required");
        validate::non_negative_int(&mut errors, "quantity", self.quantity, "Quantity cannot be negative");
        validate::opt(&mut errors, "price", self.price, "Price cannot be negative", validate::non_negative);
        validate::opt_text(&mut errors, "category", self.category.as_deref(), "Category cannot be blank");
        DomainError::check_fields(errors)
    }
}

/// Input: partial item update. `description: null` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub shelf_id: Option<ShelfId>,
}

impl UpdateItem {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the patch changes how much stock sits on which shelf.
    pub fn affects_load(&self) -> bool {
        self.quantity.is_some() || self.shelf_id.is_some()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }
        let mut errors = Vec::new();
        validate::opt_text(&mut errors, "name", self.name.as_deref(), "Name is required");
        validate::opt_text(&mut errors, "sku", self.sku.as_deref(), "SKU is required");
        validate::opt(&mut errors, "quantity", self.quantity, "Quantity cannot be negative", validate::non_negative_int);
        validate::opt(&mut errors, "price", self.price, "Price cannot be negative", validate::non_negative);
        validate::opt_text(&mut errors, "category", self.category.as_deref(), "Category cannot be blank");
        DomainError::check_fields(errors)
    }
}

/// Input: add (or remove, when negative) stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustQuantity {
    pub adjustment: i64,
}

/// Input: move all or part of an item to another shelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItem {
    pub target_shelf_id: ShelfId,
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl MoveItem {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        validate::opt(&mut errors, "quantity", self.quantity, "Quantity must be positive", validate::positive_int);
        DomainError::check_fields(errors)
    }
}

impl Item {
    pub fn new(id: ItemId, input: CreateItem, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            shelf_id: input.shelf_id,
            name: input.name,
            sku: input.sku,
            description: input.description,
            quantity: input.quantity,
            price: input.price.unwrap_or(0.0),
            category: input.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate and merge a partial update. Capacity is checked by the caller,
    /// which knows the target shelf's load.
    pub fn apply(&mut self, patch: &UpdateItem, now: DateTime<Utc>) -> DomainResult<()> {
        patch.validate()?;
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(sku) = &patch.sku {
            self.sku = sku.clone();
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(shelf_id) = patch.shelf_id {
            self.shelf_id = shelf_id;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Distinguish "field absent" (`None`) from "field is null" (`Some(None)`).
pub(crate) fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn input() -> CreateItem {
        CreateItem {
            name: "Wireless Mouse".to_string(),
            sku: "TECH-MOUSE-001".to_string(),
            quantity: 150,
            description: None,
            price: Some(29.99),
            category: None,
            shelf_id: ShelfId::new(),
        }
    }

    #[test]
    fn new_defaults_category() {
        let item = Item::new(ItemId::new(), input(), test_time()).unwrap();
        assert_eq!(item.category, "General");
        assert_eq!(item.price, 29.99);
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let mut bad = input();
        bad.quantity = -1;
        match bad.validate().unwrap_err() {
            DomainError::ValidationErrors(errors) => {
                assert_eq!(errors[0].field, "quantity");
                assert_eq!(errors[0].message, "Quantity cannot be negative");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn create_requires_name_and_sku() {
        let mut bad = input();
        bad.name = String::new();
        bad.sku = " ".to_string();
        match bad.validate().unwrap_err() {
            DomainError::ValidationErrors(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn update_distinguishes_absent_and_null_description() {
        let absent: UpdateItem = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: UpdateItem = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let mut item = Item::new(ItemId::new(), input(), test_time()).unwrap();
        item.description = Some("old".to_string());
        item.apply(&cleared, test_time()).unwrap();
        assert_eq!(item.description, None);
    }

    #[test]
    fn affects_load_only_for_quantity_or_shelf() {
        let rename = UpdateItem {
            name: Some("Mouse".to_string()),
            ..Default::default()
        };
        assert!(!rename.affects_load());

        let restock = UpdateItem {
            quantity: Some(3),
            ..Default::default()
        };
        assert!(restock.affects_load());
    }

    #[test]
    fn move_quantity_must_be_positive_when_present() {
        let mv = MoveItem {
            target_shelf_id: ShelfId::new(),
            quantity: Some(0),
        };
        assert!(mv.validate().is_err());

        let whole = MoveItem {
            target_shelf_id: ShelfId::new(),
            quantity: None,
        };
        assert!(whole.validate().is_ok());
    }
}
