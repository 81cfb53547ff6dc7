use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfwise_core::{DomainError, DomainResult, Entity, WarehouseId};

use crate::layout::Bounds;
use crate::validate;

/// Warehouse: top-level container with physical dimensions and a layout grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub location: String,
    pub description: Option<String>,
    pub capacity: i64,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub grid_size: f64,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Warehouse {
    type Id = WarehouseId;
    const KIND: &'static str = "Warehouse";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input: create a warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouse {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    pub capacity: i64,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub grid_size: Option<f64>,
}

impl CreateWarehouse {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        validate::text(&mut errors, "name", &self.name, "Name is required");
        validate::text(&mut errors, "location", &self.location, "Location is required");
        validate::positive_int(&mut errors, "capacity", self.capacity, "Capacity must be positive");
        validate::opt(&mut errors, "width", self.width, "Width must be positive", validate::positive);
        validate::opt(&mut errors, "length", self.length, "Length must be positive", validate::positive);
        validate::opt(&mut errors, "height", self.height, "Height must be positive", validate::positive);
        validate::opt(&mut errors, "gridSize", self.grid_size, "Grid size must be positive", validate::positive);
        DomainError::check_fields(errors)
    }
}

/// Input: partial warehouse update. At least one field must be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehouse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "crate::item::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub grid_size: Option<f64>,
}

impl UpdateWarehouse {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.capacity.is_none()
            && self.width.is_none()
            && self.length.is_none()
            && self.height.is_none()
            && self.grid_size.is_none()
    }

    /// True when the floor plan changes size, so shelves must be rechecked.
    pub fn resizes_floor(&self) -> bool {
        self.width.is_some() || self.length.is_some()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }
        let mut errors = Vec::new();
        validate::opt_text(&mut errors, "name", self.name.as_deref(), "Name is required");
        validate::opt_text(&mut errors, "location", self.location.as_deref(), "Location is required");
        validate::opt(&mut errors, "capacity", self.capacity, "Capacity must be positive", validate::positive_int);
        validate::opt(&mut errors, "width", self.width, "Width must be positive", validate::positive);
        validate::opt(&mut errors, "length", self.length, "Length must be positive", validate::positive);
        validate::opt(&mut errors, "height", self.height, "Height must be positive", validate::positive);
        validate::opt(&mut errors, "gridSize", self.grid_size, "Grid size must be positive", validate::positive);
        DomainError::check_fields(errors)
    }
}

/// Defaults used when the single-warehouse view needs a warehouse and none exists yet.
pub struct DefaultWarehouse;

impl DefaultWarehouse {
    pub const NAME: &'static str = "Default Warehouse";
    pub const LOCATION: &'static str = "1234 Industrial Parkway, Portland, OR 97201";
    pub const DESCRIPTION: &'static str = "Primary distribution facility (default)";
    pub const CAPACITY: i64 = 50_000;
    pub const WIDTH: f64 = 20.0;
    pub const LENGTH: f64 = 20.0;
    pub const HEIGHT: f64 = 6.0;
    pub const GRID_SIZE: f64 = 1.0;

    pub fn input() -> CreateWarehouse {
        CreateWarehouse {
            name: Self::NAME.to_string(),
            location: Self::LOCATION.to_string(),
            description: Some(Self::DESCRIPTION.to_string()),
            capacity: Self::CAPACITY,
            width: Some(Self::WIDTH),
            length: Some(Self::LENGTH),
            height: Some(Self::HEIGHT),
            grid_size: Some(Self::GRID_SIZE),
        }
    }
}

impl Warehouse {
    /// Validate `input` and build a new (non-default) warehouse.
    pub fn new(id: WarehouseId, input: CreateWarehouse, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            name: input.name,
            location: input.location,
            description: input.description,
            capacity: input.capacity,
            width: input.width.unwrap_or(DefaultWarehouse::WIDTH),
            length: input.length.unwrap_or(DefaultWarehouse::LENGTH),
            height: input.height.unwrap_or(DefaultWarehouse::HEIGHT),
            grid_size: input.grid_size.unwrap_or(DefaultWarehouse::GRID_SIZE),
            is_default: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Build the default warehouse.
    pub fn new_default(id: WarehouseId, now: DateTime<Utc>) -> Self {
        let input = DefaultWarehouse::input();
        Self {
            id,
            name: input.name,
            location: input.location,
            description: input.description,
            capacity: input.capacity,
            width: DefaultWarehouse::WIDTH,
            length: DefaultWarehouse::LENGTH,
            height: DefaultWarehouse::HEIGHT,
            grid_size: DefaultWarehouse::GRID_SIZE,
            is_default: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate and merge a partial update.
    pub fn apply(&mut self, patch: &UpdateWarehouse, now: DateTime<Utc>) -> DomainResult<()> {
        patch.validate()?;
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(length) = patch.length {
            self.length = length;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(grid_size) = patch.grid_size {
            self.grid_size = grid_size;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Floor-plan bounds (x along width, z along length).
    pub fn bounds(&self) -> Bounds {
        Bounds {
            width: self.width,
            length: self.length,
        }
    }
}
