use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfwise_core::{DomainError, DomainResult, Entity, ShelfId, WarehouseId};

use crate::layout::{Bounds, Footprint};
use crate::validate;

/// Default shelf size (x, z, y) when a create request omits it.
pub const DEFAULT_WIDTH: f64 = 1.0;
pub const DEFAULT_DEPTH: f64 = 1.0;
pub const DEFAULT_HEIGHT: f64 = 2.0;

/// Shelf: a positioned, sized storage unit inside one warehouse.
///
/// `position_*` is the centre of the shelf's base; `width` runs along x,
/// `depth` along z and `height` along y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    pub id: ShelfId,
    pub warehouse_id: WarehouseId,
    pub name: String,
    pub location: String,
    pub capacity: i64,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Shelf {
    type Id = ShelfId;
    const KIND: &'static str = "Shelf";

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input: create a shelf in an existing warehouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShelf {
    pub name: String,
    pub location: String,
    pub capacity: i64,
    pub warehouse_id: WarehouseId,
    #[serde(default)]
    pub position_x: Option<f64>,
    #[serde(default)]
    pub position_y: Option<f64>,
    #[serde(default)]
    pub position_z: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl CreateShelf {
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = Vec::new();
        validate::text(&mut errors, "name", &self.name, "Name is required");
        validate::text(&mut errors, "location", &self.location, "Location is required");
        validate::positive_int(&mut errors, "capacity", self.capacity, "Capacity must be positive");
        check_geometry(
            &mut errors,
            [self.position_x, self.position_y, self.position_z],
            [self.width, self.depth, self.height],
        );
        DomainError::check_fields(errors)
    }
}

/// Input: partial shelf update (layout edits send only geometry fields).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShelf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl UpdateShelf {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the patch changes where or how large the shelf is on the floor plan.
    pub fn touches_footprint(&self) -> bool {
        self.warehouse_id.is_some()
            || self.position_x.is_some()
            || self.position_z.is_some()
            || self.width.is_some()
            || self.depth.is_some()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.is_empty() {
            return Err(DomainError::validation("no fields to update"));
        }
        let mut errors = Vec::new();
        validate::opt_text(&mut errors, "name", self.name.as_deref(), "Name is required");
        validate::opt_text(&mut errors, "location", self.location.as_deref(), "Location is required");
        validate::opt(&mut errors, "capacity", self.capacity, "Capacity must be positive", validate::positive_int);
        check_geometry(
            &mut errors,
            [self.position_x, self.position_y, self.position_z],
            [self.width, self.depth, self.height],
        );
        DomainError::check_fields(errors)
    }
}

fn check_geometry(
    errors: &mut Vec<shelfwise_core::FieldError>,
    position: [Option<f64>; 3],
    size: [Option<f64>; 3],
) {
    for (field, value) in ["positionX", "positionY", "positionZ"].into_iter().zip(position) {
        validate::opt(errors, field, value, "Position must be a non-negative number", validate::non_negative);
    }
    for (field, value) in ["width", "depth", "height"].into_iter().zip(size) {
        validate::opt(errors, field, value, "Size must be positive", validate::positive);
    }
}

impl Shelf {
    pub fn new(id: ShelfId, input: CreateShelf, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;
        let width = input.width.unwrap_or(DEFAULT_WIDTH);
        let depth = input.depth.unwrap_or(DEFAULT_DEPTH);
        // Unplaced shelves sit in the origin corner, fully on the floor.
        Ok(Self {
            id,
            warehouse_id: input.warehouse_id,
            name: input.name,
            location: input.location,
            capacity: input.capacity,
            position_x: input.position_x.unwrap_or(width / 2.0),
            position_y: input.position_y.unwrap_or(0.0),
            position_z: input.position_z.unwrap_or(depth / 2.0),
            width,
            depth,
            height: input.height.unwrap_or(DEFAULT_HEIGHT),
            created_at: now,
            updated_at: now,
        })
    }

    /// Validate and merge a partial update.
    pub fn apply(&mut self, patch: &UpdateShelf, now: DateTime<Utc>) -> DomainResult<()> {
        patch.validate()?;
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(location) = &patch.location {
            self.location = location.clone();
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(warehouse_id) = patch.warehouse_id {
            self.warehouse_id = warehouse_id;
        }
        if let Some(v) = patch.position_x {
            self.position_x = v;
        }
        if let Some(v) = patch.position_y {
            self.position_y = v;
        }
        if let Some(v) = patch.position_z {
            self.position_z = v;
        }
        if let Some(v) = patch.width {
            self.width = v;
        }
        if let Some(v) = patch.depth {
            self.depth = v;
        }
        if let Some(v) = patch.height {
            self.height = v;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn footprint(&self) -> Footprint {
        Footprint {
            center_x: self.position_x,
            center_z: self.position_z,
            width: self.width,
            depth: self.depth,
        }
    }

    /// Reject a shelf whose footprint leaves the warehouse floor plan.
    pub fn ensure_within(&self, bounds: Bounds) -> DomainResult<()> {
        if self.footprint().within(bounds) {
            Ok(())
        } else {
            Err(DomainError::invariant(format!(
                "shelf footprint exceeds warehouse bounds ({} x {})",
                bounds.width, bounds.length
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn input() -> CreateShelf {
        CreateShelf {
            name: "A1".to_string(),
            location: "Aisle A".to_string(),
            capacity: 100,
            warehouse_id: WarehouseId::new(),
            position_x: Some(2.0),
            position_y: None,
            position_z: Some(3.0),
            width: None,
            depth: None,
            height: None,
        }
    }

    #[test]
    fn new_applies_default_size() {
        let shelf = Shelf::new(ShelfId::new(), input(), test_time()).unwrap();
        assert_eq!((shelf.width, shelf.depth, shelf.height), (1.0, 1.0, 2.0));
        assert_eq!(shelf.position_y, 0.0);
    }

    #[test]
    fn unplaced_shelf_starts_inside_the_origin_corner() {
        let shelf = Shelf::new(
            ShelfId::new(),
            CreateShelf {
                position_x: None,
                position_z: None,
                width: Some(3.0),
                ..input()
            },
            test_time(),
        )
        .unwrap();
        assert_eq!((shelf.position_x, shelf.position_z), (1.5, 0.5));
        assert!(shelf
            .ensure_within(Bounds {
                width: 3.0,
                length: 1.0
            })
            .is_ok());
    }

    #[test]
    fn negative_width_is_a_field_error() {
        let patch = UpdateShelf {
            width: Some(-1.0),
            ..Default::default()
        };
        match patch.validate().unwrap_err() {
            DomainError::ValidationErrors(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "width");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn nan_position_is_rejected() {
        let patch = UpdateShelf {
            position_x: Some(f64::NAN),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn geometry_patch_touches_footprint_but_height_does_not() {
        let move_patch = UpdateShelf {
            position_x: Some(4.0),
            ..Default::default()
        };
        assert!(move_patch.touches_footprint());

        let taller = UpdateShelf {
            height: Some(3.0),
            ..Default::default()
        };
        assert!(!taller.touches_footprint());
    }

    #[test]
    fn bounds_check_uses_footprint_edges() {
        let mut shelf = Shelf::new(ShelfId::new(), input(), test_time()).unwrap();
        let bounds = Bounds { width: 10.0, length: 10.0 };
        assert!(shelf.ensure_within(bounds).is_ok());

        shelf.position_x = 9.8;
        let err = shelf.ensure_within(bounds).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = UpdateShelf {
            position_x: Some(3.0),
            width: Some(2.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"positionX": 3.0, "width": 2.0}));
    }
}
