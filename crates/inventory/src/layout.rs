//! Floor-plan geometry for the layout editor.
//!
//! Shelves are rectangles on the warehouse floor (x along the warehouse width,
//! z along its length). The editor drags a shelf (move) or one of its edges
//! (resize east / south); while dragging it shows a clamped preview, and on
//! release the preview is snapped to the warehouse grid and sent as a
//! [`UpdateShelf`] patch.

use serde::{Deserialize, Serialize};

use crate::shelf::UpdateShelf;

/// Round `value` to the nearest multiple of `step`. A non-positive step is a no-op.
pub fn snap_to_grid(value: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return value;
    }
    (value / step).round() * step
}

/// Clamp `value` into `[min, max]`. When `min > max` the lower bound wins.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(max.min(value))
}

/// Floor-plan extent of a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub length: f64,
}

/// A shelf's rectangle on the floor, described by its centre and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footprint {
    pub center_x: f64,
    pub center_z: f64,
    pub width: f64,
    pub depth: f64,
}

impl Footprint {
    pub fn left(&self) -> f64 {
        self.center_x - self.width / 2.0
    }

    pub fn right(&self) -> f64 {
        self.center_x + self.width / 2.0
    }

    pub fn top(&self) -> f64 {
        self.center_z - self.depth / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.center_z + self.depth / 2.0
    }

    /// True when the rectangle lies entirely on the floor plan.
    pub fn within(&self, bounds: Bounds) -> bool {
        const EPS: f64 = 1e-9;
        self.left() >= -EPS
            && self.top() >= -EPS
            && self.right() <= bounds.width + EPS
            && self.bottom() <= bounds.length + EPS
    }
}

/// Maps pointer positions on a rendered floor plan (pixels) to warehouse units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub bounds: Bounds,
}

impl Viewport {
    /// Convert a pointer position relative to the viewport's top-left corner.
    pub fn to_units(&self, px: f64, py: f64) -> (f64, f64) {
        let x = if self.pixel_width > 0.0 {
            px / self.pixel_width * self.bounds.width
        } else {
            0.0
        };
        let z = if self.pixel_height > 0.0 {
            py / self.pixel_height * self.bounds.length
        } else {
            0.0
        };
        (x, z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DragKind {
    Move,
    ResizeEast,
    ResizeSouth,
}

/// One pointer drag over a shelf, from pointer-down to pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    kind: DragKind,
    bounds: Bounds,
    grid: f64,
    start: Footprint,
    start_pointer: (f64, f64),
    preview: Footprint,
}

impl DragSession {
    /// Begin a drag at `pointer` (warehouse units).
    pub fn begin(kind: DragKind, shelf: Footprint, pointer: (f64, f64), bounds: Bounds, grid: f64) -> Self {
        Self {
            kind,
            bounds,
            grid,
            start: shelf,
            start_pointer: pointer,
            preview: shelf,
        }
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    pub fn preview(&self) -> Footprint {
        self.preview
    }

    /// Move the pointer; returns the new (unsnapped) preview.
    pub fn update(&mut self, pointer: (f64, f64)) -> Footprint {
        let dx = pointer.0 - self.start_pointer.0;
        let dz = pointer.1 - self.start_pointer.1;
        let start = self.start;
        let bounds = self.bounds;

        self.preview = match self.kind {
            DragKind::Move => Footprint {
                center_x: clamp(start.center_x + dx, start.width / 2.0, bounds.width - start.width / 2.0),
                center_z: clamp(start.center_z + dz, start.depth / 2.0, bounds.length - start.depth / 2.0),
                ..start
            },
            DragKind::ResizeEast => {
                let left = start.left();
                let mut width = (start.width + dx).max(self.grid);
                if left + width > bounds.width {
                    width = bounds.width - left;
                }
                Footprint {
                    center_x: left + width / 2.0,
                    width,
                    ..start
                }
            }
            DragKind::ResizeSouth => {
                let top = start.top();
                let mut depth = (start.depth + dz).max(self.grid);
                if top + depth > bounds.length {
                    depth = bounds.length - top;
                }
                Footprint {
                    center_z: top + depth / 2.0,
                    depth,
                    ..start
                }
            }
        };
        self.preview
    }

    /// End the drag: snap the preview to the grid and build the shelf patch.
    ///
    /// A move snaps the centre and re-clamps it so the shelf stays on the floor.
    /// A resize snaps only the dragged extent; the opposite edge stays where it
    /// started and the extent is capped at the wall.
    pub fn finish(self) -> UpdateShelf {
        let p = self.preview;
        let bounds = self.bounds;
        let grid = self.grid;

        let snapped = match self.kind {
            DragKind::Move => Footprint {
                center_x: clamp(snap_to_grid(p.center_x, grid), p.width / 2.0, bounds.width - p.width / 2.0),
                center_z: clamp(snap_to_grid(p.center_z, grid), p.depth / 2.0, bounds.length - p.depth / 2.0),
                ..p
            },
            DragKind::ResizeEast => {
                let left = self.start.left();
                let width = snap_extent(p.width, grid, bounds.width - left);
                Footprint {
                    center_x: left + width / 2.0,
                    width,
                    ..p
                }
            }
            DragKind::ResizeSouth => {
                let top = self.start.top();
                let depth = snap_extent(p.depth, grid, bounds.length - top);
                Footprint {
                    center_z: top + depth / 2.0,
                    depth,
                    ..p
                }
            }
        };

        UpdateShelf {
            position_x: Some(snapped.center_x),
            position_y: Some(0.0),
            position_z: Some(snapped.center_z),
            width: Some(snapped.width),
            depth: Some(snapped.depth),
            ..UpdateShelf::default()
        }
    }
}

/// Snap a dragged extent to the grid: at least one step, at most `room`.
fn snap_extent(size: f64, grid: f64, room: f64) -> f64 {
    snap_to_grid(size, grid).max(grid).min(room)
}
