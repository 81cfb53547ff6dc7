//! Response views and JSON helpers.
//!
//! Views flatten a domain record and attach its related records, so clients
//! get the same shape the list and detail endpoints always returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use shelfwise_core::{ShelfId, WarehouseId};
use shelfwise_inventory::{Item, Shelf, Warehouse};

// -------------------------
// Envelopes
// -------------------------

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `{"data": value}` with the given status.
pub fn data<T: Serialize>(status: StatusCode, value: T) -> Response {
    (status, Json(DataEnvelope { data: value })).into_response()
}

/// `{"message": text}` with 200.
pub fn message(text: &str) -> Response {
    (StatusCode::OK, Json(serde_json::json!({ "message": text }))).into_response()
}

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfListQuery {
    pub warehouse_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    pub shelf_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub exact: bool,
    pub limit: Option<usize>,
}

// -------------------------
// Views
// -------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseWithShelves {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub shelves: Vec<Shelf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShelfWithItems {
    #[serde(flatten)]
    pub shelf: Shelf,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarehouseDetail {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub shelves: Vec<ShelfWithItems>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShelfSummary {
    #[serde(flatten)]
    pub shelf: Shelf,
    pub item_count: usize,
}

/// Default warehouse as the floor-plan editor loads it.
#[derive(Debug, Clone, Serialize)]
pub struct DefaultWarehouseView {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub shelves: Vec<ShelfSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShelfDetail {
    #[serde(flatten)]
    pub shelf: Shelf,
    pub warehouse: Warehouse,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShelfWithWarehouse {
    #[serde(flatten)]
    pub shelf: Shelf,
    pub warehouse: Warehouse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub shelf: ShelfWithWarehouse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedShelf {
    pub shelf_id: ShelfId,
    pub deleted_items_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub query: String,
    pub found: bool,
    pub shelf_ids: Vec<ShelfId>,
    pub items: Vec<Item>,
    pub suggestions: Vec<String>,
}

/// Published on every successful mutation and relayed by `/api/stream`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotice {
    pub topic: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<WarehouseId>,
}
