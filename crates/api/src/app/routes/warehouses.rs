use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use shelfwise_core::WarehouseId;
use shelfwise_inventory::{CreateWarehouse, UpdateWarehouse};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_warehouses).post(create_warehouse))
        .route(
            "/:id",
            get(get_warehouse).patch(update_warehouse).delete(delete_warehouse),
        )
        .route("/:id/statistics", get(warehouse_statistics))
}

pub async fn list_warehouses(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.list_warehouses().await {
        Ok(list) => dto::data(StatusCode::OK, list),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateWarehouse>, JsonRejection>,
) -> axum::response::Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.create_warehouse(input).await {
        Ok(view) => dto::data(StatusCode::CREATED, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WarehouseId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.warehouse_detail(id).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateWarehouse>, JsonRejection>,
) -> axum::response::Response {
    let id: WarehouseId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.update_warehouse(id, patch).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WarehouseId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.delete_warehouse(id).await {
        Ok(()) => dto::message("Warehouse deleted successfully"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn warehouse_statistics(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WarehouseId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.warehouse_statistics(id).await {
        Ok(stats) => dto::data(StatusCode::OK, stats),
        Err(e) => errors::store_error_to_response(e),
    }
}
