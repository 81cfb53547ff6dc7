use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use shelfwise_core::{ShelfId, WarehouseId};
use shelfwise_inventory::{CreateShelf, UpdateShelf};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_shelves).post(create_shelf))
        .route("/:id", get(get_shelf).patch(update_shelf).delete(delete_shelf))
        .route("/:id/statistics", get(shelf_statistics))
        .route("/:id/clear", post(clear_shelf))
}

pub async fn list_shelves(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ShelfListQuery>,
) -> axum::response::Response {
    let warehouse_id = match query.warehouse_id.as_deref().map(errors::parse_id::<WarehouseId>) {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
    };

    match services.list_shelves(warehouse_id).await {
        Ok(list) => dto::data(StatusCode::OK, list),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_shelf(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateShelf>, JsonRejection>,
) -> axum::response::Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.create_shelf(input).await {
        Ok(view) => dto::data(StatusCode::CREATED, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_shelf(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ShelfId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.shelf_detail(id).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Position and size changes from the floor-plan editor land here too.
pub async fn update_shelf(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateShelf>, JsonRejection>,
) -> axum::response::Response {
    let id: ShelfId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.update_shelf(id, patch).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_shelf(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ShelfId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.delete_shelf(id).await {
        Ok(()) => dto::message("Shelf deleted successfully"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn shelf_statistics(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ShelfId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.shelf_statistics(id).await {
        Ok(stats) => dto::data(StatusCode::OK, stats),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn clear_shelf(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ShelfId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.clear_shelf(id).await {
        Ok(cleared) => dto::data(StatusCode::OK, cleared),
        Err(e) => errors::store_error_to_response(e),
    }
}
