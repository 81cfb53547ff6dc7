use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use shelfwise_core::{ItemId, ShelfId};
use shelfwise_inventory::{AdjustQuantity, CreateItem, MoveItem, UpdateItem};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/sku/:sku", get(get_item_by_sku))
        .route("/:id", get(get_item).patch(update_item).delete(delete_item))
        .route("/:id/adjust-quantity", post(adjust_quantity))
        .route("/:id/move", post(move_item))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ItemListQuery>,
) -> axum::response::Response {
    let shelf_id = match query.shelf_id.as_deref().map(errors::parse_id::<ShelfId>) {
        None => None,
        Some(Ok(id)) => Some(id),
        Some(Err(resp)) => return resp,
    };

    match services.list_items(shelf_id).await {
        Ok(list) => dto::data(StatusCode::OK, list),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CreateItem>, JsonRejection>,
) -> axum::response::Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.create_item(input).await {
        Ok(view) => dto::data(StatusCode::CREATED, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.item_detail(id).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item_by_sku(
    Extension(services): Extension<Arc<AppServices>>,
    Path(sku): Path<String>,
) -> axum::response::Response {
    match services.item_by_sku(&sku).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<UpdateItem>, JsonRejection>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.update_item(id, patch).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.delete_item(id).await {
        Ok(()) => dto::message("Item deleted successfully"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn adjust_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<AdjustQuantity>, JsonRejection>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.adjust_item_quantity(id, input).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Responds with the item now holding the moved stock on the target shelf.
pub async fn move_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<MoveItem>, JsonRejection>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(input) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.move_item(id, input).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}
