//! The single default warehouse edited by the floor-plan view.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use shelfwise_inventory::UpdateWarehouse;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", get(get_default_warehouse).patch(update_default_warehouse))
}

pub async fn get_default_warehouse(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.default_warehouse().await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_default_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<UpdateWarehouse>, JsonRejection>,
) -> axum::response::Response {
    let Json(patch) = match body {
        Ok(b) => b,
        Err(e) => return errors::invalid_body(e),
    };

    match services.update_default_warehouse(patch).await {
        Ok(view) => dto::data(StatusCode::OK, view),
        Err(e) => errors::store_error_to_response(e),
    }
}
