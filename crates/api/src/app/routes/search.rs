use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Extension, Query},
    http::StatusCode,
};

use crate::app::services::{AppServices, DEFAULT_SUGGESTION_LIMIT};
use crate::app::{dto, errors};

/// `GET /api/search?q=&exact=&limit=`
pub async fn search(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::SearchQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", e.body_text()),
    };
    let limit = query.limit.unwrap_or(DEFAULT_SUGGESTION_LIMIT);

    match services.search(&query.q, query.exact, limit).await {
        Ok(result) => dto::data(StatusCode::OK, result),
        Err(e) => errors::store_error_to_response(e),
    }
}
