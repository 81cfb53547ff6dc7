use axum::{routing::get, Router};

pub mod items;
pub mod search;
pub mod shelves;
pub mod system;
pub mod warehouse;
pub mod warehouses;

/// Router for everything mounted under `/api`.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/stream", get(system::stream))
        .route("/search", get(search::search))
        .nest("/warehouse", warehouse::router())
        .nest("/warehouses", warehouses::router())
        .nest("/shelves", shelves::router())
        .nest("/items", items::router())
}
