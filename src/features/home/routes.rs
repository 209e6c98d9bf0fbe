use axum::{routing::get, Router};

use crate::core::state::AppState;
use crate::features::home::handlers;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .with_state(state)
}
