use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::core::state::AppState;
use crate::features::reports::handlers;

/// Create routes for the reports feature
///
/// The upload endpoint carries its own body limit so oversized photos are
/// rejected before they are buffered.
pub fn routes(state: AppState, max_request_body_size: usize) -> Router {
    Router::new()
        .route(
            "/upload",
            get(handlers::upload_form)
                .post(handlers::upload_report)
                .layer(DefaultBodyLimit::max(max_request_body_size)),
        )
        .route("/uploads/{filename}", get(handlers::uploaded_file))
        .with_state(state)
}
