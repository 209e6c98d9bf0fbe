use axum::{middleware, routing::get, Router};

use crate::core::middleware::admin_session_middleware;
use crate::core::state::AppState;
use crate::features::admin::handlers;

/// Create admin routes
///
/// The login page is always public; the panel pages pass through the session
/// gate, which only rejects requests when sessions are enforced.
pub fn routes(state: AppState) -> Router {
    let panel = Router::new()
        .route("/admin/panel", get(handlers::panel))
        .route("/admin/report/{id}", get(handlers::report_detail))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_session_middleware,
        ));

    Router::new()
        .route("/admin", get(handlers::login_form).post(handlers::login))
        .merge(panel)
        .with_state(state)
}
