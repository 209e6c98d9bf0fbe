use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::SignedCookieJar;
use minijinja::context;

use crate::core::error::Result;
use crate::core::flash;
use crate::core::state::AppState;

/// Landing page
pub async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> Result<Response> {
    let (jar, messages) = flash::take(jar);
    let page = state
        .templates
        .render("index.html", context! { messages => messages })?;
    Ok((jar, page).into_response())
}

/// Liveness check
pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use crate::shared::test_helpers::spawn_app;

    #[tokio::test]
    async fn test_index_renders() {
        let app = spawn_app().await;

        let response = app.server.get("/").await;
        response.assert_status_ok();
        assert!(response.text().contains("href=\"/upload\""));
    }

    #[tokio::test]
    async fn test_health() {
        let app = spawn_app().await;
        app.server.get("/health").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = spawn_app().await;
        app.server.get("/nope").await.assert_status_not_found();
    }
}
