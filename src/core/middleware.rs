use crate::core::flash;
use crate::core::state::AppState;
use crate::features::admin::ADMIN_SESSION_COOKIE;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

/// Request ID generator using UUID v7 (time-ordered)
#[derive(Clone, Copy)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Custom MakeSpan that includes request_id in the tracing span
#[derive(Clone, Debug)]
pub struct MakeSpanWithRequestId;

impl<B> tower_http::trace::MakeSpan<B> for MakeSpanWithRequestId {
    fn make_span(&mut self, request: &axum::http::Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    }
}

/// Gate for the admin panel pages.
///
/// Passes every request through unless `ADMIN_REQUIRE_SESSION` is enabled, in
/// which case a valid admin session token must be present in the signed
/// cookie jar. Rejected requests are sent back to the login page.
pub async fn admin_session_middleware(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    req: Request,
    next: Next,
) -> Response {
    if !state.admin_sessions.is_enforced() {
        return next.run(req).await;
    }

    let authorized = jar
        .get(ADMIN_SESSION_COOKIE)
        .map(|cookie| state.admin_sessions.validate(cookie.value()).is_ok())
        .unwrap_or(false);

    if authorized {
        return next.run(req).await;
    }

    tracing::debug!("Rejected admin request without a valid session: {}", req.uri());
    let jar = flash::push(jar, "Please log in");
    (jar, Redirect::to("/admin")).into_response()
}
