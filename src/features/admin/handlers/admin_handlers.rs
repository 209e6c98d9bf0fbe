use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use minijinja::context;
use tracing::{debug, info, warn};

use crate::core::database::DbConn;
use crate::core::error::Result;
use crate::core::extractor::{AppForm, AppQuery};
use crate::core::flash;
use crate::core::state::AppState;
use crate::features::admin::dtos::{AdminLoginForm, PanelQuery};
use crate::features::admin::services::ADMIN_SESSION_COOKIE;
use crate::features::reports::services::ReportStore;
use crate::shared::constants::AREAS;

/// Render the admin login page
pub async fn login_form(State(state): State<AppState>, jar: SignedCookieJar) -> Result<Response> {
    let (jar, messages) = flash::take(jar);
    let page = state
        .templates
        .render("admin_login.html", context! { messages => messages })?;
    Ok((jar, page).into_response())
}

/// Check the admin password and start a session
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    AppForm(form): AppForm<AdminLoginForm>,
) -> Result<Response> {
    if !state.admin_sessions.verify_password(&form.password) {
        warn!("Rejected admin login attempt");
        let jar = flash::push(jar, "Invalid password");
        return Ok((jar, Redirect::to("/admin")).into_response());
    }

    let token = state.admin_sessions.issue()?;
    let cookie = Cookie::build((ADMIN_SESSION_COOKIE, token))
        .path("/admin")
        .http_only(true)
        .same_site(SameSite::Lax);

    info!("Admin logged in");
    Ok((jar.add(cookie), Redirect::to("/admin/panel")).into_response())
}

/// List reports with optional area filter and sort order
pub async fn panel(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut db: DbConn,
    AppQuery(query): AppQuery<PanelQuery>,
) -> Result<Response> {
    let filter = query.to_filter();
    let reports = ReportStore::list(&mut db, &filter).await?;
    debug!(
        "Admin panel: area={:?}, sort={}, {} report(s)",
        filter.area,
        filter.sort.as_param(),
        reports.len()
    );

    let (jar, messages) = flash::take(jar);
    let page = state.templates.render(
        "admin_panel.html",
        context! {
            messages => messages,
            areas => AREAS,
            selected_area => filter.area.as_deref().unwrap_or(""),
            selected_sort => filter.sort.as_param(),
            reports => reports,
        },
    )?;
    Ok((jar, page).into_response())
}

/// Show a single report
pub async fn report_detail(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut db: DbConn,
    Path(id): Path<String>,
) -> Result<Response> {
    let report = match id.parse::<i64>() {
        Ok(id) => ReportStore::find_by_id(&mut db, id).await?,
        Err(_) => None,
    };

    let Some(report) = report else {
        debug!("Report '{}' not found", id);
        let jar = flash::push(jar, "Report not found");
        return Ok((jar, Redirect::to("/admin/panel")).into_response());
    };

    let (jar, messages) = flash::take(jar);
    let page = state.templates.render(
        "admin_report_detail.html",
        context! {
            messages => messages,
            report => report,
        },
    )?;
    Ok((jar, page).into_response())
}
