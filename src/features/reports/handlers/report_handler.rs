use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use minijinja::context;
use tracing::{debug, error, info};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::flash;
use crate::core::state::AppState;
use crate::features::reports::dtos::{first_error_message, UploadReportDto};
use crate::features::reports::models::CreateReport;
use crate::features::reports::services::ReportStore;
use crate::modules::storage::ImageStore;
use crate::shared::constants::AREAS;

const UPLOAD_SUCCESS_MESSAGE: &str = "Image uploaded and analyzed successfully!";
const INVALID_FILE_TYPE_MESSAGE: &str = "Invalid file type. Only PNG, JPG, and JPEG are allowed.";

/// Photo part of the upload form
struct ImagePart {
    file_name: String,
    data: Vec<u8>,
}

/// Render the report form
pub async fn upload_form(State(state): State<AppState>, jar: SignedCookieJar) -> Result<Response> {
    let (jar, messages) = flash::take(jar);
    let page = state.templates.render(
        "upload.html",
        context! {
            messages => messages,
            areas => AREAS,
        },
    )?;
    Ok((jar, page).into_response())
}

/// Accept a road photo with its location, classify it and record the report
///
/// Accepts multipart/form-data with:
/// - `image`: PNG, JPG or JPEG photo (required)
/// - `area`: one of the Michigan service areas (required)
/// - `city`, `address`: free text (optional)
pub async fn upload_report(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut multipart: Multipart,
) -> Result<Response> {
    let mut image: Option<ImagePart> = None;
    let mut area = String::new();
    let mut city = String::new();
    let mut address = String::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                image = Some(ImagePart {
                    file_name,
                    data: data.to_vec(),
                });
            }
            "area" => area = field.text().await.map_err(multipart_error)?,
            "city" => city = field.text().await.map_err(multipart_error)?,
            "address" => address = field.text().await.map_err(multipart_error)?,
            _ => {
                debug!("Ignoring unknown upload field: {}", field_name);
            }
        }
    }

    let Some(image) = image else {
        return Ok(reject_upload(jar, "No file uploaded"));
    };
    if image.file_name.is_empty() {
        return Ok(reject_upload(jar, "No file selected"));
    }

    let dto = UploadReportDto::from_form(&area, &city, &address);
    if let Err(errors) = dto.validate() {
        return Ok(reject_upload(jar, first_error_message(&errors)));
    }

    if !ImageStore::is_allowed(&image.file_name) {
        return Ok(reject_upload(jar, INVALID_FILE_TYPE_MESSAGE));
    }

    let stored = state.images.save(&image.file_name, &image.data).await?;
    debug!(
        "Stored upload '{}' as '{}' ({} bytes)",
        image.file_name, stored.filename, stored.size
    );

    let classification = state.classifier.classify(&image.data).await;

    let new_report = CreateReport {
        filename: stored.filename.clone(),
        area: dto.area,
        city: dto.city,
        address: dto.address,
        crack_type: classification.crack_type,
        repair_level: classification.repair_level,
    };

    // Acquired after classification and released once the row is written
    let inserted = match state.pool.acquire().await {
        Ok(mut conn) => ReportStore::insert(&mut conn, &new_report).await,
        Err(e) => Err(e.into()),
    };

    let report = match inserted {
        Ok(report) => report,
        Err(e) => {
            if let Err(cleanup) = state.images.remove(&stored.filename).await {
                error!(
                    "Failed to remove image '{}' after insert error: {}",
                    stored.filename, cleanup
                );
            }
            return Err(e);
        }
    };

    info!(
        "Report {} created for {} ({:?} classification)",
        report.id, report.area, classification.source
    );

    let (jar, mut messages) = flash::take(jar);
    messages.push(UPLOAD_SUCCESS_MESSAGE.to_string());

    let page = state.templates.render(
        "upload_result.html",
        context! {
            messages => messages,
            filename => &report.filename,
            area => &report.area,
            report_id => report.id,
            result => &classification,
        },
    )?;

    Ok((jar, page).into_response())
}

/// Serve a stored photo by the name it was saved under
pub async fn uploaded_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response> {
    let file = state.images.open(&filename).await?;
    Ok(([(header::CONTENT_TYPE, file.content_type)], file.data).into_response())
}

fn reject_upload(jar: SignedCookieJar, message: impl Into<String>) -> Response {
    let message = message.into();
    debug!("Upload rejected: {}", message);
    let jar = flash::push(jar, message);
    (jar, Redirect::to("/upload")).into_response()
}

fn multipart_error(e: MultipartError) -> AppError {
    debug!("Failed to read multipart field: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum request size".to_string())
    } else {
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}
