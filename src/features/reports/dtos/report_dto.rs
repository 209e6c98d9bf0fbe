use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::shared::constants::AREAS;

/// Text fields of the upload form, validated before anything is stored
#[derive(Debug, Validate)]
pub struct UploadReportDto {
    #[validate(
        length(min = 1, message = "Please select a Michigan area"),
        custom(function = "validate_area")
    )]
    pub area: String,

    #[validate(length(max = 200, message = "City must be at most 200 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub address: Option<String>,
}

impl UploadReportDto {
    /// Build from raw form values; blanks become `None`
    pub fn from_form(area: &str, city: &str, address: &str) -> Self {
        Self {
            area: area.trim().to_string(),
            city: non_empty(city),
            address: non_empty(address),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn validate_area(area: &str) -> Result<(), ValidationError> {
    // Emptiness is reported by the length rule
    if area.is_empty() || AREAS.contains(&area) {
        return Ok(());
    }
    let mut err = ValidationError::new("unknown_area");
    err.message = Some(Cow::Borrowed("Please select a valid Michigan area"));
    Err(err)
}

/// First user-facing message, checking fields in form order
pub fn first_error_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    ["area", "city", "address"]
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}

/// Ordering options for the report listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportSortBy {
    /// Newest first
    #[default]
    Date,
    /// Area name, then newest first
    Area,
    /// Most urgent repair first, then newest first
    Repair,
}

impl ReportSortBy {
    /// Parse the `sort` query value; anything unrecognised sorts by date
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("area") => ReportSortBy::Area,
            Some("repair") => ReportSortBy::Repair,
            _ => ReportSortBy::Date,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            ReportSortBy::Date => "date",
            ReportSortBy::Area => "area",
            ReportSortBy::Repair => "repair",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            ReportSortBy::Date => "created_at DESC, id DESC",
            ReportSortBy::Area => "area ASC, created_at DESC, id DESC",
            ReportSortBy::Repair => {
                "CASE repair_level \
                    WHEN 'immediate' THEN 1 \
                    WHEN 'moderate' THEN 2 \
                    WHEN 'low' THEN 3 \
                    ELSE 4 \
                 END, created_at DESC, id DESC"
            }
        }
    }
}

/// Listing criteria for reports
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Exact area to match; `None` lists every area
    pub area: Option<String>,
    pub sort: ReportSortBy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_dto_blank_optionals() {
        let dto = UploadReportDto::from_form(" Detroit ", "  ", "");
        assert_eq!(dto.area, "Detroit");
        assert!(dto.city.is_none());
        assert!(dto.address.is_none());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_upload_dto_empty_area_message() {
        let dto = UploadReportDto::from_form("", "Detroit", "");
        let errors = dto.validate().unwrap_err();
        assert_eq!(first_error_message(&errors), "Please select a Michigan area");
    }

    #[test]
    fn test_upload_dto_unknown_area_message() {
        let dto = UploadReportDto::from_form("Chicago", "", "");
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            first_error_message(&errors),
            "Please select a valid Michigan area"
        );
    }

    #[test]
    fn test_sort_from_param() {
        assert_eq!(ReportSortBy::from_param(None), ReportSortBy::Date);
        assert_eq!(ReportSortBy::from_param(Some("date")), ReportSortBy::Date);
        assert_eq!(ReportSortBy::from_param(Some("area")), ReportSortBy::Area);
        assert_eq!(ReportSortBy::from_param(Some("repair")), ReportSortBy::Repair);
        assert_eq!(ReportSortBy::from_param(Some("bogus")), ReportSortBy::Date);
    }
}
