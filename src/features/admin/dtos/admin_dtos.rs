use serde::Deserialize;

use crate::features::reports::dtos::{ReportFilter, ReportSortBy};

/// Login form posted to `/admin`
#[derive(Debug, Deserialize)]
pub struct AdminLoginForm {
    #[serde(default)]
    pub password: String,
}

/// Query params for the report panel
#[derive(Debug, Default, Deserialize)]
pub struct PanelQuery {
    /// Exact area to show; empty shows every area
    pub area: Option<String>,
    /// `date` (default), `area` or `repair`
    pub sort: Option<String>,
}

impl PanelQuery {
    pub fn to_filter(&self) -> ReportFilter {
        ReportFilter {
            area: self
                .area
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            sort: ReportSortBy::from_param(self.sort.as_deref()),
        }
    }
}
