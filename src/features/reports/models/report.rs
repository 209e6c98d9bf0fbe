use serde::Serialize;
use sqlx::FromRow;

use crate::modules::classifier::{CrackType, RepairLevel};

/// Timestamp layout stored in `reports.created_at` (UTC, microseconds)
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Database model for a submitted road damage report
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: i64,
    pub filename: String,
    pub area: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub crack_type: CrackType,
    pub repair_level: RepairLevel,
    pub created_at: String,
}

/// Data for creating a new report
#[derive(Debug)]
pub struct CreateReport {
    pub filename: String,
    pub area: String,
    pub city: Option<String>,
    pub address: Option<String>,
    pub crack_type: CrackType,
    pub repair_level: RepairLevel,
}
