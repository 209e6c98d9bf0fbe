use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;

use crate::core::error::Result;
use crate::features::reports::dtos::ReportFilter;
use crate::features::reports::models::{CreateReport, Report, CREATED_AT_FORMAT};

const REPORT_COLUMNS: &str =
    "id, filename, area, city, address, crack_type, repair_level, created_at";

/// Queries against the `reports` table.
///
/// Every operation runs on a connection borrowed from the calling request;
/// reports are append-only so there is no update or delete.
pub struct ReportStore;

impl ReportStore {
    /// Insert a report, stamping `created_at` with the current UTC time
    pub async fn insert(conn: &mut SqliteConnection, report: &CreateReport) -> Result<Report> {
        let created_at = Utc::now().format(CREATED_AT_FORMAT).to_string();

        let query = format!(
            r#"
            INSERT INTO reports (filename, area, city, address, crack_type, repair_level, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report: Report = sqlx::query_as(&query)
            .bind(&report.filename)
            .bind(&report.area)
            .bind(&report.city)
            .bind(&report.address)
            .bind(report.crack_type)
            .bind(report.repair_level)
            .bind(&created_at)
            .fetch_one(&mut *conn)
            .await?;

        info!(
            "Report saved: id={}, area={}, crack_type={}, repair_level={}",
            report.id, report.area, report.crack_type, report.repair_level
        );

        Ok(report)
    }

    pub async fn list(conn: &mut SqliteConnection, filter: &ReportFilter) -> Result<Vec<Report>> {
        let query = format!(
            r#"
            SELECT {}
            FROM reports
            WHERE (? IS NULL OR area = ?)
            ORDER BY {}
            "#,
            REPORT_COLUMNS,
            filter.sort.as_sql()
        );

        let reports: Vec<Report> = sqlx::query_as(&query)
            .bind(filter.area.as_deref())
            .bind(filter.area.as_deref())
            .fetch_all(&mut *conn)
            .await?;

        Ok(reports)
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Report>> {
        let query = format!("SELECT {} FROM reports WHERE id = ?", REPORT_COLUMNS);

        let report: Option<Report> = sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(report)
    }
}
