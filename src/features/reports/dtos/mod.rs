mod report_dto;

pub use report_dto::{first_error_message, ReportFilter, ReportSortBy, UploadReportDto};
