mod report;

pub use report::{CreateReport, Report, CREATED_AT_FORMAT};
