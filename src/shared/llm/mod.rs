//! Helpers for reading structured data out of model responses.

mod parser;

pub use parser::parse_json_lenient;
