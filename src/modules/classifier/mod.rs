//! Road damage classification
//!
//! Wraps the external vision model and the deterministic mock used when the
//! model is not configured or unavailable.

mod mock;
mod response;
mod types;
mod watsonx_client;

pub use types::{Classification, ClassificationSource, CrackType, RepairLevel};
pub use watsonx_client::ClassificationClient;
