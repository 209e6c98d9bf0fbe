//! Storage module for uploaded images
//!
//! Provides a local filesystem store that names files by upload time and
//! serves them back by name.

mod local_store;

pub use local_store::{secure_filename, ImageFile, ImageStore, StoredImage};
