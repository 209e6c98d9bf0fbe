//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the image store and the vision classification client.

pub mod classifier;
pub mod storage;
