use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::config::{AdminConfig, ClassifierConfig};
use crate::core::error::AppError;
use crate::core::templates::Templates;
use crate::features::admin::AdminSessionService;
use crate::modules::classifier::ClassificationClient;
use crate::modules::storage::ImageStore;

/// Shared handles passed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: SqlitePool,
    pub images: Arc<ImageStore>,
    pub classifier: Arc<ClassificationClient>,
    pub templates: Arc<Templates>,
    pub admin_sessions: Arc<AdminSessionService>,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        images: ImageStore,
        classifier_config: &ClassifierConfig,
        admin_config: &AdminConfig,
    ) -> Result<Self, AppError> {
        let templates = Templates::new()?;
        let classifier = ClassificationClient::new(classifier_config)?;

        Ok(Self {
            pool,
            images: Arc::new(images),
            classifier: Arc::new(classifier),
            templates: Arc::new(templates),
            admin_sessions: Arc::new(AdminSessionService::new(admin_config)),
            cookie_key: cookie_key(&admin_config.session_secret),
        })
    }
}

/// Derive the 64-byte cookie signing key from the configured secret
pub fn cookie_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_key_is_stable_per_secret() {
        assert_eq!(
            cookie_key("secret").signing(),
            cookie_key("secret").signing()
        );
        assert_ne!(cookie_key("secret").signing(), cookie_key("other").signing());
    }
}
