use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::config::AdminConfig;
use crate::core::error::AppError;

/// Cookie holding the admin session token
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Checks the shared admin password and issues short-lived HS256 session
/// tokens signed with the configured session secret.
pub struct AdminSessionService {
    password: String,
    require_session: bool,
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AdminSessionService {
    pub fn new(config: &AdminConfig) -> Self {
        let secret = config.session_secret.as_bytes();
        Self {
            password: config.password.clone(),
            require_session: config.require_session,
            ttl: config.session_ttl,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        candidate == self.password
    }

    /// Whether the panel pages require a valid session token
    pub fn is_enforced(&self) -> bool {
        self.require_session
    }

    pub fn issue(&self) -> Result<String, AppError> {
        self.issue_at(Utc::now())
    }

    fn issue_at(&self, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign admin session: {}", e)))
    }

    pub fn validate(&self, token: &str) -> Result<AdminClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<AdminClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid admin session: {}", e)))?;

        if token_data.claims.sub != ADMIN_SUBJECT {
            return Err(AppError::Unauthorized(
                "Admin session has an unexpected subject".to_string(),
            ));
        }

        Ok(token_data.claims)
    }
}
