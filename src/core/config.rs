use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub classifier: ClassifierConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_request_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Local filesystem storage for uploaded road photos
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
}

/// Vision classification endpoint settings
///
/// Both `api_key` and `url` must be present for live classification;
/// otherwise the mock classifier is used.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: Option<String>,
    pub url: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Plaintext password compared on the admin login form
    pub password: String,
    /// Secret used to sign cookies and admin session tokens
    pub session_secret: String,
    /// Whether panel and detail pages demand a valid admin session token
    pub require_session: bool,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            classifier: ClassifierConfig::from_env()?,
            admin: AdminConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        Ok(Self {
            host,
            port,
            max_request_body_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_URL: &'static str = "sqlite://reports.db";
    const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").unwrap_or_else(|_| Self::DEFAULT_URL.to_string());

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
        })
    }
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        let upload_dir = env::var("UPLOAD_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "uploads".to_string());

        Ok(Self {
            upload_dir: PathBuf::from(upload_dir),
        })
    }
}

impl ClassifierConfig {
    const DEFAULT_MODEL: &'static str = "llama-3-2-90b-vision-instruct";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, String> {
        // Empty values count as unset so a blank .env entry keeps mock mode
        let api_key = env::var("WATSONX_API_KEY").ok().filter(|s| !s.is_empty());
        let url = env::var("WATSONX_URL").ok().filter(|s| !s.is_empty());
        let model = env::var("WATSONX_MODEL").unwrap_or_else(|_| Self::DEFAULT_MODEL.to_string());

        let timeout_secs = env::var("WATSONX_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "WATSONX_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            api_key,
            url,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Config with no credentials, i.e. always the mock classifier
    #[cfg(test)]
    pub fn mock() -> Self {
        Self {
            api_key: None,
            url: None,
            model: Self::DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AdminConfig {
    const DEFAULT_PASSWORD: &'static str = "adminpass";
    const DEFAULT_SESSION_SECRET: &'static str = "dev-secret-key-change-in-production";
    const DEFAULT_SESSION_TTL_SECS: u64 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let password =
            env::var("ADMIN_PASSWORD").unwrap_or_else(|_| Self::DEFAULT_PASSWORD.to_string());

        let session_secret = env::var("SESSION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_SESSION_SECRET.to_string());

        let require_session = env::var("ADMIN_REQUIRE_SESSION")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .map_err(|_| "ADMIN_REQUIRE_SESSION must be true or false".to_string())?;

        let session_ttl_secs = env::var("ADMIN_SESSION_TTL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_SESSION_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "ADMIN_SESSION_TTL_SECS must be a valid number".to_string())?;

        Ok(Self {
            password,
            session_secret,
            require_session,
            session_ttl: Duration::from_secs(session_ttl_secs),
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == Self::DEFAULT_SESSION_SECRET
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            password: Self::DEFAULT_PASSWORD.to_string(),
            session_secret: Self::DEFAULT_SESSION_SECRET.to_string(),
            require_session: false,
            session_ttl: Duration::from_secs(Self::DEFAULT_SESSION_TTL_SECS),
        }
    }
}
