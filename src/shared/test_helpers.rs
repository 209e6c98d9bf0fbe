use axum::Router;
use axum_test::{TestResponse, TestServer};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::app::build_router;
use crate::core::config::{AdminConfig, ClassifierConfig, DatabaseConfig};
use crate::core::database::{create_pool, run_migrations};
use crate::core::state::AppState;
use crate::modules::storage::ImageStore;

/// PNG signature plus a short payload, 12 bytes in total
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nroad";

/// Request body limit used by test apps
pub const TEST_BODY_LIMIT: usize = 1024 * 1024;

/// Knobs for [`spawn_app_with_config`]
pub struct TestAppConfig {
    pub admin: AdminConfig,
    pub classifier: ClassifierConfig,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for TestAppConfig {
    fn default() -> Self {
        Self {
            admin: AdminConfig::default(),
            classifier: ClassifierConfig::mock(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

/// A migrated SQLite database in a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the pool is used.
pub async fn test_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().unwrap();
    let pool = migrated_pool(&dir, 5, 5).await;
    (dir, pool)
}

async fn migrated_pool(dir: &TempDir, max_connections: u32, acquire_timeout_secs: u64) -> SqlitePool {
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("reports.db").display()),
        max_connections,
        acquire_timeout_secs,
    };
    let pool = create_pool(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

/// Full application wired to a temporary database and upload directory
pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    dir: TempDir,
}

impl TestApp {
    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_config(TestAppConfig::default()).await
}

pub async fn spawn_app_with(admin: AdminConfig) -> TestApp {
    spawn_app_with_config(TestAppConfig {
        admin,
        ..TestAppConfig::default()
    })
    .await
}

pub async fn spawn_app_with_config(config: TestAppConfig) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let pool = migrated_pool(&dir, config.max_connections, config.acquire_timeout_secs).await;
    let images = ImageStore::new(dir.path().join("uploads")).await.unwrap();
    let state = AppState::new(pool.clone(), images, &config.classifier, &config.admin).unwrap();

    let server = TestServer::new(build_router(state, TEST_BODY_LIMIT)).unwrap();
    TestApp { server, pool, dir }
}

/// Serve `router` on an ephemeral port and return its base URL
pub async fn spawn_stub_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/", addr)
}

/// Follow a redirect carrying a flash cookie and collect the rendered messages
pub async fn flash_messages(app: &TestApp, response: &TestResponse, location: &str) -> Vec<String> {
    let cookie = response.cookie("_flash");
    let page = app.server.get(location).add_cookie(cookie).await;
    page.assert_status_ok();

    page.text()
        .split("<div class=\"flash\">")
        .skip(1)
        .filter_map(|rest| rest.split("</div>").next())
        .map(|m| m.trim().to_string())
        .collect()
}
