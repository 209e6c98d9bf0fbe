mod session_service;

pub use session_service::{AdminClaims, AdminSessionService, ADMIN_SESSION_COOKIE};
