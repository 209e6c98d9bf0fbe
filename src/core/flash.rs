//! One-shot user messages carried across a redirect.
//!
//! Messages live in a signed cookie so the browser cannot forge them, and are
//! cleared by the first page that renders them.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;

pub const FLASH_COOKIE: &str = "_flash";

/// Append a message to the pending flash messages.
pub fn push(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    let mut messages = read(&jar);
    messages.push(message.into());

    let value = serde_json::to_string(&messages).unwrap_or_else(|_| "[]".to_string());
    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    jar.add(cookie)
}

/// Remove and return every pending message.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<String>) {
    let messages = read(&jar);
    if messages.is_empty() {
        return (jar, messages);
    }

    let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/"));
    (jar, messages)
}

fn read(jar: &SignedCookieJar) -> Vec<String> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str::<Vec<String>>(cookie.value()).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Key;

    fn jar() -> SignedCookieJar {
        SignedCookieJar::new(Key::from(&[7u8; 64]))
    }

    #[test]
    fn test_push_then_take_returns_messages_in_order() {
        let jar = push(jar(), "first");
        let jar = push(jar, "second");

        let (jar, messages) = take(jar);
        assert_eq!(messages, vec!["first".to_string(), "second".to_string()]);

        let (_, messages) = take(jar);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_take_on_empty_jar() {
        let (_, messages) = take(jar());
        assert!(messages.is_empty());
    }
}
