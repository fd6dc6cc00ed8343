use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Session lifetime: 30 days.
pub const SESSION_TTL_SECS: i64 = 2_592_000;

/// Generate a cryptographically secure random session token.
pub fn generate_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Expiry timestamp for a session created now, in SQLite `datetime()` format.
#[must_use]
pub fn session_expiry() -> String {
    (Utc::now() + Duration::seconds(SESSION_TTL_SECS))
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Read the session token from the request's `Cookie` header.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|cookie| {
                cookie
                    .trim()
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
            })
        })
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value for a new session.
///
/// The frontend is served from another origin, so secure deployments need
/// `SameSite=None`, which browsers only accept together with `Secure`.
#[must_use]
pub fn session_cookie(token: &str, secure: bool) -> String {
    let site = if secure { "SameSite=None; Secure" } else { "SameSite=Lax" };
    format!("{SESSION_COOKIE}={token}; HttpOnly; {site}; Path=/; Max-Age={SESSION_TTL_SECS}")
}

/// `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    let site = if secure { "SameSite=None; Secure" } else { "SameSite=Lax" };
    format!("{SESSION_COOKIE}=; HttpOnly; {site}; Path=/; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_generate_session_token() {
        let token1 = generate_session_token();
        let token2 = generate_session_token();

        assert_eq!(token1.len(), 64);
        assert_ne!(token1, token2);
        assert!(token1.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_session_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers), Some("abc123"));
    }

    #[test]
    fn test_session_token_ignores_lookalike_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::COOKIE,
            HeaderValue::from_static("session_hint=1; session="),
        );
        assert_eq!(session_token(&headers), None);
        assert_eq!(session_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let dev = session_cookie("tok", false);
        assert!(dev.starts_with("session=tok;"));
        assert!(dev.contains("HttpOnly"));
        assert!(dev.contains("SameSite=Lax"));
        assert!(!dev.contains("Secure"));

        let prod = session_cookie("tok", true);
        assert!(prod.contains("SameSite=None; Secure"));
        assert!(clear_session_cookie(true).contains("Max-Age=0"));
    }

    #[test]
    fn test_session_expiry_format() {
        let expiry = session_expiry();
        assert_eq!(expiry.len(), "2024-01-01 00:00:00".len());
        assert!(chrono::NaiveDateTime::parse_from_str(&expiry, "%Y-%m-%d %H:%M:%S").is_ok());
    }
}
