//! Session store access.
//!
//! The browser's cookie jar holds two values: the HTTP-only bearer `token` and
//! the readable `XSRF-TOKEN`. Handlers, the gatekeeper and the proxy layer all
//! read them through [`SessionProvider`]; only the login/logout paths write them
//! through the helpers below.

use axum::{extract::FromRequestParts, http::request::Parts, http::StatusCode};
use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};

pub const TOKEN_COOKIE: &str = "token";
pub const CSRF_COOKIE:  &str = "XSRF-TOKEN";

/// Read-only view of the current session.
pub trait SessionProvider: Send + Sync {
    fn token(&self) -> Option<String>;
    fn csrf_token(&self) -> Option<String>;
}

// ── Request-scoped implementation ─────────────────────────────

/// Session backed by the incoming request's cookies.
/// Requires `CookieManagerLayer` on the router.
#[derive(Clone)]
pub struct CookieSession {
    cookies: Cookies,
}

impl CookieSession {
    pub fn new(cookies: Cookies) -> Self {
        Self { cookies }
    }

    pub fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    fn value(&self, name: &str) -> Option<String> {
        self.cookies
            .get(name)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    }
}

impl SessionProvider for CookieSession {
    fn token(&self) -> Option<String> {
        self.value(TOKEN_COOKIE)
    }

    /// Values arrive percent-decoded from `tower-cookies`.
    fn csrf_token(&self) -> Option<String> {
        self.value(CSRF_COOKIE)
    }
}

impl<S> FromRequestParts<S> for CookieSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state).await?;
        Ok(Self::new(cookies))
    }
}

// ── Fixed implementation ──────────────────────────────────────

/// A session with fixed values, for callers that already hold the token
/// (the client library, background jobs, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    pub token:      Option<String>,
    pub csrf_token: Option<String>,
}

impl StaticSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self { token: Some(token.into()), csrf_token: None }
    }

    pub fn csrf(mut self, csrf: impl Into<String>) -> Self {
        self.csrf_token = Some(csrf.into());
        self
    }
}

impl SessionProvider for StaticSession {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }

    fn csrf_token(&self) -> Option<String> {
        self.csrf_token.clone()
    }
}

// ── Writers ───────────────────────────────────────────────────

pub fn set_token_cookie(cookies: &Cookies, token: &str, days: i64, secure: bool) {
    let cookie = Cookie::build((TOKEN_COOKIE, token.to_owned()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::days(days))
        .build();
    cookies.add(cookie);
}

/// Relays the backend's CSRF token. Page scripts must be able to read it.
pub fn set_csrf_cookie(cookies: &Cookies, csrf: &str, days: i64, secure: bool) {
    let cookie = Cookie::build((CSRF_COOKIE, csrf.to_owned()))
        .http_only(false)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::days(days))
        .build();
    cookies.add(cookie);
}

pub fn clear_token_cookie(cookies: &Cookies) {
    expire(cookies, TOKEN_COOKIE, true);
}

pub fn clear_session_cookies(cookies: &Cookies) {
    expire(cookies, TOKEN_COOKIE, true);
    expire(cookies, CSRF_COOKIE, false);
}

fn expire(cookies: &Cookies, name: &'static str, http_only: bool) {
    let cookie = Cookie::build((name, ""))
        .http_only(http_only)
        .path("/")
        .max_age(Duration::ZERO)
        .build();
    cookies.add(cookie);
}
