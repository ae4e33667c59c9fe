//! Session invalidation on backend rejection.

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::auth::session::{clear_token_cookie, CookieSession, SessionProvider};

/// Middleware: when an `/api` call carrying a token ends in 401, the token is
/// stale, so delete the cookie along with the error response.
pub async fn drop_rejected_token(
    session: CookieSession,
    req: Request,
    next: Next,
) -> Response {
    let had_token = session.token().is_some();
    let response = next.run(req).await;

    if had_token && response.status() == StatusCode::UNAUTHORIZED {
        tracing::info!("Backend rejected session token; clearing cookie");
        clear_token_cookie(session.cookies());
    }
    response
}
