use axum::{body::Bytes, middleware, Router};
use serde_json::Value;

use crate::{
    auth::session::SessionProvider,
    errors::{AppError, AppResult},
    middleware::session_guard::drop_rejected_token,
    services::backend::ProxyRequest,
    state::AppState,
};

mod auth;
mod blogs;
mod cart;
mod products;
mod settings;
mod user;
mod wishlist;

/// Build the full `/api` router.
///
/// Each resource module translates one verb on one path into a single backend
/// call. Auth requirements are declared per call on the [`ProxyRequest`], so
/// a missing token is answered with 401 before the backend is contacted.
///
/// `/auth` itself stays outside the rejected-token guard: a 401 from login
/// means bad credentials, not a stale session.
pub fn all_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::check_router())
        .merge(cart::router())
        .merge(products::router())
        .merge(wishlist::router())
        .merge(user::router())
        .merge(settings::router())
        .merge(blogs::router())
        .route_layer(middleware::from_fn(drop_rejected_token))
        .merge(auth::session_router())
}

// ── Shared helpers ────────────────────────────────────────────

/// Answer 401 before the body is looked at when the call needs a session.
pub(crate) fn require_session(session: &dyn SessionProvider) -> AppResult<()> {
    session.token().map(|_| ()).ok_or(AppError::Unauthorized)
}

/// Parse a required JSON body.
pub(crate) fn json_body(body: &Bytes) -> AppResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::BadRequest("Request body is required".into()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// Attach a JSON body when the browser sent one. Mutations such as checkout
/// may be posted without any body at all.
pub(crate) fn with_optional_json(request: ProxyRequest, body: &Bytes) -> AppResult<ProxyRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(request);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))?;
    Ok(request.json(value))
}
