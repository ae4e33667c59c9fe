pub mod session;

use axum::http::StatusCode;

use crate::{
    errors::{AppError, AppResult},
    models::User,
    services::backend::{ApiClient, ProxyError},
};
use session::SessionProvider;

// ── Admin verification ────────────────────────────────────────

/// Resolve the caller's identity through the backend and require the admin role.
///
/// No token → `Unauthorized` without a backend call. A token the backend does
/// not vouch for → `Unauthorized`; an identity without the admin role → `Forbidden`.
pub async fn require_admin(api: &ApiClient, session: &dyn SessionProvider) -> AppResult<User> {
    if session.token().is_none() {
        return Err(AppError::Unauthorized);
    }

    let check = match api.auth_check(session).await {
        Ok(check) => check,
        Err(ProxyError::Upstream { status, .. }) if status == StatusCode::UNAUTHORIZED => {
            return Err(AppError::Unauthorized)
        }
        Err(e) => return Err(e.into()),
    };

    let user = check.identity().ok_or(AppError::Unauthorized)?;
    if !user.is_admin() {
        tracing::info!(user_id = user.id, "Admin action refused for non-admin user");
        return Err(AppError::Forbidden);
    }
    Ok(user)
}
