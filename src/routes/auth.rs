use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    auth::session::{
        clear_session_cookies, set_csrf_cookie, set_token_cookie, CookieSession, SessionProvider,
    },
    errors::{AppError, AppResult, GENERIC_FAILURE},
    models::{LoginResponse, SessionStatus},
    routes::json_body,
    services::backend::{ApiClient, ProxyRequest},
    state::AppState,
};

// ── Router ────────────────────────────────────────────────────

/// Presence, login and logout. These write the session cookies themselves.
pub fn session_router() -> Router<AppState> {
    Router::new().route("/auth", get(session_presence).post(login).delete(logout))
}

pub fn check_router() -> Router<AppState> {
    Router::new().route("/auth/check", get(check))
}

// ── Handlers ──────────────────────────────────────────────────

/// GET /api/auth: whether the browser holds a session cookie at all.
/// Purely local: says nothing about whether the backend still accepts it.
async fn session_presence(session: CookieSession) -> Json<Value> {
    Json(json!({ "hasSession": session.token().is_some() }))
}

/// POST /api/auth: exchange credentials for a session cookie.
async fn login(
    State(state): State<AppState>,
    session: CookieSession,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<impl IntoResponse> {
    let body = json_body(&body?)?;
    let reply = state
        .api
        .execute(&session, ProxyRequest::post("/login").without_csrf().json(body))
        .await?;

    let login: LoginResponse = serde_json::from_value(reply.body)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Unexpected login response: {e}")))?;
    let token = login
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Login response carried no access token")))?;

    let config = &state.config;
    set_token_cookie(session.cookies(), &token, config.session_days, config.secure_cookies());
    if let Some(csrf) = reply.csrf_token {
        set_csrf_cookie(session.cookies(), &csrf, config.session_days, config.secure_cookies());
    }

    let user_id = login.user.as_ref().and_then(|u| u.get("id")).cloned();
    tracing::info!(?user_id, "User logged in");
    Ok(Json(json!({ "success": true, "user": login.user })))
}

/// DELETE /api/auth: end the session.
///
/// Two phases: the backend is asked to revoke the token (failures are logged
/// and ignored), then the local cookies are deleted no matter what.
async fn logout(State(state): State<AppState>, session: CookieSession) -> Json<Value> {
    revoke_remote(&state.api, &session).await;
    clear_session_cookies(session.cookies());
    Json(json!({ "success": true, "message": "Logged out" }))
}

/// GET /api/auth/check: current identity as seen by the backend.
async fn check(State(state): State<AppState>, session: CookieSession) -> Response {
    if session.token().is_none() {
        return Json(SessionStatus::anonymous()).into_response();
    }

    match state.api.auth_check(&session).await {
        Ok(check) => {
            let user = check.vouched_user();
            Json(SessionStatus {
                is_authenticated: user.is_some(),
                user,
                error: None,
            })
            .into_response()
        }
        Err(err) => {
            let (status, message) = match err.status() {
                Some(status) => (status, err.to_string()),
                None => {
                    tracing::error!(error = %err, "Auth check could not reach the backend");
                    (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_owned())
                }
            };
            let body = SessionStatus { error: Some(message), ..SessionStatus::anonymous() };
            (status, Json(body)).into_response()
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────

async fn revoke_remote(api: &ApiClient, session: &CookieSession) {
    if session.token().is_none() {
        return;
    }
    if let Err(e) = api.logout(session).await {
        tracing::warn!(error = %e, "Remote logout failed; clearing local session anyway");
    }
}
