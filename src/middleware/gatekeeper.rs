//! Edge gatekeeper middleware.
//!
//! Runs before anything under a protected prefix (`/dashboard` by default).
//! The session token is validated against the backend's auth-check on every
//! matched request; nothing is cached between requests. Callers without a
//! valid session go to sign-in, non-admins go to the forbidden page.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    auth::session::{clear_token_cookie, CookieSession, SessionProvider},
    config::Config,
    models::User,
    services::backend::{ApiClient, ProxyError},
    state::AppState,
};

/// Terminal outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Redirect(String),
}

/// What the backend said about the presented token.
#[derive(Debug, Clone)]
pub enum CheckOutcome {
    Admin(User),
    NonAdmin(User),
    NotAuthenticated,
    /// Backend answered 401: the token is no longer valid.
    Rejected,
    /// Unreachable, non-2xx or unreadable.
    Unavailable,
}

#[derive(Debug, Clone)]
pub enum SessionState {
    NoToken,
    HasToken(CheckOutcome),
}

/// Pure decision for a request on a protected path.
pub fn decide(config: &Config, session: &SessionState) -> Gate {
    let signin = || Gate::Redirect(config.signin_path.clone());
    match session {
        SessionState::NoToken => signin(),
        SessionState::HasToken(outcome) => match outcome {
            CheckOutcome::Admin(_)    => Gate::Allow,
            CheckOutcome::NonAdmin(_) => Gate::Redirect(config.forbidden_path.clone()),
            CheckOutcome::NotAuthenticated
            | CheckOutcome::Rejected
            | CheckOutcome::Unavailable => signin(),
        },
    }
}

pub async fn check_token(api: &ApiClient, session: &dyn SessionProvider) -> CheckOutcome {
    match api.auth_check(session).await {
        Ok(check) => match check.identity() {
            Some(user) if user.is_admin() => CheckOutcome::Admin(user),
            Some(user) => CheckOutcome::NonAdmin(user),
            None => CheckOutcome::NotAuthenticated,
        },
        Err(ProxyError::Upstream { status, .. }) if status == StatusCode::UNAUTHORIZED => {
            CheckOutcome::Rejected
        }
        Err(e) => {
            tracing::warn!(error = %e, "Auth check failed in gatekeeper");
            CheckOutcome::Unavailable
        }
    }
}

/// Middleware: protect the configured path prefixes.
pub async fn gatekeeper(
    State(state): State<AppState>,
    session: CookieSession,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    if !state.config.is_protected(&path) {
        return next.run(req).await;
    }

    let session_state = match session.token() {
        None => SessionState::NoToken,
        Some(_) => SessionState::HasToken(check_token(&state.api, &session).await),
    };

    match decide(&state.config, &session_state) {
        Gate::Allow => next.run(req).await,
        Gate::Redirect(location) => {
            if matches!(session_state, SessionState::HasToken(CheckOutcome::Rejected)) {
                clear_token_cookie(session.cookies());
            }
            tracing::debug!(%path, %location, "Gatekeeper redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
