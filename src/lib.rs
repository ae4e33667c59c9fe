//! Backend-for-frontend gateway for the storefront and admin dashboard.
//!
//! The gateway owns no business data. It bridges the browser's cookie session
//! to bearer-token calls against the backend API, guards the dashboard pages,
//! and serves the built front-end.

use axum::{middleware::from_fn_with_state, Router};
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use crate::middleware::gatekeeper::gatekeeper;
use state::AppState;

/// Full application: `/api` handlers, the static front-end as fallback, and
/// the gatekeeper in front of both.
pub fn app(state: AppState) -> Router {
    let pages = Router::new().fallback_service(ServeDir::new(&state.config.static_dir));
    app_with_pages(state, pages)
}

/// Same as [`app`] with a caller-supplied page router.
pub fn app_with_pages(state: AppState, pages: Router<AppState>) -> Router {
    let gate = from_fn_with_state(state.clone(), gatekeeper);
    Router::new()
        .nest("/api", routes::all_routes())
        .merge(pages)
        .layer(gate)
        .layer(CookieManagerLayer::new())   // must wrap everything that reads cookies
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
