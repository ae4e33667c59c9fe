//! `/user` routes: the signed-in customer's own account.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::{
    auth::session::CookieSession,
    errors::AppResult,
    routes::{json_body, require_session},
    services::backend::ProxyRequest,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/profile",      get(show_profile).put(update_profile))
        .route("/user/orders/stats", get(order_stats))
}

async fn show_profile(
    State(state): State<AppState>,
    session: CookieSession,
) -> AppResult<Json<Value>> {
    let body = state
        .api
        .send(&session, ProxyRequest::get("/user/profile").authenticated())
        .await?;
    Ok(Json(body))
}

async fn update_profile(
    State(state): State<AppState>,
    session: CookieSession,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<Value>> {
    require_session(&session)?;
    let body = json_body(&body?)?;
    let body = state
        .api
        .send(&session, ProxyRequest::put("/user/profile").authenticated().json(body))
        .await?;
    Ok(Json(body))
}

async fn order_stats(
    State(state): State<AppState>,
    session: CookieSession,
) -> AppResult<Json<Value>> {
    let body = state
        .api
        .send(&session, ProxyRequest::get("/user/orders/stats").authenticated())
        .await?;
    Ok(Json(body))
}
