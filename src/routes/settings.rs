//! `/settings` routes: storefront settings (shop name, currency, contact
//! details). Reading is public; writing is an admin action.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::{
    auth::{require_admin, session::CookieSession},
    errors::AppResult,
    routes::json_body,
    services::backend::ProxyRequest,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(show_settings).put(update_settings))
}

async fn show_settings(
    State(state): State<AppState>,
    session: CookieSession,
) -> AppResult<Json<Value>> {
    let body = state.api.send(&session, ProxyRequest::get("/settings")).await?;
    Ok(Json(body))
}

async fn update_settings(
    State(state): State<AppState>,
    session: CookieSession,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<Value>> {
    let admin = require_admin(&state.api, &session).await?;
    let body = json_body(&body?)?;
    let body = state
        .api
        .send(&session, ProxyRequest::put("/admin/settings").authenticated().json(body))
        .await?;
    tracing::info!(admin_id = admin.id, "Settings updated");
    Ok(Json(body))
}
