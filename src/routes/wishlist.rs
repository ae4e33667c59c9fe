use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::{
    auth::session::CookieSession,
    errors::AppResult,
    services::backend::ProxyRequest,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wishlist",                     get(list_wishlist))
        .route("/wishlist/toggle/{product_id}", post(toggle_product))
}

async fn list_wishlist(
    State(state): State<AppState>,
    session: CookieSession,
) -> AppResult<Json<Value>> {
    let body = state
        .api
        .send(&session, ProxyRequest::get("/wishlist").authenticated())
        .await?;
    Ok(Json(body))
}

/// POST /api/wishlist/toggle/{product_id}: add if absent, remove if present.
async fn toggle_product(
    State(state): State<AppState>,
    session: CookieSession,
    Path(product_id): Path<String>,
) -> AppResult<Json<Value>> {
    let endpoint = format!("/wishlist/toggle/{}", urlencoding::encode(&product_id));
    let body = state
        .api
        .send(&session, ProxyRequest::post(endpoint).authenticated())
        .await?;
    Ok(Json(body))
}
