//! `/products` routes: public catalog reads.
//!
//! No session is required, but a token is still forwarded when present so the
//! backend can personalize (wishlist flags, prices).

use axum::{
    extract::{Path, RawQuery, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::{
    auth::session::CookieSession,
    errors::AppResult,
    services::{backend::ProxyRequest, catalog::attach_image_urls},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products",        get(list_products))
        .route("/products/{slug}", get(show_product))
}

/// GET /api/products: query string (filters, paging) is passed through as-is.
async fn list_products(
    State(state): State<AppState>,
    session: CookieSession,
    RawQuery(query): RawQuery,
) -> AppResult<Json<Value>> {
    let endpoint = match query.filter(|q| !q.is_empty()) {
        Some(q) => format!("/products?{q}"),
        None    => "/products".to_owned(),
    };
    let mut body = state.api.send(&session, ProxyRequest::get(endpoint)).await?;
    attach_image_urls(&mut body, &state.config.public_asset_url);
    Ok(Json(body))
}

async fn show_product(
    State(state): State<AppState>,
    session: CookieSession,
    Path(slug): Path<String>,
) -> AppResult<Json<Value>> {
    let endpoint = format!("/products/{}", urlencoding::encode(&slug));
    let mut body = state.api.send(&session, ProxyRequest::get(endpoint)).await?;
    attach_image_urls(&mut body, &state.config.public_asset_url);
    Ok(Json(body))
}
