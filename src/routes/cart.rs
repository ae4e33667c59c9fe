//! `/cart` routes: cart read/mutate and checkout. All calls require a session.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::{
    auth::session::CookieSession,
    errors::{AppError, AppResult},
    routes::{json_body, require_session, with_optional_json},
    services::backend::ProxyRequest,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart",          get(show_cart).post(mutate_cart).delete(clear_cart))
        .route("/cart/checkout", post(checkout))
}

/// Cart mutations posted to `POST /api/cart`, selected by the `action` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CartAction {
    Add,
    Update,
    Remove,
    Clear,
}

impl CartAction {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "add"    => Some(Self::Add),
            "update" => Some(Self::Update),
            "remove" => Some(Self::Remove),
            "clear"  => Some(Self::Clear),
            _        => None,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────

async fn show_cart(
    State(state): State<AppState>,
    session: CookieSession,
) -> AppResult<Json<Value>> {
    let body = state
        .api
        .send(&session, ProxyRequest::get("/cart").authenticated())
        .await?;
    Ok(Json(body))
}

async fn mutate_cart(
    State(state): State<AppState>,
    session: CookieSession,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<Value>> {
    require_session(&session)?;
    let request = cart_request(json_body(&body?)?)?.authenticated();
    let body = state.api.send(&session, request).await?;
    Ok(Json(body))
}

async fn clear_cart(
    State(state): State<AppState>,
    session: CookieSession,
) -> AppResult<Json<Value>> {
    let body = state
        .api
        .send(&session, ProxyRequest::delete("/cart").authenticated())
        .await?;
    Ok(Json(body))
}

async fn checkout(
    State(state): State<AppState>,
    session: CookieSession,
    body: Result<Bytes, BytesRejection>,
) -> AppResult<Json<Value>> {
    require_session(&session)?;
    let request = with_optional_json(ProxyRequest::post("/cart/checkout"), &body?)?.authenticated();
    let body = state.api.send(&session, request).await?;
    Ok(Json(body))
}

// ── Helpers ──────────────────────────────────────────────────

/// Map an action body onto the backend call. The remaining fields are
/// forwarded untouched; the backend validates them.
fn cart_request(mut body: Value) -> AppResult<ProxyRequest> {
    let action = body
        .as_object_mut()
        .and_then(|map| map.remove("action"))
        .ok_or_else(|| AppError::BadRequest("Missing cart action".into()))?;
    let action = action
        .as_str()
        .and_then(CartAction::parse)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown cart action: {action}")))?;

    let request = match action {
        CartAction::Add    => ProxyRequest::post("/cart").json(body),
        CartAction::Update => {
            let item = item_id(&body)?;
            ProxyRequest::put(format!("/cart/{item}")).json(body)
        }
        CartAction::Remove => ProxyRequest::delete(format!("/cart/{}", item_id(&body)?)),
        CartAction::Clear  => ProxyRequest::delete("/cart"),
    };
    Ok(request)
}

fn item_id(body: &Value) -> AppResult<String> {
    match body.get("item_id").or_else(|| body.get("id")) {
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Ok(urlencoding::encode(s).into_owned()),
        _ => Err(AppError::BadRequest("Cart item id is required".into())),
    }
}
