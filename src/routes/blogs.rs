//! `/blogs` routes: image upload for the blog editor, relayed to the backend
//! as multipart without touching the file contents.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::{
    auth::{require_admin, session::CookieSession},
    errors::{AppError, AppResult},
    services::backend::ProxyRequest,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/blogs/upload-image", post(upload_image))
}

/// POST /api/blogs/upload-image: admin only.
async fn upload_image(
    State(state): State<AppState>,
    session: CookieSession,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Value>> {
    let admin = require_admin(&state.api, &session).await?;
    let mut multipart = multipart?;

    let mut form = Form::new();
    let mut parts = 0usize;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name         = field.name().unwrap_or("image").to_owned();
        let file_name    = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        let mut part = Part::bytes(data.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part
                .mime_str(&content_type)
                .map_err(|_| AppError::BadRequest(format!("Invalid content type: {content_type}")))?;
        }
        form = form.part(name, part);
        parts += 1;
    }

    if parts == 0 {
        return Err(AppError::BadRequest("No file uploaded".into()));
    }

    let body = state
        .api
        .send(
            &session,
            ProxyRequest::post("/admin/blogs/upload-image").authenticated().multipart(form),
        )
        .await?;

    tracing::info!(admin_id = admin.id, parts, "Blog image relayed");
    Ok(Json(body))
}
