//! Authenticated proxy layer.
//!
//! Every call toward the backend API goes through [`ApiClient::execute`]: it
//! attaches the bearer and CSRF headers from a [`SessionProvider`], sends one
//! request, and normalizes failures into [`ProxyError`]. It never writes to the
//! session itself.

use std::{sync::Arc, time::Duration};

use axum::http::{
    header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE},
    HeaderMap, Method, StatusCode,
};
use reqwest::multipart::Form;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tower_cookies::Cookie;

use crate::{
    auth::session::{SessionProvider, CSRF_COOKIE},
    config::Config,
    models::AuthCheck,
};

pub const CSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Used when the backend fails without a readable `message`.
pub const UPSTREAM_FALLBACK: &str = "Request to the backend failed";

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Auth was required and the session holds no token. Nothing was sent.
    #[error("Authentication required")]
    Unauthorized,

    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("unreadable backend response: {0}")]
    Decode(String),
}

/// Normalized `{message, status}` shape. `status` is absent when the backend
/// was never reached or never answered.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub message: String,
    pub status:  Option<u16>,
}

impl ProxyError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ProxyError::Unauthorized           => Some(StatusCode::UNAUTHORIZED),
            ProxyError::Upstream { status, .. } => Some(*status),
            ProxyError::Transport(_) | ProxyError::Decode(_) => None,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            message: self.to_string(),
            status:  self.status().map(|s| s.as_u16()),
        }
    }
}

// ── Request description ───────────────────────────────────────

#[derive(Debug)]
pub enum Payload {
    Empty,
    Json(Value),
    /// Content type is left to the transport so it can write the boundary.
    Multipart(Form),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    Default,
    NoStore,
}

/// One outbound call. Built fresh per request and consumed by `execute`.
#[derive(Debug)]
pub struct ProxyRequest {
    pub endpoint:     String,
    pub method:       Method,
    pub payload:      Payload,
    pub require_auth: bool,
    pub include_csrf: bool,
    pub cache:        CachePolicy,
}

impl ProxyRequest {
    /// State-mutating methods carry the CSRF token by default.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        let include_csrf = !method.is_safe();
        Self {
            endpoint: endpoint.into(),
            method,
            payload: Payload::Empty,
            require_auth: false,
            include_csrf,
            cache: CachePolicy::Default,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn authenticated(mut self) -> Self {
        self.require_auth = true;
        self
    }

    pub fn without_csrf(mut self) -> Self {
        self.include_csrf = false;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.payload = Payload::Multipart(form);
        self
    }

    pub fn no_store(mut self) -> Self {
        self.cache = CachePolicy::NoStore;
        self
    }
}

/// Successful backend answer.
#[derive(Debug)]
pub struct ProxyReply {
    pub status:     StatusCode,
    pub body:       Value,
    /// `XSRF-TOKEN` issued by the backend in `Set-Cookie`, if any.
    pub csrf_token: Option<String>,
}

// ── Client ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ApiClient {
    http:     reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend_timeout_secs))
            .user_agent(concat!("storefront-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            http,
            base_url: Arc::from(config.backend_api_url.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn execute(
        &self,
        session: &dyn SessionProvider,
        request: ProxyRequest,
    ) -> Result<ProxyReply, ProxyError> {
        let token = session.token();
        if request.require_auth && token.is_none() {
            tracing::debug!(endpoint = %request.endpoint, "No session token; backend not contacted");
            return Err(ProxyError::Unauthorized);
        }

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.endpoint))
            .header(ACCEPT, "application/json");

        if let Some(token) = &token {
            builder = builder.bearer_auth(token);
        }
        if request.include_csrf {
            if let Some(csrf) = session.csrf_token() {
                builder = builder.header(CSRF_HEADER, csrf);
            }
        }
        if request.cache == CachePolicy::NoStore {
            builder = builder.header(CACHE_CONTROL, "no-store");
        }

        builder = match request.payload {
            Payload::Empty          => builder.header(CONTENT_TYPE, "application/json"),
            Payload::Json(body)     => builder.json(&body),
            Payload::Multipart(form) => builder.multipart(form),
        };

        let resp = builder.send().await.map_err(|e| {
            tracing::warn!(endpoint = %request.endpoint, error = %e, "Backend request failed");
            ProxyError::Transport(e.to_string())
        })?;

        let status = resp.status();
        let csrf_token = csrf_from_headers(resp.headers());
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ProxyError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = error_message(&bytes).unwrap_or_else(|| UPSTREAM_FALLBACK.to_owned());
            tracing::debug!(
                method = %request.method,
                endpoint = %request.endpoint,
                %status,
                "Backend returned an error"
            );
            return Err(ProxyError::Upstream { status, message });
        }

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ProxyError::Decode(e.to_string()))?
        };

        Ok(ProxyReply { status, body, csrf_token })
    }

    /// Parsed JSON body of a successful call.
    pub async fn send(
        &self,
        session: &dyn SessionProvider,
        request: ProxyRequest,
    ) -> Result<Value, ProxyError> {
        Ok(self.execute(session, request).await?.body)
    }

    /// `GET /auth-check`, never served from a cache.
    pub async fn auth_check(&self, session: &dyn SessionProvider) -> Result<AuthCheck, ProxyError> {
        let body = self
            .send(session, ProxyRequest::get("/auth-check").authenticated().no_store())
            .await?;
        serde_json::from_value(body).map_err(|e| ProxyError::Decode(e.to_string()))
    }

    /// `POST /logout` for the session's token.
    pub async fn logout(&self, session: &dyn SessionProvider) -> Result<(), ProxyError> {
        self.send(session, ProxyRequest::post("/logout").authenticated())
            .await
            .map(|_| ())
    }
}

fn error_message(bytes: &[u8]) -> Option<String> {
    let body: Value = serde_json::from_slice(bytes).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

fn csrf_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| Cookie::parse(raw.to_owned()).ok())
        .find(|c| c.name() == CSRF_COOKIE && !c.value().is_empty())
        .map(|c| match urlencoding::decode(c.value()) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => c.value().to_owned(),
        })
}
