#![allow(dead_code)]

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use storefront_gateway::{config::Config, state::AppState};

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method:  Method,
    pub path:    String,
    pub query:   Option<String>,
    pub headers: HeaderMap,
    pub body:    Vec<u8>,
}

impl Hit {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub status:     StatusCode,
    pub body:       Value,
    pub set_cookie: Vec<String>,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            set_cookie: Vec::new(),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn with_cookie(mut self, cookie: &str) -> Self {
        self.set_cookie.push(cookie.to_owned());
        self
    }
}

#[derive(Default)]
struct Inner {
    hits:   Mutex<Vec<Hit>>,
    routes: Mutex<HashMap<(Method, String), Reply>>,
}

/// Stand-in for the backend API: an axum server on an ephemeral port that
/// records every request and answers from a reply table (404 otherwise).
#[derive(Clone)]
pub struct MockBackend {
    pub base_url: String,
    inner:        Arc<Inner>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let inner = Arc::new(Inner::default());
        let app = Router::new().fallback(handle).with_state(inner.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}/api"), inner }
    }

    pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.inner
            .routes
            .lock()
            .unwrap()
            .insert((method, format!("/api{path}")), reply);
        self
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.inner.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self) -> usize {
        self.inner.hits.lock().unwrap().len()
    }

    pub fn last_hit(&self, method: Method, path: &str) -> Option<Hit> {
        let full = format!("/api{path}");
        self.hits()
            .into_iter()
            .rev()
            .find(|h| h.method == method && h.path == full)
    }
}

async fn handle(State(inner): State<Arc<Inner>>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let body = to_bytes(body, usize::MAX).await.unwrap_or_default();
    let path = parts.uri.path().to_owned();

    inner.hits.lock().unwrap().push(Hit {
        method:  parts.method.clone(),
        path:    path.clone(),
        query:   parts.uri.query().map(str::to_owned),
        headers: parts.headers.clone(),
        body:    body.to_vec(),
    });

    let reply = inner.routes.lock().unwrap().get(&(parts.method, path)).cloned();
    match reply {
        Some(reply) => {
            let mut response = (reply.status, axum::Json(reply.body)).into_response();
            for cookie in reply.set_cookie {
                response
                    .headers_mut()
                    .append(header::SET_COOKIE, HeaderValue::from_str(&cookie).unwrap());
            }
            response
        }
        None => (StatusCode::NOT_FOUND, axum::Json(json!({ "message": "Not found" }))).into_response(),
    }
}

/// A base URL nobody listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub fn config_for(backend_url: &str) -> Config {
    Config {
        backend_api_url:      backend_url.to_owned(),
        public_asset_url:     "https://cdn.test/storage".into(),
        backend_timeout_secs: 5,
        ..Config::default()
    }
}

pub fn state_for(backend_url: &str) -> AppState {
    AppState::new(config_for(backend_url)).unwrap()
}

// ── Fixtures ─────────────────────────────────────────────────

pub fn admin_user() -> Value {
    json!({
        "id": 1,
        "name": "A",
        "email": "a@x.com",
        "roles": [{ "id": 1, "slug": "admin", "name": "Admin" }]
    })
}

pub fn customer_user() -> Value {
    json!({
        "id": 2,
        "name": "C",
        "email": "c@x.com",
        "roles": [{ "id": 2, "slug": "customer", "name": "Customer" }]
    })
}

// ── Request helpers ──────────────────────────────────────────

pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request {
    let mut builder = axum::http::Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A request with an arbitrary body and content type.
pub fn raw_request(method: Method, uri: &str, cookie: Option<&str>, content_type: &str, body: &str) -> Request {
    let mut builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_owned())).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

pub fn set_cookie_named(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(response).into_iter().find(|c| c.starts_with(&prefix))
}
