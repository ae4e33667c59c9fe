//! Calls from the client to the gateway's `/api/auth` routes.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::{Credentials, SessionStatus, User};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The gateway answered with an error; the message is user-facing.
    #[error("{0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /api/auth/check`
    async fn check(&self) -> Result<SessionStatus, ClientError>;
    /// `POST /api/auth`
    async fn login(&self, credentials: &Credentials) -> Result<User, ClientError>;
    /// `DELETE /api/auth`
    async fn logout(&self) -> Result<(), ClientError>;
}

/// [`AuthApi`] over HTTP with its own cookie jar, so the session cookie the
/// gateway sets on login rides along on later calls.
pub struct HttpAuthApi {
    http:     reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct LoginReply {
    user: Option<User>,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn check(&self) -> Result<SessionStatus, ClientError> {
        let resp = self.http.get(self.url("/api/auth/check")).send().await?;
        if !resp.status().is_success() {
            return Err(rejection(resp, "Session check failed").await);
        }
        Ok(resp.json::<SessionStatus>().await?)
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, ClientError> {
        let resp = self
            .http
            .post(self.url("/api/auth"))
            .json(credentials)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejection(resp, "Login failed").await);
        }
        resp.json::<LoginReply>()
            .await?
            .user
            .ok_or_else(|| ClientError::Decode("login reply carried no user".into()))
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let resp = self.http.delete(self.url("/api/auth")).send().await?;
        if !resp.status().is_success() {
            return Err(rejection(resp, "Logout failed").await);
        }
        Ok(())
    }
}

/// Turn an error response into a readable message, falling back to `fallback`.
async fn rejection(resp: reqwest::Response, fallback: &str) -> ClientError {
    let message = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| {
            body.get("error")
                .or_else(|| body.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| fallback.to_owned());
    ClientError::Rejected(message)
}
