//! Shared application state: injected into every handler via `axum::extract::State`.

use crate::{config::Config, services::backend::ApiClient};

/// Application-wide state passed via axum `State<AppState>`.
///
/// Cloning is cheap: `ApiClient` wraps an `Arc`-backed `reqwest::Client`, and
/// `Config` holds only strings and primitives.
#[derive(Clone)]
pub struct AppState {
    pub api:    ApiClient,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config)?;
        Ok(Self { api, config })
    }
}
