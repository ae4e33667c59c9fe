use dotenvy::dotenv;
use std::env;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    // Gateway
    pub gateway_host:       String,
    pub gateway_port:       u16,
    pub static_dir:         String,

    // Backend API
    pub backend_api_url:    String,
    pub public_asset_url:   String,
    pub backend_timeout_secs: u64,

    // Gatekeeper
    pub protected_prefixes: Vec<String>,
    pub signin_path:        String,
    pub forbidden_path:     String,

    // Session
    pub session_days:       i64,

    // App
    pub app_env:            String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_host:       "0.0.0.0".into(),
            gateway_port:       3000,
            static_dir:         "public".into(),

            backend_api_url:    "http://localhost:8000/api".into(),
            public_asset_url:   "http://localhost:8000/storage".into(),
            backend_timeout_secs: 15,

            protected_prefixes: vec!["/dashboard".into()],
            signin_path:        "/auth/signin".into(),
            forbidden_path:     "/403".into(),

            session_days:       7,

            app_env:            "development".into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        fn parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
            match env::var(key) {
                Ok(raw) => raw
                    .trim()
                    .parse::<T>()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw)),
                Err(_) => Ok(default),
            }
        }

        let defaults = Self::default();

        Ok(Self {
            gateway_host: env::var("GATEWAY_HOST").unwrap_or(defaults.gateway_host),
            gateway_port: parse("GATEWAY_PORT", defaults.gateway_port)?,
            static_dir:   env::var("STATIC_DIR").unwrap_or(defaults.static_dir),

            backend_api_url:  env::var("BACKEND_API_URL").unwrap_or(defaults.backend_api_url),
            public_asset_url: env::var("PUBLIC_ASSET_URL").unwrap_or(defaults.public_asset_url),
            backend_timeout_secs: parse("BACKEND_TIMEOUT_SECS", defaults.backend_timeout_secs)?,

            protected_prefixes: env::var("PROTECTED_PREFIXES")
                .map(|raw| split_prefixes(&raw))
                .unwrap_or(defaults.protected_prefixes),
            signin_path:    env::var("SIGNIN_PATH").unwrap_or(defaults.signin_path),
            forbidden_path: env::var("FORBIDDEN_PATH").unwrap_or(defaults.forbidden_path),

            session_days: parse("SESSION_DAYS", defaults.session_days)?,

            app_env: env::var("APP_ENV").unwrap_or(defaults.app_env),
        })
    }

    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }

    /// Session cookies are only marked `Secure` outside local development.
    pub fn secure_cookies(&self) -> bool {
        !self.is_development()
    }

    /// True when `path` equals a protected prefix or sits beneath one.
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

fn split_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with('/') {
                p.to_owned()
            } else {
                format!("/{p}")
            }
        })
        .collect()
}
