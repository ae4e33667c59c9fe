use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Identity ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug:  String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name:  String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Identity reported by the backend's auth-check. Never cached across requests.
///
/// Only `id` is mandatory. Fields the gateway does not interpret are kept in
/// `extra` so the user serializes back to what the backend sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id:    u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name:  String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roles: Vec<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub const ADMIN_ROLE: &str = "admin";

impl User {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.slug == ADMIN_ROLE)
    }

    /// Lenient decode of a raw backend user object.
    pub fn from_raw(raw: &Value) -> Option<Self> {
        match User::deserialize(raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Backend user object could not be read");
                None
            }
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Backend payloads ─────────────────────────────────────────

/// `GET /auth-check`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthCheck {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user:          Option<Value>,
}

impl AuthCheck {
    /// The backend's user object as sent, only when the backend vouches for it.
    pub fn vouched_user(self) -> Option<Value> {
        if self.authenticated { self.user } else { None }
    }

    pub fn identity(self) -> Option<User> {
        self.vouched_user().as_ref().and_then(User::from_raw)
    }
}

/// `POST /login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user:         Option<Value>,
}

// ── Gateway payloads ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email:    String,
    pub password: String,
}

/// `GET /api/auth/check`. `user` is relayed verbatim from the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_authenticated: bool,
    #[serde(default)]
    pub user:             Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error:            Option<String>,
}

impl SessionStatus {
    pub fn anonymous() -> Self {
        Self { is_authenticated: false, user: None, error: None }
    }

    pub fn identity(&self) -> Option<User> {
        if !self.is_authenticated {
            return None;
        }
        self.user.as_ref().and_then(User::from_raw)
    }
}
