//! Signals that drive auth-state re-validation, and the seams through which a
//! host (browser shell, desktop webview, test) delivers them.

use tokio::sync::broadcast;

/// Storage key whose change in another tab means "auth state moved".
pub const AUTH_SYNC_KEY: &str = "auth-sync";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Same-document signal raised after a successful login.
    UserLogin,
    /// Same-document signal raised after a successful logout.
    UserLogout,
    /// Page visibility changed.
    VisibilityChanged { visible: bool },
    /// Cross-tab storage write.
    Storage { key: String },
}

impl AuthEvent {
    pub fn triggers_recheck(&self) -> bool {
        match self {
            AuthEvent::UserLogin | AuthEvent::UserLogout => true,
            AuthEvent::VisibilityChanged { visible } => *visible,
            AuthEvent::Storage { key } => key == AUTH_SYNC_KEY,
        }
    }
}

/// Publish/subscribe channel injected into the auth store.
pub trait EventBus: Send + Sync {
    fn publish(&self, event: AuthEvent);
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

/// Process-local bus over a tokio broadcast channel.
#[derive(Clone)]
pub struct InMemoryBus {
    tx: broadcast::Sender<AuthEvent>,
}

impl InMemoryBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus for InMemoryBus {
    fn publish(&self, event: AuthEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Auth event published with no subscribers");
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }
}

/// Host navigation.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}
