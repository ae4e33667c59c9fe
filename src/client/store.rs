//! Client-side reflection of the session, for UI gating only. The gatekeeper
//! remains the authority for access control.
//!
//! Every operation takes a sequence number when it starts. A response is
//! applied only if its number is still the latest issued, so a slow response
//! can never overwrite the result of a newer operation.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};

use super::{
    api::AuthApi,
    events::{AuthEvent, EventBus, Navigator},
};
use crate::models::{Credentials, User};

pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub user:             Option<User>,
    pub is_authenticated: bool,
    pub is_admin:         bool,
    /// An operation is in flight.
    pub loading:          bool,
    pub error:            Option<String>,
}

impl AuthSnapshot {
    fn set_identity(&mut self, user: Option<User>) {
        self.is_authenticated = user.is_some();
        self.is_admin = user.as_ref().is_some_and(User::is_admin);
        self.user = user;
    }
}

pub struct AuthStore {
    api:       Arc<dyn AuthApi>,
    bus:       Arc<dyn EventBus>,
    navigator: Arc<dyn Navigator>,
    state:     watch::Sender<AuthSnapshot>,
    latest:    AtomicU64,
}

/// Background re-validation loop started by [`AuthStore::mount`]. Dropping it
/// unmounts the store.
pub struct SyncHandle(JoinHandle<()>);

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl AuthStore {
    pub fn new(
        api: Arc<dyn AuthApi>,
        bus: Arc<dyn EventBus>,
        navigator: Arc<dyn Navigator>,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(AuthSnapshot::default());
        Arc::new(Self {
            api,
            bus,
            navigator,
            state,
            latest: AtomicU64::new(0),
        })
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.subscribe()
    }

    /// Run the initial check, then re-check on every triggering event until
    /// the returned handle is dropped.
    pub fn mount(self: &Arc<Self>) -> SyncHandle {
        // Subscribe before the first check so no signal is missed.
        let mut events = self.bus.subscribe();
        let store = Arc::clone(self);

        SyncHandle(tokio::spawn(async move {
            store.check_auth_status().await;
            loop {
                match events.recv().await {
                    Ok(event) if event.triggers_recheck() => {
                        tracing::debug!(?event, "Re-validating session");
                        store.check_auth_status().await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Auth events dropped; re-validating");
                        store.check_auth_status().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }))
    }

    /// Ask the gateway who we are. Never fails outward: errors clear the
    /// identity and land in `error`.
    pub async fn check_auth_status(&self) -> bool {
        let seq = self.begin();
        match self.api.check().await {
            Ok(status) => {
                let user = status.identity();
                let authenticated = user.is_some();
                self.settle(seq, |s| s.set_identity(user));
                authenticated
            }
            Err(e) => {
                tracing::warn!(error = %e, "Auth status check failed");
                self.settle(seq, |s| {
                    s.set_identity(None);
                    s.error = Some(e.to_string());
                });
                false
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        let seq = self.begin();
        let credentials = Credentials {
            email:    email.to_owned(),
            password: password.to_owned(),
        };

        match self.api.login(&credentials).await {
            Ok(user) => {
                self.settle(seq, |s| s.set_identity(Some(user)));
                self.bus.publish(AuthEvent::UserLogin);
                true
            }
            Err(e) => {
                self.settle(seq, |s| s.error = Some(e.to_string()));
                false
            }
        }
    }

    /// On success the identity is cleared and the host navigates home once.
    /// On failure the identity is left as it was.
    pub async fn logout(&self) -> bool {
        let seq = self.begin();
        match self.api.logout().await {
            Ok(()) => {
                self.settle(seq, |s| s.set_identity(None));
                self.bus.publish(AuthEvent::UserLogout);
                self.navigator.navigate(HOME_PATH);
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Logout failed");
                self.settle(seq, |s| s.error = Some(e.to_string()));
                false
            }
        }
    }

    // ── Fencing ───────────────────────────────────────────────

    fn begin(&self) -> u64 {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        seq
    }

    /// Apply `update` only if `seq` is still the newest operation.
    fn settle(&self, seq: u64, update: impl FnOnce(&mut AuthSnapshot)) -> bool {
        let applied = self.state.send_if_modified(|s| {
            if self.latest.load(Ordering::SeqCst) != seq {
                return false;
            }
            update(s);
            s.loading = false;
            true
        });
        if !applied {
            tracing::debug!(seq, "Discarding stale auth response");
        }
        applied
    }
}
