//! Client-side auth state.
//!
//! [`AuthStore`] keeps an observable snapshot of who is signed in. It talks to
//! the gateway through [`AuthApi`], learns about outside changes through an
//! injected [`EventBus`], and asks the host to change pages through a
//! [`Navigator`].

pub mod api;
pub mod events;
pub mod store;

pub use api::{AuthApi, ClientError, HttpAuthApi};
pub use events::{AuthEvent, EventBus, InMemoryBus, Navigator, AUTH_SYNC_KEY};
pub use store::{AuthSnapshot, AuthStore, SyncHandle};
