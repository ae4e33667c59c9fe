pub mod gatekeeper;
pub mod session_guard;
