//! Session lifecycle for the medcab client.
//!
//! [`SessionManager`] is the single owner of the access token and the identity
//! derived from it. It subscribes to authorization failures published by the
//! [`ProtectedClient`](medcab_client::ProtectedClient) and tears the session
//! down in response. Views learn where to go next through [`Navigation`]
//! events and ask a [`RouteGuard`] whether guarded content may render.

mod error;
mod guard;
mod manager;

pub use error::SessionError;
pub use guard::{GuardDecision, RouteGuard};
pub use manager::{
    Navigation, ProfileFailurePolicy, SessionManager, SessionSnapshot, MIN_REGISTRATION_CODE_LEN,
};
