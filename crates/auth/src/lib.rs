//! Access token handling for the medcab client.
//!
//! The backend issues JWT access tokens. The client never verifies their
//! signature (it holds no key); it only reads the claims to detect expiry
//! locally, and keeps the raw string in a [`TokenStore`] under a fixed key.

mod store;
mod token;

pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};
pub use token::{AccessToken, Claims, TokenError};
