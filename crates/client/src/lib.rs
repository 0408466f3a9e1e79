//! Bearer-token REST client for the practice backend.
//!
//! Every request made through [`ProtectedClient`] reads the persisted token and
//! attaches it. Every `401`/`403` answer is handed as an
//! [`UnauthorizedSignal`] to the one installed [`UnauthorizedHandler`] (the
//! session manager) before the error is returned, so the session is already
//! torn down when the caller sees the failure.

mod body;
mod client;
mod error;

pub use body::ErrorBody;
pub use client::{ProtectedClient, RequestOptions, UnauthorizedHandler, UnauthorizedSignal};
pub use error::{ApiError, ErrorKind};

pub use reqwest::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;
