use medcab_auth::{StoreError, TokenError};
use medcab_client::{ApiError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid access token: {0}")]
    Token(#[from] TokenError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("session expired, sign in again")]
    Expired,
    #[error("registration code must contain at least {min} characters")]
    InvalidRegistrationCode { min: usize },
    #[error("no active session")]
    NotAuthenticated,
}

impl SessionError {
    /// True when the failure ended the session.
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::Api(error) => error.kind() == ErrorKind::Authorization,
            Self::Expired | Self::NotAuthenticated => true,
            _ => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Api(error) => error.user_message(),
            other => other.to_string(),
        }
    }
}
