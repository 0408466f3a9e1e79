use medcab_auth::StoreError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::body::ErrorBody;

/// Generic text for failures where no response was received.
const UNREACHABLE_MESSAGE: &str = "cannot reach server";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot reach server: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request rejected with status {status}: {body}")]
    Unauthorized { status: StatusCode, body: ErrorBody },
    #[error("request failed with status {status}: {body}")]
    Application { status: StatusCode, body: ErrorBody },
    #[error("no access token stored, sign in again")]
    MissingToken,
    #[error("request cancelled")]
    Cancelled,
    #[error("response with status {0} carried no body")]
    EmptyResponse(StatusCode),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token storage failed: {0}")]
    Store(#[from] StoreError),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Coarse classification callers use to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received.
    Network,
    /// `401`/`403`; the session has already been torn down.
    Authorization,
    /// Any other non-success status, with structured messages.
    Application,
    /// Failures that never left the client.
    Local,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Unauthorized { .. } => ErrorKind::Authorization,
            Self::Application { .. } | Self::EmptyResponse(_) => ErrorKind::Application,
            Self::MissingToken
            | Self::Cancelled
            | Self::Json(_)
            | Self::Store(_)
            | Self::Client(_) => ErrorKind::Local,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { status, .. } | Self::Application { status, .. } => Some(*status),
            Self::EmptyResponse(status) => Some(*status),
            Self::Network(error) => error.status(),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Unauthorized { body, .. } | Self::Application { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Text suitable for display next to the form that triggered the request.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => UNREACHABLE_MESSAGE.to_string(),
            Self::Unauthorized { body, .. } => body
                .primary_message()
                .map(str::to_string)
                .unwrap_or_else(|| "your session is no longer valid".to_string()),
            Self::Application { body, status } if body.is_empty() => {
                format!("request failed with status {status}")
            }
            Self::Application { body, .. } => body.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
