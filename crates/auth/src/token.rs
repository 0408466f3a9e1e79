use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("access token is empty")]
    Empty,
    #[error("access token could not be decoded: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("access token carries no expiry claim")]
    MissingExpiry,
    #[error("access token expiry {0} is out of range")]
    InvalidExpiry(i64),
}

/// Claims the client reads from an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
    /// Backend user id; a number or a string depending on the issuer
    #[serde(default)]
    pub user_id: Option<serde_json::Value>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub jti: Option<String>,
}

/// A raw bearer token together with its decoded expiry.
#[derive(Clone)]
pub struct AccessToken {
    raw: String,
    claims: Claims,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Decode the claims of `raw` without checking the signature.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TokenError::Empty);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(trimmed, &DecodingKey::from_secret(&[]), &validation)?;
        let claims = data.claims;

        let exp = claims.exp.ok_or(TokenError::MissingExpiry)?;
        let expires_at = Utc
            .timestamp_opt(exp, 0)
            .single()
            .ok_or(TokenError::InvalidExpiry(exp))?;

        Ok(Self {
            raw: trimmed.to_string(),
            claims,
            expires_at,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// A token is expired once `now + leeway` has passed its `exp` claim.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        self.expires_at < now + leeway
    }

    pub fn is_expired(&self, leeway: Duration) -> bool {
        self.is_expired_at(Utc::now(), leeway)
    }

    /// Short form safe for logs.
    pub fn redacted(&self) -> String {
        let prefix: String = self.raw.chars().take(8).collect();
        format!("{prefix}… ({} chars)", self.raw.len())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("raw", &self.redacted())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
