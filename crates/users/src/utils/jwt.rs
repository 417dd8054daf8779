//! JWT verification for caller identity resolution.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use huddle_config::AuthConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::CallerIdentity;

/// JWT claims issued by the identity provider
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token creation failed: {0}")]
    Creation(String),

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Verifies (and, for seeding and tests, mints) HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    token_duration: Duration,
}

impl JwtManager {
    pub fn new(secret: &str, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
            token_duration: Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Builds a manager from the auth settings, or `None` when no signing
    /// secret is configured.
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        let secret = config
            .jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())?;
        Some(Self::new(secret, &config.issuer, &config.audience))
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Generate a signed token for `subject`
    pub fn generate_token(
        &self,
        subject: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<String, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TokenError::Creation("System time error".to_string()))?;
        let exp = now + self.token_duration;

        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: exp.as_secs() as usize,
            iat: now.as_secs() as usize,
            email: email.map(str::to_string),
            name: name.map(str::to_string),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Creation(err.to_string()))
    }

    /// Validate signature, issuer, audience and expiry
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| TokenError::Invalid(err.to_string()))
    }

    /// Resolve a token to a caller identity. Invalid tokens resolve to `None`.
    pub fn identity_from_token(&self, token: &str) -> Option<CallerIdentity> {
        match self.validate_token(token) {
            Ok(claims) => {
                let mut identity = CallerIdentity::new(claims.iss, claims.sub);
                identity.email = claims.email;
                identity.name = claims.name;
                Some(identity)
            }
            Err(err) => {
                tracing::debug!(error = %err, "rejected bearer token");
                None
            }
        }
    }
}
