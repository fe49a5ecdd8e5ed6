//! Service-to-service bearer credential.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Claims carried by a service credential. `sub` names the calling
/// subsystem, not an end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceClaims {
    pub sub: String,
    pub iat: i64,
}

/// Bearer token attached to every outbound call.
#[derive(Clone)]
pub struct ServiceToken {
    subject: String,
    token: String,
}

impl std::fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceToken")
            .field("subject", &self.subject)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl ServiceToken {
    /// Mints an HS256 token for `subject` signed with the shared secret.
    pub fn issue(subject: impl Into<String>, secret: &[u8]) -> Result<Self, ClientError> {
        let subject = subject.into();
        let claims = ServiceClaims {
            sub: subject.clone(),
            iat: chrono::Utc::now().timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )?;
        Ok(Self { subject, token })
    }

    /// Wraps a token minted elsewhere.
    pub fn from_raw(subject: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            token: token.into(),
        }
    }

    /// Returns the calling subsystem this token identifies.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the encoded token.
    pub fn as_str(&self) -> &str {
        &self.token
    }

    /// Verifies a bearer token against the shared secret.
    ///
    /// Service tokens carry no expiry, so only the signature and the
    /// algorithm are checked.
    pub fn verify(token: &str, secret: &[u8]) -> Result<ServiceClaims, ClientError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        let data = decode::<ServiceClaims>(token, &DecodingKey::from_secret(secret), &validation)?;
        Ok(data.claims)
    }
}
