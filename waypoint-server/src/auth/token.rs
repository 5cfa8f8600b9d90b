//! Signed session tokens
//!
//! Format: `base64url(claims_json) "." base64url(hmac_sha256(claims_json))`,
//! unpadded. The token is opaque to clients; only this server verifies it.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::AuthError;
use crate::models::Username;

type HmacSha256 = Hmac<Sha256>;

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username the session belongs to
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

/// Issues and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenSigner {
    key: Arc<[u8]>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer. The secret must not be empty and the TTL must be positive.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Config("token secret cannot be empty".into()));
        }
        if ttl <= Duration::zero() {
            return Err(AuthError::Config("token ttl must be positive".into()));
        }

        Ok(Self {
            key: Arc::from(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self, payload: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("hmac accepts any key length");
        mac.update(payload);
        mac
    }

    /// Issue a token for `username`, valid from now for the configured TTL.
    pub fn issue(&self, username: &Username) -> Result<String, AuthError> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(&self, username: &Username, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: username.as_str().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| AuthError::MalformedToken)?;
        let signature = self.mac(&payload).finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let (payload_b64, signature_b64) =
            token.split_once('.').ok_or(AuthError::MalformedToken)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::MalformedToken)?;

        // Constant-time comparison
        self.mac(&payload)
            .verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedToken)?;

        if claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret-test-secret", Duration::hours(1)).unwrap()
    }

    fn alice() -> Username {
        Username::new("alice").unwrap()
    }

    #[test]
    fn issue_then_verify() {
        let signer = signer();
        let token = signer.issue(&alice()).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn rejects_expired() {
        let signer = signer();
        let issued = Utc::now() - Duration::hours(2);
        let token = signer.issue_at(&alice(), issued).unwrap();

        assert!(matches!(signer.verify(&token), Err(AuthError::Expired)));
    }

    #[test]
    fn rejects_other_secret() {
        let token = signer().issue(&alice()).unwrap();
        let other = TokenSigner::new(b"another-secret", Duration::hours(1)).unwrap();

        assert!(matches!(other.verify(&token), Err(AuthError::BadSignature)));
    }

    #[test]
    fn rejects_tampered_payload() {
        let signer = signer();
        let token = signer.issue(&alice()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let forged_claims = Claims {
            sub: "mallory".into(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);

        assert!(matches!(signer.verify(&forged), Err(AuthError::BadSignature)));
    }

    #[test]
    fn rejects_malformed() {
        let signer = signer();
        assert!(matches!(signer.verify("no-dot"), Err(AuthError::MalformedToken)));
        assert!(matches!(signer.verify("!!.!!"), Err(AuthError::MalformedToken)));
        assert!(matches!(signer.verify(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn rejects_bad_config() {
        assert!(TokenSigner::new(b"", Duration::hours(1)).is_err());
        assert!(TokenSigner::new(b"secret", Duration::zero()).is_err());
    }

    #[test]
    fn debug_hides_key() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains("test-secret"));
    }
}
