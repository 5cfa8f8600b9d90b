//! Authentication: password hashing, session tokens and the session cookie
//!
//! Login issues a signed token carried in the `token` cookie. Protected
//! routes take an [`AuthUser`](crate::http::extractors::AuthUser), which
//! verifies the token and yields the username every place query is scoped to.

pub mod password;
pub mod token;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Duration;

pub use password::PasswordHasher;
pub use token::{Claims, TokenSigner};

/// Name of the session cookie
pub const TOKEN_COOKIE: &str = "token";

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no session token")]
    MissingToken,

    #[error("malformed session token")]
    MalformedToken,

    #[error("invalid session token signature")]
    BadSignature,

    #[error("session expired")]
    Expired,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("auth misconfigured: {0}")]
    Config(String),
}

/// Session settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for session tokens
    pub secret: Vec<u8>,
    /// How long a login stays valid
    pub token_ttl: Duration,
    /// Mark the cookie `Secure` (HTTPS only)
    pub cookie_secure: bool,
    /// `SameSite` attribute of the cookie
    pub same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: Vec::new(),
            token_ttl: Duration::hours(24),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }
}

/// Cookie attributes applied to the session cookie
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieSettings {
    /// Build the session cookie carrying `token`.
    pub fn session(&self, token: String) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, token))
            .http_only(true)
            .path("/")
            .secure(self.secure)
            .same_site(self.same_site)
            .build()
    }

    /// Cookie that matches the session cookie's path, for removal.
    pub fn removal(&self) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, "")).path("/").build()
    }
}

impl From<&AuthConfig> for CookieSettings {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secure: config.cookie_secure,
            same_site: config.same_site,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let settings = CookieSettings {
            secure: true,
            same_site: SameSite::None,
        };
        let cookie = settings.session("abc.def".into());

        assert_eq!(cookie.name(), "token");
        assert_eq!(cookie.value(), "abc.def");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
    }

    #[test]
    fn default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl, Duration::hours(24));
        assert!(!config.cookie_secure);
    }
}
