//! Argon2id password hashing
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) so parameters travel with
//! the hash and can be raised later without invalidating stored rows.

use std::sync::{Arc, OnceLock};
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use super::AuthError;
use crate::models::Password;

/// Password hasher with fixed Argon2id parameters
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
    /// Hash checked when there is no real account, made with `params` on first use
    dummy: Arc<OnceLock<Option<String>>>,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl PasswordHasher {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            dummy: Arc::new(OnceLock::new()),
            #[cfg(test)]
            verifications: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password with a fresh random salt.
    pub fn hash(&self, password: &Password) -> Result<String, AuthError> {
        self.hash_bytes(password.as_bytes())
    }

    fn hash_bytes(&self, password: &[u8]) -> Result<String, AuthError> {
        use argon2::password_hash::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password, &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored PHC hash.
    ///
    /// Returns `Ok(false)` on mismatch; errors only for unparseable hashes.
    pub fn verify(&self, password: &Password, stored: &str) -> Result<bool, AuthError> {
        self.verify_bytes(password.as_bytes(), stored)
    }

    fn verify_bytes(&self, password: &[u8], stored: &str) -> Result<bool, AuthError> {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);

        let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;

        match self.argon2().verify_password(password, &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Hash(e.to_string())),
        }
    }

    /// Spend the same work as [`verify`](Self::verify) when there is no
    /// account to check against, so login latency does not reveal which
    /// usernames exist. Always returns `false`.
    pub fn verify_dummy(&self, password: Option<&Password>) -> bool {
        let dummy = self.dummy.get_or_init(|| {
            self.hash_bytes(b"waypoint-no-such-account")
                .map_err(|e| tracing::warn!(error = %e, "failed to build dummy password hash"))
                .ok()
        });

        if let Some(dummy) = dummy {
            let password = password.map(Password::as_bytes).unwrap_or_default();
            let _ = self.verify_bytes(password, dummy);
        }
        false
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[cfg(test)]
impl PasswordHasher {
    /// Minimum-cost parameters so tests stay fast in debug builds.
    pub(crate) fn cheap() -> Self {
        Self::new(Params::new(Params::MIN_M_COST, 1, 1, None).expect("valid argon2 params"))
    }

    /// Number of Argon2 verifications run by this hasher and its clones.
    pub(crate) fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(s: &str) -> Password {
        Password::new(s.to_owned()).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = PasswordHasher::cheap();
        let hash = hasher.hash(&pw("correct horse")).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&pw("correct horse"), &hash).unwrap());
        assert!(!hasher.verify(&pw("battery staple"), &hash).unwrap());
    }

    #[test]
    fn salts_differ() {
        let hasher = PasswordHasher::cheap();
        let a = hasher.hash(&pw("same password")).unwrap();
        let b = hasher.hash(&pw("same password")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verifies_hash_made_with_other_params() {
        let hash = PasswordHasher::cheap().hash(&pw("portable")).unwrap();
        let stronger = PasswordHasher::new(Params::new(Params::MIN_M_COST * 2, 2, 1, None).unwrap());
        assert!(stronger.verify(&pw("portable"), &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_error() {
        let err = PasswordHasher::cheap()
            .verify(&pw("whatever1"), "not-a-phc-string")
            .unwrap_err();
        assert!(matches!(err, AuthError::Hash(_)));
    }

    #[test]
    fn dummy_verify_runs_argon2() {
        let hasher = PasswordHasher::cheap();
        let clone = hasher.clone();

        assert!(!hasher.verify_dummy(Some(&pw("whatever1"))));
        assert!(!clone.verify_dummy(None));
        assert_eq!(hasher.verifications(), 2);
    }
}
