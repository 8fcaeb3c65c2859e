//! Argon2id hashing for admin account passwords.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use nexiler_core::ports::{AuthError, PasswordService};

/// Stand-in hash checked when a sign-in names no account. Same algorithm and
/// cost parameters as `Argon2::default()`; no password matches it.
const DECOY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$bmV4aWxlci1kZWNveQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn hashing_error(e: argon2::password_hash::Error) -> AuthError {
    AuthError::HashingError(e.to_string())
}

pub struct Argon2PasswordService {
    argon2: Argon2<'static>,
}

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    fn matches(&self, password: &str, hash: &PasswordHash<'_>) -> bool {
        self.argon2.verify_password(password.as_bytes(), hash).is_ok()
    }
}

impl Default for Argon2PasswordService {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(hashing_error)?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let stored = PasswordHash::new(hash).map_err(hashing_error)?;
        Ok(self.matches(password, &stored))
    }

    fn verify_missing(&self, password: &str) {
        match PasswordHash::new(DECOY_HASH) {
            Ok(decoy) => {
                let _ = self.matches(password, &decoy);
            }
            Err(e) => tracing::error!(error = %e, "Decoy password hash is malformed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use argon2::Params;

    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = Argon2PasswordService::new();

        let hash = service.hash("admin-secret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("admin-secret", &hash).unwrap());
        assert!(!service.verify("admin-secret ", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let service = Argon2PasswordService::new();
        assert!(matches!(
            service.verify("anything", "plain-text"),
            Err(AuthError::HashingError(_))
        ));
    }

    #[test]
    fn test_decoy_costs_the_same_as_a_real_hash() {
        let service = Argon2PasswordService::new();
        let real = service.hash("admin-secret").unwrap();
        let real = PasswordHash::new(&real).unwrap();

        let decoy = PasswordHash::new(DECOY_HASH).unwrap();

        let decoy_params = Params::try_from(&decoy).unwrap();
        let real_params = Params::try_from(&real).unwrap();
        assert_eq!(decoy.algorithm, real.algorithm);
        assert_eq!(decoy_params.m_cost(), real_params.m_cost());
        assert_eq!(decoy_params.t_cost(), real_params.t_cost());
        assert_eq!(decoy_params.p_cost(), real_params.p_cost());

        assert!(!service.matches("admin-secret", &decoy));
        assert!(!service.matches("", &decoy));
    }
}
