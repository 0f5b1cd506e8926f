//! Password hashing and verification.
//!
//! Wraps bcrypt with a cost fixed at build time. Hashing salts every call,
//! so two hashes of the same password never match byte-for-byte.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! refused when hashing and never match when verifying.

use bcrypt::{BcryptError, non_truncating_hash, non_truncating_verify};

use crate::errors::{ServiceError, ServiceResult};

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Hash a password before storing it in the database.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    non_truncating_hash(password, HASH_COST).map_err(|e| match e {
        BcryptError::Truncation(_) => ServiceError::Validation {
            message: "password: Password must be at most 72 bytes".to_string(),
            details: vec![(
                "password".to_string(),
                "Password must be at most 72 bytes".to_string(),
            )],
        },
        e => {
            tracing::error!("Password hashing failed: {}", e);
            ServiceError::internal_error("Password hashing failed")
        }
    })
}

/// Verify a password against the stored hash.
///
/// Returns `Ok(false)` for a wrong password. Only a corrupted hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> ServiceResult<bool> {
    match non_truncating_verify(password, password_hash) {
        Ok(matched) => Ok(matched),
        Err(BcryptError::Truncation(_)) => Ok(false),
        Err(e) => {
            tracing::error!("Password verification failed: {}", e);
            Err(ServiceError::internal_error("Password verification failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted() {
        let first = hash_password("secret1").unwrap();
        let second = hash_password("secret1").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("secret1", &first).unwrap());
        assert!(verify_password("secret1", &second).unwrap());
    }

    #[test]
    fn test_wrong_password_is_false_not_error() {
        let hashed = hash_password("secret1").unwrap();

        assert!(!verify_password("secret1x", &hashed).unwrap());
        assert!(!verify_password("", &hashed).unwrap());
    }

    #[test]
    fn test_long_passwords_are_not_truncated() {
        let password = "a".repeat(72);
        let hashed = hash_password(&password).unwrap();

        assert!(verify_password(&password, &hashed).unwrap());
        assert!(!verify_password(&format!("{}x", password), &hashed).unwrap());
        assert!(matches!(
            hash_password(&"a".repeat(73)),
            Err(ServiceError::Validation { .. })
        ));
    }

    #[test]
    fn test_corrupted_hash_is_internal_error() {
        let result = verify_password("secret1", "definitely-not-bcrypt");

        assert!(matches!(result, Err(ServiceError::InternalError { .. })));
    }
}
