//! Admin password hashing. Every hash carries its own random salt and cost,
//! so two accounts with the same password store different hashes.
//!
//! Both functions are CPU-bound; async callers should run them on
//! `tokio::task::spawn_blocking`.

pub use bcrypt::{BcryptError, DEFAULT_COST};

/// Lowest cost bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hashes `password` with a fresh salt at `cost`.
///
/// # Errors
///
/// Returns [`BcryptError`] if `cost` is outside `MIN_COST..=MAX_COST`.
pub fn hash_password(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password, cost)
}

/// `true` when `password` matches `stored_hash`. A stored value that is not
/// a bcrypt hash never matches.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    bcrypt::verify(password, stored_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_bcrypt_with_requested_cost() {
        let hash = hash_password("hunter22", MIN_COST).expect("hash");
        assert!(hash.starts_with("$2b$04$"), "{hash}");
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("same password", MIN_COST).expect("hash");
        let b = hash_password("same password", MIN_COST).expect("hash");
        assert_ne!(a, b);
        assert!(verify_password("same password", &a));
        assert!(verify_password("same password", &b));
    }

    #[test]
    fn verify_accepts_matching_password_only() {
        let stored = hash_password("correct horse", MIN_COST).expect("hash");
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong", &stored));
    }

    #[test]
    fn legacy_or_garbage_hash_never_matches() {
        let sha256_hex = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert!(!verify_password("password", sha256_hex));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn cost_out_of_range_is_an_error() {
        assert!(hash_password("pw", MIN_COST - 1).is_err());
        assert!(hash_password("pw", MAX_COST + 1).is_err());
    }
}
