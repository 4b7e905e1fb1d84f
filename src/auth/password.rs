use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password for storage in `users.password`
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Check a password against a stored digest. Malformed digests never match.
pub fn verify_password(password: &str, digest: &str) -> bool {
    match verify(password, digest) {
        Ok(matches) => matches,
        Err(e) => {
            tracing::warn!("Stored password digest could not be verified: {}", e);
            false
        }
    }
}
