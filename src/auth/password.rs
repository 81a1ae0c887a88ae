// Password hashing utilities
// bcrypt with the library's default cost

use bcrypt::{hash, verify, DEFAULT_COST};

/// Minimum length for a new password
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks a new password against the length policy
pub fn validate_new_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

/// Hashes a password using bcrypt
///
/// # Arguments
/// * `password` - The plaintext password to hash
///
/// # Returns
/// * `Ok(String)` - The bcrypt hash
/// * `Err(String)` - If hashing fails
///
/// # Example
/// ```
/// use minivoetbal_api::auth::password::hash_password;
///
/// let hash = hash_password("scheidsrechter").expect("valid hash");
/// assert!(hash.starts_with("$2"));
/// ```
pub fn hash_password(password: &str) -> Result<String, String> {
    hash(password, DEFAULT_COST).map_err(|e| e.to_string())
}

/// Verifies a password against a bcrypt hash
///
/// # Arguments
/// * `password` - The plaintext password to verify
/// * `hash` - The stored bcrypt hash
///
/// # Returns
/// * `Ok(bool)` - True if the password matches
/// * `Err(String)` - If the hash cannot be parsed
pub fn verify_password(password: &str, hash: &str) -> Result<bool, String> {
    verify(password, hash).map_err(|e| e.to_string())
}
