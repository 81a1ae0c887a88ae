// Password reset tokens
// The raw token only travels in the email; the database keeps its SHA-256

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::repositories::PasswordResetToken;

/// How long a reset link stays valid
pub const RESET_TOKEN_LIFETIME_HOURS: i64 = 1;

/// Hex-encoded SHA-256 of a raw token
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Generates a fresh token for a user
///
/// # Arguments
/// * `user_id` - Account the token resets
/// * `now` - Issue time; the token expires [`RESET_TOKEN_LIFETIME_HOURS`] later
///
/// # Returns
/// The raw token for the email, and the record to store
pub fn issue(user_id: Uuid, now: DateTime<Utc>) -> (String, PasswordResetToken) {
    let raw = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let record = PasswordResetToken {
        token_hash: hash_token(&raw),
        user_id,
        expires_at: now + Duration::hours(RESET_TOKEN_LIFETIME_HOURS),
        used_at: None,
    };
    (raw, record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn issued_token_matches_stored_hash() {
        let now = Utc::now();
        let (raw, record) = issue(Uuid::new_v4(), now);

        assert_eq!(raw.len(), 64);
        assert_eq!(record.token_hash, hash_token(&raw));
        assert_eq!(record.expires_at, now + Duration::hours(1));
        assert!(record.is_usable(now));
    }

    #[test]
    fn tokens_are_unique() {
        let now = Utc::now();
        let (a, _) = issue(Uuid::new_v4(), now);
        let (b, _) = issue(Uuid::new_v4(), now);
        assert_ne!(a, b);
    }
}
