// JWT token creation and verification
// Session tokens carry the user's role and team so handlers can gate without a lookup

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::value_objects::{Role, Viewer};

/// Lifetime of a session token
pub const TOKEN_LIFETIME_HOURS: i64 = 8;

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user_id)
/// * `role` - Role at the time of login
/// * `team_id` - Managed team, player managers only
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    #[serde(default)]
    pub team_id: Option<Uuid>,
    pub exp: usize,
}

impl Claims {
    pub fn viewer(&self) -> Viewer {
        Viewer::User {
            user_id: self.sub,
            role: self.role,
            team_id: self.team_id,
        }
    }
}

/// Creates a signed HS256 token for a user
///
/// # Arguments
/// * `user_id` - Goes into the `sub` claim
/// * `role` - Role the handlers gate on
/// * `team_id` - Managed team, `None` unless the role is player manager
/// * `secret` - Signing key from the configuration
///
/// # Returns
/// * `Ok(String)` - The token, valid for [`TOKEN_LIFETIME_HOURS`]
/// * `Err(String)` - If encoding fails
///
/// # Example
/// ```
/// use minivoetbal_api::auth::jwt::{create_token, verify_token};
/// use minivoetbal_api::domain::user::value_objects::Role;
/// use uuid::Uuid;
///
/// let user_id = Uuid::new_v4();
/// let token = create_token(user_id, Role::Referee, None, "secret").expect("valid token");
/// let claims = verify_token(&token, "secret").expect("valid token");
/// assert_eq!(claims.sub, user_id);
/// assert_eq!(claims.role, Role::Referee);
/// ```
pub fn create_token(
    user_id: Uuid,
    role: Role,
    team_id: Option<Uuid>,
    secret: &str,
) -> Result<String, String> {
    let expiry = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
    let claims = Claims {
        sub: user_id,
        role,
        team_id,
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| e.to_string())
}

/// Verifies and decodes a JWT token
///
/// # Arguments
/// * `token` - The bearer token as sent by the client
/// * `secret` - Signing key from the configuration
///
/// # Returns
/// * `Ok(Claims)` - The decoded claims
/// * `Err(String)` - On a bad signature, a malformed token or an expired one
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
