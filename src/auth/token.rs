use crate::config::AuthSettings;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
}

/// Generates a session JWT for `user_id`, signed with the configured secret.
///
/// The token expires after `settings.jwt_expiration_hours`.
pub fn generate_token(user_id: Uuid, settings: &AuthSettings) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::hours(settings.jwt_expiration_hours))
        .ok_or_else(|| AppError::InternalServerError("Invalid token expiration".into()))?;

    let claims = Claims {
        sub: user_id,
        exp: expiration.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a JWT string and decodes its claims.
///
/// Returns `AppError::Unauthorized` if the token is malformed, its signature is invalid,
/// or it has expired.
pub fn verify_token(token: &str, settings: &AuthSettings) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(secret: &str) -> AuthSettings {
        AuthSettings {
            jwt_secret: secret.to_string(),
            jwt_expiration_hours: 24,
            token_ttl_minutes: 10,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn test_token_generation_and_verification() {
        let settings = settings("test_secret_for_gen_verify");
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, &settings).unwrap();
        let claims = verify_token(&token, &settings).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_expiration() {
        let settings = settings("test_secret_for_expiration");
        let issued = chrono::Utc::now() - chrono::Duration::hours(3);

        let claims_expired = Claims {
            sub: Uuid::new_v4(),
            exp: (issued + chrono::Duration::hours(1)).timestamp() as usize,
            iat: issued.timestamp() as usize,
        };
        let expired_token = encode(
            &Header::default(),
            &claims_expired,
            &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
        )
        .unwrap();

        match verify_token(&expired_token, &settings) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token: ExpiredSignature"), "{}", msg);
            }
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = generate_token(Uuid::new_v4(), &settings("one_secret")).unwrap();

        match verify_token(&token, &settings("a_completely_different_secret")) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token: InvalidSignature"), "{}", msg);
            }
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_garbage_token_is_unauthorized() {
        assert!(matches!(
            verify_token("not-a-jwt", &settings("secret")),
            Err(AppError::Unauthorized(_))
        ));
    }
}
