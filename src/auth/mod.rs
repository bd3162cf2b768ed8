pub mod extractors;
pub mod middleware;
pub mod otp;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use otp::{generate_one_time_token, ONE_TIME_TOKEN_REGEX};
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Payload for `POST /api/auth/create-account`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Payload carrying a one-time token (confirmation and token validation).
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Payload for the flows that only need an address: new confirmation code, forgot password.
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
}

/// Path of `POST /api/auth/update-password/{token}`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetTokenPath {
    #[validate(regex(path = "ONE_TIME_TOKEN_REGEX", message = "Token is not valid"))]
    pub token: String,
}

/// New password chosen through the reset flow.
#[derive(Debug, Deserialize, Validate)]
pub struct NewPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is not valid"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckPasswordRequest {
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response structure after a successful login.
/// Contains the JWT access token and the ID of the authenticated user.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_account_validation() {
        let valid = CreateAccountRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "password123".to_string(),
            password_confirmation: "password123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let mismatch = CreateAccountRequest {
            password_confirmation: "password124".to_string(),
            ..valid
        };
        assert!(mismatch.validate().is_err());

        let short_password = CreateAccountRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
            password_confirmation: "short".to_string(),
        };
        assert!(short_password.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_reset_token_path_validation() {
        let valid = ResetTokenPath {
            token: "123456".to_string(),
        };
        assert!(valid.validate().is_ok());

        let not_numeric = ResetTokenPath {
            token: "12345a".to_string(),
        };
        assert!(not_numeric.validate().is_err());
    }
}
