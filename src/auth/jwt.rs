use crate::types::{AppError, Claims, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

/// Message returned for every token that fails verification, whatever the cause.
pub const INVALID_TOKEN_MESSAGE: &str = "Token is invalid!";

/// Authentication service for password hashing and JWT issuance.
///
/// Passwords are peppered with a deployment-wide secret and hashed with
/// Argon2id (random per-hash salt, PHC output). Tokens are HS256 JWTs that
/// carry the user id and no expiry.
pub struct AuthService {
    jwt_secret: String,
    pepper: String,
}

impl AuthService {
    /// Creates a new AuthService.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for signing JWTs (should be at least 32 chars)
    /// * `pepper` - Secret appended to every password before hashing
    pub fn new(jwt_secret: String, pepper: String) -> Self {
        Self { jwt_secret, pepper }
    }

    fn peppered(&self, password: &str) -> String {
        let mut combined = String::with_capacity(password.len() + self.pepper.len());
        combined.push_str(password);
        combined.push_str(&self.pepper);
        combined
    }

    /// Hashes `password + pepper` using Argon2id.
    ///
    /// Returns a PHC-formatted hash string with the salt embedded.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Verifies `password + pepper` against a stored Argon2 hash.
    ///
    /// The comparison itself is constant time (done inside `argon2`).
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(self.peppered(password).as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Issues a signed token for a user.
    pub fn issue_token(&self, user_id: i64) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: Utc::now().timestamp() as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry no expiry claim.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }

    /// Verifies a token and returns its claims.
    ///
    /// Bad signatures, malformed tokens and decode failures all produce the
    /// same `AppError::Auth` so callers cannot tell them apart.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Self::validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            AppError::Auth(INVALID_TOKEN_MESSAGE.to_string())
        })
    }

    /// Verifies a token and returns the user id it was issued for.
    pub fn verify_user_id(&self, token: &str) -> Result<i64> {
        let claims = self.verify_token(token)?;
        claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Auth(INVALID_TOKEN_MESSAGE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> AuthService {
        AuthService::new(
            "test-secret-key-that-is-at-least-32-chars".to_string(),
            "test-pepper".to_string(),
        )
    }

    #[test]
    fn test_password_hashing() {
        let service = create_test_service();
        let password = "test_password_123";

        let hash = service
            .hash_password(password)
            .expect("should hash password");

        assert_ne!(hash, password);
        assert!(hash.starts_with("$argon2"), "hash should be in PHC format");
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = create_test_service();

        let first = service.hash_password("same").expect("should hash");
        let second = service.hash_password("same").expect("should hash");

        assert_ne!(first, second, "each hash should carry its own salt");
    }

    #[test]
    fn test_password_verification_success() {
        let service = create_test_service();
        let password = "secure_password_456";

        let hash = service
            .hash_password(password)
            .expect("should hash password");
        let is_valid = service
            .verify_password(password, &hash)
            .expect("should verify");

        assert!(is_valid, "correct password should verify successfully");
    }

    #[test]
    fn test_password_verification_failure() {
        let service = create_test_service();

        let hash = service
            .hash_password("correct_password")
            .expect("should hash password");
        let is_valid = service
            .verify_password("wrong_password", &hash)
            .expect("should verify");

        assert!(!is_valid, "wrong password should fail verification");
    }

    #[test]
    fn test_pepper_is_part_of_the_hash_input() {
        let service = create_test_service();
        let other_pepper = AuthService::new(
            "test-secret-key-that-is-at-least-32-chars".to_string(),
            "different-pepper".to_string(),
        );

        let hash = service.hash_password("hunter22").expect("should hash");

        assert!(!other_pepper
            .verify_password("hunter22", &hash)
            .expect("should verify"));
        // Raw, unpeppered argon2 verification must not match either.
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"hunter22", &parsed)
            .is_err());
    }

    #[test]
    fn test_malformed_stored_hash_is_an_internal_error() {
        let service = create_test_service();

        let result = service.verify_password("pw", "not-a-phc-string");

        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_token_round_trip() {
        let service = create_test_service();

        let token = service.issue_token(42).expect("should issue token");
        let user_id = service.verify_user_id(&token).expect("should verify");

        assert_eq!(user_id, 42);
    }

    #[test]
    fn test_token_has_no_expiry() {
        let service = create_test_service();

        let token = service.issue_token(1).expect("should issue token");

        let raw = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret("test-secret-key-that-is-at-least-32-chars".as_bytes()),
            &AuthService::validation(),
        )
        .expect("should decode")
        .claims;

        assert_eq!(raw["sub"], "1");
        assert!(raw.get("exp").is_none());
    }

    #[test]
    fn test_token_verification_invalid_token() {
        let service = create_test_service();

        let result = service.verify_token("invalid.token.here");

        assert!(
            matches!(result, Err(AppError::Auth(ref msg)) if msg == INVALID_TOKEN_MESSAGE),
            "invalid token should fail verification"
        );
    }

    #[test]
    fn test_token_verification_wrong_secret() {
        let service1 = AuthService::new(
            "secret-one-that-is-32-chars-long".to_string(),
            "pepper".to_string(),
        );
        let service2 = AuthService::new(
            "secret-two-that-is-32-chars-long".to_string(),
            "pepper".to_string(),
        );

        let token = service1.issue_token(789).expect("should generate");
        let result = service2.verify_token(&token);

        assert!(
            matches!(result, Err(AppError::Auth(ref msg)) if msg == INVALID_TOKEN_MESSAGE),
            "token from different secret should fail with the generic message"
        );
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let service = create_test_service();
        let claims = Claims {
            sub: "not-a-number".to_string(),
            iat: 0,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-secret-key-that-is-at-least-32-chars".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.verify_user_id(&token),
            Err(AppError::Auth(_))
        ));
    }
}
