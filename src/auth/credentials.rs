//! Account registration and login on top of the storage layer.

use crate::auth::jwt::AuthService;
use crate::db::{DatabaseClient, User};
use crate::types::{AppError, Result};
use std::sync::Arc;

/// Message returned for every failed login, whether the user exists or not.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Could not verify";

/// Well-formed Argon2id hash that matches no password. Unknown usernames are
/// verified against it so every failed login pays the same hashing cost.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$Y2xvdWRmbG93ZXJkdW1teQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

pub const MAX_USERNAME_LEN: usize = 80;
pub const MAX_EMAIL_LEN: usize = 120;

/// Persists accounts and turns credentials into tokens.
pub struct CredentialStore {
    db: Arc<dyn DatabaseClient>,
    auth: Arc<AuthService>,
}

impl CredentialStore {
    pub fn new(db: Arc<dyn DatabaseClient>, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }

    /// Creates an account.
    ///
    /// Fails with `Conflict` when the username or email is already taken. The
    /// storage layer's unique constraints back this up if two registrations race.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        validate_registration(username, email, password)?;

        if self.db.get_user_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.db.get_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hash_blocking(password).await?;
        let user = self.db.create_user(username, email, &password_hash).await?;

        tracing::info!(user_id = user.id, username = %user.username, "registered new user");
        Ok(user)
    }

    /// Checks a username/password pair and issues a token on success.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        let Some(user) = self.db.get_user_by_username(username).await? else {
            self.verify_blocking(password, DUMMY_PASSWORD_HASH).await?;
            tracing::debug!("login rejected: unknown username");
            return Err(invalid_credentials());
        };

        if !self.verify_blocking(password, &user.password_hash).await? {
            tracing::debug!(user_id = user.id, "login rejected: password mismatch");
            return Err(invalid_credentials());
        }

        let token = self.auth.issue_token(user.id)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    /// Resolves a user id taken from a verified token.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.db.get_user_by_id(id).await
    }

    // Argon2 is deliberately slow; keep it off the async worker threads.
    async fn hash_blocking(&self, password: &str) -> Result<String> {
        let auth = Arc::clone(&self.auth);
        let password = password.to_string();
        tokio::task::spawn_blocking(move || auth.hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    async fn verify_blocking(&self, password: &str, hash: &str) -> Result<bool> {
        let auth = Arc::clone(&self.auth);
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || auth.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }
}

fn invalid_credentials() -> AppError {
    AppError::Auth(INVALID_CREDENTIALS_MESSAGE.to_string())
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<()> {
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput(
            "Username, email and password are required".to_string(),
        ));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }
    if email.chars().count() > MAX_EMAIL_LEN || !email.contains('@') {
        return Err(AppError::InvalidInput(
            "Email address is not valid".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "a@b.c", "pw")]
    #[case("user", "", "pw")]
    #[case("user", "a@b.c", "")]
    #[case("user", "no-at-sign", "pw")]
    fn rejects_incomplete_registration(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
    ) {
        assert!(matches!(
            validate_registration(username, email, password),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn dummy_hash_parses_and_never_matches() {
        let auth = AuthService::new("x".repeat(32), "pepper".to_string());
        assert!(!auth.verify_password("", DUMMY_PASSWORD_HASH).unwrap());
        assert!(!auth.verify_password("password123", DUMMY_PASSWORD_HASH).unwrap());
    }

    #[test]
    fn rejects_overlong_username() {
        let username = "u".repeat(MAX_USERNAME_LEN + 1);
        assert!(validate_registration(&username, "a@b.c", "pw").is_err());
        assert!(validate_registration(&username[1..], "a@b.c", "pw").is_ok());
    }
}
