//! Authentication: password hashing, tokens and the request guard.
//!
//! # Module Structure
//!
//! - [`auth::jwt`](crate::auth::jwt) - Argon2id password hashing with a pepper, HS256 tokens
//! - [`auth::credentials`](crate::auth::credentials) - registration and login
//! - [`auth::middleware`](crate::auth::middleware) - Axum layer and extractor for protected routes
//!
//! # Flow
//!
//! Registration stores `argon2id(password + pepper)`. Login verifies the same
//! peppered input and returns a token signed with the server secret. Protected
//! routes read the token from the `x-access-token` header, verify it and load
//! the user it names before the handler runs.
//!
//! ```ignore
//! async fn protected_handler(AuthUser(user): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.username)
//! }
//! ```
//!
//! # Configuration
//!
//! Configure via `game.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"     # env var holding the signing secret (>= 32 bytes)
//! pepper_env = "PASSWORD_PEPPER"    # env var holding the password pepper
//! ```
//!
//! Tokens carry no expiry claim and there is no server-side session store,
//! so a token stays valid until the signing secret is rotated.

/// Account registration and login.
pub mod credentials;
/// Password hashing and token issuance/verification.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
