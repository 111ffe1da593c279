use crate::auth::jwt::INVALID_TOKEN_MESSAGE;
use crate::db::User;
use crate::types::AppError;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

/// Request header that carries the access token.
pub const TOKEN_HEADER: &str = "x-access-token";

/// Message returned when no token header is present.
pub const MISSING_TOKEN_MESSAGE: &str = "Token is missing!";

/// Guards the protected router.
///
/// Reads the token from [`TOKEN_HEADER`], verifies it and resolves it to a
/// stored user. The user is inserted into the request extensions for
/// [`AuthUser`]. A valid token whose user no longer exists is rejected the
/// same way as a forged one.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(TOKEN_HEADER)
        .ok_or_else(|| AppError::Auth(MISSING_TOKEN_MESSAGE.to_string()))?;
    // A present header that is not visible ASCII cannot hold a token.
    let token = header
        .to_str()
        .map_err(|_| AppError::Auth(INVALID_TOKEN_MESSAGE.to_string()))?
        .trim();
    if token.is_empty() {
        return Err(AppError::Auth(MISSING_TOKEN_MESSAGE.to_string()));
    }

    let user_id = state.auth_service.verify_user_id(token)?;

    let user = state.credentials.find_by_id(user_id).await?.ok_or_else(|| {
        tracing::debug!(user_id, "token refers to a user that no longer exists");
        AppError::Auth(INVALID_TOKEN_MESSAGE.to_string())
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Extractor for the user resolved by [`auth_middleware`].
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Auth(MISSING_TOKEN_MESSAGE.to_string()))
    }
}
