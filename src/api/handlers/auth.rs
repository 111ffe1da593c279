use crate::{
    types::{
        ApiJson, AppError, ErrorResponse, LoginRequest, RegisterRequest, RegisterResponse,
        Result, TokenResponse,
    },
    auth::credentials::INVALID_CREDENTIALS_MESSAGE,
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 409, description = "Username or email already taken", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let username = payload.username.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let user = state
        .credentials
        .register(&username, &email, &password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "New user created!".to_string(),
            user: user.profile(),
        }),
    ))
}

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    // Missing fields fail exactly like wrong ones.
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AppError::Auth(INVALID_CREDENTIALS_MESSAGE.to_string()));
    };

    let token = state.credentials.authenticate(&username, &password).await?;

    Ok(Json(TokenResponse { token }))
}
