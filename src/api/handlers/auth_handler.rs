//! Authentication handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::AuthResponse;
use crate::errors::{AppError, AppResult};
use crate::types::MessageResponse;

pub const RESET_LINK_SENT_MESSAGE: &str = "Password reset link has been sent to your email";
pub const PASSWORD_UPDATED_MESSAGE: &str = "Password has been updated";

/// User registration request.
///
/// Absent and `null` fields both reach the service as empty strings.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User display name
    #[validate(length(max = 100, message = "Name is too long"))]
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// User email address
    #[validate(length(max = 254, message = "Email is too long"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    /// Password: 8+ chars with upper, lower, digit and one of @$!%*?&
    #[validate(length(max = 128, message = "Password is too long"))]
    #[schema(example = "Secret1!", min_length = 8)]
    pub password: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(max = 254, message = "Email is too long"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
    #[validate(length(max = 128, message = "Password is too long"))]
    #[schema(example = "Secret1!")]
    pub password: Option<String>,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetRequest {
    #[validate(length(max = 254, message = "Email is too long"))]
    #[schema(example = "jane@example.com")]
    pub email: Option<String>,
}

/// New password submitted with a reset token
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewPasswordRequest {
    #[validate(length(max = 128, message = "Password is too long"))]
    #[schema(example = "Changed2@")]
    pub password: Option<String>,
}

/// Public account routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/reset-password", post(request_password_reset))
        .route("/reset-password/:user_id/:token", post(confirm_password_reset))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Missing fields, invalid input or email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let response = state
        .auth_service
        .register(
            payload.name.unwrap_or_default(),
            payload.email.unwrap_or_default(),
            payload.password.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login and get a session token
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let response = state
        .auth_service
        .login(
            payload.email.unwrap_or_default(),
            payload.password.unwrap_or_default(),
        )
        .await?;

    Ok(Json(response))
}

/// Email a password reset link
#[utoipa::path(
    post,
    path = "/api/users/reset-password",
    tag = "Authentication",
    request_body = ResetRequest,
    responses(
        (status = 200, description = "Reset link sent", body = MessageResponse),
        (status = 400, description = "Missing email or unknown user"),
        (status = 500, description = "Email could not be sent")
    )
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .request_password_reset(payload.email.unwrap_or_default())
        .await?;

    Ok(Json(MessageResponse::new(RESET_LINK_SENT_MESSAGE)))
}

/// Set a new password with a reset token
#[utoipa::path(
    post,
    path = "/api/users/reset-password/{user_id}/{token}",
    tag = "Authentication",
    params(
        ("user_id" = String, Path, description = "Account the token was issued for"),
        ("token" = String, Path, description = "Reset token from the emailed link")
    ),
    request_body = NewPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Missing or weak password, or unknown user"),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(String, String)>,
    ValidatedJson(payload): ValidatedJson<NewPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = Uuid::parse_str(&user_id).map_err(|_| AppError::not_found("User"))?;

    state
        .auth_service
        .confirm_password_reset(user_id, token, payload.password.unwrap_or_default())
        .await?;

    Ok(Json(MessageResponse::new(PASSWORD_UPDATED_MESSAGE)))
}
