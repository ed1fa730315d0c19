//! Authentication, profile and password reset endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{ChangePassword, Role, SignUp, UpdateProfile, User},
};

use super::{AuthenticatedUser, MessageResponse};

/// Sign-in request
#[derive(Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

/// Sanitized user summary returned on sign-in
#[derive(Serialize, ToSchema)]
pub struct UserInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub is_lender: bool,
    pub is_borrower: bool,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            is_superuser: user.is_superuser,
            is_staff: user.is_staff,
            is_active: user.is_active,
            is_lender: user.is_lender,
            is_borrower: user.is_borrower,
        }
    }
}

/// Sign-in response
#[derive(Serialize, ToSchema)]
pub struct SignInResponse {
    pub token: String,
    pub token_type: String,
    pub user: UserInfo,
}

/// Forgot password request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// OTP verification request
#[derive(Deserialize, Validate, ToSchema)]
pub struct VerifyOtpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
}

/// Password reset request
#[derive(Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(equal = 6, message = "OTP must be 6 digits"))]
    pub otp: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "auth",
    request_body = SignUp,
    responses(
        (status = 201, description = "User registered, pending activation", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn sign_up(
    State(state): State<crate::AppState>,
    Json(request): Json<SignUp>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.services.users.sign_up(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User successfully registered")),
    ))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Authenticated", body = SignInResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account not activated")
    )
)]
pub async fn sign_in(
    State(state): State<crate::AppState>,
    Json(request): Json<SignInRequest>,
) -> AppResult<Json<SignInResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, user) = state
        .services
        .users
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(SignInResponse {
        token,
        token_type: "Bearer".to_string(),
        user: UserInfo::from(&user),
    }))
}

/// Current authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.users.get_by_id(claims.user_id).await?;
    Ok(Json(user))
}

/// Update the caller's profile
#[utoipa::path(
    patch,
    path = "/auth/profile",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 403, description = "Account not activated")
    )
)]
pub async fn update_profile(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateProfile>,
) -> AppResult<Json<User>> {
    claims.require_active()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state
        .services
        .users
        .update_profile(claims.user_id, request)
        .await?;
    Ok(Json(user))
}

/// Change the caller's password
#[utoipa::path(
    post,
    path = "/auth/change-password",
    tag = "auth",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Old password is incorrect")
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ChangePassword>,
) -> AppResult<Json<MessageResponse>> {
    claims.require_active()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .users
        .change_password(claims.user_id, request)
        .await?;

    Ok(Json(MessageResponse::new(
        "Password changed successfully. Please login again",
    )))
}

/// Request a password-reset OTP by email
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "OTP emailed", body = MessageResponse),
        (status = 404, description = "No such user")
    )
)]
pub async fn forgot_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.services.otp.request_reset(&request.email).await?;

    Ok(Json(MessageResponse::new("OTP sent successfully")))
}

/// Check an OTP without consuming it
#[utoipa::path(
    post,
    path = "/auth/verify-otp",
    tag = "auth",
    request_body = VerifyOtpRequest,
    responses(
        (status = 200, description = "OTP is valid", body = MessageResponse),
        (status = 400, description = "OTP expired or invalid"),
        (status = 404, description = "No such user or OTP")
    )
)]
pub async fn verify_otp(
    State(state): State<crate::AppState>,
    Json(request): Json<VerifyOtpRequest>,
) -> AppResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .otp
        .verify(&request.email, &request.otp)
        .await?;

    Ok(Json(MessageResponse::new("Your OTP is valid")))
}

/// Reset the password with a valid OTP
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "OTP expired or invalid"),
        (status = 404, description = "No such user or OTP")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .otp
        .reset_password(&request.email, &request.otp, &request.password)
        .await?;

    Ok(Json(MessageResponse::new("Password reset successfully")))
}
