//! User administration endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::user::User};

use super::AuthenticatedUser;

/// List every user (superuser only)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 403, description = "Not a superuser")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_superuser()?;

    let users = state.services.users.list_all().await?;
    Ok(Json(users))
}

/// List activated users (superuser only)
#[utoipa::path(
    get,
    path = "/users/active",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active users", body = Vec<User>),
        (status = 403, description = "Not a superuser")
    )
)]
pub async fn list_active_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_superuser()?;

    let users = state.services.users.list_by_active(true).await?;
    Ok(Json(users))
}

/// List accounts awaiting activation (superuser only)
#[utoipa::path(
    get,
    path = "/users/inactive",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inactive users", body = Vec<User>),
        (status = 403, description = "Not a superuser")
    )
)]
pub async fn list_inactive_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_superuser()?;

    let users = state.services.users.list_by_active(false).await?;
    Ok(Json(users))
}

/// Activate a user account (admin or superuser)
#[utoipa::path(
    post,
    path = "/users/{id}/activate",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account activated", body = User),
        (status = 403, description = "Insufficient privileges"),
        (status = 404, description = "User not found")
    )
)]
pub async fn activate_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<User>> {
    if claims.require_superuser().is_err() {
        claims.require_admin()?;
    }

    let user = state.services.users.activate(user_id).await?;
    Ok(Json(user))
}

/// Deactivate a user account (admin or superuser)
#[utoipa::path(
    patch,
    path = "/users/{id}/deactivate",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account deactivated", body = User),
        (status = 403, description = "Insufficient privileges"),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<User>> {
    if claims.require_superuser().is_err() {
        claims.require_admin()?;
    }

    let user = state.services.users.deactivate(user_id).await?;
    Ok(Json(user))
}

/// Promote a user to admin (superuser only)
#[utoipa::path(
    patch,
    path = "/users/{id}/promote",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User promoted to admin", body = User),
        (status = 403, description = "Not a superuser"),
        (status = 404, description = "User not found")
    )
)]
pub async fn promote_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<User>> {
    claims.require_superuser()?;

    let user = state.services.users.promote_to_admin(user_id).await?;
    Ok(Json(user))
}
