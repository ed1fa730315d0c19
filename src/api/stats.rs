//! Count endpoints for dashboards

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    services::stats::{DashboardStats, UserStats},
};

use super::AuthenticatedUser;

/// Platform-wide counts (superuser only)
#[utoipa::path(
    get,
    path = "/stats/dashboard",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Active user, lender and borrower counts", body = DashboardStats),
        (status = 403, description = "Not a superuser")
    )
)]
pub async fn dashboard_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DashboardStats>> {
    claims.require_superuser()?;

    let stats = state.services.stats.dashboard().await?;
    Ok(Json(stats))
}

/// The caller's own shelf counts
#[utoipa::path(
    get,
    path = "/stats/me",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owned, borrowed and lent counts", body = UserStats)
    )
)]
pub async fn my_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserStats>> {
    claims.require_active()?;

    let stats = state.services.stats.for_user(claims.user_id).await?;
    Ok(Json(stats))
}
