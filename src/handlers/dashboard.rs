use axum::{extract::State, http::StatusCode, Json};

use super::StatusResult;
use crate::{auth::AuthUser, services::dashboard::DashboardStats, ApiResponse, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/dashboard-stats",
    summary = "Dashboard counters",
    description = "Shipment, driver and associate company totals for the calling backoffice user",
    responses(
        (status = 200, description = "Counters", body = ApiResponse<DashboardStats>),
        (status = 403, description = "Caller is not a backoffice user", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "dashboard"
)]
pub async fn stats(State(state): State<AppState>, user: AuthUser) -> StatusResult<DashboardStats> {
    let stats = state.services.dashboard.stats(user.user_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(stats))))
}
