use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{respond, StatusResult};
use crate::{
    auth::AuthUser, entities::device, errors::ServiceError,
    services::devices::RegisterDeviceRequest, ApiResponse, AppState,
};

pub async fn list(State(state): State<AppState>, user: AuthUser) -> StatusResult<Vec<device::Model>> {
    let devices = state.services.devices.list(user.user_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(devices))))
}

/// Upserts the caller's single registration
pub async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RegisterDeviceRequest>,
) -> StatusResult<device::Model> {
    let device = state.services.devices.register(user.user_id, request).await?;
    respond(StatusCode::CREATED, device, "Device registered")
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> StatusResult<device::Model> {
    let device = state.services.devices.get(user.user_id, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(device))))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.devices.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
