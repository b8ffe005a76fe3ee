//! Driver and warehouse profile endpoints; reads are open to any
//! authenticated user, mutations only to the matching role.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::StatusResult;
use crate::{
    errors::ServiceError,
    services::{
        profiles::{DriverUpdate, WarehouseUpdate},
        views::{DriverView, WarehouseView},
    },
    ApiResponse, AppState,
};

pub async fn list_drivers(State(state): State<AppState>) -> StatusResult<Vec<DriverView>> {
    let drivers = state.services.profiles.list_drivers().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(drivers))))
}

pub async fn get_driver(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusResult<DriverView> {
    let driver = state.services.profiles.get_driver(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(driver))))
}

pub async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<DriverUpdate>,
) -> StatusResult<DriverView> {
    let driver = state.services.profiles.update_driver(id, update).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(driver))))
}

pub async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.profiles.delete_driver(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_warehouses(State(state): State<AppState>) -> StatusResult<Vec<WarehouseView>> {
    let warehouses = state.services.profiles.list_warehouses().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(warehouses))))
}

pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusResult<WarehouseView> {
    let warehouse = state.services.profiles.get_warehouse(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(warehouse))))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<WarehouseUpdate>,
) -> StatusResult<WarehouseView> {
    let warehouse = state.services.profiles.update_warehouse(id, update).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(warehouse))))
}

pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.profiles.delete_warehouse(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
