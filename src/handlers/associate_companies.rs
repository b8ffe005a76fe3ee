use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{respond, StatusResult};
use crate::{
    entities::associate_company,
    errors::ServiceError,
    services::associate_companies::AssociateCompanyRequest,
    ApiResponse, AppState,
};

pub async fn list(State(state): State<AppState>) -> StatusResult<Vec<associate_company::Model>> {
    let companies = state.services.associate_companies.list().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(companies))))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusResult<associate_company::Model> {
    let company = state.services.associate_companies.get(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(company))))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<AssociateCompanyRequest>,
) -> StatusResult<associate_company::Model> {
    let company = state.services.associate_companies.create(request).await?;
    respond(StatusCode::CREATED, company, "Associate company created")
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssociateCompanyRequest>,
) -> StatusResult<associate_company::Model> {
    let company = state
        .services
        .associate_companies
        .update(id, request, false)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(company))))
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssociateCompanyRequest>,
) -> StatusResult<associate_company::Model> {
    let company = state
        .services
        .associate_companies
        .update(id, request, true)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(company))))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.associate_companies.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
