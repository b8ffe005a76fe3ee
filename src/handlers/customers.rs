use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::StatusResult;
use crate::{
    auth::AuthUser,
    services::{
        customers::{CustomerEntry, CustomerHistoryQuery, CustomerListQuery},
        views::ShipmentView,
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Warehouses and associate companies with their latest active shipment
#[utoipa::path(
    get,
    path = "/api/v1/shipments/customers",
    summary = "List customers",
    params(CustomerListQuery),
    responses(
        (status = 200, description = "Page of customers", body = ApiResponse<PaginatedResponse<CustomerEntry>>),
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<CustomerListQuery>,
) -> StatusResult<PaginatedResponse<CustomerEntry>> {
    let page = state.services.customers.list(user.user_id, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/customers/{id}",
    summary = "Customer shipment history",
    params(
        ("id" = Uuid, Path, description = "Warehouse or associate company id"),
        CustomerHistoryQuery,
    ),
    responses(
        (status = 200, description = "Page of shipments", body = ApiResponse<PaginatedResponse<ShipmentView>>),
        (status = 400, description = "Invalid type parameter", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "customers"
)]
pub async fn customer_history(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<CustomerHistoryQuery>,
) -> StatusResult<PaginatedResponse<ShipmentView>> {
    let page = state.services.customers.history(id, query).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(page))))
}
