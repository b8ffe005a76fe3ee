use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{respond, FormInput, Platform, StatusResult};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::{
        shipments::{AddContainersRequest, AddedShipment, ShipmentListQuery},
        views::AnyShipmentView,
    },
    ApiResponse, AppState, PaginatedResponse,
};

/// Create up to two containers, each with a queued shipment
#[utoipa::path(
    post,
    path = "/api/v1/container/add",
    summary = "Add containers",
    description = "Creates the containers and their queued shipments in one transaction",
    request_body = AddContainersRequest,
    responses(
        (status = 201, description = "Containers and Shipments created successfully", body = ApiResponse<Vec<AddedShipment>>),
        (status = 400, description = "Empty or oversized container list", body = crate::errors::ErrorResponse),
        (status = 403, description = "Caller is not a backoffice user", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipments"
)]
pub async fn add_containers(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AddContainersRequest>,
) -> StatusResult<Vec<AddedShipment>> {
    let added = state.services.shipments.add_containers(&user, request).await?;
    respond(
        StatusCode::CREATED,
        added,
        "Containers and Shipments created successfully",
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments",
    summary = "List shipments",
    description = "Shipments visible to the caller's role, newest first, 10 per page",
    params(
        ShipmentListQuery,
        ("Platform" = Option<String>, Header, description = "`mobile` selects the app view"),
    ),
    responses(
        (status = 200, description = "Page of shipments", body = ApiResponse<PaginatedResponse<AnyShipmentView>>),
        (status = 404, description = "Invalid status value", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    platform: Platform,
    user: AuthUser,
    Query(query): Query<ShipmentListQuery>,
) -> StatusResult<PaginatedResponse<AnyShipmentView>> {
    let page = state
        .services
        .shipments
        .list(&user, query, platform.mobile)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}",
    summary = "Get shipment",
    params(("id" = Uuid, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Shipment", body = ApiResponse<AnyShipmentView>),
        (status = 404, description = "Shipment Does not exist", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    platform: Platform,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> StatusResult<AnyShipmentView> {
    let view = state.services.shipments.get(id, platform.mobile).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(view))))
}

/// Apply a workflow step or field edits; mobile callers get the refreshed view back
#[utoipa::path(
    put,
    path = "/api/v1/shipments/{id}",
    summary = "Update shipment",
    description = "Multipart or JSON form. Status changes notify the other parties of the shipment",
    params(("id" = Uuid, Path, description = "Shipment id")),
    responses(
        (status = 202, description = "Shipment Updated", body = ApiResponse<AnyShipmentView>),
        (status = 400, description = "Rejected transition or invalid field", body = crate::errors::ErrorResponse),
        (status = 404, description = "Shipment Does not exist", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipments"
)]
pub async fn update_shipment(
    State(state): State<AppState>,
    platform: Platform,
    user: AuthUser,
    Path(id): Path<Uuid>,
    FormInput(form): FormInput,
) -> StatusResult<AnyShipmentView> {
    let view = state
        .services
        .shipments
        .update(&user, id, form, platform.mobile)
        .await?;
    let mut response = ApiResponse::with_message(view, "Shipment Updated");
    if !platform.mobile {
        response.data = None;
    }
    Ok((StatusCode::ACCEPTED, Json(response)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/shipments/{id}",
    summary = "Delete shipment",
    params(("id" = Uuid, Path, description = "Shipment id")),
    responses(
        (status = 204, description = "Shipment deleted"),
        (status = 404, description = "Shipment Does not exist", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "shipments"
)]
pub async fn delete_shipment(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.shipments.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
