use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{respond, StatusResult};
use crate::{
    auth::AuthUser,
    entities::notification,
    errors::ServiceError,
    services::notifications::{NotificationList, NotificationUpdate},
    ApiResponse, AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub is_read: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<NotificationQuery>,
) -> StatusResult<NotificationList> {
    let list = state
        .services
        .notifications
        .list(user.user_id, query.is_read.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(list))))
}

pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> StatusResult<notification::Model> {
    let found = state.services.notifications.get(user.user_id, id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(found))))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<NotificationUpdate>,
) -> StatusResult<notification::Model> {
    let updated = state
        .services
        .notifications
        .update(user.user_id, id, update)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(updated))))
}

pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.notifications.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn read_all(State(state): State<AppState>, user: AuthUser) -> StatusResult<Value> {
    let updated = state.services.notifications.mark_all_read(user.user_id).await?;
    respond(
        StatusCode::OK,
        json!({ "updated": updated }),
        "All notifications have been marked as read.",
    )
}

pub async fn delete_all(State(state): State<AppState>, user: AuthUser) -> StatusResult<Value> {
    let deleted = state.services.notifications.delete_all(user.user_id).await?;
    respond(
        StatusCode::OK,
        json!({ "deleted": deleted }),
        "All notifications have been deleted.",
    )
}
