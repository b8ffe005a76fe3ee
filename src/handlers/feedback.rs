use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{respond, StatusResult};
use crate::{
    auth::AuthUser, entities::feedback, errors::ServiceError,
    services::feedback::FeedbackRequest, ApiResponse, AppState,
};

pub async fn list(State(state): State<AppState>, _user: AuthUser) -> StatusResult<Vec<feedback::Model>> {
    let entries = state.services.feedback.list().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(entries))))
}

/// Stores feedback under the caller's e-mail address
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<FeedbackRequest>,
) -> StatusResult<feedback::Model> {
    let email = match user.email {
        Some(email) => email,
        None => state.services.accounts.profile(user.user_id).await?.0.email,
    };
    let entry = state.services.feedback.submit(&email, request).await?;
    respond(StatusCode::CREATED, entry, "Feedback submitted")
}

pub async fn get(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> StatusResult<feedback::Model> {
    let entry = state.services.feedback.get(id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(entry))))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServiceError> {
    state.services.feedback.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
