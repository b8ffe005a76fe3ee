use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{respond, FormInput, Platform, StatusResult};
use crate::{
    auth::AuthUser,
    services::views::{CompanyView, ProfileView, UserView},
    ApiResponse, AppState,
};

/// Onboarding answer: the role profile on mobile, the account on web
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum OnboardingBody {
    Mobile { user_data: ProfileView },
    Web { user: UserView },
}

/// Complete the caller's account
#[utoipa::path(
    post,
    path = "/api/v1/company/onboarding",
    summary = "Onboard account",
    description = "Fill in role details, create the company for backoffice and warehouse users, and mark the account onboarded",
    params(("Platform" = Option<String>, Header, description = "`mobile` selects the app response shape")),
    responses(
        (status = 201, description = "Created successfully", body = ApiResponse<OnboardingBody>),
        (status = 400, description = "Invalid form or duplicate company email", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "companies"
)]
pub async fn onboarding(
    State(state): State<AppState>,
    platform: Platform,
    user: AuthUser,
    FormInput(form): FormInput,
) -> StatusResult<OnboardingBody> {
    let outcome = state
        .services
        .companies
        .onboard(user.user_id, form, platform.mobile)
        .await?;
    let body = if platform.mobile {
        OnboardingBody::Mobile {
            user_data: outcome.user_data,
        }
    } else {
        OnboardingBody::Web { user: outcome.user }
    };
    respond(StatusCode::CREATED, body, "Created successfully")
}

#[utoipa::path(
    put,
    path = "/api/v1/company/edit/{id}",
    summary = "Edit company",
    params(("id" = Uuid, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company updated", body = ApiResponse<CompanyView>),
        (status = 404, description = "Company not found", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "companies"
)]
pub async fn edit_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    _user: AuthUser,
    FormInput(form): FormInput,
) -> StatusResult<CompanyView> {
    let company = state.services.companies.edit_company(id, form).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(company))))
}

#[utoipa::path(
    get,
    path = "/api/v1/company/view",
    summary = "View own company",
    responses(
        (status = 200, description = "Company of the caller", body = ApiResponse<CompanyView>),
        (status = 400, description = "Caller has no company", body = crate::errors::ErrorResponse),
    ),
    security(("Bearer" = [])),
    tag = "companies"
)]
pub async fn view_company(State(state): State<AppState>, user: AuthUser) -> StatusResult<CompanyView> {
    let company = state
        .services
        .companies
        .view_company(user.user_id, user.user_type)
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(company))))
}
