use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use serde_json::{json, Value};

use super::{respond, respond_message, FormInput, Platform, StatusResult};
use crate::{
    auth::AuthUser,
    errors::ServiceError,
    services::{
        accounts::{
            ChangePasswordRequest, ContactUsRequest, ForgotPasswordRequest, GoogleAuthRequest,
            LoginRequest, ResetPasswordRequest, Session, SignupRequest,
        },
        views::{ProfileView, UserView},
    },
    ApiResponse, AppState,
};

/// Account payload; which parts are present depends on the platform
#[derive(Debug, Default, Serialize)]
pub struct AccountBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<ProfileView>,
}

impl AccountBody {
    fn mobile(session: Session) -> Self {
        Self {
            token: Some(session.token),
            user_data: Some(session.user_data),
            ..Default::default()
        }
    }

    fn web(session: Session) -> Self {
        Self {
            token: Some(session.token),
            user: Some(session.user),
            ..Default::default()
        }
    }
}

pub async fn signup(
    State(state): State<AppState>,
    platform: Platform,
    Json(request): Json<SignupRequest>,
) -> StatusResult<AccountBody> {
    let session = state.services.accounts.signup(request).await?;
    let body = if platform.mobile {
        AccountBody::mobile(session)
    } else {
        AccountBody::web(session)
    };
    respond(StatusCode::CREATED, body, "User registered successfully")
}

pub async fn login(
    State(state): State<AppState>,
    platform: Platform,
    Json(request): Json<LoginRequest>,
) -> StatusResult<AccountBody> {
    let session = state.services.accounts.login(request, platform.mobile).await?;
    let body = if platform.mobile {
        AccountBody::mobile(session)
    } else {
        AccountBody {
            token: Some(session.token),
            user: Some(session.user),
            user_data: Some(session.user_data),
            success: None,
        }
    };
    respond(StatusCode::CREATED, body, "Login successful")
}

pub async fn user_profile(
    State(state): State<AppState>,
    platform: Platform,
    user: AuthUser,
) -> StatusResult<AccountBody> {
    let (user_view, profile) = state.services.accounts.profile(user.user_id).await?;
    let body = if platform.mobile {
        AccountBody {
            user_data: Some(profile),
            ..Default::default()
        }
    } else {
        AccountBody {
            user: Some(user_view),
            ..Default::default()
        }
    };
    Ok((StatusCode::OK, Json(ApiResponse::success(body))))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    FormInput(form): FormInput,
) -> StatusResult<AccountBody> {
    let updated = state.services.accounts.update_profile(user.user_id, form).await?;
    respond(
        StatusCode::OK,
        AccountBody {
            user: Some(updated.user),
            user_data: Some(updated.user_data),
            ..Default::default()
        },
        updated.message,
    )
}

pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> StatusResult<()> {
    state
        .services
        .accounts
        .change_password(user.user_id, request)
        .await?;
    respond_message(StatusCode::OK, "Password Changes Successfully")
}

pub async fn profile_picture(State(state): State<AppState>, user: AuthUser) -> StatusResult<Value> {
    let url = state.services.accounts.profile_picture(user.user_id).await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(json!({ "profile_picture": url }))),
    ))
}

pub async fn upload_profile_picture(
    State(state): State<AppState>,
    user: AuthUser,
    FormInput(form): FormInput,
) -> StatusResult<Value> {
    let url = state
        .services
        .accounts
        .upload_profile_picture(user.user_id, form.file("profile_picture"))
        .await?;
    respond(
        StatusCode::OK,
        json!({ "profile_picture": url }),
        "Profile Picture Uploaded",
    )
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(request): Json<ForgotPasswordRequest>,
) -> StatusResult<()> {
    state.services.accounts.forgot_password(request).await?;
    respond_message(StatusCode::ACCEPTED, "Password Recovery email sent")
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> StatusResult<()> {
    state.services.accounts.reset_password(request).await?;
    respond_message(
        StatusCode::ACCEPTED,
        "Password has been reset with the new password.",
    )
}

pub async fn logout(State(state): State<AppState>, user: AuthUser) -> StatusResult<()> {
    state.services.accounts.logout(&user).await?;
    respond_message(StatusCode::OK, "User Logout successfully")
}

pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, ServiceError> {
    state.services.accounts.delete_user(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn google_login(
    State(state): State<AppState>,
    platform: Platform,
    Json(request): Json<GoogleAuthRequest>,
) -> StatusResult<AccountBody> {
    let outcome = state
        .services
        .accounts
        .google_login(request, platform.mobile)
        .await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let mut body = if platform.mobile {
        AccountBody::mobile(outcome.session)
    } else {
        AccountBody::web(outcome.session)
    };
    body.success = Some(outcome.message);
    respond(status, body, outcome.message)
}

pub async fn google_signup(
    State(state): State<AppState>,
    Json(request): Json<GoogleAuthRequest>,
) -> StatusResult<AccountBody> {
    let outcome = state.services.accounts.google_signup(request).await?;
    let mut body = AccountBody::web(outcome.session);
    body.success = Some(outcome.message);
    respond(StatusCode::CREATED, body, outcome.message)
}

pub async fn contact_us(
    State(state): State<AppState>,
    Json(request): Json<ContactUsRequest>,
) -> StatusResult<()> {
    state.services.accounts.contact_us(request).await?;
    respond_message(StatusCode::OK, "Form submitted successfully")
}
