pub mod accounts;
pub mod associate_companies;
pub mod companies;
pub mod customers;
pub mod dashboard;
pub mod devices;
pub mod feedback;
pub mod notifications;
pub mod profiles;
pub mod shipments;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, Request},
    http::{header, request::Parts, StatusCode},
    Json,
};
use std::{convert::Infallible, sync::Arc, time::Duration};
use tracing::info;

use crate::{
    auth::{oauth2::GoogleOAuthClient, oauth2::GoogleOAuthConfig, reset_token::ResetTokenGenerator, AuthService},
    config::AppConfig,
    db::DbPool,
    errors::ServiceError,
    services::{
        accounts::AccountService,
        associate_companies::AssociateCompanyService,
        companies::CompanyService,
        customers::CustomerService,
        dashboard::DashboardService,
        devices::DeviceService,
        email::{mailer_from_app_config, Mailer},
        feedback::FeedbackService,
        form::{FormData, UploadedFile},
        notifications::NotificationService,
        profiles::ProfileService,
        push::{FcmPushSender, NoopPushSender, PushSender},
        shipments::ShipmentService,
        storage::StorageService,
    },
    ApiResponse,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Handler result carrying an explicit status code
pub type StatusResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ServiceError>;

pub fn respond<T>(status: StatusCode, data: T, message: impl Into<String>) -> StatusResult<T> {
    Ok((status, Json(ApiResponse::with_message(data, message))))
}

pub fn respond_message(status: StatusCode, message: impl Into<String>) -> StatusResult<()> {
    Ok((status, Json(ApiResponse::message(message))))
}

/// Outside services the API talks to
#[derive(Clone)]
pub struct Collaborators {
    pub storage: StorageService,
    pub mailer: Arc<dyn Mailer>,
    pub push: Arc<dyn PushSender>,
    pub google: Arc<GoogleOAuthClient>,
}

impl Collaborators {
    pub fn from_app_config(cfg: &AppConfig) -> Result<Self, ServiceError> {
        let push: Arc<dyn PushSender> = match cfg.fcm_server_key.as_deref() {
            Some(key) if !key.is_empty() => {
                info!("Push notifications go to FCM");
                Arc::new(FcmPushSender::new(cfg.fcm_endpoint.clone(), key))
            }
            _ => Arc::new(NoopPushSender),
        };
        Ok(Self {
            storage: StorageService::from_app_config(cfg)?,
            mailer: mailer_from_app_config(cfg)?,
            push,
            google: Arc::new(GoogleOAuthClient::new(GoogleOAuthConfig::from_app_config(cfg))),
        })
    }
}

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<AccountService>,
    pub companies: Arc<CompanyService>,
    pub associate_companies: Arc<AssociateCompanyService>,
    pub profiles: Arc<ProfileService>,
    pub shipments: Arc<ShipmentService>,
    pub customers: Arc<CustomerService>,
    pub dashboard: Arc<DashboardService>,
    pub notifications: Arc<NotificationService>,
    pub devices: Arc<DeviceService>,
    pub feedback: Arc<FeedbackService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        auth_service: Arc<AuthService>,
        cfg: &AppConfig,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            storage,
            mailer,
            push,
            google,
        } = collaborators;

        let notifications = Arc::new(NotificationService::new(db_pool.clone(), push));
        let reset_tokens = ResetTokenGenerator::new(cfg.jwt_secret.clone(), cfg.password_reset_timeout_secs);

        Self {
            accounts: Arc::new(AccountService::new(
                db_pool.clone(),
                auth_service,
                storage.clone(),
                mailer,
                google,
                reset_tokens,
                cfg.password_reset_url.clone(),
            )),
            companies: Arc::new(CompanyService::new(
                db_pool.clone(),
                storage.clone(),
                notifications.clone(),
            )),
            associate_companies: Arc::new(AssociateCompanyService::new(db_pool.clone())),
            profiles: Arc::new(ProfileService::new(db_pool.clone(), storage.clone())),
            shipments: Arc::new(ShipmentService::new(
                db_pool.clone(),
                storage.clone(),
                notifications.clone(),
            )),
            customers: Arc::new(CustomerService::new(db_pool.clone(), storage)),
            dashboard: Arc::new(DashboardService::new(db_pool.clone())),
            devices: Arc::new(DeviceService::new(db_pool.clone())),
            feedback: Arc::new(FeedbackService::new(db_pool)),
            notifications,
        }
    }
}

/// Client platform taken from the `Platform` header; `mobile` selects the app shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub mobile: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for Platform
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mobile = parts
            .headers
            .get("platform")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("mobile"));
        Ok(Self { mobile })
    }
}

/// A multipart form or a JSON object, read into [`FormData`]
#[derive(Debug, Default)]
pub struct FormInput(pub FormData);

#[async_trait]
impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ServiceError::bad_request(e.body_text()))?;
            let mut form = FormData::new();
            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ServiceError::bad_request(e.body_text()))?
            {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                match field.file_name().map(str::to_string) {
                    Some(file_name) => {
                        let content_type = field.content_type().map(str::to_string);
                        let bytes = field
                            .bytes()
                            .await
                            .map_err(|e| ServiceError::bad_request(e.body_text()))?;
                        form.insert_file(UploadedFile {
                            field: name,
                            file_name,
                            content_type,
                            bytes,
                        });
                    }
                    None => {
                        let value = field
                            .text()
                            .await
                            .map_err(|e| ServiceError::bad_request(e.body_text()))?;
                        form.insert(name, value);
                    }
                }
            }
            return Ok(Self(form));
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ServiceError::bad_request(e.body_text()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(FormData::new()));
        }
        let value = serde_json::from_slice(&body)
            .map_err(|e| ServiceError::bad_request(format!("Invalid JSON body: {}", e)))?;
        Ok(Self(FormData::from_json(value)?))
    }
}

/// Upper bound on request bodies carrying uploads
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
