//! Back office API for container logistics
//!
//! Companies, their customers, drivers and warehouse users, and the shipment
//! workflow that moves a container from the port to the warehouse and back.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::AuthRouterExt;
use crate::db::DbPool;
use crate::entities::UserType;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    /// Success carrying both data and a user-facing message
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn validation_errors(errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some("Validation failed".to_string()),
            errors: Some(errors),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

impl ApiResponse<()> {
    /// Success with only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}


/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Every `/api/v1` route with its authentication and user-type layers
pub fn api_v1_routes() -> Router<AppState> {
    use axum::routing::{delete, put};
    use handlers::{
        accounts, associate_companies, companies, customers, dashboard, devices, feedback,
        notifications, profiles, shipments,
    };

    let public = Router::new()
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
        .route("/forgot-password", post(accounts::forgot_password))
        .route("/reset-password", post(accounts::reset_password))
        .route("/auth/google/login", post(accounts::google_login))
        .route("/auth/google/signup", post(accounts::google_signup))
        .route("/contact-us", post(accounts::contact_us));

    let account = Router::new()
        .route("/user-profile", get(accounts::user_profile))
        .route("/user-profile-update", put(accounts::update_profile))
        .route("/change-password", post(accounts::change_password))
        .route(
            "/upload-profile-picture",
            get(accounts::profile_picture).post(accounts::upload_profile_picture),
        )
        .route("/user/logout", get(accounts::logout))
        .route("/delete-user", delete(accounts::delete_user))
        .route("/company/onboarding", post(companies::onboarding))
        .route("/company/edit/:id", put(companies::edit_company))
        .route("/company/view", get(companies::view_company))
        .with_auth();

    let associate = Router::new()
        .route(
            "/associate-company",
            get(associate_companies::list).post(associate_companies::create),
        )
        .route(
            "/associate-company/:id",
            get(associate_companies::get)
                .put(associate_companies::update)
                .patch(associate_companies::partial_update)
                .delete(associate_companies::delete),
        )
        .with_user_type(UserType::Backoffice);

    let drivers = Router::new()
        .route("/driver", get(profiles::list_drivers))
        .route(
            "/driver/:id",
            get(profiles::get_driver)
                .put(profiles::update_driver)
                .patch(profiles::update_driver)
                .delete(profiles::delete_driver),
        )
        .with_user_type(UserType::Driver);

    let warehouses = Router::new()
        .route("/warehouse", get(profiles::list_warehouses))
        .route(
            "/warehouse/:id",
            get(profiles::get_warehouse)
                .put(profiles::update_warehouse)
                .patch(profiles::update_warehouse)
                .delete(profiles::delete_warehouse),
        )
        .with_user_type(UserType::Warehouse);

    let backoffice_only = Router::new()
        .route("/container/add", post(shipments::add_containers))
        .route("/dashboard-stats", get(dashboard::stats))
        .require_user_type(UserType::Backoffice);

    let shipments = Router::new()
        .route("/shipments", get(shipments::list_shipments))
        .route("/shipments/customers", get(customers::list_customers))
        .route("/shipments/customers/:id", get(customers::customer_history))
        .route(
            "/shipments/:id",
            get(shipments::get_shipment)
                .put(shipments::update_shipment)
                .delete(shipments::delete_shipment),
        )
        .with_auth();

    let inbox = Router::new()
        .route("/notifications", get(notifications::list))
        .route(
            "/notifications/:id",
            get(notifications::get)
                .put(notifications::update)
                .patch(notifications::update)
                .delete(notifications::delete),
        )
        .route("/read-all/notifications", post(notifications::read_all))
        .route("/delete-all/notifications", post(notifications::delete_all))
        .route("/devices", get(devices::list).post(devices::register))
        .route("/devices/:id", get(devices::get).delete(devices::delete))
        .route("/feedback", get(feedback::list).post(feedback::submit))
        .route("/feedback/:id", get(feedback::get).delete(feedback::delete))
        .with_auth();

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(public)
        .merge(account)
        .merge(associate)
        .merge(drivers)
        .merge(warehouses)
        .merge(backoffice_only)
        .merge(shipments)
        .merge(inbox)
}

async fn api_status() -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "backoffice-api",
        "timestamp": Utc::now().to_rfc3339(),
    });

    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(e) => {
            ::tracing::warn!(error = %e, "Database health check failed");
            "unhealthy"
        }
    };

    Ok(Json(ApiResponse::success(json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": Utc::now().to_rfc3339(),
    }))))
}
