#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    middleware, Router,
};
use backoffice_api::{
    auth::{inject_auth_service, oauth2::GoogleOAuthClient, AuthConfig, AuthService},
    config::AppConfig,
    db,
    handlers::{AppServices, Collaborators},
    services::{
        email::RecordingMailer,
        push::RecordingPushSender,
        storage::{MemoryStorage, StorageService},
    },
    AppState,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "Kq7vN2xR9mW4tY8pL3zH6jB1cF5gD0sA-uE7iO2wQ9rT4yU8pA3sD6fG1hJ5kL0z";
pub const PASSWORD: &str = "Quay-Lantern-7731";

/// A signed-up account as the tests use it
#[derive(Debug, Clone)]
pub struct Account {
    pub user_id: Uuid,
    /// Driver, warehouse or backoffice profile id
    pub profile_id: Uuid,
    pub token: String,
}

/// Decoded response
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// Application wired to a throwaway SQLite file and in-memory collaborators
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
    pub mailer: Arc<RecordingMailer>,
    pub push: Arc<RecordingPushSender>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::build(RecordingMailer::new("noreply@harbor.example"), None).await
    }

    pub async fn with_failing_mailer() -> Self {
        Self::build(RecordingMailer::failing("noreply@harbor.example"), None).await
    }

    /// Google userinfo requests go to `user_info_url`
    pub async fn with_google_userinfo(user_info_url: &str) -> Self {
        Self::build(
            RecordingMailer::new("noreply@harbor.example"),
            Some(user_info_url.to_string()),
        )
        .await
    }

    async fn build(mailer: RecordingMailer, user_info_url: Option<String>) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db_path = dir.path().join("backoffice_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let db_arc = Arc::new(pool);

        let auth_service = Arc::new(AuthService::new(
            AuthConfig::from_app_config(&cfg),
            db_arc.clone(),
        ));

        let storage = Arc::new(MemoryStorage::new());
        let mailer = Arc::new(mailer);
        let push = Arc::new(RecordingPushSender::new());
        let mut google = GoogleOAuthClient::new(None);
        if let Some(url) = user_info_url {
            google = google.with_user_info_url(url);
        }

        let collaborators = Collaborators {
            storage: StorageService::new(storage.clone(), "media/", Duration::from_secs(3600)),
            mailer: mailer.clone(),
            push: push.clone(),
            google: Arc::new(google),
        };
        let services = AppServices::new(db_arc.clone(), auth_service.clone(), &cfg, collaborators);
        let state = AppState {
            db: db_arc,
            config: cfg,
            services,
        };

        let api_router = backoffice_api::api_v1_routes()
            .layer(middleware::from_fn_with_state(auth_service, inject_auth_service));
        let router = Router::new()
            .nest("/api/v1", api_router)
            .with_state(state.clone());

        Self {
            router,
            state,
            storage,
            mailer,
            push,
            _dir: dir,
        }
    }

    /// Sends a JSON request; `mobile` sets the `Platform: mobile` header
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
        mobile: bool,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Token {}", tok));
        }
        if mobile {
            builder = builder.header("platform", "mobile");
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).expect("serialize request body"))
            }
            None => Body::empty(),
        };

        let request = builder.body(body).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");
        decode(response).await
    }

    /// Sends a multipart form; files are `(field, file name, bytes)`
    pub async fn call_multipart(
        &self,
        method: Method,
        uri: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
        token: &str,
        mobile: bool,
    ) -> Reply {
        const BOUNDARY: &str = "backoffice-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, file_name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Token {}", token))
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if mobile {
            builder = builder.header("platform", "mobile");
        }
        let request = builder.body(Body::from(body)).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");
        decode(response).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> Reply {
        self.call(Method::GET, uri, None, Some(token), false).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: &str) -> Reply {
        self.call(Method::POST, uri, Some(body), Some(token), false).await
    }

    pub async fn put(&self, uri: &str, body: Value, token: &str, mobile: bool) -> Reply {
        self.call(Method::PUT, uri, Some(body), Some(token), mobile).await
    }

    /// Signs up through the API; drivers and warehouses sign up from the app
    pub async fn signup(&self, email: &str, user_type: &str) -> Account {
        let mobile = user_type != "backoffice";
        let reply = self
            .call(
                Method::POST,
                "/api/v1/signup",
                Some(json!({
                    "first_name": "Sam",
                    "last_name": "Okafor",
                    "phone_number": "+1 555 0100",
                    "email": email,
                    "password": PASSWORD,
                    "user_type": user_type,
                })),
                None,
                mobile,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "signup failed: {}", reply.body);

        let data = reply.data();
        let token = data["token"].as_str().expect("token").to_string();
        let (user_id, profile_id) = if mobile {
            let profile = &data["user_data"];
            (uuid_at(&profile["user"]["id"]), uuid_at(&profile["id"]))
        } else {
            let profile = self
                .call(Method::GET, "/api/v1/user-profile", None, Some(&token), true)
                .await;
            (
                uuid_at(&data["user"]["id"]),
                uuid_at(&profile.data()["user_data"]["id"]),
            )
        };

        Account {
            user_id,
            profile_id,
            token,
        }
    }

    /// Backoffice account that has completed onboarding with a company
    pub async fn onboarded_backoffice(&self, email: &str, company_email: &str) -> Account {
        let account = self.signup(email, "backoffice").await;
        let reply = self
            .post(
                "/api/v1/company/onboarding",
                json!({
                    "company_name": "Harbor Freight Partners",
                    "company_email": company_email,
                    "company_phone_number": "+1 555 0199",
                    "city": "Long Beach",
                    "state": "CA",
                }),
                &account.token,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "onboarding failed: {}", reply.body);
        account
    }

    /// Registers containers as `backoffice`; returns the shipment ids
    pub async fn add_containers(&self, backoffice: &Account, numbers: &[&str]) -> Vec<Uuid> {
        let containers: Vec<Value> = numbers
            .iter()
            .map(|n| json!({ "container_number": n, "size": "40", "type": "HC" }))
            .collect();
        let reply = self
            .post(
                "/api/v1/container/add",
                json!({ "containers": containers }),
                &backoffice.token,
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "add containers failed: {}", reply.body);
        reply
            .data()
            .as_array()
            .expect("added shipments")
            .iter()
            .map(|added| uuid_at(&added["shipment_id"]))
            .collect()
    }
}

pub fn uuid_at(value: &Value) -> Uuid {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("expected uuid, got {}", value))
}

async fn decode(response: axum::response::Response) -> Reply {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    Reply { status, body }
}
