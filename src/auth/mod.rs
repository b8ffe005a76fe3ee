/*!
 * # Authentication and Authorization Module
 *
 * Access tokens are HS256 JWTs. Every issued token id is also stored in
 * `auth_tokens`; a token is only honoured while its row exists, so logout
 * and mobile re-login can revoke tokens server side.
 *
 * Role checks are based on the account's user type:
 *
 * - `with_auth` requires any authenticated user
 * - `with_user_type` requires the user type for mutating methods only
 * - `require_user_type` requires the user type for every method
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::{auth_token, user, UserType};
use crate::errors::ServiceError;

pub mod oauth2;
pub mod password;
pub mod password_policy;
pub mod reset_token;

pub use password::{hash_password, verify_password};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use reset_token::ResetTokenGenerator;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Single element: the account's user type
    pub roles: Vec<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub user_type: UserType,
    pub token_id: Uuid,
}

impl AuthUser {
    pub fn is(&self, user_type: UserType) -> bool {
        self.user_type == user_type
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_audience: String,
        jwt_issuer: String,
        access_token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_audience,
            jwt_issuer,
            access_token_expiration,
        }
    }

    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            cfg.auth_audience.clone(),
            cfg.auth_issuer.clone(),
            Duration::from_secs(cfg.jwt_expiration as u64),
        )
    }
}

/// Freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    pub db: Arc<DatabaseConnection>,
}

impl AuthService {
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self { config, db }
    }

    /// Sign a token for `user` and record its id
    pub async fn generate_token<C>(&self, conn: &C, user: &user::Model) -> Result<IssuedToken, AuthError>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let expires_at = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;
        let jti = Uuid::new_v4();

        let claims = Claims {
            sub: user.id.to_string(),
            name: Some(user.full_name()),
            email: Some(user.email.clone()),
            roles: vec![user.user_type.to_string()],
            jti: jti.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        auth_token::Entity::insert(auth_token::ActiveModel {
            id: Set(jti),
            user_id: Set(user.id),
            created_at: Set(now),
            expires_at: Set(expires_at),
        })
        .exec_without_returning(conn)
        .await?;

        debug!(user_id = %user.id, jti = %jti, "Issued access token");

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Decode a token and make sure it has not been revoked
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        let jti = Uuid::parse_str(&claims.jti).map_err(|_| AuthError::InvalidToken)?;
        let stored = auth_token::Entity::find_by_id(jti)
            .one(self.db.as_ref())
            .await?;
        if stored.is_none() {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Build the request user from validated claims
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.validate_token(token).await?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
        let token_id = Uuid::parse_str(&claims.jti).map_err(|_| AuthError::InvalidToken)?;
        let user_type = claims
            .roles
            .first()
            .and_then(|role| role.parse::<UserType>().ok())
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
            user_type,
            token_id,
        })
    }

    pub async fn revoke_token<C>(&self, conn: &C, token_id: Uuid) -> Result<(), AuthError>
    where
        C: ConnectionTrait,
    {
        auth_token::Entity::delete_by_id(token_id).exec(conn).await?;
        Ok(())
    }

    /// Drop every token the user holds
    pub async fn revoke_all_for_user<C>(&self, conn: &C, user_id: Uuid) -> Result<u64, AuthError>
    where
        C: ConnectionTrait,
    {
        let result = auth_token::Entity::delete_many()
            .filter(auth_token::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Remove rows whose JWT has already expired
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let result = auth_token::Entity::delete_many()
            .filter(auth_token::Column::ExpiresAt.lt(Utc::now()))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingAuth,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    RevokedToken,

    #[error("Token creation error: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuth
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::RevokedToken => ServiceError::Unauthorized(err.to_string()),
            AuthError::InsufficientPermissions => ServiceError::Forbidden(err.to_string()),
            AuthError::TokenCreation(msg) => ServiceError::JwtError(msg),
            AuthError::DatabaseError(msg) | AuthError::InternalError(msg) => {
                ServiceError::InternalError(msg)
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, error_message): (StatusCode, &str, String) = match &self {
            Self::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "AUTH_MISSING",
                "Authentication credentials were not provided.".to_string(),
            ),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_INVALID_TOKEN",
                "Invalid token.".to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "AUTH_TOKEN_EXPIRED",
                "Token has expired".to_string(),
            ),
            Self::RevokedToken => (
                StatusCode::UNAUTHORIZED,
                "AUTH_REVOKED_TOKEN",
                "Invalid token.".to_string(),
            ),
            Self::TokenCreation(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AUTH_TOKEN_CREATION_FAILED",
                msg.clone(),
            ),
            Self::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "You do not have permission to perform this action.".to_string(),
            ),
            Self::DatabaseError(_) | Self::InternalError(_) => {
                warn!(error = %self, "authentication failed internally");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AUTH_INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (status, body).into_response()
    }
}

/// Middleware that accepts only users of the given type on mutating methods
pub async fn user_type_middleware(
    State(required): State<UserType>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if is_safe_method(request.method()) {
        return Ok(next.run(request).await);
    }
    require_user_type_middleware(State(required), request, next).await
}

/// Middleware that accepts only users of the given type
pub async fn require_user_type_middleware(
    State(required): State<UserType>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.is(required) {
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

fn is_safe_method(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD || method == Method::OPTIONS
}

/// Authentication middleware that extracts and validates bearer tokens
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match request.extensions().get::<Arc<AuthService>>() {
        Some(service) => service.clone(),
        None => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service not available",
            )
                .into_response();
        }
    };

    match extract_auth_from_headers(request.headers(), &auth_service).await {
        Ok(user) => {
            tracing::Span::current().record("user_id", tracing::field::display(user.user_id));
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Makes the [`AuthService`] available to [`auth_middleware`] further down the stack
pub async fn inject_auth_service(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth);
    next.run(request).await
}

/// Raw bearer token from the Authorization header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

async fn extract_auth_from_headers(
    headers: &HeaderMap,
    auth_service: &AuthService,
) -> Result<AuthUser, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::MissingAuth)?;
    auth_service.authenticate(token).await
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_user_type(self, user_type: UserType) -> Self;
    fn require_user_type(self, user_type: UserType) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_user_type(self, user_type: UserType) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            user_type,
            user_type_middleware,
        ))
        .with_auth()
    }

    fn require_user_type(self, user_type: UserType) -> Self {
        self.layer(axum::middleware::from_fn_with_state(
            user_type,
            require_user_type_middleware,
        ))
        .with_auth()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use assert_matches::assert_matches;
    use axum::{body::Body, http::Request as HttpRequest, routing::get, Extension, Router};
    use tower::ServiceExt;

    const SECRET: &str = "Kq7vN2xR9mW4tY8pL3zH6jB1cF5gD0sA-uE7iO2wQ9rT4yU8pA3sD6fG1hJ5kL0z";

    async fn service() -> (Arc<AuthService>, user::Model) {
        let db = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&db).await.unwrap();

        let now = Utc::now();
        let account = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: Set("Dana".into()),
            last_name: Set("Reyes".into()),
            email: Set("dana@harbor.example".into()),
            password_hash: Set(None),
            phone_number: Set(None),
            user_type: Set(UserType::Driver),
            profile_picture: Set(None),
            is_onboarded: Set(false),
            payload: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let account = sea_orm::ActiveModelTrait::insert(account, &db).await.unwrap();

        let config = AuthConfig::new(
            SECRET.into(),
            "backoffice-clients".into(),
            "backoffice-api".into(),
            Duration::from_secs(600),
        );
        (Arc::new(AuthService::new(config, Arc::new(db))), account)
    }

    #[tokio::test]
    async fn issued_token_authenticates_until_revoked() {
        let (auth, account) = service().await;
        let issued = auth.generate_token(auth.db.as_ref(), &account).await.unwrap();

        let user = auth.authenticate(&issued.token).await.unwrap();
        assert_eq!(user.user_id, account.id);
        assert_eq!(user.user_type, UserType::Driver);
        assert_eq!(user.token_id, issued.jti);

        auth.revoke_token(auth.db.as_ref(), issued.jti).await.unwrap();
        assert_matches!(
            auth.validate_token(&issued.token).await,
            Err(AuthError::RevokedToken)
        );
    }

    #[tokio::test]
    async fn revoke_all_drops_every_token() {
        let (auth, account) = service().await;
        let first = auth.generate_token(auth.db.as_ref(), &account).await.unwrap();
        let second = auth.generate_token(auth.db.as_ref(), &account).await.unwrap();

        let removed = auth
            .revoke_all_for_user(auth.db.as_ref(), account.id)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(auth.validate_token(&first.token).await.is_err());
        assert!(auth.validate_token(&second.token).await.is_err());
    }

    #[tokio::test]
    async fn tampered_token_is_invalid() {
        let (auth, account) = service().await;
        let issued = auth.generate_token(auth.db.as_ref(), &account).await.unwrap();
        let tampered = format!("{}x", issued.token);
        assert_matches!(
            auth.validate_token(&tampered).await,
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn bearer_token_accepts_both_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(header::AUTHORIZATION, "Token xyz".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("xyz"));
        headers.insert(header::AUTHORIZATION, "Basic xyz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn user_type_gate_only_blocks_mutations() {
        let (auth, account) = service().await;
        let issued = auth.generate_token(auth.db.as_ref(), &account).await.unwrap();

        let app = Router::new()
            .route("/resource", get(|| async { "read" }).post(|| async { "write" }))
            .with_user_type(UserType::Backoffice)
            .layer(Extension(auth.clone()));

        let read = app
            .clone()
            .oneshot(
                HttpRequest::get("/resource")
                    .header("authorization", format!("Bearer {}", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(read.status(), StatusCode::OK);

        let write = app
            .clone()
            .oneshot(
                HttpRequest::post("/resource")
                    .header("authorization", format!("Bearer {}", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(write.status(), StatusCode::FORBIDDEN);

        let anonymous = app
            .oneshot(HttpRequest::get("/resource").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    }
}
