/*!
 * # Google OAuth2
 *
 * Web clients send the authorization code from Google's consent screen;
 * it is exchanged for an access token and the profile is read from the
 * userinfo endpoint. Mobile clients already hold an access token and only
 * need the userinfo call.
 */

use oauth2::{
    basic::BasicClient, reqwest::async_http_client, AuthUrl, AuthorizationCode, ClientId,
    ClientSecret, RedirectUrl, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::AppConfig;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USER_INFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Error, Debug)]
pub enum OAuth2Error {
    #[error("Google OAuth is not configured")]
    NotConfigured,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("Failed to fetch user info: {0}")]
    UserInfoFailed(String),
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
}

impl GoogleOAuthConfig {
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            user_info_url: GOOGLE_USER_INFO_URL.to_string(),
        }
    }

    /// Present only when client id, secret and redirect url are all set
    pub fn from_app_config(cfg: &AppConfig) -> Option<Self> {
        match (
            cfg.google_client_id.as_ref(),
            cfg.google_client_secret.as_ref(),
            cfg.google_redirect_url.as_ref(),
        ) {
            (Some(id), Some(secret), Some(redirect)) => {
                Some(Self::new(id.clone(), secret.clone(), redirect.clone()))
            }
            _ => None,
        }
    }
}

/// Profile fields returned by Google's userinfo endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleUserInfo {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Clone)]
pub struct GoogleOAuthClient {
    config: Option<GoogleOAuthConfig>,
    user_info_url: String,
    http_client: reqwest::Client,
}

impl GoogleOAuthClient {
    pub fn new(config: Option<GoogleOAuthConfig>) -> Self {
        let user_info_url = config
            .as_ref()
            .map(|c| c.user_info_url.clone())
            .unwrap_or_else(|| GOOGLE_USER_INFO_URL.to_string());
        Self {
            config,
            user_info_url,
            http_client: reqwest::Client::new(),
        }
    }

    /// Overrides the userinfo endpoint; used when no client credentials are configured
    pub fn with_user_info_url(mut self, url: impl Into<String>) -> Self {
        self.user_info_url = url.into();
        self
    }

    fn build_client(&self) -> Result<BasicClient, OAuth2Error> {
        let config = self.config.as_ref().ok_or(OAuth2Error::NotConfigured)?;

        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone())
                .map_err(|e| OAuth2Error::ConfigurationError(e.to_string()))?,
            Some(
                TokenUrl::new(config.token_url.clone())
                    .map_err(|e| OAuth2Error::ConfigurationError(e.to_string()))?,
            ),
        )
        .set_redirect_uri(
            RedirectUrl::new(config.redirect_url.clone())
                .map_err(|e| OAuth2Error::ConfigurationError(e.to_string()))?,
        );

        Ok(client)
    }

    /// Exchange an authorization code for an access token
    pub async fn exchange_code(&self, code: &str) -> Result<String, OAuth2Error> {
        let client = self.build_client()?;

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                warn!(error = %e, "Google code exchange failed");
                OAuth2Error::TokenExchangeFailed(e.to_string())
            })?;

        info!("Exchanged Google authorization code for tokens");
        Ok(token_result.access_token().secret().clone())
    }

    /// Fetch the Google profile belonging to an access token
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, OAuth2Error> {
        let response = self
            .http_client
            .get(&self.user_info_url)
            .bearer_auth(access_token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| OAuth2Error::UserInfoFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuth2Error::UserInfoFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let info: GoogleUserInfo = response
            .json()
            .await
            .map_err(|e| OAuth2Error::UserInfoFailed(e.to_string()))?;

        if info.email.is_none() {
            return Err(OAuth2Error::UserInfoFailed(
                "Missing 'email' field".to_string(),
            ));
        }

        Ok(info)
    }

    /// Code exchange followed by the userinfo call
    pub async fn user_info_from_code(&self, code: &str) -> Result<GoogleUserInfo, OAuth2Error> {
        let access_token = self.exchange_code(code).await?;
        self.fetch_user_info(&access_token).await
    }
}
