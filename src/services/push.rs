//! Push delivery to mobile devices.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::errors::ServiceError;

/// One push message fanned out to a user's devices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub registration_ids: Vec<String>,
    pub title: String,
    pub body: String,
    pub notification_type: Option<String>,
    pub shipment_id: Option<String>,
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, message: &PushMessage) -> Result<(), ServiceError>;
}

/// Legacy FCM HTTP API sender
pub struct FcmPushSender {
    endpoint: String,
    server_key: String,
    http_client: reqwest::Client,
}

impl FcmPushSender {
    pub fn new(endpoint: impl Into<String>, server_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            server_key: server_key.into(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PushSender for FcmPushSender {
    #[instrument(skip(self, message), fields(devices = message.registration_ids.len()))]
    async fn send(&self, message: &PushMessage) -> Result<(), ServiceError> {
        if message.registration_ids.is_empty() {
            debug!("No registered devices; skipping push");
            return Ok(());
        }

        let payload = serde_json::json!({
            "registration_ids": message.registration_ids,
            "notification": {
                "title": message.title,
                "body": message.body,
            },
            "data": {
                "type": message.notification_type,
                "shipment_id": message.shipment_id,
            },
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("FCM request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::ExternalServiceError(format!(
                "FCM returned HTTP {}: {}",
                status, body
            )));
        }

        info!("Push notification delivered to FCM");
        Ok(())
    }
}

/// Used when no FCM server key is configured
pub struct NoopPushSender;

#[async_trait]
impl PushSender for NoopPushSender {
    async fn send(&self, message: &PushMessage) -> Result<(), ServiceError> {
        info!(
            title = %message.title,
            devices = message.registration_ids.len(),
            "Push disabled; notification not sent"
        );
        Ok(())
    }
}

/// Keeps every message in memory
#[derive(Default)]
pub struct RecordingPushSender {
    sent: Mutex<Vec<PushMessage>>,
}

impl RecordingPushSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl PushSender for RecordingPushSender {
    async fn send(&self, message: &PushMessage) -> Result<(), ServiceError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }
}
