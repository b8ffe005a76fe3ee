use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{device, notification},
    errors::ServiceError,
    services::push::{PushMessage, PushSender},
};

/// Notifications of one user with the unread count of the same set
#[derive(Debug, Clone, Serialize)]
pub struct NotificationList {
    pub unread_count: usize,
    pub notifications: Vec<notification::Model>,
}

/// Fields a user may change on their own notification
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct NotificationUpdate {
    pub read: Option<bool>,
    pub title: Option<String>,
    pub message: Option<String>,
}

/// `true`, `1` and `t` in any case mean read; anything else means unread
pub fn parse_is_read(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "t")
}

/// Persists notifications and fans them out to the recipient's devices
pub struct NotificationService {
    db: Arc<DbPool>,
    push: Arc<dyn PushSender>,
}

impl NotificationService {
    pub fn new(db: Arc<DbPool>, push: Arc<dyn PushSender>) -> Self {
        Self { db, push }
    }

    /// Stores the notification, then pushes it; push failures are only logged
    #[instrument(skip(self, message))]
    pub async fn create_and_send_notification(
        &self,
        recipient_id: Uuid,
        title: &str,
        message: &str,
        notification_type: Option<&str>,
        shipment_id: Option<Uuid>,
    ) -> Result<notification::Model, ServiceError> {
        let db = &*self.db;
        let record = notification::ActiveModel {
            id: Set(Uuid::new_v4()),
            recipient_id: Set(Some(recipient_id)),
            title: Set(title.to_string()),
            notification_type: Set(notification_type.map(str::to_string)),
            message: Set(message.to_string()),
            read: Set(false),
            shipment_id: Set(shipment_id),
            data: Set(Some(json!({
                "shipment_id": shipment_id.map(|id| id.to_string()),
                "type": notification_type,
            }))),
            created_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;

        let registration_ids = device::Entity::find()
            .filter(device::Column::UserId.eq(recipient_id))
            .all(db)
            .await?
            .into_iter()
            .map(|d| d.registration_id)
            .collect::<Vec<_>>();

        let push = PushMessage {
            registration_ids,
            title: title.to_string(),
            body: message.to_string(),
            notification_type: notification_type.map(str::to_string),
            shipment_id: shipment_id.map(|id| id.to_string()),
        };
        if let Err(e) = self.push.send(&push).await {
            warn!(recipient_id = %recipient_id, error = %e, "Push delivery failed");
        }

        metrics::counter!("backoffice_notifications.sent", 1);
        info!(notification_id = %record.id, recipient_id = %recipient_id, "Notification created");
        Ok(record)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid, is_read: Option<&str>) -> Result<NotificationList, ServiceError> {
        let mut query = notification::Entity::find()
            .filter(notification::Column::RecipientId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt);
        if let Some(raw) = is_read {
            query = query.filter(notification::Column::Read.eq(parse_is_read(raw)));
        }
        let notifications = query.all(&*self.db).await?;
        let unread_count = notifications.iter().filter(|n| !n.read).count();
        Ok(NotificationList {
            unread_count,
            notifications,
        })
    }

    async fn owned(&self, user_id: Uuid, id: Uuid) -> Result<notification::Model, ServiceError> {
        notification::Entity::find_by_id(id)
            .filter(notification::Column::RecipientId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Notification not found."))
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<notification::Model, ServiceError> {
        self.owned(user_id, id).await
    }

    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: NotificationUpdate,
    ) -> Result<notification::Model, ServiceError> {
        let mut active: notification::ActiveModel = self.owned(user_id, id).await?.into();
        if let Some(read) = update.read {
            active.read = Set(read);
        }
        if let Some(title) = update.title {
            active.title = Set(title);
        }
        if let Some(message) = update.message {
            active.message = Set(message);
        }
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.owned(user_id, id).await?;
        notification::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::Read, sea_orm::sea_query::Expr::value(true))
            .filter(notification::Column::RecipientId.eq(user_id))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }

    #[instrument(skip(self))]
    pub async fn delete_all(&self, user_id: Uuid) -> Result<u64, ServiceError> {
        let result = notification::Entity::delete_many()
            .filter(notification::Column::RecipientId.eq(user_id))
            .exec(&*self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
