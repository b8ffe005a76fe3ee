use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{db::DbPool, entities::device, errors::ServiceError};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterDeviceRequest {
    #[validate(length(min = 1, message = "registration_id is required"))]
    pub registration_id: String,
}

/// Push registrations; a user keeps a single device record
#[derive(Clone)]
pub struct DeviceService {
    db: Arc<DbPool>,
}

impl DeviceService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Replaces the registration id of the user's device, creating it if needed
    #[instrument(skip(self, request))]
    pub async fn register(
        &self,
        user_id: Uuid,
        request: RegisterDeviceRequest,
    ) -> Result<device::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db;

        let existing = device::Entity::find()
            .filter(device::Column::UserId.eq(user_id))
            .order_by_asc(device::Column::CreatedAt)
            .one(db)
            .await?;

        let saved = match existing {
            Some(found) => {
                let mut active: device::ActiveModel = found.into();
                active.registration_id = Set(request.registration_id);
                active.update(db).await?
            }
            None => {
                device::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(Some(user_id)),
                    registration_id: Set(request.registration_id),
                    created_at: Set(Utc::now()),
                }
                .insert(db)
                .await?
            }
        };

        info!(device_id = %saved.id, "Device registered");
        Ok(saved)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<device::Model>, ServiceError> {
        Ok(device::Entity::find()
            .filter(device::Column::UserId.eq(user_id))
            .order_by_desc(device::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<device::Model, ServiceError> {
        device::Entity::find_by_id(id)
            .filter(device::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Device not found."))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let found = self.get(user_id, id).await?;
        device::Entity::delete_by_id(found.id).exec(&*self.db).await?;
        Ok(())
    }

    /// Drops the user's oldest device; used on logout
    pub async fn remove_first(&self, user_id: Uuid) -> Result<bool, ServiceError> {
        let db = &*self.db;
        let first = device::Entity::find()
            .filter(device::Column::UserId.eq(user_id))
            .order_by_asc(device::Column::CreatedAt)
            .one(db)
            .await?;
        match first {
            Some(found) => {
                device::Entity::delete_by_id(found.id).exec(db).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserType;
    use crate::services::test_support::{insert_user, memory_db};

    #[tokio::test]
    async fn registering_twice_keeps_one_device() {
        let db = memory_db().await;
        let user = insert_user(&db, "d@haul.example", UserType::Driver).await;
        let devices = DeviceService::new(db);

        let first = devices
            .register(user.id, RegisterDeviceRequest { registration_id: "old".into() })
            .await
            .unwrap();
        let second = devices
            .register(user.id, RegisterDeviceRequest { registration_id: "new".into() })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let all = devices.list(user.id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].registration_id, "new");

        assert!(devices.remove_first(user.id).await.unwrap());
        assert!(!devices.remove_first(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn empty_registration_id_is_rejected() {
        let db = memory_db().await;
        let user = insert_user(&db, "d@haul.example", UserType::Driver).await;
        let err = DeviceService::new(db)
            .register(user.id, RegisterDeviceRequest { registration_id: String::new() })
            .await
            .unwrap_err();
        assert_eq!(err.response_message(), "registration_id is required");
    }
}
