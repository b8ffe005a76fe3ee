use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{db::DbPool, entities::feedback, errors::ServiceError};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FeedbackRequest {
    #[validate(length(min = 1, max = 255, message = "Subject is required."))]
    pub subject: String,
    #[validate(length(min = 1, message = "Message is required."))]
    pub message: String,
}

#[derive(Clone)]
pub struct FeedbackService {
    db: Arc<DbPool>,
}

impl FeedbackService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Records feedback under the sender's email address
    #[instrument(skip(self, request))]
    pub async fn submit(&self, email: &str, request: FeedbackRequest) -> Result<feedback::Model, ServiceError> {
        request.validate()?;
        let saved = feedback::ActiveModel {
            id: Set(Uuid::new_v4()),
            subject: Set(request.subject),
            message: Set(request.message),
            email: Set(email.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;
        info!(feedback_id = %saved.id, "Feedback received");
        Ok(saved)
    }

    pub async fn list(&self) -> Result<Vec<feedback::Model>, ServiceError> {
        Ok(feedback::Entity::find()
            .order_by_desc(feedback::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<feedback::Model, ServiceError> {
        feedback::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Feedback not found."))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = feedback::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Feedback not found."));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::memory_db;

    #[tokio::test]
    async fn submitted_feedback_is_listed_and_deletable() {
        let service = FeedbackService::new(memory_db().await);
        let saved = service
            .submit(
                "ops@harbor.example",
                FeedbackRequest {
                    subject: "Map view".into(),
                    message: "Please show chassis yards.".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(saved.email, "ops@harbor.example");
        assert_eq!(service.list().await.unwrap().len(), 1);

        service.delete(saved.id).await.unwrap();
        assert!(service.get(saved.id).await.is_err());
    }
}
