use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{associate_company, backoffice_user},
    errors::ServiceError,
};

/// Body of create, full update and partial update
#[derive(Debug, Default, Clone, Deserialize, Validate, ToSchema)]
pub struct AssociateCompanyRequest {
    /// Backoffice account the customer is registered under; create only
    pub user_id: Option<Uuid>,
    pub responsible_person_name: Option<String>,
    pub associate_company_name: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub associate_company_email: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub associate_company_bio: Option<String>,
}

impl AssociateCompanyRequest {
    /// Fields that must be present on create and full update
    fn missing_required(&self) -> Option<&'static str> {
        [
            ("responsible_person_name", &self.responsible_person_name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("country", &self.country),
            ("state", &self.state),
            ("zip_code", &self.zip_code),
        ]
        .into_iter()
        .find(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| name)
    }

    fn check(&self, partial: bool) -> Result<(), ServiceError> {
        self.validate()?;
        if !partial {
            if let Some(field) = self.missing_required() {
                return Err(ServiceError::ValidationError(format!(
                    "{}: This field is required.",
                    field
                )));
            }
        }
        Ok(())
    }

    fn apply(self, active: &mut associate_company::ActiveModel) {
        if let Some(v) = self.responsible_person_name {
            active.responsible_person_name = Set(v);
        }
        if let Some(v) = self.associate_company_name {
            active.associate_company_name = Set(Some(v));
        }
        if let Some(v) = self.associate_company_email {
            active.associate_company_email = Set(Some(v.to_lowercase()));
        }
        if let Some(v) = self.email {
            active.email = Set(v.to_lowercase());
        }
        if let Some(v) = self.phone {
            active.phone = Set(v);
        }
        if let Some(v) = self.address {
            active.address = Set(v);
        }
        if let Some(v) = self.country {
            active.country = Set(v);
        }
        if let Some(v) = self.city {
            active.city = Set(Some(v));
        }
        if let Some(v) = self.state {
            active.state = Set(v);
        }
        if let Some(v) = self.zip_code {
            active.zip_code = Set(v);
        }
        if let Some(v) = self.associate_company_bio {
            active.associate_company_bio = Set(Some(v));
        }
    }
}

/// Customers registered under backoffice companies
#[derive(Clone)]
pub struct AssociateCompanyService {
    db: Arc<DbPool>,
}

impl AssociateCompanyService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<associate_company::Model>, ServiceError> {
        Ok(associate_company::Entity::find()
            .order_by_desc(associate_company::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<associate_company::Model, ServiceError> {
        associate_company::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("No AssociateCompany matches the given query."))
    }

    /// Creates the customer under the company of `request.user_id`
    #[instrument(skip(self, request))]
    pub async fn create(&self, request: AssociateCompanyRequest) -> Result<associate_company::Model, ServiceError> {
        let db = &*self.db;
        let user_id = request
            .user_id
            .ok_or_else(|| ServiceError::bad_request("user_id must be provided"))?;

        let backoffice = backoffice_user::Entity::find()
            .filter(backoffice_user::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("No BackOfficeUser matches the given query."))?;
        let company_id = backoffice.company_id.ok_or_else(|| {
            ServiceError::bad_request("No company associated with this backoffice user")
        })?;

        request.check(false)?;

        let now = Utc::now();
        let mut active = associate_company::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            responsible_person_name: Set(String::new()),
            associate_company_name: Set(None),
            associate_company_email: Set(None),
            email: Set(String::new()),
            phone: Set(String::new()),
            address: Set(String::new()),
            country: Set(String::new()),
            city: Set(None),
            state: Set(String::new()),
            zip_code: Set(String::new()),
            associate_company_bio: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        request.apply(&mut active);
        let created = active.insert(db).await?;

        info!(associate_company_id = %created.id, company_id = %company_id, "Associate company created");
        Ok(created)
    }

    /// Full (`partial = false`) or partial update
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: AssociateCompanyRequest,
        partial: bool,
    ) -> Result<associate_company::Model, ServiceError> {
        let existing = self.get(id).await?;
        request.check(partial)?;

        let mut active: associate_company::ActiveModel = existing.into();
        request.apply(&mut active);
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        associate_company::Entity::delete_by_id(existing.id)
            .exec(&*self.db)
            .await?;
        info!(associate_company_id = %id, "Associate company deleted");
        Ok(())
    }
}
