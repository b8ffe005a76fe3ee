use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{backoffice_user, driver, warehouse_user},
    errors::ServiceError,
    services::{
        form::FormData,
        storage::StorageService,
        views::{load_drivers, load_warehouses, DriverView, WarehouseView},
    },
};

/// Returns the driver profile of `user_id`, creating an empty one if needed
pub async fn ensure_driver<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<driver::Model, DbErr> {
    if let Some(found) = driver::Entity::find()
        .filter(driver::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    {
        return Ok(found);
    }
    let now = Utc::now();
    driver::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        company_name: Set(None),
        state: Set(None),
        emergency_number: Set(None),
        license_number: Set(None),
        registration_state: Set(None),
        twic_number: Set(None),
        dot_number: Set(None),
        dg_certification: Set(None),
        driver_payload: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn ensure_warehouse<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<warehouse_user::Model, DbErr> {
    if let Some(found) = warehouse_user::Entity::find()
        .filter(warehouse_user::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    {
        return Ok(found);
    }
    let now = Utc::now();
    warehouse_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        company_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn ensure_backoffice<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<backoffice_user::Model, DbErr> {
    if let Some(found) = backoffice_user::Entity::find()
        .filter(backoffice_user::Column::UserId.eq(user_id))
        .one(conn)
        .await?
    {
        return Ok(found);
    }
    let now = Utc::now();
    backoffice_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        company_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Driver fields accepted from profile and onboarding forms
pub const DRIVER_FORM_FIELDS: [&str; 8] = [
    "company_name",
    "state",
    "emergency_number",
    "license_number",
    "registration_state",
    "twic_number",
    "dot_number",
    "dg_certification",
];

/// Copies the driver fields present in `form`; `overwrite_missing` clears absent ones
pub fn apply_driver_form(active: &mut driver::ActiveModel, form: &FormData, overwrite_missing: bool) {
    for field in DRIVER_FORM_FIELDS {
        let value = form.value(field).map(str::to_string);
        if value.is_none() && !overwrite_missing {
            continue;
        }
        let slot = match field {
            "company_name" => &mut active.company_name,
            "state" => &mut active.state,
            "emergency_number" => &mut active.emergency_number,
            "license_number" => &mut active.license_number,
            "registration_state" => &mut active.registration_state,
            "twic_number" => &mut active.twic_number,
            "dot_number" => &mut active.dot_number,
            _ => &mut active.dg_certification,
        };
        *slot = Set(value);
    }
}

/// Partial update of a driver profile
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DriverUpdate {
    pub company_name: Option<String>,
    pub state: Option<String>,
    pub emergency_number: Option<String>,
    pub license_number: Option<String>,
    pub registration_state: Option<String>,
    pub twic_number: Option<String>,
    pub dot_number: Option<String>,
    pub dg_certification: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub driver_payload: Option<serde_json::Value>,
}

/// Partial update of a warehouse profile
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct WarehouseUpdate {
    pub company: Option<Uuid>,
}

/// Driver and warehouse profile directory
#[derive(Clone)]
pub struct ProfileService {
    db: Arc<DbPool>,
    storage: StorageService,
}

impl ProfileService {
    pub fn new(db: Arc<DbPool>, storage: StorageService) -> Self {
        Self { db, storage }
    }

    #[instrument(skip(self))]
    pub async fn list_drivers(&self) -> Result<Vec<DriverView>, ServiceError> {
        let db = &*self.db;
        let ids = driver::Entity::find()
            .order_by_desc(driver::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect::<Vec<_>>();
        let records = load_drivers(db, ids.clone()).await?;
        Ok(ids
            .iter()
            .filter_map(|id| records.get(id))
            .map(|r| DriverView::render(r, &self.storage))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_driver(&self, id: Uuid) -> Result<DriverView, ServiceError> {
        let records = load_drivers(&*self.db, vec![id]).await?;
        records
            .get(&id)
            .map(|r| DriverView::render(r, &self.storage))
            .ok_or_else(|| ServiceError::not_found("Driver not found."))
    }

    #[instrument(skip(self, update))]
    pub async fn update_driver(&self, id: Uuid, update: DriverUpdate) -> Result<DriverView, ServiceError> {
        let db = &*self.db;
        let existing = driver::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Driver not found."))?;

        let mut active: driver::ActiveModel = existing.into();
        macro_rules! assign {
            ($($field:ident),*) => {
                $(if let Some(value) = update.$field {
                    active.$field = Set(Some(value));
                })*
            };
        }
        assign!(
            company_name,
            state,
            emergency_number,
            license_number,
            registration_state,
            twic_number,
            dot_number,
            dg_certification,
            driver_payload
        );
        active.update(db).await?;

        info!(driver_id = %id, "Driver profile updated");
        self.get_driver(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_driver(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = driver::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Driver not found."));
        }
        info!(driver_id = %id, "Driver profile deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> Result<Vec<WarehouseView>, ServiceError> {
        let db = &*self.db;
        let ids = warehouse_user::Entity::find()
            .order_by_desc(warehouse_user::Column::CreatedAt)
            .all(db)
            .await?
            .into_iter()
            .map(|w| w.id)
            .collect::<Vec<_>>();
        let records = load_warehouses(db, ids.clone()).await?;
        Ok(ids
            .iter()
            .filter_map(|id| records.get(id))
            .map(|r| WarehouseView::render(r, &self.storage))
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, id: Uuid) -> Result<WarehouseView, ServiceError> {
        let records = load_warehouses(&*self.db, vec![id]).await?;
        records
            .get(&id)
            .map(|r| WarehouseView::render(r, &self.storage))
            .ok_or_else(|| ServiceError::not_found("Warehouse user not found."))
    }

    #[instrument(skip(self))]
    pub async fn update_warehouse(
        &self,
        id: Uuid,
        update: WarehouseUpdate,
    ) -> Result<WarehouseView, ServiceError> {
        let db = &*self.db;
        let existing = warehouse_user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Warehouse user not found."))?;

        if let Some(company_id) = update.company {
            let exists = crate::entities::company::Entity::find_by_id(company_id)
                .one(db)
                .await?
                .is_some();
            if !exists {
                return Err(ServiceError::bad_request("Company not found."));
            }
            let mut active: warehouse_user::ActiveModel = existing.into();
            active.company_id = Set(Some(company_id));
            active.update(db).await?;
        }

        self.get_warehouse(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_warehouse(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = warehouse_user::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Warehouse user not found."));
        }
        info!(warehouse_id = %id, "Warehouse profile deleted");
        Ok(())
    }
}
