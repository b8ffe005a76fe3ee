use chrono::{Duration, NaiveTime, TimeZone, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{associate_company, driver, shipment},
    errors::ServiceError,
    services::profiles::ensure_backoffice,
};

/// Counters shown on the backoffice landing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardStats {
    pub today_shipment: u64,
    pub total_shipment: u64,
    pub total_driver: u64,
    pub associate_company: u64,
    pub shipment_history: u64,
}

#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, user_id: Uuid) -> Result<DashboardStats, ServiceError> {
        let db = &*self.db;
        let backoffice = ensure_backoffice(db, user_id).await?;

        let midnight = Utc.from_utc_datetime(&Utc::now().date_naive().and_time(NaiveTime::MIN));
        let tomorrow = midnight + Duration::days(1);
        let mine = || {
            shipment::Entity::find()
                .filter(shipment::Column::CreatedBy.eq(user_id))
                .filter(shipment::Column::IsDeleted.eq(false))
        };

        let today_shipment = mine()
            .filter(shipment::Column::CreatedAt.gte(midnight))
            .filter(shipment::Column::CreatedAt.lt(tomorrow))
            .count(db)
            .await?;
        let total_shipment = mine().count(db).await?;
        // Created up to the start of today
        let shipment_history = mine()
            .filter(shipment::Column::CreatedAt.lte(midnight))
            .count(db)
            .await?;
        let total_driver = driver::Entity::find().count(db).await?;
        let associate_company = match backoffice.company_id {
            Some(company_id) => {
                associate_company::Entity::find()
                    .filter(associate_company::Column::CompanyId.eq(company_id))
                    .count(db)
                    .await?
            }
            None => 0,
        };

        Ok(DashboardStats {
            today_shipment,
            total_shipment,
            total_driver,
            associate_company,
            shipment_history,
        })
    }
}
