//! Customers seen from a backoffice user: every warehouse plus the
//! associate companies of the caller's own company.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{associate_company, company, container, shipment, user, warehouse_user, ShipmentStatus},
    errors::ServiceError,
    services::{
        page_number,
        profiles::ensure_backoffice,
        storage::StorageService,
        views::{load_shipment_records, ShipmentView},
        PAGE_SIZE,
    },
    PaginatedResponse,
};

/// Statuses that make a shipment a customer's "latest"
const ACTIVE_STATUSES: [ShipmentStatus; 2] = [ShipmentStatus::PickedUp, ShipmentStatus::Assigned];
const OPEN_STATUSES: [ShipmentStatus; 3] = [
    ShipmentStatus::Queued,
    ShipmentStatus::PickedUp,
    ShipmentStatus::Assigned,
];
const CLOSED_STATUSES: [ShipmentStatus; 2] = [ShipmentStatus::Delivered, ShipmentStatus::ReturnedEmpty];

/// Matches the `type` query value of the history endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CustomerKind {
    Warehouse,
    Company,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CustomerEntry {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: CustomerKind,
    pub responsible_person_name: String,
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone_number: Option<String>,
    pub profile_picture: Option<String>,
    pub latest_shipment: Option<ShipmentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerListQuery {
    pub page: Option<String>,
    /// Case-insensitive company name fragment
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerHistoryQuery {
    /// `warehouse` or `company`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Any value selects delivered and returned shipments instead of open ones
    pub status: Option<String>,
    pub container_number: Option<String>,
    pub page: Option<String>,
}

fn matches(name: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => name.is_some_and(|n| n.to_lowercase().contains(needle)),
    }
}

#[derive(Clone)]
pub struct CustomerService {
    db: Arc<DbPool>,
    storage: StorageService,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>, storage: StorageService) -> Self {
        Self { db, storage }
    }

    /// Latest active shipment per warehouse or customer id
    async fn latest_shipments(
        &self,
        column: shipment::Column,
        ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, ShipmentView>, ServiceError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = shipment::Entity::find()
            .filter(column.is_in(ids))
            .filter(shipment::Column::Status.is_in(ACTIVE_STATUSES))
            .filter(shipment::Column::IsDeleted.eq(false))
            .order_by_desc(shipment::Column::UpdatedAt)
            .all(&*self.db)
            .await?;

        let mut latest = HashMap::new();
        for record in load_shipment_records(&*self.db, rows).await? {
            let owner = match column {
                shipment::Column::WarehouseId => record.shipment.warehouse_id,
                _ => record.shipment.customer_id,
            };
            if let Some(owner) = owner {
                latest
                    .entry(owner)
                    .or_insert_with(|| ShipmentView::render(&record, &self.storage));
            }
        }
        Ok(latest)
    }

    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        user_id: Uuid,
        query: CustomerListQuery,
    ) -> Result<PaginatedResponse<CustomerEntry>, ServiceError> {
        let db = &*self.db;
        let backoffice = ensure_backoffice(db, user_id).await?;
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let needle = needle.as_deref();

        let warehouses: Vec<(warehouse_user::Model, Option<user::Model>)> = warehouse_user::Entity::find()
            .find_also_related(user::Entity)
            .all(db)
            .await?;
        let companies: HashMap<Uuid, company::Model> = company::Entity::find()
            .filter(company::Column::Id.is_in(warehouses.iter().filter_map(|(w, _)| w.company_id)))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();
        let warehouses: Vec<_> = warehouses
            .into_iter()
            .filter_map(|(profile, user)| {
                let company = profile.company_id.and_then(|id| companies.get(&id));
                if !matches(company.map(|c| c.company_name.as_str()), needle) {
                    return None;
                }
                Some((profile, user?, company.cloned()))
            })
            .collect();

        let customers: Vec<associate_company::Model> = match backoffice.company_id {
            Some(company_id) => associate_company::Entity::find()
                .filter(associate_company::Column::CompanyId.eq(company_id))
                .all(db)
                .await?
                .into_iter()
                .filter(|c| matches(c.associate_company_name.as_deref(), needle))
                .collect(),
            None => Vec::new(),
        };

        let mut warehouse_latest = self
            .latest_shipments(
                shipment::Column::WarehouseId,
                warehouses.iter().map(|(w, _, _)| w.id).collect(),
            )
            .await?;
        let mut customer_latest = self
            .latest_shipments(shipment::Column::CustomerId, customers.iter().map(|c| c.id).collect())
            .await?;

        let mut entries: Vec<CustomerEntry> = warehouses
            .into_iter()
            .map(|(profile, user, company)| CustomerEntry {
                id: profile.id,
                kind: CustomerKind::Warehouse,
                responsible_person_name: format!("{} {}", user.first_name, user.last_name),
                company_name: company.as_ref().map(|c| c.company_name.clone()),
                company_email: company.as_ref().map(|c| c.company_email.clone()),
                company_phone_number: company.and_then(|c| c.company_phone_number),
                profile_picture: self.storage.url(user.profile_picture.as_deref()),
                latest_shipment: warehouse_latest.remove(&profile.id),
                created_at: profile.created_at,
                updated_at: profile.updated_at,
            })
            .chain(customers.into_iter().map(|c| CustomerEntry {
                id: c.id,
                kind: CustomerKind::Company,
                responsible_person_name: c.responsible_person_name,
                company_name: c.associate_company_name,
                company_email: c.associate_company_email,
                company_phone_number: Some(c.phone),
                profile_picture: None,
                latest_shipment: customer_latest.remove(&c.id),
                created_at: c.created_at,
                updated_at: c.updated_at,
            }))
            .collect();
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        // Past the end serves the last page
        let total = entries.len() as u64;
        let last_page = total.div_ceil(PAGE_SIZE).max(1);
        let page = page_number(query.page.as_deref()).min(last_page);
        let items = entries
            .into_iter()
            .skip(((page - 1) * PAGE_SIZE) as usize)
            .take(PAGE_SIZE as usize)
            .collect();

        Ok(PaginatedResponse::new(items, total, page, PAGE_SIZE))
    }

    /// Shipments of one warehouse or customer, open ones unless `status` is given
    #[instrument(skip(self, query))]
    pub async fn history(
        &self,
        id: Uuid,
        query: CustomerHistoryQuery,
    ) -> Result<PaginatedResponse<ShipmentView>, ServiceError> {
        let db = &*self.db;
        let owner = match query.kind.as_deref() {
            Some("warehouse") => shipment::Column::WarehouseId,
            Some("company") => shipment::Column::CustomerId,
            _ => {
                return Err(ServiceError::bad_request(
                    "Invalid type parameter. Must be \"warehouse\" or \"company\".",
                ))
            }
        };
        let statuses: &[ShipmentStatus] = match query.status.as_deref() {
            Some(s) if !s.is_empty() => &CLOSED_STATUSES,
            _ => &OPEN_STATUSES,
        };
        let page = page_number(query.page.as_deref());

        let mut select = shipment::Entity::find()
            .filter(owner.eq(id))
            .filter(shipment::Column::Status.is_in(statuses.iter().copied()))
            .filter(shipment::Column::IsDeleted.eq(false))
            .order_by_desc(shipment::Column::UpdatedAt);

        if let Some(number) = query
            .container_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        {
            let container_ids: Vec<Uuid> = container::Entity::find()
                .filter(
                    Expr::expr(Func::lower(Expr::col(container::Column::ContainerNumber)))
                        .like(format!("%{}%", number.to_lowercase())),
                )
                .all(db)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            select = select.filter(shipment::Column::ContainerId.is_in(container_ids));
        }

        let paginator = select.paginate(db, PAGE_SIZE);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;
        let items = load_shipment_records(db, rows)
            .await?
            .iter()
            .map(|record| ShipmentView::render(record, &self.storage))
            .collect();

        Ok(PaginatedResponse::new(items, total, page, PAGE_SIZE))
    }
}
