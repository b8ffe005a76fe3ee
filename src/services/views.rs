//! Response shapes and the loaders that assemble them.
//!
//! Records are rows joined with their relations; views are what the API
//! serializes, with stored object names replaced by signed URLs.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    associate_company, backoffice_user, company, container, driver, shipment, user,
    warehouse_user, ShipmentStatus, UserType,
};
use crate::services::storage::StorageService;

/// Format used for `assigned_date` on the wire
pub const ASSIGNED_DATE_FORMAT: &str = "%Y/%m/%d";

#[derive(Debug, Clone)]
pub struct DriverRecord {
    pub profile: driver::Model,
    pub user: user::Model,
}

#[derive(Debug, Clone)]
pub struct WarehouseRecord {
    pub profile: warehouse_user::Model,
    pub user: user::Model,
    pub company: Option<company::Model>,
}

#[derive(Debug, Clone)]
pub struct ShipmentRecord {
    pub shipment: shipment::Model,
    pub container: container::Model,
    pub customer: Option<associate_company::Model>,
    pub driver: Option<DriverRecord>,
    pub warehouse: Option<WarehouseRecord>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub user_type: UserType,
    /// Signed URL of the profile picture
    pub profile_picture: Option<String>,
    pub is_onboarded: bool,
    #[schema(value_type = Option<Object>)]
    pub payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl UserView {
    pub fn render(user: &user::Model, storage: &StorageService) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            user_type: user.user_type,
            profile_picture: storage.url(user.profile_picture.as_deref()),
            is_onboarded: user.is_onboarded,
            payload: user.payload.clone(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompanyView {
    pub id: Uuid,
    pub company_name: String,
    pub company_email: String,
    pub company_phone_number: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub company_bio: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub company_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<company::Model> for CompanyView {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            company_name: model.company_name,
            company_email: model.company_email,
            company_phone_number: model.company_phone_number,
            address: model.address,
            country: model.country,
            city: model.city,
            state: model.state,
            zip_code: model.zip_code,
            company_bio: model.company_bio,
            company_payload: model.company_payload,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DriverView {
    pub id: Uuid,
    pub user: UserView,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DriverView {
    pub fn render(record: &DriverRecord, storage: &StorageService) -> Self {
        let profile = &record.profile;
        Self {
            id: profile.id,
            user: UserView::render(&record.user, storage),
            company_name: profile.company_name.clone(),
            state: profile.state.clone(),
            emergency_number: profile.emergency_number.clone(),
            license_number: profile.license_number.clone(),
            registration_state: profile.registration_state.clone(),
            twic_number: profile.twic_number.clone(),
            dot_number: profile.dot_number.clone(),
            dg_certification: profile.dg_certification.clone(),
            driver_payload: profile.driver_payload.clone(),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WarehouseView {
    pub id: Uuid,
    pub user: UserView,
    pub company: Option<CompanyView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WarehouseView {
    pub fn render(record: &WarehouseRecord, storage: &StorageService) -> Self {
        Self {
            id: record.profile.id,
            user: UserView::render(&record.user, storage),
            company: record.company.clone().map(CompanyView::from),
            created_at: record.profile.created_at,
            updated_at: record.profile.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BackOfficeView {
    pub id: Uuid,
    pub user: UserView,
    pub company: Option<CompanyView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Role profile of the signed-in user
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ProfileView {
    Driver(DriverView),
    Warehouse(WarehouseView),
    Backoffice(BackOfficeView),
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentView {
    pub id: Uuid,
    pub container: container::Model,
    pub customer: Option<associate_company::Model>,
    pub driver: Option<DriverView>,
    pub warehouse: Option<WarehouseView>,
    pub status: ShipmentStatus,
    /// `YYYY/MM/DD`
    pub assigned_date: Option<String>,
    pub warehouse_accepted_date: Option<DateTime<Utc>>,
    pub driver_delivered_date: Option<DateTime<Utc>>,
    pub pickedup_date: Option<DateTime<Utc>>,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub chassis_location: Option<String>,
    pub return_location: Option<String>,
    pub return_time: Option<String>,
    pub pickup_time: Option<String>,
    pub vessel_eta: Option<String>,
    pub last_free_day: Option<String>,
    pub discharged_date: Option<String>,
    pub outgate_date: Option<String>,
    pub ingate_date: Option<String>,
    pub empty_date: Option<String>,
    pub return_day: Option<String>,
    pub master_bill_of_landing: Option<String>,
    pub house_bill_of_landing: Option<String>,
    pub seal_number: Option<String>,
    pub reference_number: Option<String>,
    pub vessel_name: Option<String>,
    pub voyage: Option<String>,
    pub shipment_number: Option<String>,
    pub pickup_number: Option<String>,
    pub appointment_number: Option<String>,
    pub return_number: Option<String>,
    pub reservation_number: Option<String>,
    pub delivery_date: Option<String>,
    pub delivery_from: Option<String>,
    pub delivery_to: Option<String>,
    pub delivery_order: bool,
    pub delivery_order_file: Option<String>,
    pub bill_of_landing: bool,
    pub bill_of_landing_file: Option<String>,
    pub proof_of_delivery_file: Option<String>,
    pub freight_hold: bool,
    pub customs_hold: bool,
    pub carrier_hold: bool,
    pub commodity: Option<String>,
    pub piece_count: Option<i32>,
    pub weight_lbs: Option<i32>,
    pub weight_kgs: Option<i32>,
    pub pallet_count: Option<i32>,
    pub freight_description: Option<String>,
    pub is_deleted: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShipmentView {
    pub fn render(record: &ShipmentRecord, storage: &StorageService) -> Self {
        let s = record.shipment.clone();
        Self {
            id: s.id,
            container: record.container.clone(),
            customer: record.customer.clone(),
            driver: record.driver.as_ref().map(|d| DriverView::render(d, storage)),
            warehouse: record
                .warehouse
                .as_ref()
                .map(|w| WarehouseView::render(w, storage)),
            status: s.status,
            assigned_date: s
                .assigned_date
                .map(|d| d.format(ASSIGNED_DATE_FORMAT).to_string()),
            warehouse_accepted_date: s.warehouse_accepted_date,
            driver_delivered_date: s.driver_delivered_date,
            pickedup_date: s.pickedup_date,
            pickup_location: s.pickup_location,
            delivery_location: s.delivery_location,
            chassis_location: s.chassis_location,
            return_location: s.return_location,
            return_time: s.return_time,
            pickup_time: s.pickup_time,
            vessel_eta: s.vessel_eta,
            last_free_day: s.last_free_day,
            discharged_date: s.discharged_date,
            outgate_date: s.outgate_date,
            ingate_date: s.ingate_date,
            empty_date: s.empty_date,
            return_day: s.return_day,
            master_bill_of_landing: s.master_bill_of_landing,
            house_bill_of_landing: s.house_bill_of_landing,
            seal_number: s.seal_number,
            reference_number: s.reference_number,
            vessel_name: s.vessel_name,
            voyage: s.voyage,
            shipment_number: s.shipment_number,
            pickup_number: s.pickup_number,
            appointment_number: s.appointment_number,
            return_number: s.return_number,
            reservation_number: s.reservation_number,
            delivery_date: s.delivery_date,
            delivery_from: s.delivery_from,
            delivery_to: s.delivery_to,
            delivery_order: s.delivery_order,
            delivery_order_file: storage.url(s.delivery_order_file.as_deref()),
            bill_of_landing: s.bill_of_landing,
            bill_of_landing_file: storage.url(s.bill_of_landing_file.as_deref()),
            proof_of_delivery_file: storage.url(s.proof_of_delivery_file.as_deref()),
            freight_hold: s.freight_hold,
            customs_hold: s.customs_hold,
            carrier_hold: s.carrier_hold,
            commodity: s.commodity,
            piece_count: s.piece_count,
            weight_lbs: s.weight_lbs,
            weight_kgs: s.weight_kgs,
            pallet_count: s.pallet_count,
            freight_description: s.freight_description,
            is_deleted: s.is_deleted,
            created_by: s.created_by,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

/// Reduced shipment shape for the driver and warehouse apps
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShipmentMobileView {
    pub id: Uuid,
    pub container: container::Model,
    pub assigned_date: Option<String>,
    pub delivery_order_file: Option<String>,
    pub bill_of_landing_file: Option<String>,
    pub proof_of_delivery_file: Option<String>,
    pub status: ShipmentStatus,
    pub pickup_location: Option<String>,
    pub delivery_location: Option<String>,
    pub return_location: Option<String>,
    pub return_time: Option<String>,
    pub pickup_time: Option<String>,
    pub return_day: Option<String>,
    pub pickedup_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<String>,
    pub delivery_from: Option<String>,
    pub delivery_to: Option<String>,
    pub warehouse: Option<WarehouseView>,
    pub driver: Option<DriverView>,
}

impl ShipmentMobileView {
    pub fn render(record: &ShipmentRecord, storage: &StorageService) -> Self {
        let s = &record.shipment;
        Self {
            id: s.id,
            container: record.container.clone(),
            assigned_date: s
                .assigned_date
                .map(|d| d.format(ASSIGNED_DATE_FORMAT).to_string()),
            delivery_order_file: storage.url(s.delivery_order_file.as_deref()),
            bill_of_landing_file: storage.url(s.bill_of_landing_file.as_deref()),
            proof_of_delivery_file: storage.url(s.proof_of_delivery_file.as_deref()),
            status: s.status,
            pickup_location: s.pickup_location.clone(),
            delivery_location: s.delivery_location.clone(),
            return_location: s.return_location.clone(),
            return_time: s.return_time.clone(),
            pickup_time: s.pickup_time.clone(),
            return_day: s.return_day.clone(),
            pickedup_date: s.pickedup_date,
            delivery_date: s.delivery_date.clone(),
            delivery_from: s.delivery_from.clone(),
            delivery_to: s.delivery_to.clone(),
            warehouse: record
                .warehouse
                .as_ref()
                .map(|w| WarehouseView::render(w, storage)),
            driver: record.driver.as_ref().map(|d| DriverView::render(d, storage)),
        }
    }
}

/// Shipment rendered for the requesting platform
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum AnyShipmentView {
    Web(Box<ShipmentView>),
    Mobile(Box<ShipmentMobileView>),
}

impl AnyShipmentView {
    pub fn render(record: &ShipmentRecord, storage: &StorageService, mobile: bool) -> Self {
        if mobile {
            Self::Mobile(Box::new(ShipmentMobileView::render(record, storage)))
        } else {
            Self::Web(Box::new(ShipmentView::render(record, storage)))
        }
    }
}

fn unique(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Drivers keyed by profile id, each with its user
pub async fn load_drivers<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, DriverRecord>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = driver::Entity::find()
        .filter(driver::Column::Id.is_in(ids))
        .find_also_related(user::Entity)
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(profile, user)| {
            let user = user?;
            Some((profile.id, DriverRecord { profile, user }))
        })
        .collect())
}

/// Warehouse profiles keyed by id, each with its user and company
pub async fn load_warehouses<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, WarehouseRecord>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = warehouse_user::Entity::find()
        .filter(warehouse_user::Column::Id.is_in(ids))
        .find_also_related(user::Entity)
        .all(conn)
        .await?;

    let company_ids = unique(rows.iter().filter_map(|(p, _)| p.company_id));
    let companies = load_companies(conn, company_ids).await?;

    Ok(rows
        .into_iter()
        .filter_map(|(profile, user)| {
            let user = user?;
            let company = profile.company_id.and_then(|id| companies.get(&id).cloned());
            Some((
                profile.id,
                WarehouseRecord {
                    profile,
                    user,
                    company,
                },
            ))
        })
        .collect())
}

async fn load_companies<C: ConnectionTrait>(
    conn: &C,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, company::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(company::Entity::find()
        .filter(company::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect())
}

/// Joins shipments with their container, customer, driver and warehouse,
/// keeping the input order
pub async fn load_shipment_records<C: ConnectionTrait>(
    conn: &C,
    shipments: Vec<shipment::Model>,
) -> Result<Vec<ShipmentRecord>, DbErr> {
    if shipments.is_empty() {
        return Ok(Vec::new());
    }

    let containers: HashMap<Uuid, container::Model> = container::Entity::find()
        .filter(container::Column::Id.is_in(unique(shipments.iter().map(|s| s.container_id))))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let customer_ids = unique(shipments.iter().filter_map(|s| s.customer_id));
    let customers: HashMap<Uuid, associate_company::Model> = if customer_ids.is_empty() {
        HashMap::new()
    } else {
        associate_company::Entity::find()
            .filter(associate_company::Column::Id.is_in(customer_ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
    };

    let drivers = load_drivers(conn, unique(shipments.iter().filter_map(|s| s.driver_id))).await?;
    let warehouses =
        load_warehouses(conn, unique(shipments.iter().filter_map(|s| s.warehouse_id))).await?;

    Ok(shipments
        .into_iter()
        .filter_map(|shipment| {
            let Some(container) = containers.get(&shipment.container_id).cloned() else {
                warn!(shipment_id = %shipment.id, "Shipment has no container; skipped");
                return None;
            };
            Some(ShipmentRecord {
                customer: shipment.customer_id.and_then(|id| customers.get(&id).cloned()),
                driver: shipment.driver_id.and_then(|id| drivers.get(&id).cloned()),
                warehouse: shipment.warehouse_id.and_then(|id| warehouses.get(&id).cloned()),
                container,
                shipment,
            })
        })
        .collect())
}

pub async fn load_shipment_record<C: ConnectionTrait>(
    conn: &C,
    shipment: shipment::Model,
) -> Result<Option<ShipmentRecord>, DbErr> {
    Ok(load_shipment_records(conn, vec![shipment]).await?.pop())
}

/// Renders the role profile of `user`, creating the profile row if it is missing
pub async fn load_profile_view<C: ConnectionTrait>(
    conn: &C,
    storage: &StorageService,
    user: &user::Model,
) -> Result<ProfileView, DbErr> {
    Ok(match user.user_type {
        UserType::Driver => {
            let profile = crate::services::profiles::ensure_driver(conn, user.id).await?;
            ProfileView::Driver(DriverView::render(
                &DriverRecord {
                    profile,
                    user: user.clone(),
                },
                storage,
            ))
        }
        UserType::Warehouse => {
            let profile = crate::services::profiles::ensure_warehouse(conn, user.id).await?;
            let company = match profile.company_id {
                Some(id) => company::Entity::find_by_id(id).one(conn).await?,
                None => None,
            };
            ProfileView::Warehouse(WarehouseView::render(
                &WarehouseRecord {
                    profile,
                    user: user.clone(),
                    company,
                },
                storage,
            ))
        }
        UserType::Backoffice => {
            let profile = crate::services::profiles::ensure_backoffice(conn, user.id).await?;
            let company = match profile.company_id {
                Some(id) => company::Entity::find_by_id(id).one(conn).await?,
                None => None,
            };
            ProfileView::Backoffice(backoffice_view(profile, user, company, storage))
        }
    })
}

fn backoffice_view(
    profile: backoffice_user::Model,
    user: &user::Model,
    company: Option<company::Model>,
    storage: &StorageService,
) -> BackOfficeView {
    BackOfficeView {
        id: profile.id,
        user: UserView::render(user, storage),
        company: company.map(CompanyView::from),
        created_at: profile.created_at,
        updated_at: profile.updated_at,
    }
}
