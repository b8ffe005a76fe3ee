//! Shipment workflow.
//!
//! Shipments move Queued -> Assigned -> Picked Up -> Delivered / Accepted
//! -> Returned Empty. Updates arrive as loosely typed forms; every value is
//! parsed before anything is written, then the shipment and its container
//! are saved in one transaction. Status changes notify the other parties.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthUser,
    db::{self, DbPool},
    entities::{
        associate_company, container, driver, shipment, warehouse_user, ShipmentStatus, UserType,
    },
    errors::ServiceError,
    services::{
        documents::{proof_of_delivery_name, render_shipment_details},
        form::{parse_bool, FormData},
        notifications::NotificationService,
        page_number,
        shipment_filters::{parse_status_filter, timeframe_range},
        storage::{StorageService, BILLS_OF_LANDING, DELIVERY_ORDERS},
        views::{
            load_shipment_record, load_shipment_records, AnyShipmentView, ShipmentRecord,
            ASSIGNED_DATE_FORMAT,
        },
        PAGE_SIZE,
    },
    PaginatedResponse,
};

/// Free-text shipment columns accepted from update forms
const TEXT_FIELDS: &[&str] = &[
    "pickup_location",
    "delivery_location",
    "chassis_location",
    "return_location",
    "return_time",
    "pickup_time",
    "vessel_eta",
    "last_free_day",
    "discharged_date",
    "outgate_date",
    "ingate_date",
    "empty_date",
    "return_day",
    "master_bill_of_landing",
    "house_bill_of_landing",
    "seal_number",
    "reference_number",
    "vessel_name",
    "voyage",
    "shipment_number",
    "pickup_number",
    "appointment_number",
    "return_number",
    "reservation_number",
    "delivery_date",
    "delivery_from",
    "delivery_to",
    "commodity",
    "freight_description",
];

const FLAG_FIELDS: &[&str] = &[
    "delivery_order",
    "bill_of_landing",
    "freight_hold",
    "customs_hold",
    "carrier_hold",
];

const COUNT_FIELDS: &[&str] = &["piece_count", "weight_lbs", "weight_kgs", "pallet_count"];

const CONTAINER_TEXT_FIELDS: &[&str] = &[
    "size",
    "type",
    "owner",
    "chassis_number",
    "chassis_size",
    "chassis_type",
    "genset_number",
    "temperature",
    "scac",
];

const CONTAINER_FLAG_FIELDS: &[&str] = &["hazmat", "overweight", "overheight", "hot", "genset", "liquor"];

fn text_slot<'a>(active: &'a mut shipment::ActiveModel, field: &str) -> Option<&'a mut ActiveValue<Option<String>>> {
    Some(match field {
        "pickup_location" => &mut active.pickup_location,
        "delivery_location" => &mut active.delivery_location,
        "chassis_location" => &mut active.chassis_location,
        "return_location" => &mut active.return_location,
        "return_time" => &mut active.return_time,
        "pickup_time" => &mut active.pickup_time,
        "vessel_eta" => &mut active.vessel_eta,
        "last_free_day" => &mut active.last_free_day,
        "discharged_date" => &mut active.discharged_date,
        "outgate_date" => &mut active.outgate_date,
        "ingate_date" => &mut active.ingate_date,
        "empty_date" => &mut active.empty_date,
        "return_day" => &mut active.return_day,
        "master_bill_of_landing" => &mut active.master_bill_of_landing,
        "house_bill_of_landing" => &mut active.house_bill_of_landing,
        "seal_number" => &mut active.seal_number,
        "reference_number" => &mut active.reference_number,
        "vessel_name" => &mut active.vessel_name,
        "voyage" => &mut active.voyage,
        "shipment_number" => &mut active.shipment_number,
        "pickup_number" => &mut active.pickup_number,
        "appointment_number" => &mut active.appointment_number,
        "return_number" => &mut active.return_number,
        "reservation_number" => &mut active.reservation_number,
        "delivery_date" => &mut active.delivery_date,
        "delivery_from" => &mut active.delivery_from,
        "delivery_to" => &mut active.delivery_to,
        "commodity" => &mut active.commodity,
        "freight_description" => &mut active.freight_description,
        _ => return None,
    })
}

fn flag_slot<'a>(active: &'a mut shipment::ActiveModel, field: &str) -> Option<&'a mut ActiveValue<bool>> {
    Some(match field {
        "delivery_order" => &mut active.delivery_order,
        "bill_of_landing" => &mut active.bill_of_landing,
        "freight_hold" => &mut active.freight_hold,
        "customs_hold" => &mut active.customs_hold,
        "carrier_hold" => &mut active.carrier_hold,
        _ => return None,
    })
}

fn count_slot<'a>(active: &'a mut shipment::ActiveModel, field: &str) -> Option<&'a mut ActiveValue<Option<i32>>> {
    Some(match field {
        "piece_count" => &mut active.piece_count,
        "weight_lbs" => &mut active.weight_lbs,
        "weight_kgs" => &mut active.weight_kgs,
        "pallet_count" => &mut active.pallet_count,
        _ => return None,
    })
}

fn container_text_slot<'a>(
    active: &'a mut container::ActiveModel,
    field: &str,
) -> Option<&'a mut ActiveValue<Option<String>>> {
    Some(match field {
        "size" => &mut active.size,
        "type" => &mut active.container_type,
        "owner" => &mut active.owner,
        "chassis_number" => &mut active.chassis_number,
        "chassis_size" => &mut active.chassis_size,
        "chassis_type" => &mut active.chassis_type,
        "genset_number" => &mut active.genset_number,
        "temperature" => &mut active.temperature,
        "scac" => &mut active.scac,
        _ => return None,
    })
}

fn container_flag_slot<'a>(active: &'a mut container::ActiveModel, field: &str) -> Option<&'a mut ActiveValue<bool>> {
    Some(match field {
        "hazmat" => &mut active.hazmat,
        "overweight" => &mut active.overweight,
        "overheight" => &mut active.overheight,
        "hot" => &mut active.hot,
        "genset" => &mut active.genset,
        "liquor" => &mut active.liquor,
        _ => return None,
    })
}

fn not_updated() -> ServiceError {
    ServiceError::bad_request("Shipment not Updated")
}

fn shipment_missing() -> ServiceError {
    ServiceError::not_found("Shipment Does not exist")
}

fn parse_flag(raw: &str) -> Result<bool, ServiceError> {
    parse_bool(raw).ok_or_else(not_updated)
}

fn parse_count(raw: Option<&str>) -> Result<Option<i32>, ServiceError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse::<i32>().map(Some).map_err(|_| not_updated()),
    }
}

fn parse_reference(raw: Option<&str>) -> Result<Option<Uuid>, ServiceError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => Uuid::parse_str(v).map(Some).map_err(|_| not_updated()),
    }
}

fn parse_assigned_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), ASSIGNED_DATE_FORMAT).map_err(|_| not_updated())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShipmentListQuery {
    /// 1-based page number
    pub page: Option<String>,
    /// today, tomorrow, this_week, past_day, past_week, past_month, past_6_months or past_year
    pub timeframe: Option<String>,
    /// Case-insensitive container number fragment
    pub search: Option<String>,
    /// Comma separated status names such as `PICKED_UP,CONTAINER_QUEUED`
    pub status: Option<String>,
}

/// One container of an add-containers request
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ContainerInput {
    #[validate(length(min = 1, message = "Container number is required."))]
    pub container_number: String,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub container_type: Option<String>,
    pub owner: Option<String>,
    pub chassis_number: Option<String>,
    pub chassis_size: Option<String>,
    pub chassis_type: Option<String>,
    pub genset_number: Option<String>,
    pub temperature: Option<String>,
    pub scac: Option<String>,
    #[serde(default)]
    pub hazmat: bool,
    #[serde(default)]
    pub overweight: bool,
    #[serde(default)]
    pub overheight: bool,
    #[serde(default)]
    pub hot: bool,
    #[serde(default)]
    pub genset: bool,
    #[serde(default)]
    pub liquor: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddContainersRequest {
    #[serde(default)]
    pub containers: Vec<ContainerInput>,
}

/// Shipments created by one add-containers call
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddedShipment {
    pub shipment_id: Uuid,
    pub container_id: Uuid,
    pub container_number: String,
}

#[derive(Clone)]
pub struct ShipmentService {
    db: Arc<DbPool>,
    storage: StorageService,
    notifications: Arc<NotificationService>,
}

impl ShipmentService {
    pub fn new(db: Arc<DbPool>, storage: StorageService, notifications: Arc<NotificationService>) -> Self {
        Self {
            db,
            storage,
            notifications,
        }
    }

    async fn find_live(&self, id: Uuid) -> Result<shipment::Model, ServiceError> {
        shipment::Entity::find_by_id(id)
            .filter(shipment::Column::IsDeleted.eq(false))
            .one(&*self.db)
            .await?
            .ok_or_else(shipment_missing)
    }

    async fn record(&self, shipment: shipment::Model) -> Result<ShipmentRecord, ServiceError> {
        load_shipment_record(&*self.db, shipment)
            .await?
            .ok_or_else(shipment_missing)
    }

    /// Shipments visible to the caller, filtered and paginated
    #[instrument(skip(self, caller, query), fields(user_id = %caller.user_id))]
    pub async fn list(
        &self,
        caller: &AuthUser,
        query: ShipmentListQuery,
        mobile: bool,
    ) -> Result<PaginatedResponse<AnyShipmentView>, ServiceError> {
        let db = &*self.db;
        let page = page_number(query.page.as_deref());
        let empty = || Ok(PaginatedResponse::new(Vec::new(), 0, page, PAGE_SIZE));

        let mut select = shipment::Entity::find().filter(shipment::Column::IsDeleted.eq(false));
        select = match caller.user_type {
            UserType::Driver => {
                let profile = driver::Entity::find()
                    .filter(driver::Column::UserId.eq(caller.user_id))
                    .one(db)
                    .await?;
                match profile {
                    Some(p) => select.filter(shipment::Column::DriverId.eq(p.id)),
                    None => return empty(),
                }
            }
            UserType::Warehouse => {
                let profile = warehouse_user::Entity::find()
                    .filter(warehouse_user::Column::UserId.eq(caller.user_id))
                    .one(db)
                    .await?;
                match profile {
                    Some(p) => select.filter(shipment::Column::WarehouseId.eq(p.id)),
                    None => return empty(),
                }
            }
            UserType::Backoffice => select.filter(shipment::Column::CreatedBy.eq(caller.user_id)),
        };

        if let Some((start, end)) = query
            .timeframe
            .as_deref()
            .and_then(|t| timeframe_range(t.trim(), Utc::now().date_naive()))
        {
            select = select.filter(shipment::Column::AssignedDate.between(start, end));
        }

        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            let container_ids = container::Entity::find()
                .filter(Expr::expr(Func::lower(Expr::col(container::Column::ContainerNumber))).like(pattern))
                .all(db)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect::<Vec<_>>();
            if container_ids.is_empty() {
                return empty();
            }
            select = select.filter(shipment::Column::ContainerId.is_in(container_ids));
        }

        let statuses = match query.status.as_deref() {
            Some(raw) => parse_status_filter(raw)?,
            None => Vec::new(),
        };
        select = select.order_by_desc(shipment::Column::UpdatedAt);

        let (rows, total) = if statuses.is_empty() {
            let paginator = select.paginate(db, PAGE_SIZE);
            let total = paginator.num_items().await?;
            (paginator.fetch_page(page - 1).await?, total)
        } else {
            // Requested status order first, recency second
            let mut rows = select
                .filter(shipment::Column::Status.is_in(statuses.clone()))
                .all(db)
                .await?;
            rows.sort_by_key(|s| statuses.iter().position(|st| *st == s.status));
            let total = rows.len() as u64;
            let start = ((page - 1) * PAGE_SIZE) as usize;
            let rows = rows.into_iter().skip(start).take(PAGE_SIZE as usize).collect();
            (rows, total)
        };

        let items = load_shipment_records(db, rows)
            .await?
            .iter()
            .map(|record| AnyShipmentView::render(record, &self.storage, mobile))
            .collect();

        info!(total, page, "Listed shipments");
        Ok(PaginatedResponse::new(items, total, page, PAGE_SIZE))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid, mobile: bool) -> Result<AnyShipmentView, ServiceError> {
        let record = self.record(self.find_live(id).await?).await?;
        Ok(AnyShipmentView::render(&record, &self.storage, mobile))
    }

    /// Marks the shipment deleted; it disappears from every list
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find_live(id).await?;
        let mut active: shipment::ActiveModel = existing.into();
        active.is_deleted = Set(true);
        active.update(&*self.db).await?;
        info!(shipment_id = %id, "Shipment soft deleted");
        Ok(())
    }

    /// Applies an update form and runs the status transition rules
    #[instrument(skip(self, caller, form), fields(user_id = %caller.user_id))]
    pub async fn update(
        &self,
        caller: &AuthUser,
        id: Uuid,
        form: FormData,
        mobile: bool,
    ) -> Result<AnyShipmentView, ServiceError> {
        let db = &*self.db;
        let current = self.find_live(id).await?;
        let current_container = container::Entity::find_by_id(current.container_id)
            .one(db)
            .await?
            .ok_or_else(shipment_missing)?;

        let mut active: shipment::ActiveModel = current.clone().into();
        let mut container_active: container::ActiveModel = current_container.clone().into();
        let mut container_changed = false;

        // Container fields
        if let Some(number) = form.non_empty("container[container_number]") {
            container_active.container_number = Set(number.to_string());
            container_changed = true;
        }
        for field in CONTAINER_TEXT_FIELDS {
            let key = format!("container[{}]", field);
            if form.contains(&key) {
                if let Some(slot) = container_text_slot(&mut container_active, field) {
                    *slot = Set(form.value(&key).map(str::to_string));
                    container_changed = true;
                }
            }
        }
        for field in CONTAINER_FLAG_FIELDS {
            let key = format!("container[{}]", field);
            if let Some(raw) = form.value(&key) {
                let flag = parse_flag(raw)?;
                if let Some(slot) = container_flag_slot(&mut container_active, field) {
                    *slot = Set(flag);
                    container_changed = true;
                }
            }
        }

        // References
        let driver_id = match form.contains("driver") {
            true => Some(parse_reference(form.value("driver"))?),
            false => None,
        };
        let warehouse_id = match form.contains("warehouse") {
            true => Some(parse_reference(form.value("warehouse"))?),
            false => None,
        };
        let customer_id = match form.contains("customer") {
            true => Some(parse_reference(form.value("customer"))?),
            false => None,
        };
        if let Some(Some(id)) = driver_id {
            driver::Entity::find_by_id(id).one(db).await?.ok_or_else(not_updated)?;
        }
        if let Some(Some(id)) = warehouse_id {
            warehouse_user::Entity::find_by_id(id).one(db).await?.ok_or_else(not_updated)?;
        }
        if let Some(Some(id)) = customer_id {
            associate_company::Entity::find_by_id(id).one(db).await?.ok_or_else(not_updated)?;
        }

        let mut new_status = None;
        if let Some(Some(id)) = driver_id {
            if current.driver_id != Some(id) {
                new_status = Some(ShipmentStatus::Assigned);
            }
        }

        let assigned_date = match form.value("assigned_date").map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => Some(parse_assigned_date(raw)?),
            None => None,
        };
        if assigned_date.is_none() && current.assigned_date.is_none() {
            return Err(ServiceError::bad_request("Assign Date Required"));
        }

        let now = Utc::now();
        let mut accepted = false;
        if let Some(raw) = form.value("status") {
            let status = ShipmentStatus::from_label(raw.trim()).ok_or_else(not_updated)?;
            match status {
                ShipmentStatus::PickedUp => {
                    // The warehouse must already be on the shipment
                    if current.warehouse_id.is_none() {
                        return Err(ServiceError::bad_request(
                            "Warehouse is not assigned to this shipment",
                        ));
                    }
                    active.pickedup_date = Set(Some(now));
                }
                ShipmentStatus::Accepted => {
                    active.warehouse_accepted_date = Set(Some(now));
                    accepted = true;
                }
                ShipmentStatus::Delivered => {
                    active.driver_delivered_date = Set(Some(now));
                }
                ShipmentStatus::ReturnedEmpty => {
                    if current.status != ShipmentStatus::Accepted {
                        return Err(ServiceError::bad_request("Shipment is not accepted"));
                    }
                }
                ShipmentStatus::Queued | ShipmentStatus::Assigned => {}
            }
            new_status = Some(status);
        }

        for field in TEXT_FIELDS {
            if form.contains(field) {
                if let Some(slot) = text_slot(&mut active, field) {
                    *slot = Set(form.value(field).map(str::to_string));
                }
            }
        }
        for field in FLAG_FIELDS {
            if let Some(raw) = form.value(field) {
                let flag = parse_flag(raw)?;
                if let Some(slot) = flag_slot(&mut active, field) {
                    *slot = Set(flag);
                }
            }
        }
        for field in COUNT_FIELDS {
            if form.contains(field) {
                let count = parse_count(form.value(field))?;
                if let Some(slot) = count_slot(&mut active, field) {
                    *slot = Set(count);
                }
            }
        }

        // Everything parsed; uploads and writes follow
        let mut uploaded = Vec::new();
        for (field, folder) in [
            ("delivery_order_file", DELIVERY_ORDERS),
            ("bill_of_landing_file", BILLS_OF_LANDING),
        ] {
            if let Some(file) = form.file(field) {
                let name = self
                    .storage
                    .store(folder, &file.file_name, file.bytes.clone(), file.content_type.as_deref())
                    .await?;
                uploaded.push(name.clone());
                match field {
                    "delivery_order_file" => active.delivery_order_file = Set(Some(name)),
                    _ => active.bill_of_landing_file = Set(Some(name)),
                }
            }
        }

        if let Some(date) = assigned_date {
            active.assigned_date = Set(Some(date));
        }
        if let Some(driver) = driver_id {
            active.driver_id = Set(driver);
        }
        if let Some(warehouse) = warehouse_id {
            active.warehouse_id = Set(warehouse);
        }
        if let Some(customer) = customer_id {
            active.customer_id = Set(customer);
        }
        if let Some(status) = new_status {
            active.status = Set(status);
        }

        let written = db::transaction(db, "update_shipment", move |txn| {
            Box::pin(async move {
                if container_changed {
                    container_active.update(txn).await?;
                }
                Ok(active.update(txn).await?)
            })
        })
        .await;
        let updated = match written {
            Ok(updated) => updated,
            Err(e) => {
                for name in &uploaded {
                    if let Err(cleanup) = self.storage.remove(name).await {
                        warn!(object = %name, error = %cleanup, "Could not remove orphaned upload");
                    }
                }
                return Err(e);
            }
        };

        // The update is committed; a failed PDF does not undo it
        let updated = if accepted {
            match self.attach_proof_of_delivery(updated.clone()).await {
                Ok(with_pdf) => with_pdf,
                Err(e) => {
                    warn!(shipment_id = %id, error = %e, "Proof of delivery not stored");
                    updated
                }
            }
        } else {
            updated
        };
        let record = self.record(updated).await?;

        if let Some(status) = new_status {
            metrics::counter!("backoffice_shipments.status_changed", 1, "status" => status.label());
            info!(
                shipment_id = %id,
                from = %current.status,
                to = %status,
                "Shipment status changed"
            );
        }
        self.notify_parties(caller, &record, record.shipment.status).await;

        Ok(AnyShipmentView::render(&record, &self.storage, mobile))
    }

    /// Renders the delivery PDF and links it to the shipment
    async fn attach_proof_of_delivery(&self, shipment: shipment::Model) -> Result<shipment::Model, ServiceError> {
        let record = self.record(shipment.clone()).await?;
        let name = proof_of_delivery_name(shipment.id);
        self.storage
            .store_as(&name, render_shipment_details(&record), Some("application/pdf"))
            .await?;

        let mut active: shipment::ActiveModel = shipment.into();
        active.proof_of_delivery_file = Set(Some(name));
        Ok(active.update(&*self.db).await?)
    }

    /// Tells the other parties about an update, naming the current status; failures are logged
    async fn notify_parties(&self, caller: &AuthUser, record: &ShipmentRecord, status: ShipmentStatus) {
        let driver_user = record.driver.as_ref().map(|d| d.user.id);
        let warehouse_user = record.warehouse.as_ref().map(|w| w.user.id);
        let creator = record.shipment.created_by;

        let candidates = match caller.user_type {
            UserType::Driver => [warehouse_user, creator],
            UserType::Warehouse => [driver_user, creator],
            UserType::Backoffice => [warehouse_user, driver_user],
        };
        let mut recipients: Vec<Uuid> = Vec::new();
        for id in candidates.into_iter().flatten() {
            if !recipients.contains(&id) {
                recipients.push(id);
            }
        }

        let number = &record.container.container_number;
        let message = format!("Container {} has been {}.", number, status.label());
        for recipient in recipients {
            if let Err(e) = self
                .notifications
                .create_and_send_notification(
                    recipient,
                    number,
                    &message,
                    Some(status.label()),
                    Some(record.shipment.id),
                )
                .await
            {
                warn!(recipient_id = %recipient, error = %e, "Shipment notification failed");
            }
        }
    }

    /// Creates one queued shipment per container, all or nothing
    #[instrument(skip(self, caller, request), fields(user_id = %caller.user_id))]
    pub async fn add_containers(
        &self,
        caller: &AuthUser,
        request: AddContainersRequest,
    ) -> Result<Vec<AddedShipment>, ServiceError> {
        if request.containers.is_empty() || request.containers.len() > 2 {
            return Err(ServiceError::bad_request(
                "Invalid data. Provide a list of up to 2 containers.",
            ));
        }
        for input in &request.containers {
            input.validate()?;
        }

        let created_by = caller.user_id;
        let containers = request.containers;
        let added = db::transaction(&self.db, "add_containers", move |txn| {
            Box::pin(async move {
                let mut added = Vec::with_capacity(containers.len());
                for input in containers {
                    let now = Utc::now();
                    let saved = container::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        container_number: Set(input.container_number),
                        size: Set(input.size),
                        container_type: Set(input.container_type),
                        owner: Set(input.owner),
                        chassis_number: Set(input.chassis_number),
                        chassis_size: Set(input.chassis_size),
                        chassis_type: Set(input.chassis_type),
                        genset_number: Set(input.genset_number),
                        temperature: Set(input.temperature),
                        scac: Set(input.scac),
                        hazmat: Set(input.hazmat),
                        overweight: Set(input.overweight),
                        overheight: Set(input.overheight),
                        hot: Set(input.hot),
                        genset: Set(input.genset),
                        liquor: Set(input.liquor),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    let shipment = queued_shipment(saved.id, Some(created_by)).insert(txn).await?;
                    added.push(AddedShipment {
                        shipment_id: shipment.id,
                        container_id: saved.id,
                        container_number: saved.container_number,
                    });
                }
                Ok(added)
            })
        })
        .await?;

        metrics::counter!("backoffice_shipments.created", added.len() as u64);
        info!(count = added.len(), "Containers and shipments created");
        Ok(added)
    }

}

/// A fresh `Queued` shipment for `container_id`
pub(crate) fn queued_shipment(container_id: Uuid, created_by: Option<Uuid>) -> shipment::ActiveModel {
    let now = Utc::now();
    shipment::ActiveModel {
        id: Set(Uuid::new_v4()),
        container_id: Set(container_id),
        customer_id: Set(None),
        driver_id: Set(None),
        warehouse_id: Set(None),
        status: Set(ShipmentStatus::Queued),
        assigned_date: Set(None),
        warehouse_accepted_date: Set(None),
        driver_delivered_date: Set(None),
        pickedup_date: Set(None),
        pickup_location: Set(None),
        delivery_location: Set(None),
        chassis_location: Set(None),
        return_location: Set(None),
        return_time: Set(None),
        pickup_time: Set(None),
        vessel_eta: Set(None),
        last_free_day: Set(None),
        discharged_date: Set(None),
        outgate_date: Set(None),
        ingate_date: Set(None),
        empty_date: Set(None),
        return_day: Set(None),
        master_bill_of_landing: Set(None),
        house_bill_of_landing: Set(None),
        seal_number: Set(None),
        reference_number: Set(None),
        vessel_name: Set(None),
        voyage: Set(None),
        shipment_number: Set(None),
        pickup_number: Set(None),
        appointment_number: Set(None),
        return_number: Set(None),
        reservation_number: Set(None),
        delivery_date: Set(None),
        delivery_from: Set(None),
        delivery_to: Set(None),
        delivery_order: Set(false),
        delivery_order_file: Set(None),
        bill_of_landing: Set(false),
        bill_of_landing_file: Set(None),
        proof_of_delivery_file: Set(None),
        freight_hold: Set(false),
        customs_hold: Set(false),
        carrier_hold: Set(false),
        commodity: Set(None),
        piece_count: Set(None),
        weight_lbs: Set(None),
        weight_kgs: Set(None),
        pallet_count: Set(None),
        freight_description: Set(None),
        is_deleted: Set(false),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profiles::{ensure_driver, ensure_warehouse};
    use crate::services::form::UploadedFile;
    use crate::services::push::RecordingPushSender;
    use crate::services::storage::{MemoryStorage, ObjectStorage, PROOF_OF_DELIVERY};
    use bytes::Bytes;
    use crate::services::test_support::{insert_user, memory_db, memory_storage};
    use crate::services::views::ShipmentView;
    use assert_matches::assert_matches;
    use sea_orm::ConnectionTrait;

    struct Fixture {
        db: Arc<DbPool>,
        storage: StorageService,
        shipments: ShipmentService,
        notifications: Arc<NotificationService>,
        backoffice: AuthUser,
        driver: AuthUser,
        warehouse: AuthUser,
        driver_profile: Uuid,
        warehouse_profile: Uuid,
    }

    fn caller(user_id: Uuid, user_type: UserType) -> AuthUser {
        AuthUser {
            user_id,
            email: None,
            user_type,
            token_id: Uuid::new_v4(),
        }
    }

    async fn fixture() -> Fixture {
        let db = memory_db().await;
        let storage = memory_storage();
        let notifications = Arc::new(NotificationService::new(
            db.clone(),
            Arc::new(RecordingPushSender::new()),
        ));
        let shipments = ShipmentService::new(db.clone(), storage.clone(), notifications.clone());

        let ops = insert_user(&db, "ops@harbor.example", UserType::Backoffice).await;
        let dana = insert_user(&db, "dana@haul.example", UserType::Driver).await;
        let wren = insert_user(&db, "wren@depot.example", UserType::Warehouse).await;
        let driver_profile = ensure_driver(&*db, dana.id).await.unwrap().id;
        let warehouse_profile = ensure_warehouse(&*db, wren.id).await.unwrap().id;

        Fixture {
            db,
            storage,
            shipments,
            notifications,
            backoffice: caller(ops.id, UserType::Backoffice),
            driver: caller(dana.id, UserType::Driver),
            warehouse: caller(wren.id, UserType::Warehouse),
            driver_profile,
            warehouse_profile,
        }
    }

    fn containers(numbers: &[&str]) -> AddContainersRequest {
        AddContainersRequest {
            containers: numbers
                .iter()
                .map(|n| ContainerInput {
                    container_number: n.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    async fn add_one(f: &Fixture, number: &str) -> Uuid {
        f.shipments
            .add_containers(&f.backoffice, containers(&[number]))
            .await
            .unwrap()[0]
            .shipment_id
    }

    fn form(pairs: &[(&str, &str)]) -> FormData {
        let mut form = FormData::new();
        for (k, v) in pairs {
            form.insert(*k, *v);
        }
        form
    }

    fn web(view: AnyShipmentView) -> ShipmentView {
        match view {
            AnyShipmentView::Web(view) => *view,
            AnyShipmentView::Mobile(_) => panic!("expected web view"),
        }
    }

    #[tokio::test]
    async fn add_containers_checks_batch_size() {
        let f = fixture().await;
        for numbers in [&[][..], &["A", "B", "C"][..]] {
            let err = f
                .shipments
                .add_containers(&f.backoffice, containers(numbers))
                .await
                .unwrap_err();
            assert_eq!(
                err.response_message(),
                "Invalid data. Provide a list of up to 2 containers."
            );
        }

        let added = f
            .shipments
            .add_containers(&f.backoffice, containers(&["MSCU1111111", "MSCU2222222"]))
            .await
            .unwrap();
        assert_eq!(added.len(), 2);
        let view = web(f.shipments.get(added[0].shipment_id, false).await.unwrap());
        assert_eq!(view.status, ShipmentStatus::Queued);
        assert_eq!(view.created_by, Some(f.backoffice.user_id));
    }

    #[tokio::test]
    async fn failed_batch_leaves_nothing_behind() {
        let f = fixture().await;
        f.db.execute_unprepared(
            "CREATE TRIGGER reject_container BEFORE INSERT ON containers \
             WHEN NEW.container_number = 'BOOM' \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .await
        .unwrap();

        let result = f
            .shipments
            .add_containers(&f.backoffice, containers(&["MSCU1111111", "BOOM"]))
            .await;
        assert_matches!(result, Err(ServiceError::DatabaseError(_)));
        assert_eq!(container::Entity::find().count(&*f.db).await.unwrap(), 0);
        assert_eq!(shipment::Entity::find().count(&*f.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn assigning_a_driver_requires_a_date_and_sets_assigned() {
        let f = fixture().await;
        let id = add_one(&f, "MSCU1234567").await;
        let driver = f.driver_profile.to_string();

        let err = f
            .shipments
            .update(&f.backoffice, id, form(&[("driver", &driver)]), false)
            .await
            .unwrap_err();
        assert_eq!(err.response_message(), "Assign Date Required");

        let err = f
            .shipments
            .update(&f.backoffice, id, form(&[("driver", &driver), ("assigned_date", "13-03-2024")]), false)
            .await
            .unwrap_err();
        assert_eq!(err.response_message(), "Shipment not Updated");

        let view = web(
            f.shipments
                .update(&f.backoffice, id, form(&[("driver", &driver), ("assigned_date", "2024/03/13")]), false)
                .await
                .unwrap(),
        );
        assert_eq!(view.status, ShipmentStatus::Assigned);
        assert_eq!(view.assigned_date.as_deref(), Some("2024/03/13"));

        // Backoffice changes notify the driver
        let inbox = f.notifications.list(f.driver.user_id, None).await.unwrap();
        assert_eq!(inbox.notifications.len(), 1);
        assert_eq!(inbox.notifications[0].title, "MSCU1234567");
        assert_eq!(inbox.notifications[0].message, "Container MSCU1234567 has been Assigned.");
    }

    #[tokio::test]
    async fn full_workflow_produces_proof_of_delivery() {
        let f = fixture().await;
        let id = add_one(&f, "MSCU7654321").await;
        let driver = f.driver_profile.to_string();
        let warehouse = f.warehouse_profile.to_string();

        f.shipments
            .update(&f.backoffice, id, form(&[("driver", &driver), ("assigned_date", "2024/03/13")]), false)
            .await
            .unwrap();

        let err = f
            .shipments
            .update(&f.driver, id, form(&[("status", "Picked Up")]), true)
            .await
            .unwrap_err();
        assert_eq!(err.response_message(), "Warehouse is not assigned to this shipment");

        let err = f
            .shipments
            .update(&f.driver, id, form(&[("status", "Returned Empty")]), true)
            .await
            .unwrap_err();
        assert_eq!(err.response_message(), "Shipment is not accepted");

        f.shipments
            .update(&f.backoffice, id, form(&[("warehouse", &warehouse)]), false)
            .await
            .unwrap();
        let picked = f
            .shipments
            .update(&f.driver, id, form(&[("status", "Picked Up")]), true)
            .await
            .unwrap();
        assert_matches!(picked, AnyShipmentView::Mobile(_));

        f.shipments
            .update(&f.driver, id, form(&[("status", "Delivered")]), true)
            .await
            .unwrap();
        let accepted = web(
            f.shipments
                .update(&f.warehouse, id, form(&[("status", "Accepted")]), false)
                .await
                .unwrap(),
        );
        assert!(accepted.warehouse_accepted_date.is_some());
        assert!(accepted.driver_delivered_date.is_some());
        assert!(accepted.proof_of_delivery_file.is_some());

        let pdf = f
            .storage
            .read(&proof_of_delivery_name(id))
            .await
            .unwrap()
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-"));

        let returned = web(
            f.shipments
                .update(&f.backoffice, id, form(&[("status", "Returned Empty")]), false)
                .await
                .unwrap(),
        );
        assert_eq!(returned.status, ShipmentStatus::ReturnedEmpty);

        // Driver and warehouse updates reach the creator; backoffice updates do not
        let creator_inbox = f.notifications.list(f.backoffice.user_id, None).await.unwrap();
        assert_eq!(creator_inbox.notifications.len(), 3);
    }

    #[tokio::test]
    async fn pickup_needs_a_warehouse_already_on_the_shipment() {
        let f = fixture().await;
        let id = add_one(&f, "MSCU3333333").await;
        let driver = f.driver_profile.to_string();
        let warehouse = f.warehouse_profile.to_string();
        f.shipments
            .update(&f.backoffice, id, form(&[("driver", &driver), ("assigned_date", "2024/03/13")]), false)
            .await
            .unwrap();

        let err = f
            .shipments
            .update(&f.driver, id, form(&[("status", "Picked Up"), ("warehouse", &warehouse)]), true)
            .await
            .unwrap_err();
        assert_eq!(err.response_message(), "Warehouse is not assigned to this shipment");

        let view = web(f.shipments.get(id, false).await.unwrap());
        assert_eq!(view.status, ShipmentStatus::Assigned);
        assert!(view.warehouse.is_none());
    }

    #[tokio::test]
    async fn field_edits_notify_with_the_current_status() {
        let f = fixture().await;
        let id = add_one(&f, "MSCU4444444").await;
        let driver = f.driver_profile.to_string();
        f.shipments
            .update(&f.backoffice, id, form(&[("driver", &driver), ("assigned_date", "2024/03/13")]), false)
            .await
            .unwrap();
        let before = f.notifications.list(f.backoffice.user_id, None).await.unwrap();
        assert!(before.notifications.is_empty());

        f.shipments
            .update(&f.driver, id, form(&[("pickup_location", "Pier 9")]), true)
            .await
            .unwrap();

        let inbox = f.notifications.list(f.backoffice.user_id, None).await.unwrap();
        assert_eq!(inbox.notifications.len(), 1);
        assert_eq!(inbox.notifications[0].message, "Container MSCU4444444 has been Assigned.");
        assert_eq!(inbox.notifications[0].notification_type.as_deref(), Some("Assigned"));
    }

    /// Memory store that refuses keys under one folder
    struct RejectingStorage {
        inner: MemoryStorage,
        folder: &'static str,
    }

    #[async_trait::async_trait]
    impl ObjectStorage for RejectingStorage {
        async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<(), ServiceError> {
            if key.contains(self.folder) {
                return Err(ServiceError::StorageError("bucket unavailable".into()));
            }
            self.inner.put(key, body, content_type).await
        }

        fn signed_url(&self, key: &str, expires: std::time::Duration) -> Result<String, ServiceError> {
            self.inner.signed_url(key, expires)
        }

        async fn get(&self, key: &str) -> Result<Option<Bytes>, ServiceError> {
            self.inner.get(key).await
        }

        async fn delete(&self, key: &str) -> Result<(), ServiceError> {
            self.inner.delete(key).await
        }
    }

    fn service_over(f: &Fixture, backend: Arc<dyn ObjectStorage>) -> ShipmentService {
        ShipmentService::new(
            f.db.clone(),
            StorageService::new(backend, "media/", std::time::Duration::from_secs(3600)),
            f.notifications.clone(),
        )
    }

    #[tokio::test]
    async fn acceptance_survives_a_failed_pdf_upload() {
        let f = fixture().await;
        let shipments = service_over(
            &f,
            Arc::new(RejectingStorage {
                inner: MemoryStorage::new(),
                folder: PROOF_OF_DELIVERY,
            }),
        );
        let id = add_one(&f, "MSCU6666666").await;
        let warehouse = f.warehouse_profile.to_string();
        shipments
            .update(&f.backoffice, id, form(&[("warehouse", &warehouse), ("assigned_date", "2024/03/13")]), false)
            .await
            .unwrap();

        let accepted = web(
            shipments
                .update(&f.warehouse, id, form(&[("status", "Accepted")]), false)
                .await
                .unwrap(),
        );
        assert_eq!(accepted.status, ShipmentStatus::Accepted);
        assert!(accepted.proof_of_delivery_file.is_none());
    }

    #[tokio::test]
    async fn failed_write_removes_uploaded_documents() {
        let f = fixture().await;
        let backend = Arc::new(MemoryStorage::new());
        let shipments = service_over(&f, backend.clone());
        let id = add_one(&f, "MSCU7777777").await;
        f.db.execute_unprepared(
            "CREATE TRIGGER reject_shipment_update BEFORE UPDATE ON shipments \
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .await
        .unwrap();

        let mut input = form(&[("assigned_date", "2024/03/13")]);
        input.insert_file(UploadedFile {
            field: "delivery_order_file".into(),
            file_name: "order.pdf".into(),
            content_type: Some("application/pdf".into()),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        });
        let result = shipments.update(&f.backoffice, id, input, false).await;
        assert_matches!(result, Err(ServiceError::DatabaseError(_)));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn update_rejects_bad_values_without_writing() {
        let f = fixture().await;
        let id = add_one(&f, "MSCU0000001").await;

        for bad in [
            form(&[("assigned_date", "2024/03/13"), ("status", "Lost")]),
            form(&[("assigned_date", "2024/03/13"), ("piece_count", "many")]),
            form(&[("assigned_date", "2024/03/13"), ("customs_hold", "maybe")]),
            form(&[("assigned_date", "2024/03/13"), ("warehouse", &Uuid::new_v4().to_string())]),
        ] {
            let err = f.shipments.update(&f.backoffice, id, bad, false).await.unwrap_err();
            assert_eq!(err.response_message(), "Shipment not Updated");
        }

        let view = web(f.shipments.get(id, false).await.unwrap());
        assert_eq!(view.assigned_date, None);
        assert_eq!(view.status, ShipmentStatus::Queued);
    }

    #[tokio::test]
    async fn container_fields_and_null_strings() {
        let f = fixture().await;
        let id = add_one(&f, "MSCU0000002").await;

        let view = web(
            f.shipments
                .update(
                    &f.backoffice,
                    id,
                    form(&[
                        ("assigned_date", "2024/03/13"),
                        ("container[size]", "40HC"),
                        ("container[hazmat]", "true"),
                        ("pickup_location", "Pier 9"),
                        ("weight_kgs", "12000"),
                        ("customs_hold", "1"),
                    ]),
                    false,
                )
                .await
                .unwrap(),
        );
        assert_eq!(view.container.size.as_deref(), Some("40HC"));
        assert!(view.container.hazmat);
        assert_eq!(view.pickup_location.as_deref(), Some("Pier 9"));
        assert_eq!(view.weight_kgs, Some(12000));
        assert!(view.customs_hold);

        let view = web(
            f.shipments
                .update(&f.backoffice, id, form(&[("pickup_location", "null"), ("weight_kgs", "null")]), false)
                .await
                .unwrap(),
        );
        assert_eq!(view.pickup_location, None);
        assert_eq!(view.weight_kgs, None);
    }

    #[tokio::test]
    async fn list_is_scoped_filtered_and_ordered() {
        let f = fixture().await;
        let first = add_one(&f, "ABCU1000001").await;
        let second = add_one(&f, "XYZU2000002").await;
        let driver = f.driver_profile.to_string();
        let today = Utc::now().date_naive().format(ASSIGNED_DATE_FORMAT).to_string();

        f.shipments
            .update(&f.backoffice, first, form(&[("driver", &driver), ("assigned_date", &today)]), false)
            .await
            .unwrap();

        let all = f
            .shipments
            .list(&f.backoffice, ShipmentListQuery::default(), false)
            .await
            .unwrap();
        assert_eq!(all.total, 2);

        let mine = f
            .shipments
            .list(&f.driver, ShipmentListQuery::default(), true)
            .await
            .unwrap();
        assert_eq!(mine.total, 1);

        let none = f
            .shipments
            .list(&f.warehouse, ShipmentListQuery::default(), true)
            .await
            .unwrap();
        assert_eq!(none.total, 0);

        let searched = f
            .shipments
            .list(
                &f.backoffice,
                ShipmentListQuery {
                    search: Some("xyzu".into()),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();
        assert_eq!(searched.total, 1);

        let today_only = f
            .shipments
            .list(
                &f.backoffice,
                ShipmentListQuery {
                    timeframe: Some("today".into()),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();
        assert_eq!(today_only.total, 1);

        let ordered = f
            .shipments
            .list(
                &f.backoffice,
                ShipmentListQuery {
                    status: Some("CONTAINER_QUEUED, CONTAINER_ASSIGNED".into()),
                    ..Default::default()
                },
                false,
            )
            .await
            .unwrap();
        let ids: Vec<Uuid> = ordered
            .items
            .into_iter()
            .map(|v| web(v).id)
            .collect();
        assert_eq!(ids, vec![second, first]);

        assert_matches!(
            f.shipments
                .list(
                    &f.backoffice,
                    ShipmentListQuery {
                        status: Some("LOST".into()),
                        ..Default::default()
                    },
                    false,
                )
                .await,
            Err(ServiceError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn soft_deleted_shipments_disappear() {
        let f = fixture().await;
        let id = add_one(&f, "MSCU0000003").await;
        f.shipments.delete(id).await.unwrap();

        assert_matches!(f.shipments.get(id, false).await, Err(ServiceError::NotFound(msg)) if msg == "Shipment Does not exist");
        assert_matches!(f.shipments.delete(id).await, Err(ServiceError::NotFound(_)));
        let row = shipment::Entity::find_by_id(id).one(&*f.db).await.unwrap().unwrap();
        assert!(row.is_deleted);
    }
}
