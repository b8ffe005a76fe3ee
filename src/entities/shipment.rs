use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Workflow state of a shipment.
///
/// The stored value is the display label ("Picked Up"); list filters refer
/// to statuses by their upper-case name (`PICKED_UP`).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ShipmentStatus {
    #[sea_orm(string_value = "Queued")]
    #[serde(rename = "Queued")]
    #[strum(serialize = "Queued")]
    Queued,
    #[sea_orm(string_value = "Assigned")]
    #[serde(rename = "Assigned")]
    #[strum(serialize = "Assigned")]
    Assigned,
    #[sea_orm(string_value = "Picked Up")]
    #[serde(rename = "Picked Up")]
    #[strum(serialize = "Picked Up")]
    PickedUp,
    #[sea_orm(string_value = "Delivered")]
    #[serde(rename = "Delivered")]
    #[strum(serialize = "Delivered")]
    Delivered,
    #[sea_orm(string_value = "Accepted")]
    #[serde(rename = "Accepted")]
    #[strum(serialize = "Accepted")]
    Accepted,
    #[sea_orm(string_value = "Returned Empty")]
    #[serde(rename = "Returned Empty")]
    #[strum(serialize = "Returned Empty")]
    ReturnedEmpty,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 6] = [
        ShipmentStatus::Queued,
        ShipmentStatus::Assigned,
        ShipmentStatus::PickedUp,
        ShipmentStatus::Delivered,
        ShipmentStatus::Accepted,
        ShipmentStatus::ReturnedEmpty,
    ];

    /// Stored label, e.g. "Returned Empty"
    pub fn label(self) -> &'static str {
        match self {
            ShipmentStatus::Queued => "Queued",
            ShipmentStatus::Assigned => "Assigned",
            ShipmentStatus::PickedUp => "Picked Up",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Accepted => "Accepted",
            ShipmentStatus::ReturnedEmpty => "Returned Empty",
        }
    }

    /// Name used by list filters, e.g. "RETURNED_EMPTY"
    pub fn name(self) -> &'static str {
        match self {
            ShipmentStatus::Queued => "CONTAINER_QUEUED",
            ShipmentStatus::Assigned => "CONTAINER_ASSIGNED",
            ShipmentStatus::PickedUp => "PICKED_UP",
            ShipmentStatus::Delivered => "DELIVERED",
            ShipmentStatus::Accepted => "ACCEPTED",
            ShipmentStatus::ReturnedEmpty => "RETURNED_EMPTY",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub container_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub status: ShipmentStatus,
    pub assigned_date: Option<NaiveDate>,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::container::Entity",
        from = "Column::ContainerId",
        to = "super::container::Column::Id",
        on_delete = "Cascade"
    )]
    Container,
    #[sea_orm(
        belongs_to = "super::associate_company::Entity",
        from = "Column::CustomerId",
        to = "super::associate_company::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::driver::Entity",
        from = "Column::DriverId",
        to = "super::driver::Column::Id",
        on_delete = "SetNull"
    )]
    Driver,
    #[sea_orm(
        belongs_to = "super::warehouse_user::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouse_user::Column::Id",
        on_delete = "SetNull"
    )]
    Warehouse,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    CreatedBy,
}

impl Related<super::container::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Container.def()
    }
}

impl Related<super::associate_company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::driver::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl Related<super::warehouse_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouse.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.updated_at = Set(Utc::now());
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_and_labels_resolve() {
        assert_eq!(
            ShipmentStatus::from_name("PICKED_UP"),
            Some(ShipmentStatus::PickedUp)
        );
        assert_eq!(
            ShipmentStatus::from_label("Returned Empty"),
            Some(ShipmentStatus::ReturnedEmpty)
        );
        assert_eq!(ShipmentStatus::from_name("Picked Up"), None);
        assert_eq!(ShipmentStatus::Assigned.to_string(), "Assigned");
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_string(&ShipmentStatus::PickedUp).unwrap();
        assert_eq!(json, "\"Picked Up\"");
    }
}
