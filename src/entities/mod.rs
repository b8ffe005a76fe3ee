pub mod associate_company;
pub mod auth_token;
pub mod backoffice_user;
pub mod company;
pub mod container;
pub mod device;
pub mod driver;
pub mod feedback;
pub mod notification;
pub mod shipment;
pub mod user;
pub mod warehouse_user;

pub use shipment::ShipmentStatus;
pub use user::UserType;
