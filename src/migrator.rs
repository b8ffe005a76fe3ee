use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_companies_table::Migration),
            Box::new(m20240101_000003_create_associate_companies_table::Migration),
            Box::new(m20240101_000004_create_containers_table::Migration),
            Box::new(m20240101_000005_create_profile_tables::Migration),
            Box::new(m20240101_000006_create_shipments_table::Migration),
            Box::new(m20240101_000007_create_notifications_table::Migration),
            Box::new(m20240101_000008_create_devices_table::Migration),
            Box::new(m20240101_000009_create_feedback_table::Migration),
            Box::new(m20240101_000010_create_auth_tokens_table::Migration),
        ]
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    PasswordHash,
    PhoneNumber,
    UserType,
    ProfilePicture,
    IsOnboarded,
    Payload,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Companies {
    Table,
    Id,
    CompanyName,
    CompanyEmail,
    CompanyPhoneNumber,
    Address,
    Country,
    City,
    State,
    ZipCode,
    CompanyBio,
    CompanyPayload,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AssociateCompanies {
    Table,
    Id,
    CompanyId,
    ResponsiblePersonName,
    AssociateCompanyName,
    AssociateCompanyEmail,
    Email,
    Phone,
    Address,
    Country,
    City,
    State,
    ZipCode,
    AssociateCompanyBio,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Containers {
    Table,
    Id,
    ContainerNumber,
    Size,
    ContainerType,
    Owner,
    ChassisNumber,
    ChassisSize,
    ChassisType,
    GensetNumber,
    Temperature,
    Scac,
    Hazmat,
    Overweight,
    Overheight,
    Hot,
    Genset,
    Liquor,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Drivers {
    Table,
    Id,
    UserId,
    CompanyName,
    State,
    EmergencyNumber,
    LicenseNumber,
    RegistrationState,
    TwicNumber,
    DotNumber,
    DgCertification,
    DriverPayload,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BackofficeUsers {
    Table,
    Id,
    UserId,
    CompanyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum WarehouseUsers {
    Table,
    Id,
    UserId,
    CompanyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Shipments {
    Table,
    Id,
    ContainerId,
    CustomerId,
    DriverId,
    WarehouseId,
    Status,
    AssignedDate,
    WarehouseAcceptedDate,
    DriverDeliveredDate,
    PickedupDate,
    PickupLocation,
    DeliveryLocation,
    ChassisLocation,
    ReturnLocation,
    ReturnTime,
    PickupTime,
    VesselEta,
    LastFreeDay,
    DischargedDate,
    OutgateDate,
    IngateDate,
    EmptyDate,
    ReturnDay,
    MasterBillOfLanding,
    HouseBillOfLanding,
    SealNumber,
    ReferenceNumber,
    VesselName,
    Voyage,
    ShipmentNumber,
    PickupNumber,
    AppointmentNumber,
    ReturnNumber,
    ReservationNumber,
    DeliveryDate,
    DeliveryFrom,
    DeliveryTo,
    DeliveryOrder,
    DeliveryOrderFile,
    BillOfLanding,
    BillOfLandingFile,
    ProofOfDeliveryFile,
    FreightHold,
    CustomsHold,
    CarrierHold,
    Commodity,
    PieceCount,
    WeightLbs,
    WeightKgs,
    PalletCount,
    FreightDescription,
    IsDeleted,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    RecipientId,
    Title,
    NotificationType,
    Message,
    Read,
    ShipmentId,
    Data,
    CreatedAt,
}

#[derive(Iden)]
enum Devices {
    Table,
    Id,
    UserId,
    RegistrationId,
    CreatedAt,
}

#[derive(Iden)]
enum Feedback {
    Table,
    Id,
    Subject,
    Message,
    Email,
    CreatedAt,
}

#[derive(Iden)]
enum AuthTokens {
    Table,
    Id,
    UserId,
    CreatedAt,
    ExpiresAt,
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn optional_string(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).string().null().to_owned()
}

fn flag(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .boolean()
        .not_null()
        .default(false)
        .to_owned()
}

mod m20240101_000001_create_users_table {
    use super::{flag, optional_string, timestamp, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Users::FirstName).string().not_null())
                        .col(ColumnDef::new(Users::LastName).string().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(optional_string(Users::PasswordHash))
                        .col(optional_string(Users::PhoneNumber))
                        .col(ColumnDef::new(Users::UserType).string_len(16).not_null())
                        .col(optional_string(Users::ProfilePicture))
                        .col(flag(Users::IsOnboarded))
                        .col(ColumnDef::new(Users::Payload).json().null())
                        .col(timestamp(Users::CreatedAt))
                        .col(timestamp(Users::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000002_create_companies_table {
    use super::{optional_string, timestamp, Companies};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_companies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Companies::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Companies::CompanyName).string().not_null())
                        .col(
                            ColumnDef::new(Companies::CompanyEmail)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(optional_string(Companies::CompanyPhoneNumber))
                        .col(optional_string(Companies::Address))
                        .col(optional_string(Companies::Country))
                        .col(optional_string(Companies::City))
                        .col(optional_string(Companies::State))
                        .col(optional_string(Companies::ZipCode))
                        .col(ColumnDef::new(Companies::CompanyBio).text().null())
                        .col(ColumnDef::new(Companies::CompanyPayload).json().null())
                        .col(timestamp(Companies::CreatedAt))
                        .col(timestamp(Companies::UpdatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000003_create_associate_companies_table {
    use super::{optional_string, timestamp, AssociateCompanies, Companies};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_associate_companies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AssociateCompanies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AssociateCompanies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AssociateCompanies::CompanyId).uuid().not_null())
                        .col(
                            ColumnDef::new(AssociateCompanies::ResponsiblePersonName)
                                .string()
                                .not_null(),
                        )
                        .col(optional_string(AssociateCompanies::AssociateCompanyName))
                        .col(optional_string(AssociateCompanies::AssociateCompanyEmail))
                        .col(ColumnDef::new(AssociateCompanies::Email).string().not_null())
                        .col(ColumnDef::new(AssociateCompanies::Phone).string().not_null())
                        .col(ColumnDef::new(AssociateCompanies::Address).string().not_null())
                        .col(ColumnDef::new(AssociateCompanies::Country).string().not_null())
                        .col(optional_string(AssociateCompanies::City))
                        .col(ColumnDef::new(AssociateCompanies::State).string().not_null())
                        .col(ColumnDef::new(AssociateCompanies::ZipCode).string().not_null())
                        .col(
                            ColumnDef::new(AssociateCompanies::AssociateCompanyBio)
                                .text()
                                .null(),
                        )
                        .col(timestamp(AssociateCompanies::CreatedAt))
                        .col(timestamp(AssociateCompanies::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_associate_companies_company_id")
                                .from(AssociateCompanies::Table, AssociateCompanies::CompanyId)
                                .to(Companies::Table, Companies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_associate_companies_company_id")
                        .table(AssociateCompanies::Table)
                        .col(AssociateCompanies::CompanyId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AssociateCompanies::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000004_create_containers_table {
    use super::{flag, optional_string, timestamp, Containers};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_containers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Containers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Containers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Containers::ContainerNumber).string().not_null())
                        .col(optional_string(Containers::Size))
                        .col(optional_string(Containers::ContainerType))
                        .col(optional_string(Containers::Owner))
                        .col(optional_string(Containers::ChassisNumber))
                        .col(optional_string(Containers::ChassisSize))
                        .col(optional_string(Containers::ChassisType))
                        .col(optional_string(Containers::GensetNumber))
                        .col(optional_string(Containers::Temperature))
                        .col(optional_string(Containers::Scac))
                        .col(flag(Containers::Hazmat))
                        .col(flag(Containers::Overweight))
                        .col(flag(Containers::Overheight))
                        .col(flag(Containers::Hot))
                        .col(flag(Containers::Genset))
                        .col(flag(Containers::Liquor))
                        .col(timestamp(Containers::CreatedAt))
                        .col(timestamp(Containers::UpdatedAt))
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_containers_container_number")
                        .table(Containers::Table)
                        .col(Containers::ContainerNumber)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Containers::Table).to_owned())
                .await
        }
    }
}

/// Driver, backoffice and warehouse profiles
mod m20240101_000005_create_profile_tables {
    use super::{optional_string, timestamp, BackofficeUsers, Companies, Drivers, Users, WarehouseUsers};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_profile_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Drivers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Drivers::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Drivers::UserId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(optional_string(Drivers::CompanyName))
                        .col(optional_string(Drivers::State))
                        .col(optional_string(Drivers::EmergencyNumber))
                        .col(optional_string(Drivers::LicenseNumber))
                        .col(optional_string(Drivers::RegistrationState))
                        .col(optional_string(Drivers::TwicNumber))
                        .col(optional_string(Drivers::DotNumber))
                        .col(optional_string(Drivers::DgCertification))
                        .col(ColumnDef::new(Drivers::DriverPayload).json().null())
                        .col(timestamp(Drivers::CreatedAt))
                        .col(timestamp(Drivers::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_drivers_user_id")
                                .from(Drivers::Table, Drivers::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BackofficeUsers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BackofficeUsers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BackofficeUsers::UserId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(BackofficeUsers::CompanyId).uuid().null())
                        .col(timestamp(BackofficeUsers::CreatedAt))
                        .col(timestamp(BackofficeUsers::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_backoffice_users_user_id")
                                .from(BackofficeUsers::Table, BackofficeUsers::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_backoffice_users_company_id")
                                .from(BackofficeUsers::Table, BackofficeUsers::CompanyId)
                                .to(Companies::Table, Companies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(WarehouseUsers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(WarehouseUsers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(WarehouseUsers::UserId)
                                .uuid()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(WarehouseUsers::CompanyId).uuid().null())
                        .col(timestamp(WarehouseUsers::CreatedAt))
                        .col(timestamp(WarehouseUsers::UpdatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_warehouse_users_user_id")
                                .from(WarehouseUsers::Table, WarehouseUsers::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_warehouse_users_company_id")
                                .from(WarehouseUsers::Table, WarehouseUsers::CompanyId)
                                .to(Companies::Table, Companies::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(WarehouseUsers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BackofficeUsers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Drivers::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000006_create_shipments_table {
    use super::{
        flag, optional_string, timestamp, AssociateCompanies, Containers, Drivers, Shipments,
        Users, WarehouseUsers,
    };
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_shipments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let mut table = Table::create();
            table
                .table(Shipments::Table)
                .if_not_exists()
                .col(ColumnDef::new(Shipments::Id).uuid().primary_key().not_null())
                .col(ColumnDef::new(Shipments::ContainerId).uuid().not_null())
                .col(ColumnDef::new(Shipments::CustomerId).uuid().null())
                .col(ColumnDef::new(Shipments::DriverId).uuid().null())
                .col(ColumnDef::new(Shipments::WarehouseId).uuid().null())
                .col(ColumnDef::new(Shipments::Status).string_len(32).not_null())
                .col(ColumnDef::new(Shipments::AssignedDate).date().null())
                .col(
                    ColumnDef::new(Shipments::WarehouseAcceptedDate)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(Shipments::DriverDeliveredDate)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(Shipments::PickedupDate)
                        .timestamp_with_time_zone()
                        .null(),
                );

            for col in [
                Shipments::PickupLocation,
                Shipments::DeliveryLocation,
                Shipments::ChassisLocation,
                Shipments::ReturnLocation,
                Shipments::ReturnTime,
                Shipments::PickupTime,
                Shipments::VesselEta,
                Shipments::LastFreeDay,
                Shipments::DischargedDate,
                Shipments::OutgateDate,
                Shipments::IngateDate,
                Shipments::EmptyDate,
                Shipments::ReturnDay,
                Shipments::MasterBillOfLanding,
                Shipments::HouseBillOfLanding,
                Shipments::SealNumber,
                Shipments::ReferenceNumber,
                Shipments::VesselName,
                Shipments::Voyage,
                Shipments::ShipmentNumber,
                Shipments::PickupNumber,
                Shipments::AppointmentNumber,
                Shipments::ReturnNumber,
                Shipments::ReservationNumber,
                Shipments::DeliveryDate,
                Shipments::DeliveryFrom,
                Shipments::DeliveryTo,
                Shipments::DeliveryOrderFile,
                Shipments::BillOfLandingFile,
                Shipments::ProofOfDeliveryFile,
                Shipments::Commodity,
                Shipments::FreightDescription,
            ] {
                table.col(optional_string(col));
            }

            for col in [
                Shipments::DeliveryOrder,
                Shipments::BillOfLanding,
                Shipments::FreightHold,
                Shipments::CustomsHold,
                Shipments::CarrierHold,
                Shipments::IsDeleted,
            ] {
                table.col(flag(col));
            }

            for col in [
                Shipments::PieceCount,
                Shipments::WeightLbs,
                Shipments::WeightKgs,
                Shipments::PalletCount,
            ] {
                table.col(ColumnDef::new(col).integer().null());
            }

            table
                .col(ColumnDef::new(Shipments::CreatedBy).uuid().null())
                .col(timestamp(Shipments::CreatedAt))
                .col(timestamp(Shipments::UpdatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_shipments_container_id")
                        .from(Shipments::Table, Shipments::ContainerId)
                        .to(Containers::Table, Containers::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_shipments_customer_id")
                        .from(Shipments::Table, Shipments::CustomerId)
                        .to(AssociateCompanies::Table, AssociateCompanies::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_shipments_driver_id")
                        .from(Shipments::Table, Shipments::DriverId)
                        .to(Drivers::Table, Drivers::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_shipments_warehouse_id")
                        .from(Shipments::Table, Shipments::WarehouseId)
                        .to(WarehouseUsers::Table, WarehouseUsers::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_shipments_created_by")
                        .from(Shipments::Table, Shipments::CreatedBy)
                        .to(Users::Table, Users::Id)
                        .on_delete(ForeignKeyAction::SetNull),
                );

            manager.create_table(table.to_owned()).await?;

            for (name, col) in [
                ("idx_shipments_status", Shipments::Status),
                ("idx_shipments_created_by", Shipments::CreatedBy),
                ("idx_shipments_driver_id", Shipments::DriverId),
                ("idx_shipments_warehouse_id", Shipments::WarehouseId),
                ("idx_shipments_updated_at", Shipments::UpdatedAt),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(Shipments::Table)
                            .col(col)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shipments::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000007_create_notifications_table {
    use super::{flag, optional_string, timestamp, Notifications, Shipments, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_notifications_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Notifications::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Notifications::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Notifications::RecipientId).uuid().null())
                        .col(ColumnDef::new(Notifications::Title).string().not_null())
                        .col(optional_string(Notifications::NotificationType))
                        .col(ColumnDef::new(Notifications::Message).text().not_null())
                        .col(flag(Notifications::Read))
                        .col(ColumnDef::new(Notifications::ShipmentId).uuid().null())
                        .col(ColumnDef::new(Notifications::Data).json().null())
                        .col(timestamp(Notifications::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_notifications_recipient_id")
                                .from(Notifications::Table, Notifications::RecipientId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_notifications_shipment_id")
                                .from(Notifications::Table, Notifications::ShipmentId)
                                .to(Shipments::Table, Shipments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_notifications_recipient_id")
                        .table(Notifications::Table)
                        .col(Notifications::RecipientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Notifications::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000008_create_devices_table {
    use super::{timestamp, Devices, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_devices_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Devices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Devices::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Devices::UserId).uuid().null())
                        .col(ColumnDef::new(Devices::RegistrationId).text().not_null())
                        .col(timestamp(Devices::CreatedAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_devices_user_id")
                                .from(Devices::Table, Devices::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Devices::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000009_create_feedback_table {
    use super::{timestamp, Feedback};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000009_create_feedback_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Feedback::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Feedback::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Feedback::Subject).string().not_null())
                        .col(ColumnDef::new(Feedback::Message).text().not_null())
                        .col(ColumnDef::new(Feedback::Email).string().not_null())
                        .col(timestamp(Feedback::CreatedAt))
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Feedback::Table).to_owned())
                .await
        }
    }
}

mod m20240101_000010_create_auth_tokens_table {
    use super::{timestamp, AuthTokens, Users};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000010_create_auth_tokens_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AuthTokens::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(AuthTokens::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(AuthTokens::UserId).uuid().not_null())
                        .col(timestamp(AuthTokens::CreatedAt))
                        .col(timestamp(AuthTokens::ExpiresAt))
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_auth_tokens_user_id")
                                .from(AuthTokens::Table, AuthTokens::UserId)
                                .to(Users::Table, Users::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_auth_tokens_user_id")
                        .table(AuthTokens::Table)
                        .col(AuthTokens::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AuthTokens::Table).to_owned())
                .await
        }
    }
}
