use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20241216_000003_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(TrackingStatus::Enum)
                    .values([
                        TrackingStatus::Idle,
                        TrackingStatus::EnRoute,
                        TrackingStatus::Delayed,
                        TrackingStatus::Arrived,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_type(
                Type::create()
                    .as_enum(TrackingStage::Enum)
                    .values([
                        TrackingStage::Departed,
                        TrackingStage::Approaching,
                        TrackingStage::ArrivingShortly,
                        TrackingStage::Completed,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BusTracking::Table)
                    .if_not_exists()
                    .col(uuid(BusTracking::Id).primary_key())
                    .col(uuid(BusTracking::BookingId).not_null().unique_key())
                    .col(string_len(BusTracking::BusNumber, 20).not_null())
                    .col(string_len(BusTracking::DriverName, 100).not_null())
                    .col(
                        ColumnDef::new(BusTracking::Status)
                            .custom(TrackingStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BusTracking::CurrentStage)
                            .custom(TrackingStage::Enum)
                            .not_null(),
                    )
                    .col(double(BusTracking::DistanceToPickupKm).not_null())
                    .col(integer(BusTracking::EtaMinutes).not_null())
                    .col(text(BusTracking::StatusMessage).not_null())
                    .col(boolean(BusTracking::Notify10min).not_null().default(true))
                    .col(boolean(BusTracking::NotifyDelay).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(BusTracking::LastUpdated)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bus_tracking_booking")
                            .from(BusTracking::Table, BusTracking::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BusTracking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TrackingStage::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(TrackingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BusTracking {
    #[sea_orm(iden = "bus_tracking")]
    Table,
    Id,
    BookingId,
    BusNumber,
    DriverName,
    Status,
    CurrentStage,
    DistanceToPickupKm,
    EtaMinutes,
    StatusMessage,
    #[sea_orm(iden = "notify_10min")]
    Notify10min,
    NotifyDelay,
    LastUpdated,
}

#[derive(DeriveIden)]
pub enum TrackingStatus {
    #[sea_orm(iden = "tracking_status")]
    Enum,
    #[sea_orm(iden = "idle")]
    Idle,
    #[sea_orm(iden = "en_route")]
    EnRoute,
    #[sea_orm(iden = "delayed")]
    Delayed,
    #[sea_orm(iden = "arrived")]
    Arrived,
}

#[derive(DeriveIden)]
pub enum TrackingStage {
    #[sea_orm(iden = "tracking_stage")]
    Enum,
    #[sea_orm(iden = "departed")]
    Departed,
    #[sea_orm(iden = "approaching")]
    Approaching,
    #[sea_orm(iden = "arriving_shortly")]
    ArrivingShortly,
    #[sea_orm(iden = "completed")]
    Completed,
}
