use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20241216_000001_create_routes::Route;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Confirmed,
                        BookingStatus::Delayed,
                        BookingStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid_null(Booking::UserId))
                    .col(uuid(Booking::RouteId).not_null())
                    .col(string_len(Booking::PassengerName, 100).not_null())
                    .col(integer_null(Booking::PassengerAge))
                    .col(string_len(Booking::PassengerGender, 20).not_null())
                    .col(string_len(Booking::PassengerEmail, 255).not_null())
                    .col(string_len(Booking::PassengerPhone, 30).not_null())
                    .col(string_len(Booking::BoardingPoint, 100).not_null())
                    .col(string_len(Booking::DeboardingPoint, 100).not_null())
                    .col(date(Booking::BookingDate).not_null())
                    .col(big_integer(Booking::TotalFare).not_null())
                    .col(string_len(Booking::TicketNumber, 20).not_null().unique_key())
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(integer_null(Booking::DelayMinutes))
                    .col(boolean(Booking::SubscribeToUpdates).not_null().default(false))
                    .col(boolean(Booking::ReceiveAlerts).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_route")
                            .from(Booking::Table, Booking::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_user_date")
                    .table(Booking::Table)
                    .col(Booking::UserId)
                    .col(Booking::BookingDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    #[sea_orm(iden = "bookings")]
    Table,
    Id,
    UserId,
    RouteId,
    PassengerName,
    PassengerAge,
    PassengerGender,
    PassengerEmail,
    PassengerPhone,
    BoardingPoint,
    DeboardingPoint,
    BookingDate,
    TotalFare,
    TicketNumber,
    Status,
    DelayMinutes,
    SubscribeToUpdates,
    ReceiveAlerts,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "delayed")]
    Delayed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
}
