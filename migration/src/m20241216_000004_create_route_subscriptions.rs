use sea_orm_migration::{prelude::*, schema::*};

use super::m20241216_000001_create_routes::Route;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RouteSubscription::Table)
                    .if_not_exists()
                    .col(uuid(RouteSubscription::Id).primary_key())
                    .col(uuid(RouteSubscription::UserId).not_null())
                    .col(uuid_null(RouteSubscription::RouteId))
                    .col(string_len(RouteSubscription::FromLocation, 100).not_null())
                    .col(string_len(RouteSubscription::ToLocation, 100).not_null())
                    .col(integer(RouteSubscription::DurationWeeks).not_null())
                    .col(date(RouteSubscription::StartDate).not_null())
                    .col(date(RouteSubscription::EndDate).not_null())
                    .col(integer(RouteSubscription::Discount).not_null().default(0))
                    .col(boolean(RouteSubscription::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(RouteSubscription::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_route_subscription_route")
                            .from(RouteSubscription::Table, RouteSubscription::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RouteSubscription::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RouteSubscription {
    #[sea_orm(iden = "route_subscriptions")]
    Table,
    Id,
    UserId,
    RouteId,
    FromLocation,
    ToLocation,
    DurationWeeks,
    StartDate,
    EndDate,
    Discount,
    IsActive,
    CreatedAt,
}
