use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Route::Table)
                    .if_not_exists()
                    .col(
                        uuid(Route::Id)
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(string_len(Route::FromLocation, 100).not_null())
                    .col(string_len(Route::ToLocation, 100).not_null())
                    .col(string_len(Route::Duration, 20).not_null())
                    .col(big_integer(Route::Price).not_null())
                    .col(string_len(Route::DepartureTime, 10).not_null())
                    .col(string_len(Route::ArrivalTime, 10).not_null())
                    .col(integer(Route::AvailableSeats).not_null())
                    .col(json_null(Route::Stops))
                    .col(string_len_null(Route::BoardingPoint, 100))
                    .col(string_len_null(Route::DeboardingPoint, 100))
                    .col(
                        timestamp_with_time_zone(Route::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_routes_from_to")
                    .table(Route::Table)
                    .col(Route::FromLocation)
                    .col(Route::ToLocation)
                    .to_owned(),
            )
            .await?;

        // Seed the corridors served at launch
        let insert = Query::insert()
            .into_table(Route::Table)
            .columns([
                Route::FromLocation,
                Route::ToLocation,
                Route::Duration,
                Route::Price,
                Route::DepartureTime,
                Route::ArrivalTime,
                Route::AvailableSeats,
                Route::BoardingPoint,
                Route::DeboardingPoint,
            ])
            .values_panic([
                "Berger".into(),
                "Lekki Phase 1".into(),
                "2h 10m".into(),
                2400i64.into(),
                "05:40".into(),
                "07:50".into(),
                14.into(),
                "Berger Bus Stop".into(),
                "Lekki Phase 1".into(),
            ])
            .values_panic([
                "Ikorodu".into(),
                "Lekki Phase 1".into(),
                "2h 30m".into(),
                2800i64.into(),
                "05:15".into(),
                "07:45".into(),
                14.into(),
                "Ikorodu Garage".into(),
                "Lekki Phase 1".into(),
            ])
            .values_panic([
                "TBS".into(),
                "Ikorodu".into(),
                "1h 45m".into(),
                2000i64.into(),
                "17:30".into(),
                "19:15".into(),
                14.into(),
                "TBS".into(),
                "Ikorodu Garage".into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Route::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Route {
    #[sea_orm(iden = "routes")]
    Table,
    Id,
    FromLocation,
    ToLocation,
    Duration,
    Price,
    DepartureTime,
    ArrivalTime,
    AvailableSeats,
    Stops,
    BoardingPoint,
    DeboardingPoint,
    CreatedAt,
}
