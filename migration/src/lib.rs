pub use sea_orm_migration::prelude::*;

mod m20241216_000001_create_routes;
mod m20241216_000002_create_user_profiles;
mod m20241216_000003_create_bookings;
mod m20241216_000004_create_route_subscriptions;
mod m20241216_000005_create_bus_tracking;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241216_000001_create_routes::Migration),
            Box::new(m20241216_000002_create_user_profiles::Migration),
            Box::new(m20241216_000003_create_bookings::Migration),
            Box::new(m20241216_000004_create_route_subscriptions::Migration),
            Box::new(m20241216_000005_create_bus_tracking::Migration),
        ]
    }
}
