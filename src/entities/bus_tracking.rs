use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tracking_status")]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    #[sea_orm(string_value = "idle")]
    Idle,
    #[sea_orm(string_value = "en_route")]
    EnRoute,
    #[sea_orm(string_value = "delayed")]
    Delayed,
    #[sea_orm(string_value = "arrived")]
    Arrived,
}

/// Trip stages, declared in the order a trip moves through them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tracking_stage")]
#[serde(rename_all = "snake_case")]
pub enum TrackingStage {
    #[sea_orm(string_value = "departed")]
    Departed,
    #[sea_orm(string_value = "approaching")]
    Approaching,
    #[sea_orm(string_value = "arriving_shortly")]
    ArrivingShortly,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bus_tracking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub bus_number: String,
    pub driver_name: String,
    pub status: TrackingStatus,
    pub current_stage: TrackingStage,
    pub distance_to_pickup_km: f64,
    pub eta_minutes: i32,
    pub status_message: String,
    #[sea_orm(column_name = "notify_10min")]
    pub notify_10min: bool,
    pub notify_delay: bool,
    pub last_updated: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
