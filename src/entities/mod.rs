pub mod booking;
pub mod bus_tracking;
pub mod route;
pub mod route_subscription;
pub mod support_message;
pub mod user_profile;
