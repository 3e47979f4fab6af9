pub mod admin;
pub mod health;
pub mod tracking;

pub use health::{AppStartTime, HealthService, health_routes};
pub use tracking::{click_routes, ingest_routes};
