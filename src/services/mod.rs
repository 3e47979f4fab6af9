//! Service layer for business logic
//!
//! Services own validation and orchestration; the HTTP handlers and the
//! CLI call into them and never touch storage directly.

mod analytics_service;
mod api_key_service;
mod campaign_service;
pub mod cloudflare;
pub mod conversions;
mod domain_service;
pub mod geoip;
mod integration_service;
mod pixel_service;
mod tracking_service;
pub mod user_agent;

pub use analytics_service::*;
pub use api_key_service::*;
pub use campaign_service::*;
pub use domain_service::*;
pub use geoip::{GeoInfo, GeoIpLookup, GeoIpProvider};
pub use integration_service::*;
pub use pixel_service::*;
pub use tracking_service::*;
