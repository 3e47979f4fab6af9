//! traki - conversion tracking edge API
//!
//! Records campaign click traces, stores conversion events and forwards them
//! to ad-platform pixels (Facebook Conversions API, TikTok Events API).
//!
//! # Architecture
//! - `storage`: SeaORM entities and data access
//! - `services`: domain services (campaigns, domains, pixels, tracking, forwarding)
//! - `analytics`: geo aggregation
//! - `api`: HTTP services and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
