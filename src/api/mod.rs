//! HTTP layer: routes, handlers and middleware

pub mod constants;
pub mod jwt;
pub mod middleware;
pub mod rate_limit;
pub mod services;
