//! Admin API 路由配置
//!
//! `/api/v1` 下的路由按资源拆分。

use actix_web::web;

use super::activity::{delete_event, delete_trace, get_event, get_trace, list_events, list_traces};
use super::analytics::{get_geo, get_overview};
use super::api_keys::{create_api_key, list_api_keys, revoke_api_key};
use super::auth::{login, verify_token};
use super::campaigns::{
    attach_pixel, create_campaign, delete_campaign, detach_pixel, get_campaign,
    list_campaign_pixels, list_campaigns, update_campaign, update_campaign_pixel,
};
use super::domains::{create_domain, delete_domain, get_domain, list_domains, refresh_domain};
use super::integrations::{
    create_integration, delete_integration, get_integration, list_integrations,
    update_integration,
};
use super::pixels::{create_pixel, delete_pixel, get_pixel, list_pixels, update_pixel};
use crate::api::rate_limit::login_rate_limiter;

/// 认证路由 `/auth`
///
/// - POST /auth/login - 登录（带限流，免认证）
/// - GET /auth/verify - 验证 token
pub fn auth_routes() -> actix_web::Scope {
    web::scope("/auth")
        .route("/login", web::post().to(login).wrap(login_rate_limiter()))
        .route("/verify", web::get().to(verify_token))
}

/// Campaign 路由 `/campaigns`，包含 pixel 关联子资源
pub fn campaign_routes() -> actix_web::Scope {
    web::scope("/campaigns")
        .route("", web::get().to(list_campaigns))
        .route("", web::post().to(create_campaign))
        .route("/{id}/pixels", web::get().to(list_campaign_pixels))
        .route("/{id}/pixels", web::post().to(attach_pixel))
        .route("/{id}/pixels/{pixel_id}", web::patch().to(update_campaign_pixel))
        .route("/{id}/pixels/{pixel_id}", web::delete().to(detach_pixel))
        .route("/{id}", web::get().to(get_campaign))
        .route("/{id}", web::patch().to(update_campaign))
        .route("/{id}", web::delete().to(delete_campaign))
}

pub fn domain_routes() -> actix_web::Scope {
    web::scope("/domains")
        .route("", web::get().to(list_domains))
        .route("", web::post().to(create_domain))
        .route("/{id}/refresh", web::post().to(refresh_domain))
        .route("/{id}", web::get().to(get_domain))
        .route("/{id}", web::delete().to(delete_domain))
}

pub fn pixel_routes() -> actix_web::Scope {
    web::scope("/pixels")
        .route("", web::get().to(list_pixels))
        .route("", web::post().to(create_pixel))
        .route("/{id}", web::get().to(get_pixel))
        .route("/{id}", web::patch().to(update_pixel))
        .route("/{id}", web::delete().to(delete_pixel))
}

pub fn api_key_routes() -> actix_web::Scope {
    web::scope("/api-keys")
        .route("", web::get().to(list_api_keys))
        .route("", web::post().to(create_api_key))
        .route("/{id}", web::delete().to(revoke_api_key))
}

pub fn trace_routes() -> actix_web::Scope {
    web::scope("/traces")
        .route("", web::get().to(list_traces))
        .route("/{id}", web::get().to(get_trace))
        .route("/{id}", web::delete().to(delete_trace))
}

pub fn event_routes() -> actix_web::Scope {
    web::scope("/events")
        .route("", web::get().to(list_events))
        .route("/{id}", web::get().to(get_event))
        .route("/{id}", web::delete().to(delete_event))
}

pub fn integration_routes() -> actix_web::Scope {
    web::scope("/integrations")
        .route("", web::get().to(list_integrations))
        .route("", web::post().to(create_integration))
        .route("/{id}", web::get().to(get_integration))
        .route("/{id}", web::patch().to(update_integration))
        .route("/{id}", web::delete().to(delete_integration))
}

pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/geo", web::get().to(get_geo))
        .route("/overview", web::get().to(get_overview))
}

/// 组合所有子模块路由（挂载在 `/api/v1` scope 内）
pub fn admin_v1_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth_routes())
        .service(campaign_routes())
        .service(domain_routes())
        .service(pixel_routes())
        .service(api_key_routes())
        .service(trace_routes())
        .service(event_routes())
        .service(integration_routes())
        .service(analytics_routes());
}
