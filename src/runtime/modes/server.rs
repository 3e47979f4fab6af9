//! Server mode
//!
//! 启动 HTTP 服务并挂载全部路由。

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    http::{Method, header},
    middleware::{Compress, DefaultHeaders},
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::constants::API_KEY_HEADER;
use crate::api::middleware::RequestIdMiddleware;
use crate::config::{ApiConfig, get_config};
use crate::runtime::lifetime;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(api: &ApiConfig) {
    if api.cors_allowed_origins.is_empty() {
        warn!(
            "CORS allowed origins are empty. \
            Cross-origin dashboard requests will be rejected."
        );
    }
}

/// Build CORS middleware from configuration
///
/// 空列表保持同源策略；`*` 允许任意来源（不带凭据）。
fn build_cors_middleware(api: &ApiConfig) -> Cors {
    let mut cors = Cors::default();

    if api.cors_allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &api.cors_allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors.allowed_methods([
        Method::GET,
        Method::POST,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
    .allowed_header(API_KEY_HEADER)
    .expose_headers(["X-Request-ID"])
    .max_age(api.cors_max_age as usize)
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let config = get_config();

    let services = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;
    let forwarder = services.tracking.forwarder().clone();

    validate_cors_config(&config.api);
    let api_config = config.api.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);

    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(build_cors_middleware(&api_config))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(RequestIdMiddleware)
            .configure(move |cfg| services.configure(cfg))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(forwarder) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
