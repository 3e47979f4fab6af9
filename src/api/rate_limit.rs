//! actix-governor 限流器
//!
//! 按客户端 IP 限流。连接来自可信代理（或未配置代理时的私有地址）才采用
//! X-Forwarded-For，其余情况使用连接 IP。

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use governor::middleware::NoOpMiddleware;
use tracing::debug;

use crate::config::{TrackingConfig, get_config};
use crate::utils::ip::{extract_forwarded_ip_from_headers, resolve_client_ip};

#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor;

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let config = get_config();
        let conn_info = req.connection_info();
        resolve_client_ip(
            conn_info.peer_addr(),
            extract_forwarded_ip_from_headers(req.headers()),
            &config.api.trusted_proxies,
        )
        .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract client IP"))
    }
}

/// 登录限流：每秒 1 个令牌，突发 5 次
pub fn login_rate_limiter() -> Governor<ClientIpKeyExtractor, NoOpMiddleware> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(1)
        .burst_size(5)
        .key_extractor(ClientIpKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!("Login rate limiter created: 1 req/s, burst 5");
    Governor::new(&config)
}

/// 公共追踪路由限流，速率来自 `tracking` 配置
pub fn tracking_rate_limiter(
    tracking: &TrackingConfig,
) -> Governor<ClientIpKeyExtractor, NoOpMiddleware> {
    let per_second = tracking.rate_limit_per_second.max(1);
    let burst = tracking.rate_limit_burst.max(1);

    let config = GovernorConfigBuilder::default()
        .milliseconds_per_request((1000 / per_second).max(1))
        .burst_size(burst)
        .key_extractor(ClientIpKeyExtractor)
        .finish()
        .expect("Invalid rate limit config");

    debug!(
        "Tracking rate limiter created: {} req/s, burst {}",
        per_second, burst
    );
    Governor::new(&config)
}
