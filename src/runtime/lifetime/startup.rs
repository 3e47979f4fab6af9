use std::sync::Arc;

use actix_web::web;
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::constants::{ADMIN_API_PREFIX, TRACKING_API_PREFIX};
use crate::api::middleware::AdminAuth;
use crate::api::services::admin::routes::admin_v1_routes;
use crate::api::services::{AppStartTime, click_routes, health_routes, ingest_routes};
use crate::config::{StaticConfig, TrackingConfig};
use crate::services::cloudflare::{CloudflareProvisioner, HostnameProvisioner};
use crate::services::conversions::ConversionForwarder;
use crate::services::{
    AnalyticsService, ApiKeyService, CampaignService, DomainService, GeoIpProvider,
    IntegrationService, PixelService, TrackingService,
};
use crate::storage::{SeaOrmStorage, StorageFactory};

/// 所有共享服务，按 `web::Data<Arc<_>>` 注入 handler
#[derive(Clone)]
pub struct AppServices {
    pub storage: Arc<SeaOrmStorage>,
    pub geoip: Arc<GeoIpProvider>,
    pub campaigns: Arc<CampaignService>,
    pub domains: Arc<DomainService>,
    pub pixels: Arc<PixelService>,
    pub api_keys: Arc<ApiKeyService>,
    pub integrations: Arc<IntegrationService>,
    pub tracking: Arc<TrackingService>,
    pub analytics: Arc<AnalyticsService>,
    pub app_start_time: AppStartTime,
    tracking_config: TrackingConfig,
}

impl AppServices {
    /// 使用显式的外部依赖构建（测试中注入 fake）
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        config: &StaticConfig,
        provisioner: Option<Arc<dyn HostnameProvisioner>>,
        forwarder: Arc<ConversionForwarder>,
        geoip: Arc<GeoIpProvider>,
    ) -> Self {
        let tracking = Arc::new(TrackingService::new(
            storage.clone(),
            geoip.clone(),
            forwarder,
            config.tracking.trace_param.clone(),
        ));

        Self {
            campaigns: Arc::new(CampaignService::new(storage.clone())),
            domains: Arc::new(DomainService::new(storage.clone(), provisioner)),
            pixels: Arc::new(PixelService::new(storage.clone())),
            api_keys: Arc::new(ApiKeyService::new(
                storage.clone(),
                config.tracking.api_key_cache_ttl,
            )),
            integrations: Arc::new(IntegrationService::new(storage.clone())),
            analytics: Arc::new(AnalyticsService::new(storage.clone())),
            tracking,
            geoip,
            storage,
            app_start_time: AppStartTime {
                start_datetime: chrono::Utc::now(),
            },
            tracking_config: config.tracking.clone(),
        }
    }

    /// 按配置创建 Cloudflare provisioner、转发器与 GeoIP provider
    pub fn from_config(storage: Arc<SeaOrmStorage>, config: &StaticConfig) -> Self {
        let provisioner = CloudflareProvisioner::from_config(&config.cloudflare)
            .map(|p| Arc::new(p) as Arc<dyn HostnameProvisioner>);
        if provisioner.is_none() {
            info!("Cloudflare is not configured, domains are stored as unmanaged");
        }

        let forwarder = Arc::new(ConversionForwarder::from_config(
            storage.clone(),
            &config.conversions,
        ));
        if !config.conversions.enabled {
            info!("Conversion forwarding is disabled, events are marked skipped");
        }

        let geoip = Arc::new(GeoIpProvider::new(&config.geoip));
        Self::new(storage, config, provisioner, forwarder, geoip)
    }

    /// 注册 app_data 与全部路由
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.storage.clone()))
            .app_data(web::Data::new(self.geoip.clone()))
            .app_data(web::Data::new(self.campaigns.clone()))
            .app_data(web::Data::new(self.domains.clone()))
            .app_data(web::Data::new(self.pixels.clone()))
            .app_data(web::Data::new(self.api_keys.clone()))
            .app_data(web::Data::new(self.integrations.clone()))
            .app_data(web::Data::new(self.tracking.clone()))
            .app_data(web::Data::new(self.analytics.clone()))
            .app_data(web::Data::new(self.app_start_time.clone()))
            .app_data(web::PayloadConfig::new(256 * 1024))
            .service(
                web::scope(ADMIN_API_PREFIX)
                    .wrap(AdminAuth)
                    .configure(admin_v1_routes),
            )
            .service(ingest_routes(TRACKING_API_PREFIX))
            .service(health_routes())
            .service(click_routes(&self.tracking_config));
    }
}

/// 准备服务器启动：创建存储（含迁移）并组装服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<AppServices> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    check_component_enabled(config);
    let services = AppServices::from_config(storage, config);

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(services)
}

fn check_component_enabled(config: &StaticConfig) {
    let api = &config.api;
    if api.admin_token.is_empty() {
        info!("Admin API is disabled (admin_token not set)");
    } else {
        info!("Admin API available at: {}", ADMIN_API_PREFIX);
        if api.admin_token.len() < 8 {
            warn!("WARNING: Admin Token is very short. Consider using a stronger token.");
        }
    }

    if !api.jwt_secret.is_empty() && api.jwt_secret.len() < 32 {
        warn!(
            "WARNING: JWT Secret is too short ({} bytes). \
            Recommended minimum is 32 bytes for security.",
            api.jwt_secret.len()
        );
    }

    info!("Tracking API available at: {}", TRACKING_API_PREFIX);
}
