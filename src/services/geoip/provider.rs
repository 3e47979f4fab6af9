//! GeoIP Provider 抽象层
//!
//! 统一的 GeoIP 查询接口，根据配置自动选择实现：
//! 1. geoip.enabled = false → 不查询
//! 2. maxminddb_path 配置且可读 → MaxMindProvider
//! 3. 否则 → ExternalApiProvider

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::utils::ip::is_private_or_local;

use super::external_api::ExternalApiProvider;
use super::maxmind::MaxMindProvider;
use crate::config::GeoIpConfig;

/// 地理位置信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2 国家代码 (e.g., "CN", "US")
    pub country: Option<String>,
    /// 州/省代码 (e.g., "SP", "CA")
    pub region: Option<String>,
    /// 城市名称
    pub city: Option<String>,
}

/// GeoIP 查询 trait
#[async_trait]
pub trait GeoIpLookup: Send + Sync {
    /// 查询 IP 地址的地理位置
    async fn lookup(&self, ip: &str) -> Option<GeoInfo>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 统一 GeoIP Provider
///
/// 启动时根据配置自动选择实现
pub struct GeoIpProvider {
    inner: Arc<dyn GeoIpLookup>,
}

impl GeoIpProvider {
    /// 根据 GeoIpConfig 初始化
    pub fn new(config: &GeoIpConfig) -> Self {
        if !config.enabled {
            info!("GeoIP: disabled");
            return Self::from_lookup(Arc::new(DisabledProvider));
        }

        let inner: Arc<dyn GeoIpLookup> = if let Some(ref path) = config.maxminddb_path {
            match MaxMindProvider::new(path) {
                Ok(provider) => {
                    info!("GeoIP: Using MaxMind database at {}", path);
                    Arc::new(provider)
                }
                Err(e) => {
                    warn!(
                        "GeoIP: Failed to load MaxMind database at {}: {}, falling back to external API",
                        path, e
                    );
                    Arc::new(ExternalApiProvider::new(&config.api_url))
                }
            }
        } else {
            debug!("GeoIP: No MaxMind database configured, using external API");
            Arc::new(ExternalApiProvider::new(&config.api_url))
        };

        info!("GeoIP: Initialized with {} provider", inner.name());
        Self { inner }
    }

    /// 使用自定义实现（测试注入）
    pub fn from_lookup(inner: Arc<dyn GeoIpLookup>) -> Self {
        Self { inner }
    }

    /// 查询 IP 地址的地理位置，私有地址直接跳过
    pub async fn lookup(&self, ip: &str) -> Option<GeoInfo> {
        match ip.parse() {
            Ok(addr) if !is_private_or_local(&addr) => self.inner.lookup(ip).await,
            _ => None,
        }
    }

    /// 获取当前使用的 provider 名称
    pub fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

impl Clone for GeoIpProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// 关闭 GeoIP 时使用
struct DisabledProvider;

#[async_trait]
impl GeoIpLookup for DisabledProvider {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        None
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedLookup;

    #[async_trait]
    impl GeoIpLookup for FixedLookup {
        async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
            Some(GeoInfo {
                country: Some("BR".into()),
                region: Some("SP".into()),
                city: Some("São Paulo".into()),
            })
        }

        fn name(&self) -> &'static str {
            "Fixed"
        }
    }

    #[tokio::test]
    async fn test_private_ips_are_not_looked_up() {
        let provider = GeoIpProvider::from_lookup(Arc::new(FixedLookup));
        assert!(provider.lookup("192.168.0.10").await.is_none());
        assert!(provider.lookup("not-an-ip").await.is_none());
        assert_eq!(
            provider.lookup("200.147.67.142").await.and_then(|g| g.region),
            Some("SP".to_string())
        );
    }

    #[tokio::test]
    async fn test_disabled_config() {
        let config = GeoIpConfig {
            enabled: false,
            ..GeoIpConfig::default()
        };
        let provider = GeoIpProvider::new(&config);
        assert_eq!(provider.provider_name(), "Disabled");
        assert!(provider.lookup("8.8.8.8").await.is_none());
    }
}
