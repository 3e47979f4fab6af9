//! Cloudflare for SaaS custom hostnames
//!
//! `CloudflareClient` 负责单次 HTTP 调用，`HostnameProvisioner` 是域名服务依赖的接口，
//! 未配置 Cloudflare 时不创建 provisioner（域名以 unmanaged 状态保存）。

mod client;
mod types;

use std::fmt;

use async_trait::async_trait;

use crate::config::CloudflareConfig;

pub use client::{CloudflareClient, unwrap_envelope};
pub use types::{
    ApiMessage, CreateCustomHostname, CustomHostname, DeletedHostname, Envelope, SslInfo,
    ValidationError, ZoneParams,
};

/// Cloudflare 调用错误（status 为 0 表示传输层失败）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudflareError {
    pub status: u16,
    pub message: String,
}

impl CloudflareError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn transport(err: impl fmt::Display) -> Self {
        Self::new(0, err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl fmt::Display for CloudflareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cloudflare API error ({}): {}", self.status, self.message)
    }
}

impl std::error::Error for CloudflareError {}

#[async_trait]
pub trait HostnameProvisioner: Send + Sync {
    async fn create(&self, hostname: &str) -> Result<CustomHostname, CloudflareError>;

    async fn get(&self, id: &str) -> Result<CustomHostname, CloudflareError>;

    async fn delete(&self, id: &str) -> Result<(), CloudflareError>;
}

/// 绑定到单个 zone 的 Cloudflare provisioner
pub struct CloudflareProvisioner {
    client: CloudflareClient,
    params: ZoneParams,
}

impl CloudflareProvisioner {
    pub fn new(client: CloudflareClient, params: ZoneParams) -> Self {
        Self { client, params }
    }

    /// 未配置 token/zone 时返回 None
    pub fn from_config(config: &CloudflareConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        Some(Self::new(
            CloudflareClient::new(&config.api_base_url, config.timeout_secs),
            ZoneParams {
                zone_id: config.zone_id.clone(),
                api_token: config.api_token.clone(),
            },
        ))
    }
}

#[async_trait]
impl HostnameProvisioner for CloudflareProvisioner {
    async fn create(&self, hostname: &str) -> Result<CustomHostname, CloudflareError> {
        self.client
            .create(CreateCustomHostname::http_dv(hostname), &self.params)
            .await
    }

    async fn get(&self, id: &str) -> Result<CustomHostname, CloudflareError> {
        self.client.get(id, &self.params).await
    }

    async fn delete(&self, id: &str) -> Result<(), CloudflareError> {
        self.client.delete(id, &self.params).await.map(|_| ())
    }
}
