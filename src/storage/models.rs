//! Domain records shared by the storage, service and API layers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use ts_rs::TS;

/// Dashboard 类型导出路径
pub const TS_EXPORT_PATH: &str = "../dashboard/src/services/types.generated.ts";

/// Campaign 状态
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    TS,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Active,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub destination_url: String,
    pub status: CampaignStatus,
    pub domain_id: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 自定义域名状态
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    TS,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DomainStatus {
    #[default]
    Pending,
    Active,
    Failed,
    /// 未配置 Cloudflare，仅本地记录
    Unmanaged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Domain {
    pub id: String,
    pub hostname: String,
    pub status: DomainStatus,
    pub ssl_status: Option<String>,
    pub cf_hostname_id: Option<String>,
    pub verification_errors: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 广告平台
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TS,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PixelPlatform {
    Facebook,
    Tiktok,
}

/// Pixel 凭据（包含 access_token，不直接对外序列化）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixel {
    pub id: String,
    pub name: String,
    pub platform: PixelPlatform,
    pub pixel_code: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CampaignPixel {
    pub id: String,
    pub campaign_id: String,
    pub pixel_id: String,
    pub event_name: Option<String>,
    pub test_mode: bool,
    pub test_event_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// API Key 记录（只保存 hash）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApiKey {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Trace {
    pub id: String,
    pub campaign_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
    pub is_bot: bool,
    pub referrer: Option<String>,
    pub landing_url: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub fbclid: Option<String>,
    pub ttclid: Option<String>,
    pub gclid: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 事件转发状态
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    TS,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ForwardStatus {
    #[default]
    Pending,
    Sent,
    Partial,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Event {
    pub id: String,
    pub trace_id: String,
    pub campaign_id: String,
    pub event_name: String,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub email_hash: Option<String>,
    pub phone_hash: Option<String>,
    pub source_url: Option<String>,
    pub forward_status: ForwardStatus,
    #[ts(type = "unknown")]
    pub forward_results: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct Integration {
    pub id: String,
    pub name: String,
    pub provider: String,
    #[ts(type = "Record<string, unknown>")]
    pub config: serde_json::Value,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 分页请求（page 从 1 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u64 = 20;
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// 规范化分页参数：page >= 1，page_size ∈ [1, 100]
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(Self::DEFAULT_PAGE_SIZE)
                .clamp(1, Self::MAX_PAGE_SIZE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// 分页结果
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.page_size.max(1))
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Campaign 列表过滤
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    /// 模糊匹配 name 或 destination_url
    pub search: Option<String>,
    pub status: Option<CampaignStatus>,
}

/// Trace 列表过滤
#[derive(Debug, Clone, Default)]
pub struct TraceFilter {
    pub campaign_id: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

/// Event 列表过滤
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub trace_id: Option<String>,
    pub campaign_id: Option<String>,
    pub event_name: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_page_request_clamps_values() {
        let req = PageRequest::new(Some(0), Some(1000));
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, PageRequest::MAX_PAGE_SIZE);

        let req = PageRequest::new(None, Some(0));
        assert_eq!(req.page_size, 1);
    }

    #[test]
    fn test_page_total_pages() {
        let page: Page<u8> = Page {
            items: vec![],
            total: 41,
            page: 1,
            page_size: 20,
        };
        assert_eq!(page.total_pages(), 3);

        let empty: Page<u8> = Page {
            items: vec![],
            total: 0,
            page: 1,
            page_size: 20,
        };
        assert_eq!(empty.total_pages(), 0);
    }

    #[test]
    fn test_status_string_forms() {
        assert_eq!(CampaignStatus::Paused.as_ref(), "paused");
        assert_eq!(
            DomainStatus::from_str("unmanaged").unwrap(),
            DomainStatus::Unmanaged
        );
        assert_eq!(PixelPlatform::Tiktok.as_ref(), "tiktok");
        assert_eq!(ForwardStatus::from_str("partial").unwrap(), ForwardStatus::Partial);
    }

    #[test]
    fn export_typescript_types() {
        // cargo test export_typescript_types -- --nocapture
        Campaign::export_all(&ts_rs::Config::from_env()).expect("Failed to export Campaign");
        Domain::export_all(&ts_rs::Config::from_env()).expect("Failed to export Domain");
        CampaignPixel::export_all(&ts_rs::Config::from_env()).expect("Failed to export CampaignPixel");
        Trace::export_all(&ts_rs::Config::from_env()).expect("Failed to export Trace");
        Event::export_all(&ts_rs::Config::from_env()).expect("Failed to export Event");
        Integration::export_all(&ts_rs::Config::from_env()).expect("Failed to export Integration");
    }
}
