//! Admin API 类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::services::{
    AttachPixelRequest, CreateCampaignRequest, CreateIntegrationRequest, CreatePixelRequest,
    CreatedApiKey, UpdateCampaignPixelRequest, UpdateCampaignRequest, UpdateIntegrationRequest,
    UpdatePixelRequest,
};
use crate::storage::models::TS_EXPORT_PATH;
use crate::storage::{ApiKey, CampaignStatus, PageRequest, Pixel, PixelPlatform};

use super::error_code::ErrorCode;

/// 区分「字段缺失」与「显式 null」
///
/// 配合 `#[serde(default)]`：缺失 → None，null → Some(None)，值 → Some(Some(v))
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ListMetadata {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub metadata: ListMetadata,
}

// ============ Auth ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct LoginCredentials {
    pub token: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AuthSuccessResponse {
    pub access_token: String,
    pub token_type: String,
    /// 秒
    pub expires_in: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct MessageResponse {
    pub message: String,
}

// ============ Queries ============

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CampaignListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub status: Option<CampaignStatus>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TraceListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub campaign_id: Option<String>,
    /// RFC3339
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct EventListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub trace_id: Option<String>,
    pub campaign_id: Option<String>,
    pub event_name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AnalyticsQueryParams {
    pub campaign_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

// ============ Campaigns ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreateCampaignBody {
    pub name: String,
    pub destination_url: String,
    pub status: Option<CampaignStatus>,
    pub domain_id: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

impl From<CreateCampaignBody> for CreateCampaignRequest {
    fn from(body: CreateCampaignBody) -> Self {
        Self {
            name: body.name,
            destination_url: body.destination_url,
            status: body.status,
            domain_id: body.domain_id,
            utm_source: body.utm_source,
            utm_medium: body.utm_medium,
            utm_campaign: body.utm_campaign,
        }
    }
}

/// PATCH：缺失字段保持不变，null 清空
#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateCampaignBody {
    #[ts(optional)]
    pub name: Option<String>,
    #[ts(optional)]
    pub destination_url: Option<String>,
    #[ts(optional)]
    pub status: Option<CampaignStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(optional)]
    pub domain_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(optional)]
    pub utm_source: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(optional)]
    pub utm_medium: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(optional)]
    pub utm_campaign: Option<Option<String>>,
}

impl From<UpdateCampaignBody> for UpdateCampaignRequest {
    fn from(body: UpdateCampaignBody) -> Self {
        Self {
            name: body.name,
            destination_url: body.destination_url,
            status: body.status,
            domain_id: body.domain_id,
            utm_source: body.utm_source,
            utm_medium: body.utm_medium,
            utm_campaign: body.utm_campaign,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct AttachPixelBody {
    pub pixel_id: String,
    pub event_name: Option<String>,
    #[serde(default)]
    pub test_mode: bool,
    pub test_event_code: Option<String>,
}

impl From<AttachPixelBody> for AttachPixelRequest {
    fn from(body: AttachPixelBody) -> Self {
        Self {
            pixel_id: body.pixel_id,
            event_name: body.event_name,
            test_mode: body.test_mode,
            test_event_code: body.test_event_code,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateCampaignPixelBody {
    #[serde(default, deserialize_with = "double_option")]
    #[ts(optional)]
    pub event_name: Option<Option<String>>,
    #[ts(optional)]
    pub test_mode: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[ts(optional)]
    pub test_event_code: Option<Option<String>>,
}

impl From<UpdateCampaignPixelBody> for UpdateCampaignPixelRequest {
    fn from(body: UpdateCampaignPixelBody) -> Self {
        Self {
            event_name: body.event_name,
            test_mode: body.test_mode,
            test_event_code: body.test_event_code,
        }
    }
}

// ============ Domains ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreateDomainBody {
    pub hostname: String,
}

// ============ Pixels ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreatePixelBody {
    pub name: String,
    pub platform: PixelPlatform,
    pub pixel_code: String,
    pub access_token: String,
}

impl From<CreatePixelBody> for CreatePixelRequest {
    fn from(body: CreatePixelBody) -> Self {
        Self {
            name: body.name,
            platform: body.platform,
            pixel_code: body.pixel_code,
            access_token: body.access_token,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdatePixelBody {
    #[ts(optional)]
    pub name: Option<String>,
    #[ts(optional)]
    pub pixel_code: Option<String>,
    #[ts(optional)]
    pub access_token: Option<String>,
}

impl From<UpdatePixelBody> for UpdatePixelRequest {
    fn from(body: UpdatePixelBody) -> Self {
        Self {
            name: body.name,
            pixel_code: body.pixel_code,
            access_token: body.access_token,
        }
    }
}

/// 只保留末 4 位
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Pixel 响应（access_token 脱敏）
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct PixelResponse {
    pub id: String,
    pub name: String,
    pub platform: PixelPlatform,
    pub pixel_code: String,
    pub access_token_masked: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Pixel> for PixelResponse {
    fn from(pixel: Pixel) -> Self {
        Self {
            access_token_masked: mask_token(&pixel.access_token),
            id: pixel.id,
            name: pixel.name,
            platform: pixel.platform,
            pixel_code: pixel.pixel_code,
            created_at: pixel.created_at,
            updated_at: pixel.updated_at,
        }
    }
}

// ============ API keys ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreateApiKeyBody {
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct ApiKeyResponse {
    pub id: String,
    pub name: String,
    pub key_prefix: String,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            last_used_at: key.last_used_at,
            revoked_at: key.revoked_at,
            created_at: key.created_at,
        }
    }
}

/// 创建结果，明文 key 只返回这一次
#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreatedApiKeyResponse {
    pub api_key: ApiKeyResponse,
    pub key: String,
}

impl From<CreatedApiKey> for CreatedApiKeyResponse {
    fn from(created: CreatedApiKey) -> Self {
        Self {
            api_key: created.key.into(),
            key: created.plaintext,
        }
    }
}

// ============ Integrations ============

#[derive(Serialize, Deserialize, Clone, Debug, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CreateIntegrationBody {
    pub name: String,
    pub provider: String,
    #[ts(type = "Record<string, unknown> | null")]
    pub config: Option<Value>,
    pub enabled: Option<bool>,
}

impl From<CreateIntegrationBody> for CreateIntegrationRequest {
    fn from(body: CreateIntegrationBody) -> Self {
        Self {
            name: body.name,
            provider: body.provider,
            config: body.config,
            enabled: body.enabled,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct UpdateIntegrationBody {
    #[ts(optional)]
    pub name: Option<String>,
    #[ts(type = "Record<string, unknown> | null")]
    pub config: Option<Value>,
    #[ts(optional)]
    pub enabled: Option<bool>,
}

impl From<UpdateIntegrationBody> for UpdateIntegrationRequest {
    fn from(body: UpdateIntegrationBody) -> Self {
        Self {
            name: body.name,
            config: body.config,
            enabled: body.enabled,
        }
    }
}
