//! Cloudflare custom-hostname wire types

use serde::{Deserialize, Serialize};

use crate::storage::models::DomainStatus;

/// Cloudflare API 响应信封
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

/// 每次调用的账户参数
#[derive(Debug, Clone)]
pub struct ZoneParams {
    pub zone_id: String,
    pub api_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCustomHostname {
    pub hostname: String,
    pub ssl: SslRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct SslRequest {
    pub method: String,
    #[serde(rename = "type")]
    pub ssl_type: String,
}

impl CreateCustomHostname {
    /// HTTP 验证 + DV 证书
    pub fn http_dv(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            ssl: SslRequest {
                method: "http".to_string(),
                ssl_type: "dv".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct CustomHostname {
    pub id: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ssl: Option<SslInfo>,
    #[serde(default)]
    pub verification_errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SslInfo {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub validation_errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ValidationError {
    #[serde(default)]
    pub message: String,
}

/// DELETE 返回 `{ "id": ... }`
#[derive(Debug, Clone, Deserialize)]
pub struct DeletedHostname {
    pub id: String,
}

impl CustomHostname {
    pub fn ssl_status(&self) -> Option<String> {
        self.ssl.as_ref().and_then(|s| s.status.clone())
    }

    /// 映射到本地域名状态
    pub fn domain_status(&self) -> DomainStatus {
        let hostname_status = self.status.as_deref().unwrap_or("pending");
        let ssl_status = self
            .ssl
            .as_ref()
            .and_then(|s| s.status.as_deref())
            .unwrap_or("pending");

        match (hostname_status, ssl_status) {
            ("active", "active") => DomainStatus::Active,
            ("blocked" | "moved" | "deleted", _) => DomainStatus::Failed,
            (_, "validation_timed_out" | "expired" | "deleted") => DomainStatus::Failed,
            _ => DomainStatus::Pending,
        }
    }

    /// 汇总所有校验错误；无错误时返回 None
    pub fn collect_errors(&self) -> Option<String> {
        let mut errors: Vec<&str> = self.verification_errors.iter().map(String::as_str).collect();
        if let Some(ref ssl) = self.ssl {
            errors.extend(
                ssl.validation_errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .filter(|m| !m.is_empty()),
            );
        }
        (!errors.is_empty()).then(|| errors.join("; "))
    }
}
