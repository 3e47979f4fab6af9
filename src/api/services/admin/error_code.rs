//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};
use ts_rs::TS;

use crate::errors::TrakiError;
use crate::storage::models::TS_EXPORT_PATH;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，ts-rs 自动生成 TypeScript 类型。
/// 按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 2000-2099: 认证错误
/// - 3000-3099: Campaign 错误
/// - 4000-4099: 域名错误
/// - 5000-5099: Pixel 错误
/// - 6000-6099: 追踪错误
/// - 7000-7099: Analytics 错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[ts(rename = "ErrorCode")]
#[ts(repr(enum))]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    Conflict = 1009,
    InvalidDateFormat = 1012,
    DatabaseError = 1020,
    ServiceUnavailable = 1030,

    // 认证错误 2000-2099
    AuthFailed = 2000,
    TokenInvalid = 2002,
    ApiKeyInvalid = 2003,
    RateLimitExceeded = 2004,

    // Campaign 错误 3000-3099
    CampaignNotFound = 3000,
    CampaignInactive = 3001,

    // 域名错误 4000-4099
    DomainProvisioningFailed = 4000,

    // Pixel 错误 5000-5099
    PixelDeliveryFailed = 5000,

    // 追踪错误 6000-6099
    TraceNotFound = 6000,

    // Analytics 错误 7000-7099
    AnalyticsQueryFailed = 7000,
}

impl From<TrakiError> for ErrorCode {
    fn from(err: TrakiError) -> Self {
        Self::from(&err)
    }
}

impl From<&TrakiError> for ErrorCode {
    fn from(err: &TrakiError) -> Self {
        match err {
            TrakiError::Validation(_) => ErrorCode::BadRequest,
            TrakiError::DateParse(_) => ErrorCode::InvalidDateFormat,
            TrakiError::NotFound(_) => ErrorCode::NotFound,
            TrakiError::Conflict(_) => ErrorCode::Conflict,
            TrakiError::Unauthorized(_) => ErrorCode::Unauthorized,
            TrakiError::HostnameProvisioning(_) => ErrorCode::DomainProvisioningFailed,
            TrakiError::PixelDelivery(_) => ErrorCode::PixelDeliveryFailed,
            TrakiError::DatabaseConfig(_)
            | TrakiError::DatabaseConnection(_)
            | TrakiError::DatabaseOperation(_) => ErrorCode::DatabaseError,
            TrakiError::FileOperation(_) | TrakiError::Serialization(_) => {
                ErrorCode::InternalServerError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ErrorCode::Success).unwrap(), "0");
        assert_eq!(
            serde_json::to_string(&ErrorCode::DomainProvisioningFailed).unwrap(),
            "4000"
        );
    }

    #[test]
    fn test_maps_from_traki_error() {
        assert_eq!(
            ErrorCode::from(TrakiError::validation("bad")),
            ErrorCode::BadRequest
        );
        assert_eq!(
            ErrorCode::from(TrakiError::hostname_provisioning("cf")),
            ErrorCode::DomainProvisioningFailed
        );
        assert_eq!(
            ErrorCode::from(TrakiError::database_operation("locked")),
            ErrorCode::DatabaseError
        );
    }
}
