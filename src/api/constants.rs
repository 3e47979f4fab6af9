//! API 模块常量定义

/// Admin API 路由前缀
pub const ADMIN_API_PREFIX: &str = "/api/v1";

/// 追踪 ingestion 路由前缀（API Key 认证）
pub const TRACKING_API_PREFIX: &str = "/t/v1";

/// API Key 请求头
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// JWT subject
pub const ADMIN_SUBJECT: &str = "admin";

/// JWT token_type claim
pub const ACCESS_TOKEN_TYPE: &str = "access";
