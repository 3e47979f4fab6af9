use std::fmt;

use actix_web::http::StatusCode;

use crate::services::cloudflare::CloudflareError;

#[derive(Debug, Clone)]
pub enum TrakiError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Unauthorized(String),
    Serialization(String),
    DateParse(String),
    HostnameProvisioning(String),
    PixelDelivery(String),
}

impl TrakiError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            TrakiError::DatabaseConfig(_) => "E001",
            TrakiError::DatabaseConnection(_) => "E002",
            TrakiError::DatabaseOperation(_) => "E003",
            TrakiError::FileOperation(_) => "E004",
            TrakiError::Validation(_) => "E005",
            TrakiError::NotFound(_) => "E006",
            TrakiError::Conflict(_) => "E007",
            TrakiError::Unauthorized(_) => "E008",
            TrakiError::Serialization(_) => "E009",
            TrakiError::DateParse(_) => "E010",
            TrakiError::HostnameProvisioning(_) => "E011",
            TrakiError::PixelDelivery(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            TrakiError::DatabaseConfig(_) => "Database Configuration Error",
            TrakiError::DatabaseConnection(_) => "Database Connection Error",
            TrakiError::DatabaseOperation(_) => "Database Operation Error",
            TrakiError::FileOperation(_) => "File Operation Error",
            TrakiError::Validation(_) => "Validation Error",
            TrakiError::NotFound(_) => "Resource Not Found",
            TrakiError::Conflict(_) => "Resource Conflict",
            TrakiError::Unauthorized(_) => "Unauthorized",
            TrakiError::Serialization(_) => "Serialization Error",
            TrakiError::DateParse(_) => "Date Parse Error",
            TrakiError::HostnameProvisioning(_) => "Hostname Provisioning Error",
            TrakiError::PixelDelivery(_) => "Pixel Delivery Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            TrakiError::DatabaseConfig(msg)
            | TrakiError::DatabaseConnection(msg)
            | TrakiError::DatabaseOperation(msg)
            | TrakiError::FileOperation(msg)
            | TrakiError::Validation(msg)
            | TrakiError::NotFound(msg)
            | TrakiError::Conflict(msg)
            | TrakiError::Unauthorized(msg)
            | TrakiError::Serialization(msg)
            | TrakiError::DateParse(msg)
            | TrakiError::HostnameProvisioning(msg)
            | TrakiError::PixelDelivery(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            TrakiError::Validation(_) | TrakiError::DateParse(_) => StatusCode::BAD_REQUEST,
            TrakiError::NotFound(_) => StatusCode::NOT_FOUND,
            TrakiError::Conflict(_) => StatusCode::CONFLICT,
            TrakiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TrakiError::HostnameProvisioning(_) | TrakiError::PixelDelivery(_) => {
                StatusCode::BAD_GATEWAY
            }
            TrakiError::DatabaseConfig(_)
            | TrakiError::DatabaseConnection(_)
            | TrakiError::DatabaseOperation(_)
            | TrakiError::FileOperation(_)
            | TrakiError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for TrakiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for TrakiError {}

// 便捷的构造函数
impl TrakiError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        TrakiError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        TrakiError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        TrakiError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        TrakiError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        TrakiError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        TrakiError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        TrakiError::Conflict(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        TrakiError::Unauthorized(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        TrakiError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        TrakiError::DateParse(msg.into())
    }

    pub fn hostname_provisioning<T: Into<String>>(msg: T) -> Self {
        TrakiError::HostnameProvisioning(msg.into())
    }

    pub fn pixel_delivery<T: Into<String>>(msg: T) -> Self {
        TrakiError::PixelDelivery(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for TrakiError {
    fn from(err: sea_orm::DbErr) -> Self {
        TrakiError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for TrakiError {
    fn from(err: std::io::Error) -> Self {
        TrakiError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TrakiError {
    fn from(err: serde_json::Error) -> Self {
        TrakiError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for TrakiError {
    fn from(err: chrono::ParseError) -> Self {
        TrakiError::DateParse(err.to_string())
    }
}

impl From<CloudflareError> for TrakiError {
    fn from(err: CloudflareError) -> Self {
        TrakiError::HostnameProvisioning(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TrakiError>;
