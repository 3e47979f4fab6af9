//! URL / 主机名验证
//!
//! 阻止危险协议，校验 campaign 落地页和自定义域名

use url::{Host, Url};

use crate::errors::TrakiError;

/// URL 验证错误
#[derive(Debug)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    DangerousProtocol(String),
    InvalidFormat(String),
    InvalidHostname(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(proto) => write!(
                f,
                "Invalid protocol: {}. Only http:// and https:// are allowed",
                proto
            ),
            Self::DangerousProtocol(proto) => write!(f, "Dangerous protocol blocked: {}", proto),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
            Self::InvalidHostname(host) => write!(f, "Invalid hostname: {}", host),
        }
    }
}

impl std::error::Error for UrlValidationError {}

impl From<UrlValidationError> for TrakiError {
    fn from(err: UrlValidationError) -> Self {
        TrakiError::validation(err.to_string())
    }
}

const DANGEROUS_PROTOCOLS: &[&str] = &[
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
    "about:",
    "blob:",
];

/// 验证 URL 安全性（仅允许 http/https）
pub fn validate_url(url: &str) -> Result<Url, UrlValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let url_lower = url.to_lowercase();

    if let Some(proto) = DANGEROUS_PROTOCOLS.iter().find(|p| url_lower.starts_with(*p)) {
        return Err(UrlValidationError::DangerousProtocol(proto.to_string()));
    }

    if !url_lower.starts_with("http://") && !url_lower.starts_with("https://") {
        let proto = url_lower
            .split(':')
            .next()
            .map(|s| format!("{}:", s))
            .unwrap_or_default();
        return Err(UrlValidationError::InvalidProtocol(proto));
    }

    Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))
}

/// 规范化并校验自定义域名（小写，至少两级，不含协议/路径/端口）
pub fn normalize_hostname(input: &str) -> Result<String, UrlValidationError> {
    let hostname = input.trim().trim_end_matches('.').to_ascii_lowercase();

    let invalid = || UrlValidationError::InvalidHostname(input.trim().to_string());

    if hostname.is_empty()
        || hostname.len() > 253
        || !hostname.contains('.')
        || hostname.contains(|c: char| matches!(c, '/' | ':' | '@' | '?' | '#' | ' '))
    {
        return Err(invalid());
    }

    let labels_ok = hostname.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return Err(invalid());
    }

    // IP 地址不能作为自定义域名
    match Host::parse(&hostname) {
        Ok(Host::Domain(_)) => Ok(hostname),
        _ => Err(invalid()),
    }
}
