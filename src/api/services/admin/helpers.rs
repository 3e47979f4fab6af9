//! Admin API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::{Result, TrakiError};
use crate::storage::Page;

use super::error_code::ErrorCode;
use super::types::{ApiResponse, ListMetadata, ListResponse};

/// 解析 RFC3339 时间参数
pub fn parse_datetime(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(value)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| {
            TrakiError::date_parse(format!(
                "Invalid {} format: {}. Use RFC3339 (e.g. 2025-01-01T00:00:00Z)",
                field, value
            ))
        })
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn created_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, ErrorCode::Success, "Created", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 TrakiError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_traki(err: &TrakiError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        tracing::error!("API error: {}", err);
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
///
/// 成功时返回 200 OK + JSON 数据，失败时自动映射 TrakiError。
pub fn api_result<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_traki(&e),
    }
}

/// 同 api_result，成功时返回 201
pub fn api_created<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => created_response(data),
        Err(e) => error_from_traki(&e),
    }
}

/// 删除等无返回体的操作
pub fn api_deleted(result: Result<()>) -> HttpResponse {
    match result {
        Ok(()) => json_response::<()>(StatusCode::OK, ErrorCode::Success, "Deleted", None),
        Err(e) => error_from_traki(&e),
    }
}

/// 分页列表响应 `{data, metadata}`
pub fn list_response<T, U, F>(result: Result<Page<T>>, f: F) -> HttpResponse
where
    U: Serialize,
    F: FnMut(T) -> U,
{
    match result {
        Ok(page) => {
            let metadata = ListMetadata {
                page: page.page,
                page_size: page.page_size,
                total: page.total,
                total_pages: page.total_pages(),
            };
            HttpResponse::Ok()
                .append_header(("Content-Type", "application/json; charset=utf-8"))
                .json(ListResponse {
                    data: page.map(f).items,
                    metadata,
                })
        }
        Err(e) => error_from_traki(&e),
    }
}
