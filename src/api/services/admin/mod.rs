//! Admin API 服务模块
//!
//! Dashboard 使用的 `/api/v1` 端点：
//! - 认证（登录、token 校验）
//! - campaigns / domains / pixels / api-keys / integrations CRUD
//! - traces / events 查询与删除
//! - 分析统计

mod activity;
pub mod analytics;
mod api_keys;
pub mod auth;
mod campaigns;
mod domains;
pub mod error_code;
mod helpers;
mod integrations;
mod pixels;
pub mod routes;
mod types;

// 重新导出类型
pub use types::*;

// 重新导出帮助函数
pub use helpers::{
    api_created, api_deleted, api_result, error_from_traki, error_response, json_response,
    list_response, parse_datetime, success_response,
};

// 重新导出错误码
pub use error_code::ErrorCode;
