//! Admin API 认证相关端点

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, Result as ActixResult, web};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use crate::api::jwt::get_jwt_service;
use crate::config::get_config;

use super::error_code::ErrorCode;
use super::helpers::{error_response, success_response};
use super::types::{AuthSuccessResponse, LoginCredentials, MessageResponse};

/// 常量时间比较，避免逐字节短路
pub fn token_matches(provided: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

/// 登录：校验 admin token，签发 access token
pub async fn login(
    _req: HttpRequest,
    body: web::Json<LoginCredentials>,
) -> ActixResult<impl Responder> {
    let config = get_config();

    if !token_matches(&body.token, &config.api.admin_token) {
        warn!("Admin API: login failed - invalid token");
        return Ok(error_response(
            StatusCode::UNAUTHORIZED,
            ErrorCode::AuthFailed,
            "Invalid admin token",
        ));
    }

    let jwt_service = get_jwt_service();
    let access_token = match jwt_service.generate_access_token() {
        Ok(token) => token,
        Err(e) => {
            error!("Admin API: failed to generate access token: {}", e);
            return Ok(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
                "Failed to generate token",
            ));
        }
    };

    info!("Admin API: login successful");
    Ok(success_response(AuthSuccessResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: jwt_service.access_token_ttl_secs(),
    }))
}

/// 验证 token - 如果中间件通过，则 token 有效
pub async fn verify_token(_req: HttpRequest) -> HttpResponse {
    success_response(MessageResponse {
        message: "Token is valid".to_string(),
    })
}
