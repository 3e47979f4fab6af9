//! Admin API: tracking API keys (list / create / revoke)

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::services::ApiKeyService;

use super::helpers::{api_created, api_deleted, list_response};
use super::types::{ApiKeyResponse, CreateApiKeyBody, CreatedApiKeyResponse, ListQuery};

type Service = web::Data<Arc<ApiKeyService>>;

pub async fn list_api_keys(query: web::Query<ListQuery>, service: Service) -> HttpResponse {
    list_response(service.list(query.page_request()).await, ApiKeyResponse::from)
}

pub async fn create_api_key(body: web::Json<CreateApiKeyBody>, service: Service) -> HttpResponse {
    api_created(
        service
            .create(&body.name)
            .await
            .map(CreatedApiKeyResponse::from),
    )
}

/// 吊销（保留记录，之后的认证返回 401）
pub async fn revoke_api_key(path: web::Path<String>, service: Service) -> HttpResponse {
    api_deleted(service.revoke(&path).await)
}
