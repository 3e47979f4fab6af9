//! Admin API: custom domains

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::services::DomainService;

use super::helpers::{api_created, api_deleted, api_result, list_response};
use super::types::{CreateDomainBody, ListQuery};

type Service = web::Data<Arc<DomainService>>;

pub async fn list_domains(query: web::Query<ListQuery>, service: Service) -> HttpResponse {
    list_response(service.list(query.page_request()).await, |d| d)
}

pub async fn create_domain(body: web::Json<CreateDomainBody>, service: Service) -> HttpResponse {
    api_created(service.create(&body.hostname).await)
}

pub async fn get_domain(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.get(&path).await)
}

/// 从 Cloudflare 同步验证/SSL 状态
pub async fn refresh_domain(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.refresh(&path).await)
}

pub async fn delete_domain(path: web::Path<String>, service: Service) -> HttpResponse {
    api_deleted(service.delete(&path).await)
}
