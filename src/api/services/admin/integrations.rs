//! Admin API: integrations

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::services::IntegrationService;

use super::helpers::{api_created, api_deleted, api_result, list_response};
use super::types::{CreateIntegrationBody, ListQuery, UpdateIntegrationBody};

type Service = web::Data<Arc<IntegrationService>>;

pub async fn list_integrations(query: web::Query<ListQuery>, service: Service) -> HttpResponse {
    list_response(service.list(query.page_request()).await, |i| i)
}

pub async fn create_integration(
    body: web::Json<CreateIntegrationBody>,
    service: Service,
) -> HttpResponse {
    api_created(service.create(body.into_inner().into()).await)
}

pub async fn get_integration(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.get(&path).await)
}

pub async fn update_integration(
    path: web::Path<String>,
    body: web::Json<UpdateIntegrationBody>,
    service: Service,
) -> HttpResponse {
    api_result(service.update(&path, body.into_inner().into()).await)
}

pub async fn delete_integration(path: web::Path<String>, service: Service) -> HttpResponse {
    api_deleted(service.delete(&path).await)
}
