//! Admin API: pixel credentials (access tokens are masked in responses)

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::services::PixelService;

use super::helpers::{api_created, api_deleted, api_result, list_response};
use super::types::{CreatePixelBody, ListQuery, PixelResponse, UpdatePixelBody};

type Service = web::Data<Arc<PixelService>>;

pub async fn list_pixels(query: web::Query<ListQuery>, service: Service) -> HttpResponse {
    list_response(service.list(query.page_request()).await, PixelResponse::from)
}

pub async fn create_pixel(body: web::Json<CreatePixelBody>, service: Service) -> HttpResponse {
    api_created(
        service
            .create(body.into_inner().into())
            .await
            .map(PixelResponse::from),
    )
}

pub async fn get_pixel(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.get(&path).await.map(PixelResponse::from))
}

pub async fn update_pixel(
    path: web::Path<String>,
    body: web::Json<UpdatePixelBody>,
    service: Service,
) -> HttpResponse {
    api_result(
        service
            .update(&path, body.into_inner().into())
            .await
            .map(PixelResponse::from),
    )
}

pub async fn delete_pixel(path: web::Path<String>, service: Service) -> HttpResponse {
    api_deleted(service.delete(&path).await)
}
