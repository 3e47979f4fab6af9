//! Admin API: campaigns and their pixel associations

use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::trace;

use crate::services::CampaignService;
use crate::storage::{CampaignFilter, PageRequest};
use crate::utils::non_empty;

use super::helpers::{api_created, api_deleted, api_result, list_response};
use super::types::{
    AttachPixelBody, CampaignListQuery, CreateCampaignBody, UpdateCampaignBody,
    UpdateCampaignPixelBody,
};

type Service = web::Data<Arc<CampaignService>>;

pub async fn list_campaigns(
    query: web::Query<CampaignListQuery>,
    service: Service,
) -> HttpResponse {
    trace!("Admin API: list campaigns {:?}", query);
    let query = query.into_inner();
    let filter = CampaignFilter {
        search: non_empty(query.search),
        status: query.status,
    };
    let page = PageRequest::new(query.page, query.page_size);
    list_response(service.list(&filter, page).await, |c| c)
}

pub async fn create_campaign(
    body: web::Json<CreateCampaignBody>,
    service: Service,
) -> HttpResponse {
    api_created(service.create(body.into_inner().into()).await)
}

pub async fn get_campaign(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.get(&path).await)
}

pub async fn update_campaign(
    path: web::Path<String>,
    body: web::Json<UpdateCampaignBody>,
    service: Service,
) -> HttpResponse {
    api_result(service.update(&path, body.into_inner().into()).await)
}

pub async fn delete_campaign(path: web::Path<String>, service: Service) -> HttpResponse {
    api_deleted(service.delete(&path).await)
}

// ============ /campaigns/{id}/pixels ============

pub async fn list_campaign_pixels(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.list_pixels(&path).await)
}

pub async fn attach_pixel(
    path: web::Path<String>,
    body: web::Json<AttachPixelBody>,
    service: Service,
) -> HttpResponse {
    api_created(service.attach_pixel(&path, body.into_inner().into()).await)
}

pub async fn update_campaign_pixel(
    path: web::Path<(String, String)>,
    body: web::Json<UpdateCampaignPixelBody>,
    service: Service,
) -> HttpResponse {
    let (campaign_id, pixel_id) = path.into_inner();
    api_result(
        service
            .update_pixel(&campaign_id, &pixel_id, body.into_inner().into())
            .await,
    )
}

pub async fn detach_pixel(path: web::Path<(String, String)>, service: Service) -> HttpResponse {
    let (campaign_id, pixel_id) = path.into_inner();
    api_deleted(service.detach_pixel(&campaign_id, &pixel_id).await)
}
