//! Admin API: recorded traces and events

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::errors::Result;
use crate::services::TrackingService;
use crate::storage::{EventFilter, PageRequest, TraceFilter};
use crate::utils::non_empty;

use super::helpers::{api_deleted, api_result, error_from_traki, list_response, parse_datetime};
use super::types::{EventListQuery, TraceListQuery};

type Service = web::Data<Arc<TrackingService>>;

fn trace_filter(query: &TraceListQuery) -> Result<TraceFilter> {
    Ok(TraceFilter {
        campaign_id: non_empty(query.campaign_id.clone()),
        created_after: parse_datetime("start", query.start.as_deref())?,
        created_before: parse_datetime("end", query.end.as_deref())?,
    })
}

fn event_filter(query: &EventListQuery) -> Result<EventFilter> {
    Ok(EventFilter {
        trace_id: non_empty(query.trace_id.clone()),
        campaign_id: non_empty(query.campaign_id.clone()),
        event_name: non_empty(query.event_name.clone()),
        created_after: parse_datetime("start", query.start.as_deref())?,
        created_before: parse_datetime("end", query.end.as_deref())?,
    })
}

pub async fn list_traces(query: web::Query<TraceListQuery>, service: Service) -> HttpResponse {
    let filter = match trace_filter(&query) {
        Ok(filter) => filter,
        Err(e) => return error_from_traki(&e),
    };
    let page = PageRequest::new(query.page, query.page_size);
    list_response(service.list_traces(&filter, page).await, |t| t)
}

pub async fn get_trace(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.get_trace(&path).await)
}

pub async fn delete_trace(path: web::Path<String>, service: Service) -> HttpResponse {
    api_deleted(service.delete_trace(&path).await)
}

pub async fn list_events(query: web::Query<EventListQuery>, service: Service) -> HttpResponse {
    let filter = match event_filter(&query) {
        Ok(filter) => filter,
        Err(e) => return error_from_traki(&e),
    };
    let page = PageRequest::new(query.page, query.page_size);
    list_response(service.list_events(&filter, page).await, |e| e)
}

pub async fn get_event(path: web::Path<String>, service: Service) -> HttpResponse {
    api_result(service.get_event(&path).await)
}

pub async fn delete_event(path: web::Path<String>, service: Service) -> HttpResponse {
    api_deleted(service.delete_event(&path).await)
}
