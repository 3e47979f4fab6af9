//! Admin API: analytics

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::{error, trace};

use crate::errors::{Result, TrakiError};
use crate::services::{AnalyticsQuery, AnalyticsService};
use crate::utils::non_empty;

use super::error_code::ErrorCode;
use super::helpers::{error_from_traki, error_response, success_response};
use super::types::AnalyticsQueryParams;

type Service = web::Data<Arc<AnalyticsService>>;

fn to_query(params: &AnalyticsQueryParams) -> Result<AnalyticsQuery> {
    Ok(AnalyticsQuery {
        campaign_id: non_empty(params.campaign_id.clone()),
        start: super::helpers::parse_datetime("start", params.start.as_deref())?,
        end: super::helpers::parse_datetime("end", params.end.as_deref())?,
    })
}

/// 查询失败时统一使用 AnalyticsQueryFailed
fn analytics_error(err: &TrakiError) -> HttpResponse {
    match err {
        TrakiError::Validation(_) | TrakiError::DateParse(_) => error_from_traki(err),
        _ => {
            error!("Analytics query failed: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::AnalyticsQueryFailed,
                "Analytics query failed",
            )
        }
    }
}

/// GET /analytics/geo
pub async fn get_geo(params: web::Query<AnalyticsQueryParams>, service: Service) -> HttpResponse {
    trace!("Admin API: geo analytics {:?}", params);
    let result = match to_query(&params) {
        Ok(query) => service.geo_report(&query).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(report) => success_response(report),
        Err(e) => analytics_error(&e),
    }
}

/// GET /analytics/overview
pub async fn get_overview(
    params: web::Query<AnalyticsQueryParams>,
    service: Service,
) -> HttpResponse {
    trace!("Admin API: overview analytics {:?}", params);
    let result = match to_query(&params) {
        Ok(query) => service.overview(&query).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(report) => success_response(report),
        Err(e) => analytics_error(&e),
    }
}
