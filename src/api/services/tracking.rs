//! 公共追踪端点
//!
//! - `GET /c/{campaign_id}`：记录点击并 302 跳转（按 IP 限流）
//! - `POST /t/v1/traces`、`POST /t/v1/events`：落地页脚本使用，需要 API key

use actix_web::http::StatusCode;
use actix_web::http::header::{LOCATION, REFERER, USER_AGENT};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, trace};
use ts_rs::TS;

use crate::api::middleware::ApiKeyAuth;
use crate::api::rate_limit::tracking_rate_limiter;
use crate::api::services::admin::{ErrorCode, api_created, error_from_traki, json_response};
use crate::config::TrackingConfig;
use crate::errors::TrakiError;
use crate::services::{RecordEventRequest, TraceInput, TrackingService};
use crate::storage::ForwardStatus;
use crate::storage::models::TS_EXPORT_PATH;
use crate::utils::ip::extract_client_ip;

type Service = web::Data<Arc<TrackingService>>;

fn header_value(req: &HttpRequest, name: actix_web::http::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// 按出现顺序解析查询参数（保留重复键）
pub fn query_pairs(query_string: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query_string.as_bytes())
        .into_owned()
        .collect()
}

fn plain_response(status: StatusCode, body: &'static str) -> HttpResponse {
    HttpResponse::build(status)
        .insert_header(("Content-Type", "text/plain; charset=utf-8"))
        .insert_header(("Cache-Control", "no-store"))
        .body(body)
}

/// GET /c/{campaign_id}
pub async fn handle_click(
    req: HttpRequest,
    path: web::Path<String>,
    service: Service,
) -> HttpResponse {
    let campaign_id = path.into_inner();
    trace!("Click on campaign {}", campaign_id);

    let query = query_pairs(req.query_string());
    let input = TraceInput {
        ip_address: extract_client_ip(&req),
        user_agent: header_value(&req, USER_AGENT),
        referrer: header_value(&req, REFERER),
        landing_url: Some(req.full_url().to_string()),
        ..Default::default()
    };

    match service.record_click(&campaign_id, input, &query).await {
        Ok(outcome) => HttpResponse::Found()
            .insert_header((LOCATION, outcome.redirect_url))
            .insert_header(("Cache-Control", "no-store"))
            .finish(),
        Err(TrakiError::NotFound(msg)) => {
            debug!("Click rejected: {}", msg);
            plain_response(StatusCode::NOT_FOUND, "Not Found")
        }
        Err(e) => {
            error!("Failed to record click on campaign {}: {}", campaign_id, e);
            plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

#[derive(Deserialize, Debug, Clone, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RecordTraceBody {
    pub campaign_id: String,
    #[ts(optional)]
    pub landing_url: Option<String>,
    #[ts(optional)]
    pub referrer: Option<String>,
    /// 缺省时取请求头
    #[ts(optional)]
    pub user_agent: Option<String>,
    /// 缺省时取请求来源 IP
    #[ts(optional)]
    pub ip_address: Option<String>,
    #[ts(optional)]
    pub utm_source: Option<String>,
    #[ts(optional)]
    pub utm_medium: Option<String>,
    #[ts(optional)]
    pub utm_campaign: Option<String>,
    #[ts(optional)]
    pub utm_term: Option<String>,
    #[ts(optional)]
    pub utm_content: Option<String>,
    #[ts(optional)]
    pub fbclid: Option<String>,
    #[ts(optional)]
    pub ttclid: Option<String>,
    #[ts(optional)]
    pub gclid: Option<String>,
}

#[derive(Serialize, Debug, Clone, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TraceCreatedResponse {
    pub trace_id: String,
}

#[derive(Deserialize, Debug, Clone, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct RecordEventBody {
    pub trace_id: String,
    pub event_name: String,
    #[ts(optional)]
    pub value: Option<f64>,
    #[ts(optional)]
    pub currency: Option<String>,
    #[ts(optional)]
    pub email: Option<String>,
    #[ts(optional)]
    pub phone: Option<String>,
    #[ts(optional)]
    pub source_url: Option<String>,
    /// 平台去重 ID
    #[ts(optional)]
    pub event_id: Option<String>,
}

impl From<RecordEventBody> for RecordEventRequest {
    fn from(body: RecordEventBody) -> Self {
        Self {
            trace_id: body.trace_id,
            event_name: body.event_name,
            value: body.value,
            currency: body.currency,
            email: body.email,
            phone: body.phone,
            source_url: body.source_url,
            event_id: body.event_id,
        }
    }
}

#[derive(Serialize, Debug, Clone, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct EventAcceptedResponse {
    pub event_id: String,
    pub forward_status: ForwardStatus,
}

/// POST /t/v1/traces
pub async fn record_trace(
    req: HttpRequest,
    body: web::Json<RecordTraceBody>,
    service: Service,
) -> HttpResponse {
    let body = body.into_inner();
    let input = TraceInput {
        ip_address: body.ip_address.or_else(|| extract_client_ip(&req)),
        user_agent: body.user_agent.or_else(|| header_value(&req, USER_AGENT)),
        referrer: body.referrer,
        landing_url: body.landing_url,
        utm_source: body.utm_source,
        utm_medium: body.utm_medium,
        utm_campaign: body.utm_campaign,
        utm_term: body.utm_term,
        utm_content: body.utm_content,
        fbclid: body.fbclid,
        ttclid: body.ttclid,
        gclid: body.gclid,
    };

    api_created(
        service
            .record_trace(&body.campaign_id, input)
            .await
            .map(|trace| TraceCreatedResponse { trace_id: trace.id }),
    )
}

/// POST /t/v1/events
///
/// 事件保存后返回 202，转发在后台进行。
pub async fn record_event(body: web::Json<RecordEventBody>, service: Service) -> HttpResponse {
    match service.record_event(body.into_inner().into()).await {
        Ok(event) => json_response(
            StatusCode::ACCEPTED,
            ErrorCode::Success,
            "Accepted",
            Some(EventAcceptedResponse {
                event_id: event.id,
                forward_status: event.forward_status,
            }),
        ),
        Err(e) => error_from_traki(&e),
    }
}

/// 点击跳转路由 `/c`
pub fn click_routes(tracking: &TrackingConfig) -> actix_web::Scope {
    web::scope("/c").route(
        "/{campaign_id}",
        web::get()
            .to(handle_click)
            .wrap(tracking_rate_limiter(tracking)),
    )
}

/// 数据采集路由，挂载在 `/t/v1` 下
pub fn ingest_routes(prefix: &str) -> actix_web::Scope {
    web::scope(prefix)
        .route("/traces", web::post().to(record_trace).wrap(ApiKeyAuth))
        .route("/events", web::post().to(record_event).wrap(ApiKeyAuth))
}
