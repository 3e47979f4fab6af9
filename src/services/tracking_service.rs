//! Click traces and conversion events
//!
//! `record_click` serves the public redirect route, `record_trace` and
//! `record_event` serve the API-key ingestion routes. Event forwarding
//! runs on a detached task after the event is stored.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use url::Url;

use crate::errors::{Result, TrakiError};
use crate::services::conversions::ConversionForwarder;
use crate::services::geoip::GeoIpProvider;
use crate::services::user_agent::parse_user_agent;
use crate::storage::{
    Campaign, CampaignStatus, Event, EventFilter, ForwardStatus, Page, PageRequest, SeaOrmStorage,
    Trace, TraceFilter,
};
use crate::utils::hashing::{hash_email, hash_phone};
use crate::utils::{new_id, non_empty};

/// Attribution fields shared by clicks and API-submitted traces
#[derive(Debug, Clone, Default)]
pub struct TraceInput {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub landing_url: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub fbclid: Option<String>,
    pub ttclid: Option<String>,
    pub gclid: Option<String>,
}

impl TraceInput {
    /// 从查询参数中取 UTM 与点击 ID
    pub fn with_query(mut self, query: &[(String, String)]) -> Self {
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| non_empty(Some(v.clone())))
        };
        self.utm_source = get("utm_source");
        self.utm_medium = get("utm_medium");
        self.utm_campaign = get("utm_campaign");
        self.utm_term = get("utm_term");
        self.utm_content = get("utm_content");
        self.fbclid = get("fbclid");
        self.ttclid = get("ttclid");
        self.gclid = get("gclid");
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordEventRequest {
    pub trace_id: String,
    pub event_name: String,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source_url: Option<String>,
    /// 平台去重 ID，缺省时使用事件 ID
    pub event_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClickOutcome {
    pub trace: Trace,
    pub redirect_url: String,
}

/// 目标 URL + 原始查询参数 + `<trace_param>=<trace_id>`
pub fn build_redirect_url(
    destination: &str,
    query: &[(String, String)],
    trace_param: &str,
    trace_id: &str,
) -> Result<String> {
    let mut url = Url::parse(destination)
        .map_err(|e| TrakiError::validation(format!("Invalid destination URL: {}", e)))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query.iter().filter(|(k, _)| k != trace_param) {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(trace_param, trace_id);
    }
    Ok(url.to_string())
}

pub struct TrackingService {
    storage: Arc<SeaOrmStorage>,
    geoip: Arc<GeoIpProvider>,
    forwarder: Arc<ConversionForwarder>,
    trace_param: String,
}

impl TrackingService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        geoip: Arc<GeoIpProvider>,
        forwarder: Arc<ConversionForwarder>,
        trace_param: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            geoip,
            forwarder,
            trace_param: trace_param.into(),
        }
    }

    async fn find_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        self.storage
            .get_campaign(campaign_id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Campaign '{}' not found", campaign_id)))
    }

    async fn build_trace(&self, campaign: &Campaign, input: TraceInput) -> Trace {
        let parsed = input
            .user_agent
            .as_deref()
            .map(parse_user_agent)
            .unwrap_or_default();

        let geo = match input.ip_address.as_deref() {
            Some(ip) => self.geoip.lookup(ip).await,
            None => None,
        };
        let geo = geo.unwrap_or_default();

        Trace {
            id: new_id(),
            campaign_id: campaign.id.clone(),
            ip_address: non_empty(input.ip_address),
            user_agent: non_empty(input.user_agent),
            browser: parsed.browser,
            os: parsed.os,
            device: parsed.device,
            is_bot: parsed.is_bot,
            referrer: non_empty(input.referrer),
            landing_url: non_empty(input.landing_url),
            utm_source: non_empty(input.utm_source).or_else(|| campaign.utm_source.clone()),
            utm_medium: non_empty(input.utm_medium).or_else(|| campaign.utm_medium.clone()),
            utm_campaign: non_empty(input.utm_campaign).or_else(|| campaign.utm_campaign.clone()),
            utm_term: non_empty(input.utm_term),
            utm_content: non_empty(input.utm_content),
            fbclid: non_empty(input.fbclid),
            ttclid: non_empty(input.ttclid),
            gclid: non_empty(input.gclid),
            country: geo.country,
            region: geo.region,
            city: geo.city,
            created_at: Utc::now(),
        }
    }

    /// 记录点击并返回跳转地址，campaign 不存在或已暂停时返回 NotFound
    pub async fn record_click(
        &self,
        campaign_id: &str,
        input: TraceInput,
        query: &[(String, String)],
    ) -> Result<ClickOutcome> {
        let campaign = self.find_campaign(campaign_id).await?;
        if campaign.status != CampaignStatus::Active {
            return Err(TrakiError::not_found(format!(
                "Campaign '{}' is not active",
                campaign_id
            )));
        }

        let trace = self.build_trace(&campaign, input.with_query(query)).await;
        self.storage.insert_trace(&trace).await?;

        let redirect_url = build_redirect_url(
            &campaign.destination_url,
            query,
            &self.trace_param,
            &trace.id,
        )?;
        debug!("Click {} on campaign {} -> {}", trace.id, campaign.id, redirect_url);

        Ok(ClickOutcome {
            trace,
            redirect_url,
        })
    }

    pub async fn record_trace(&self, campaign_id: &str, input: TraceInput) -> Result<Trace> {
        let campaign = self.find_campaign(campaign_id).await?;
        let trace = self.build_trace(&campaign, input).await;
        self.storage.insert_trace(&trace).await?;
        Ok(trace)
    }

    /// 保存事件后立即返回，转发在后台执行
    pub async fn record_event(&self, req: RecordEventRequest) -> Result<Event> {
        let event_name = req.event_name.trim();
        if event_name.is_empty() {
            return Err(TrakiError::validation("event_name cannot be empty"));
        }
        if req.value.is_some_and(|v| !v.is_finite()) {
            return Err(TrakiError::validation("value must be a finite number"));
        }

        let trace = self
            .storage
            .get_trace(&req.trace_id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Trace '{}' not found", req.trace_id)))?;

        let event = Event {
            id: new_id(),
            trace_id: trace.id.clone(),
            campaign_id: trace.campaign_id.clone(),
            event_name: event_name.to_string(),
            value: req.value,
            currency: non_empty(req.currency).map(|c| c.trim().to_uppercase()),
            email_hash: req.email.as_deref().and_then(hash_email),
            phone_hash: req.phone.as_deref().and_then(hash_phone),
            source_url: non_empty(req.source_url),
            forward_status: ForwardStatus::Pending,
            forward_results: None,
            created_at: Utc::now(),
        };
        self.storage.insert_event(&event).await?;
        info!("Event '{}' recorded for trace {}", event.event_name, trace.id);

        let dedup_id = non_empty(req.event_id).unwrap_or_else(|| event.id.clone());
        self.forwarder.spawn(event.clone(), trace, dedup_id);

        Ok(event)
    }

    pub fn forwarder(&self) -> &Arc<ConversionForwarder> {
        &self.forwarder
    }

    // ============ Admin queries ============

    pub async fn list_traces(
        &self,
        filter: &TraceFilter,
        page: PageRequest,
    ) -> Result<Page<Trace>> {
        self.storage.list_traces(filter, page).await
    }

    pub async fn get_trace(&self, id: &str) -> Result<Trace> {
        self.storage
            .get_trace(id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Trace '{}' not found", id)))
    }

    /// 连同其事件一起删除
    pub async fn delete_trace(&self, id: &str) -> Result<()> {
        self.storage.delete_trace(id).await
    }

    pub async fn list_events(
        &self,
        filter: &EventFilter,
        page: PageRequest,
    ) -> Result<Page<Event>> {
        self.storage.list_events(filter, page).await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event> {
        self.storage
            .get_event(id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Event '{}' not found", id)))
    }

    pub async fn delete_event(&self, id: &str) -> Result<()> {
        self.storage.delete_event(id).await
    }
}
