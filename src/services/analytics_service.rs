//! Analytics service layer
//!
//! Geo map data and the campaign overview, built from stored traces and
//! events. All queries aggregate in the database; nothing is cached.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use ts_rs::TS;

use crate::analytics::{GeoAggregation, GeoPoint, aggregate};
use crate::errors::{Result, TrakiError};
use crate::storage::models::TS_EXPORT_PATH;
use crate::storage::{EventFilter, GeoRow, SeaOrmStorage, TraceFilter};

// ============ 公共类型定义 ============

/// 分析查询范围
#[derive(Debug, Clone, Default)]
pub struct AnalyticsQuery {
    pub campaign_id: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl AnalyticsQuery {
    fn validate(&self) -> Result<()> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start > end
        {
            return Err(TrakiError::validation("start must not be after end"));
        }
        Ok(())
    }

    fn trace_filter(&self) -> TraceFilter {
        TraceFilter {
            campaign_id: self.campaign_id.clone(),
            created_after: self.start,
            created_before: self.end,
        }
    }

    fn event_filter(&self) -> EventFilter {
        EventFilter {
            campaign_id: self.campaign_id.clone(),
            created_after: self.start,
            created_before: self.end,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct GeoReport {
    pub points: Vec<GeoPoint>,
    pub aggregation: GeoAggregation,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct CampaignOverview {
    pub campaign_id: String,
    pub name: Option<String>,
    pub traces: u64,
    pub events: u64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct OverviewReport {
    pub total_traces: u64,
    pub total_events: u64,
    /// events / traces，无 trace 时为 0
    pub conversion_rate: f64,
    pub campaigns: Vec<CampaignOverview>,
}

pub fn conversion_rate(events: u64, traces: u64) -> f64 {
    if traces == 0 {
        0.0
    } else {
        events as f64 / traces as f64
    }
}

/// `"City, ST"`；没有地区时只用城市名
pub fn geo_point(row: &GeoRow) -> Option<GeoPoint> {
    let city = row.city.as_deref()?.trim();
    if city.is_empty() || row.count <= 0 {
        return None;
    }
    let label = match row.region.as_deref().map(str::trim) {
        Some(region) if !region.is_empty() => format!("{}, {}", city, region),
        _ => city.to_string(),
    };
    Some(GeoPoint {
        city: label,
        count: row.count as u64,
    })
}

// ============ AnalyticsService ============

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn geo_report(&self, query: &AnalyticsQuery) -> Result<GeoReport> {
        query.validate()?;
        let rows = self.storage.trace_geo_rows(&query.trace_filter()).await?;
        let points: Vec<GeoPoint> = rows.iter().filter_map(geo_point).collect();
        let aggregation = aggregate(&points);
        debug!(
            "Geo report: {} points, {} states, {} cities",
            points.len(),
            aggregation.states.len(),
            aggregation.cities.len()
        );
        Ok(GeoReport {
            points,
            aggregation,
        })
    }

    pub async fn overview(&self, query: &AnalyticsQuery) -> Result<OverviewReport> {
        query.validate()?;
        let counts = self
            .storage
            .overview_counts(&query.trace_filter(), &query.event_filter())
            .await?;

        let mut per_campaign: HashMap<String, (u64, u64)> = HashMap::new();
        for row in &counts.traces_by_campaign {
            per_campaign.entry(row.campaign_id.clone()).or_default().0 = row.count.max(0) as u64;
        }
        for row in &counts.events_by_campaign {
            per_campaign.entry(row.campaign_id.clone()).or_default().1 = row.count.max(0) as u64;
        }

        let ids: Vec<String> = per_campaign.keys().cloned().collect();
        let mut names = self.storage.get_campaign_names(&ids).await?;

        let mut campaigns: Vec<CampaignOverview> = per_campaign
            .into_iter()
            .map(|(campaign_id, (traces, events))| CampaignOverview {
                name: names.remove(&campaign_id),
                campaign_id,
                traces,
                events,
                conversion_rate: conversion_rate(events, traces),
            })
            .collect();
        campaigns.sort_by(|a, b| {
            b.traces
                .cmp(&a.traces)
                .then_with(|| a.campaign_id.cmp(&b.campaign_id))
        });

        Ok(OverviewReport {
            total_traces: counts.total_traces,
            total_events: counts.total_events,
            conversion_rate: conversion_rate(counts.total_events, counts.total_traces),
            campaigns,
        })
    }
}
