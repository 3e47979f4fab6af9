//! Analytics 相关的数据库查询
//!
//! 提供 trace/event 聚合查询，供 AnalyticsService 调用。

use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

use super::events::event_condition;
use super::traces::trace_condition;
use crate::errors::Result;
use crate::storage::models::{EventFilter, TraceFilter};

use migration::entities::{event, trace};

/// 地理位置查询结果行（按 city + region 分组）
#[derive(Debug, Clone, FromQueryResult)]
pub struct GeoRow {
    pub city: Option<String>,
    pub region: Option<String>,
    pub count: i64,
}

/// 单个 campaign 的计数
#[derive(Debug, Clone, FromQueryResult)]
pub struct CampaignCount {
    pub campaign_id: String,
    pub count: i64,
}

/// 概览计数
#[derive(Debug, Clone, Default)]
pub struct OverviewCounts {
    pub total_traces: u64,
    pub total_events: u64,
    pub traces_by_campaign: Vec<CampaignCount>,
    pub events_by_campaign: Vec<CampaignCount>,
}

impl super::SeaOrmStorage {
    /// 按城市/地区聚合 trace 数量（忽略没有城市的记录）
    pub async fn trace_geo_rows(&self, filter: &TraceFilter) -> Result<Vec<GeoRow>> {
        let rows = trace::Entity::find()
            .select_only()
            .column(trace::Column::City)
            .column(trace::Column::Region)
            .column_as(trace::Column::Id.count(), "count")
            .filter(trace_condition(filter))
            .filter(trace::Column::City.is_not_null())
            .group_by(trace::Column::City)
            .group_by(trace::Column::Region)
            .order_by_desc(Expr::cust("count"))
            .into_model::<GeoRow>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn overview_counts(
        &self,
        trace_filter: &TraceFilter,
        event_filter: &EventFilter,
    ) -> Result<OverviewCounts> {
        let total_traces = trace::Entity::find()
            .filter(trace_condition(trace_filter))
            .count(&self.db)
            .await?;

        let total_events = event::Entity::find()
            .filter(event_condition(event_filter))
            .count(&self.db)
            .await?;

        let traces_by_campaign = trace::Entity::find()
            .select_only()
            .column(trace::Column::CampaignId)
            .column_as(trace::Column::Id.count(), "count")
            .filter(trace_condition(trace_filter))
            .group_by(trace::Column::CampaignId)
            .order_by_desc(Expr::cust("count"))
            .into_model::<CampaignCount>()
            .all(&self.db)
            .await?;

        let events_by_campaign = event::Entity::find()
            .select_only()
            .column(event::Column::CampaignId)
            .column_as(event::Column::Id.count(), "count")
            .filter(event_condition(event_filter))
            .group_by(event::Column::CampaignId)
            .order_by_desc(Expr::cust("count"))
            .into_model::<CampaignCount>()
            .all(&self.db)
            .await?;

        Ok(OverviewCounts {
            total_traces,
            total_events,
            traces_by_campaign,
            events_by_campaign,
        })
    }
}
