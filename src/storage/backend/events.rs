use sea_orm::{
    ActiveValue::Set, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::{debug, info};

use super::converters::{event_to_active_model, model_to_event};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, TrakiError};
use crate::storage::models::{Event, EventFilter, ForwardStatus, Page, PageRequest};

use migration::entities::event;

pub(super) fn event_condition(filter: &EventFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(ref trace_id) = filter.trace_id {
        condition = condition.add(event::Column::TraceId.eq(trace_id.as_str()));
    }
    if let Some(ref campaign_id) = filter.campaign_id {
        condition = condition.add(event::Column::CampaignId.eq(campaign_id.as_str()));
    }
    if let Some(ref event_name) = filter.event_name {
        condition = condition.add(event::Column::EventName.eq(event_name.as_str()));
    }
    if let Some(after) = filter.created_after {
        condition = condition.add(event::Column::CreatedAt.gte(after));
    }
    if let Some(before) = filter.created_before {
        condition = condition.add(event::Column::CreatedAt.lte(before));
    }
    condition
}

impl SeaOrmStorage {
    pub async fn insert_event(&self, e: &Event) -> Result<()> {
        let db = &self.db;
        retry::with_retry(&format!("insert_event({})", e.id), self.retry_config, || async {
            event::Entity::insert(event_to_active_model(e))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|err| TrakiError::database_operation(format!("写入 event 失败: {}", err)))?;

        debug!("Event recorded: {} {} (trace {})", e.id, e.event_name, e.trace_id);
        Ok(())
    }

    pub async fn get_event(&self, id: &str) -> Result<Option<Event>> {
        let model = event::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_event))
    }

    pub async fn list_events(
        &self,
        filter: &EventFilter,
        page: PageRequest,
    ) -> Result<Page<Event>> {
        let select = event::Entity::find()
            .filter(event_condition(filter))
            .order_by_desc(event::Column::CreatedAt);
        Ok(self
            .paginate("list_events", select, page)
            .await?
            .map(model_to_event))
    }

    /// 更新转发结果
    pub async fn set_event_forward_result(
        &self,
        id: &str,
        status: ForwardStatus,
        results: Option<&serde_json::Value>,
    ) -> Result<()> {
        let db = &self.db;
        let id_owned = id.to_string();
        let results_text = results.map(|v| v.to_string());

        retry::with_retry(
            &format!("set_event_forward_result({})", id),
            self.retry_config,
            || async {
                event::Entity::update_many()
                    .set(event::ActiveModel {
                        forward_status: Set(status.as_ref().to_string()),
                        forward_results: Set(results_text.clone()),
                        ..Default::default()
                    })
                    .filter(event::Column::Id.eq(id_owned.clone()))
                    .exec(db)
                    .await
                    .map(|_| ())
            },
        )
        .await
        .map_err(|e| TrakiError::database_operation(format!("更新转发状态失败: {}", e)))
    }

    pub async fn delete_event(&self, id: &str) -> Result<()> {
        let result = event::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!("Event 不存在: {}", id)));
        }
        info!("Event deleted: {}", id);
        Ok(())
    }
}
