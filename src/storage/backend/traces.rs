use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::{debug, info};

use super::converters::{model_to_trace, trace_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, TrakiError};
use crate::storage::models::{Page, PageRequest, Trace, TraceFilter};

use migration::entities::{event, trace};

pub(super) fn trace_condition(filter: &TraceFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(ref campaign_id) = filter.campaign_id {
        condition = condition.add(trace::Column::CampaignId.eq(campaign_id.as_str()));
    }
    if let Some(after) = filter.created_after {
        condition = condition.add(trace::Column::CreatedAt.gte(after));
    }
    if let Some(before) = filter.created_before {
        condition = condition.add(trace::Column::CreatedAt.lte(before));
    }
    condition
}

impl SeaOrmStorage {
    pub async fn insert_trace(&self, t: &Trace) -> Result<()> {
        let db = &self.db;
        retry::with_retry(&format!("insert_trace({})", t.id), self.retry_config, || async {
            trace::Entity::insert(trace_to_active_model(t))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| TrakiError::database_operation(format!("写入 trace 失败: {}", e)))?;

        debug!("Trace recorded: {} (campaign {})", t.id, t.campaign_id);
        Ok(())
    }

    pub async fn get_trace(&self, id: &str) -> Result<Option<Trace>> {
        let db = &self.db;
        let id_owned = id.to_string();
        let model = retry::with_retry(&format!("get_trace({})", id), self.retry_config, || async {
            trace::Entity::find_by_id(id_owned.clone()).one(db).await
        })
        .await?;
        Ok(model.map(model_to_trace))
    }

    pub async fn list_traces(
        &self,
        filter: &TraceFilter,
        page: PageRequest,
    ) -> Result<Page<Trace>> {
        let select = trace::Entity::find()
            .filter(trace_condition(filter))
            .order_by_desc(trace::Column::CreatedAt);
        Ok(self
            .paginate("list_traces", select, page)
            .await?
            .map(model_to_trace))
    }

    /// 删除 trace 及其事件
    pub async fn delete_trace(&self, id: &str) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TrakiError::database_operation(format!("开始事务失败: {}", e)))?;

        event::Entity::delete_many()
            .filter(event::Column::TraceId.eq(id))
            .exec(&txn)
            .await?;

        let result = trace::Entity::delete_by_id(id.to_string()).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!("Trace 不存在: {}", id)));
        }

        txn.commit()
            .await
            .map_err(|e| TrakiError::database_operation(format!("提交事务失败: {}", e)))?;
        info!("Trace deleted: {}", id);
        Ok(())
    }
}
