//! Campaign and campaign-pixel persistence

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::{error, info};

use super::converters::{
    campaign_pixel_to_active_model, campaign_to_active_model, model_to_campaign,
    model_to_campaign_pixel,
};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, TrakiError};
use crate::storage::models::{Campaign, CampaignFilter, CampaignPixel, Page, PageRequest};

use migration::entities::{campaign, campaign_pixel};

impl SeaOrmStorage {
    pub async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>> {
        let db = &self.db;
        let id_owned = id.to_string();

        let model = retry::with_retry(
            &format!("get_campaign({})", id),
            self.retry_config,
            || async { campaign::Entity::find_by_id(id_owned.clone()).one(db).await },
        )
        .await
        .map_err(|e| {
            error!("查询 campaign 失败（重试后仍失败）: {}", e);
            TrakiError::database_operation(format!("查询 campaign 失败: {}", e))
        })?;

        Ok(model.map(model_to_campaign))
    }

    /// 按 ID 批量查询 campaign 名称，不存在的 ID 不出现在结果中
    pub async fn get_campaign_names(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(String, String)> = campaign::Entity::find()
            .select_only()
            .column(campaign::Column::Id)
            .column(campaign::Column::Name)
            .filter(campaign::Column::Id.is_in(ids.iter().cloned()))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn list_campaigns(
        &self,
        filter: &CampaignFilter,
        page: PageRequest,
    ) -> Result<Page<Campaign>> {
        let mut condition = Condition::all();

        if let Some(ref search) = filter.search {
            condition = condition.add(
                Condition::any()
                    .add(campaign::Column::Name.contains(search))
                    .add(campaign::Column::DestinationUrl.contains(search)),
            );
        }
        if let Some(status) = filter.status {
            condition = condition.add(campaign::Column::Status.eq(status.as_ref()));
        }

        let select = campaign::Entity::find()
            .filter(condition)
            .order_by_desc(campaign::Column::CreatedAt);

        Ok(self
            .paginate("list_campaigns", select, page)
            .await?
            .map(model_to_campaign))
    }

    pub async fn insert_campaign(&self, c: &Campaign) -> Result<()> {
        let db = &self.db;
        retry::with_retry(&format!("insert_campaign({})", c.id), self.retry_config, || async {
            campaign::Entity::insert(campaign_to_active_model(c, true))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| TrakiError::database_operation(format!("创建 campaign 失败: {}", e)))?;

        info!("Campaign created: {}", c.id);
        Ok(())
    }

    pub async fn update_campaign(&self, c: &Campaign) -> Result<()> {
        let db = &self.db;
        retry::with_retry(&format!("update_campaign({})", c.id), self.retry_config, || async {
            campaign::Entity::update(campaign_to_active_model(c, false))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| TrakiError::database_operation(format!("更新 campaign 失败: {}", e)))
    }

    /// 删除 campaign 及其 pixel 关联（单事务）
    pub async fn delete_campaign(&self, id: &str) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TrakiError::database_operation(format!("开始事务失败: {}", e)))?;

        campaign_pixel::Entity::delete_many()
            .filter(campaign_pixel::Column::CampaignId.eq(id))
            .exec(&txn)
            .await?;

        let result = campaign::Entity::delete_by_id(id.to_string())
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!("Campaign 不存在: {}", id)));
        }

        txn.commit()
            .await
            .map_err(|e| TrakiError::database_operation(format!("提交事务失败: {}", e)))?;

        info!("Campaign deleted: {}", id);
        Ok(())
    }

    pub async fn list_campaign_pixels(&self, campaign_id: &str) -> Result<Vec<CampaignPixel>> {
        let db = &self.db;
        let campaign_owned = campaign_id.to_string();

        let models = retry::with_retry(
            &format!("list_campaign_pixels({})", campaign_id),
            self.retry_config,
            || async {
                campaign_pixel::Entity::find()
                    .filter(campaign_pixel::Column::CampaignId.eq(campaign_owned.clone()))
                    .order_by_asc(campaign_pixel::Column::CreatedAt)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            TrakiError::database_operation(format!("查询 campaign pixels 失败: {}", e))
        })?;

        Ok(models.into_iter().map(model_to_campaign_pixel).collect())
    }

    pub async fn get_campaign_pixel(
        &self,
        campaign_id: &str,
        pixel_id: &str,
    ) -> Result<Option<CampaignPixel>> {
        let model = campaign_pixel::Entity::find()
            .filter(campaign_pixel::Column::CampaignId.eq(campaign_id))
            .filter(campaign_pixel::Column::PixelId.eq(pixel_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_campaign_pixel))
    }

    pub async fn insert_campaign_pixel(&self, cp: &CampaignPixel) -> Result<()> {
        campaign_pixel::Entity::insert(campaign_pixel_to_active_model(cp, true))
            .exec(&self.db)
            .await
            .map_err(|e| {
                TrakiError::database_operation(format!("创建 campaign pixel 关联失败: {}", e))
            })?;
        info!(
            "Pixel {} attached to campaign {}",
            cp.pixel_id, cp.campaign_id
        );
        Ok(())
    }

    pub async fn update_campaign_pixel(&self, cp: &CampaignPixel) -> Result<()> {
        campaign_pixel::Entity::update(campaign_pixel_to_active_model(cp, false))
            .exec(&self.db)
            .await
            .map_err(|e| {
                TrakiError::database_operation(format!("更新 campaign pixel 关联失败: {}", e))
            })?;
        Ok(())
    }

    pub async fn delete_campaign_pixel(&self, campaign_id: &str, pixel_id: &str) -> Result<()> {
        let result = campaign_pixel::Entity::delete_many()
            .filter(campaign_pixel::Column::CampaignId.eq(campaign_id))
            .filter(campaign_pixel::Column::PixelId.eq(pixel_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!(
                "Pixel {} 未关联到 campaign {}",
                pixel_id, campaign_id
            )));
        }
        info!("Pixel {} detached from campaign {}", pixel_id, campaign_id);
        Ok(())
    }
}
