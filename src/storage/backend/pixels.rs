use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::info;

use super::converters::{model_to_pixel, pixel_to_active_model};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, TrakiError};
use crate::storage::models::{Page, PageRequest, Pixel};

use migration::entities::{campaign_pixel, pixel};

impl SeaOrmStorage {
    pub async fn get_pixel(&self, id: &str) -> Result<Option<Pixel>> {
        let db = &self.db;
        let id_owned = id.to_string();
        let model = retry::with_retry(&format!("get_pixel({})", id), self.retry_config, || async {
            pixel::Entity::find_by_id(id_owned.clone()).one(db).await
        })
        .await?;
        model.map(model_to_pixel).transpose()
    }

    /// 批量获取 pixel（事件转发时使用）
    pub async fn get_pixels(&self, ids: &[String]) -> Result<Vec<Pixel>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = pixel::Entity::find()
            .filter(pixel::Column::Id.is_in(ids.iter().cloned()))
            .all(&self.db)
            .await?;
        models.into_iter().map(model_to_pixel).collect()
    }

    pub async fn list_pixels(&self, page: PageRequest) -> Result<Page<Pixel>> {
        let select = pixel::Entity::find().order_by_desc(pixel::Column::CreatedAt);
        let page = self.paginate("list_pixels", select, page).await?;
        let items = page
            .items
            .into_iter()
            .map(model_to_pixel)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page {
            items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
        })
    }

    pub async fn insert_pixel(&self, p: &Pixel) -> Result<()> {
        pixel::Entity::insert(pixel_to_active_model(p, true))
            .exec(&self.db)
            .await
            .map_err(|e| TrakiError::database_operation(format!("创建 pixel 失败: {}", e)))?;
        info!("Pixel created: {} ({})", p.id, p.platform.as_ref());
        Ok(())
    }

    pub async fn update_pixel(&self, p: &Pixel) -> Result<()> {
        pixel::Entity::update(pixel_to_active_model(p, false))
            .exec(&self.db)
            .await
            .map_err(|e| TrakiError::database_operation(format!("更新 pixel 失败: {}", e)))?;
        Ok(())
    }

    /// 删除 pixel 及其 campaign 关联（单事务）
    pub async fn delete_pixel(&self, id: &str) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| TrakiError::database_operation(format!("开始事务失败: {}", e)))?;

        campaign_pixel::Entity::delete_many()
            .filter(campaign_pixel::Column::PixelId.eq(id))
            .exec(&txn)
            .await?;

        let result = pixel::Entity::delete_by_id(id.to_string()).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!("Pixel 不存在: {}", id)));
        }

        txn.commit()
            .await
            .map_err(|e| TrakiError::database_operation(format!("提交事务失败: {}", e)))?;
        info!("Pixel deleted: {}", id);
        Ok(())
    }
}
