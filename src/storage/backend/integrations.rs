use sea_orm::{EntityTrait, QueryOrder};
use tracing::info;

use super::SeaOrmStorage;
use super::converters::{integration_to_active_model, model_to_integration};
use crate::errors::{Result, TrakiError};
use crate::storage::models::{Integration, Page, PageRequest};

use migration::entities::integration;

impl SeaOrmStorage {
    pub async fn get_integration(&self, id: &str) -> Result<Option<Integration>> {
        let model = integration::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_integration))
    }

    pub async fn list_integrations(&self, page: PageRequest) -> Result<Page<Integration>> {
        let select = integration::Entity::find().order_by_desc(integration::Column::CreatedAt);
        Ok(self
            .paginate("list_integrations", select, page)
            .await?
            .map(model_to_integration))
    }

    pub async fn insert_integration(&self, i: &Integration) -> Result<()> {
        integration::Entity::insert(integration_to_active_model(i, true))
            .exec(&self.db)
            .await
            .map_err(|e| {
                TrakiError::database_operation(format!("创建 integration 失败: {}", e))
            })?;
        info!("Integration created: {} ({})", i.name, i.provider);
        Ok(())
    }

    pub async fn update_integration(&self, i: &Integration) -> Result<()> {
        integration::Entity::update(integration_to_active_model(i, false))
            .exec(&self.db)
            .await
            .map_err(|e| {
                TrakiError::database_operation(format!("更新 integration 失败: {}", e))
            })?;
        Ok(())
    }

    pub async fn delete_integration(&self, id: &str) -> Result<()> {
        let result = integration::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!("Integration 不存在: {}", id)));
        }
        info!("Integration deleted: {}", id);
        Ok(())
    }
}
