use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::info;

use super::converters::{api_key_to_active_model, model_to_api_key};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, TrakiError};
use crate::storage::models::{ApiKey, Page, PageRequest};

use migration::entities::api_key;

impl SeaOrmStorage {
    pub async fn find_api_key_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        let db = &self.db;
        let hash_owned = key_hash.to_string();
        let model = retry::with_retry("find_api_key_by_hash", self.retry_config, || async {
            api_key::Entity::find()
                .filter(api_key::Column::KeyHash.eq(hash_owned.clone()))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(model_to_api_key))
    }

    pub async fn get_api_key(&self, id: &str) -> Result<Option<ApiKey>> {
        let model = api_key::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_api_key))
    }

    pub async fn list_api_keys(&self, page: PageRequest) -> Result<Page<ApiKey>> {
        let select = api_key::Entity::find().order_by_desc(api_key::Column::CreatedAt);
        Ok(self
            .paginate("list_api_keys", select, page)
            .await?
            .map(model_to_api_key))
    }

    pub async fn insert_api_key(&self, key: &ApiKey) -> Result<()> {
        api_key::Entity::insert(api_key_to_active_model(key))
            .exec(&self.db)
            .await
            .map_err(|e| TrakiError::database_operation(format!("创建 API key 失败: {}", e)))?;
        info!("API key created: {} ({})", key.name, key.key_prefix);
        Ok(())
    }

    /// 标记吊销（保留记录以便审计）
    pub async fn revoke_api_key(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        let result = api_key::Entity::update_many()
            .set(api_key::ActiveModel {
                revoked_at: Set(Some(at)),
                ..Default::default()
            })
            .filter(api_key::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!("API key 不存在: {}", id)));
        }
        info!("API key revoked: {}", id);
        Ok(())
    }

    pub async fn touch_api_key(&self, id: &str, at: DateTime<Utc>) -> Result<()> {
        api_key::Entity::update_many()
            .set(api_key::ActiveModel {
                last_used_at: Set(Some(at)),
                ..Default::default()
            })
            .filter(api_key::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
