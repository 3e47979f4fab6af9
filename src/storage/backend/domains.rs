use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::converters::{domain_to_active_model, model_to_domain};
use super::{SeaOrmStorage, retry};
use crate::errors::{Result, TrakiError};
use crate::storage::models::{Domain, Page, PageRequest};

use migration::entities::domain;

impl SeaOrmStorage {
    pub async fn get_domain(&self, id: &str) -> Result<Option<Domain>> {
        let db = &self.db;
        let id_owned = id.to_string();
        let model = retry::with_retry(&format!("get_domain({})", id), self.retry_config, || async {
            domain::Entity::find_by_id(id_owned.clone()).one(db).await
        })
        .await?;
        Ok(model.map(model_to_domain))
    }

    pub async fn find_domain_by_hostname(&self, hostname: &str) -> Result<Option<Domain>> {
        let model = domain::Entity::find()
            .filter(domain::Column::Hostname.eq(hostname))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_domain))
    }

    pub async fn list_domains(&self, page: PageRequest) -> Result<Page<Domain>> {
        let select = domain::Entity::find().order_by_desc(domain::Column::CreatedAt);
        Ok(self
            .paginate("list_domains", select, page)
            .await?
            .map(model_to_domain))
    }

    pub async fn insert_domain(&self, d: &Domain) -> Result<()> {
        domain::Entity::insert(domain_to_active_model(d, true))
            .exec(&self.db)
            .await
            .map_err(|e| TrakiError::database_operation(format!("创建 domain 失败: {}", e)))?;
        info!("Domain created: {} ({})", d.hostname, d.id);
        Ok(())
    }

    pub async fn update_domain(&self, d: &Domain) -> Result<()> {
        let db = &self.db;
        retry::with_retry(&format!("update_domain({})", d.id), self.retry_config, || async {
            domain::Entity::update(domain_to_active_model(d, false))
                .exec(db)
                .await
                .map(|_| ())
        })
        .await
        .map_err(|e| TrakiError::database_operation(format!("更新 domain 失败: {}", e)))
    }

    pub async fn delete_domain(&self, id: &str) -> Result<()> {
        let result = domain::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(TrakiError::not_found(format!("Domain 不存在: {}", id)));
        }
        info!("Domain deleted: {}", id);
        Ok(())
    }
}
