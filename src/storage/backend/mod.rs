//! SeaORM storage backend
//!
//! Database storage for traki resources, supporting SQLite,
//! MySQL/MariaDB, and PostgreSQL.

mod analytics;
mod api_keys;
mod campaigns;
mod connection;
mod converters;
mod domains;
mod events;
mod integrations;
mod pixels;
pub mod retry;
mod traces;

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, TrakiError};
use crate::storage::models::{Page, PageRequest, StorageConfig};

pub use analytics::{CampaignCount, GeoRow, OverviewCounts};
pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(TrakiError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = config.database_url.as_str();
        if database_url.is_empty() {
            return Err(TrakiError::database_config("database_url 未设置"));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, config.pool_size, config.timeout).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry_config: retry::RetryConfig::from(config),
        };

        run_migrations(&storage.db).await?;

        info!(
            "{} storage initialized",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
        }
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 数据库连通性检查（用于健康检查）
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| TrakiError::database_connection(format!("数据库不可用: {}", e)))
    }

    /// 对任意 Select 执行 COUNT + 分页查询（均带重试）
    pub(crate) async fn paginate<E>(
        &self,
        operation: &str,
        select: Select<E>,
        page: PageRequest,
    ) -> Result<Page<E::Model>>
    where
        E: EntityTrait,
        E::Model: Send + Sync,
    {
        let db = &self.db;

        let total = retry::with_retry(
            &format!("{}(count)", operation),
            self.retry_config,
            || async { select.clone().count(db).await },
        )
        .await
        .map_err(|e| TrakiError::database_operation(format!("{} 计数失败: {}", operation, e)))?;

        let items = retry::with_retry(&format!("{}(data)", operation), self.retry_config, || async {
            select
                .clone()
                .paginate(db, page.page_size)
                .fetch_page(page.page.saturating_sub(1))
                .await
        })
        .await
        .map_err(|e| {
            TrakiError::database_operation(format!("{} 分页查询失败: {}", operation, e))
        })?;

        Ok(Page {
            items,
            total,
            page: page.page,
            page_size: page.page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("sqlite://traki.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/traki.sqlite").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mariadb://u:p@h/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("postgresql://h/db").unwrap(), "postgres");
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }
}
