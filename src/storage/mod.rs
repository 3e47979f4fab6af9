use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{CampaignCount, GeoRow, OverviewCounts, SeaOrmStorage};
pub use models::{
    ApiKey, Campaign, CampaignFilter, CampaignPixel, CampaignStatus, Domain, DomainStatus, Event,
    EventFilter, ForwardStatus, Integration, Page, PageRequest, Pixel, PixelPlatform, Trace,
    TraceFilter,
};

pub struct StorageFactory;

impl StorageFactory {
    /// 按全局配置创建存储（自动推断数据库类型并运行迁移）
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let storage = SeaOrmStorage::new(&config.database).await?;
        Ok(Arc::new(storage))
    }
}
