//! Event entity: one row per tracked conversion, keyed by trace_id

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub trace_id: String,
    pub campaign_id: String,
    pub event_name: String,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub email_hash: Option<String>,
    pub phone_hash: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub source_url: Option<String>,
    /// pending | sent | partial | failed | skipped
    pub forward_status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub forward_results: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
