use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "domains")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub hostname: String,
    /// pending | active | failed | unmanaged
    pub status: String,
    pub ssl_status: Option<String>,
    /// Cloudflare custom hostname id
    pub cf_hostname_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub verification_errors: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
