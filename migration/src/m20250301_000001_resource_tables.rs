//! 资源表迁移
//!
//! 创建 campaigns、domains、pixels、campaign_pixels、integrations 表

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 campaigns 表
        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campaigns::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Campaigns::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Campaigns::DestinationUrl).text().not_null())
                    .col(
                        ColumnDef::new(Campaigns::Status)
                            .string_len(16)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(Campaigns::DomainId).string_len(36).null())
                    .col(ColumnDef::new(Campaigns::UtmSource).string_len(255).null())
                    .col(ColumnDef::new(Campaigns::UtmMedium).string_len(255).null())
                    .col(ColumnDef::new(Campaigns::UtmCampaign).string_len(255).null())
                    .col(
                        ColumnDef::new(Campaigns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Campaigns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaigns_created_at")
                    .table(Campaigns::Table)
                    .col(Campaigns::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 创建 domains 表
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domains::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Domains::Hostname)
                            .string_len(253)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Domains::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Domains::SslStatus).string_len(64).null())
                    .col(ColumnDef::new(Domains::CfHostnameId).string_len(64).null())
                    .col(ColumnDef::new(Domains::VerificationErrors).text().null())
                    .col(
                        ColumnDef::new(Domains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Domains::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 pixels 表
        manager
            .create_table(
                Table::create()
                    .table(Pixels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pixels::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pixels::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Pixels::Platform).string_len(32).not_null())
                    .col(ColumnDef::new(Pixels::PixelCode).string_len(128).not_null())
                    .col(ColumnDef::new(Pixels::AccessToken).text().not_null())
                    .col(
                        ColumnDef::new(Pixels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pixels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 campaign_pixels 关联表
        manager
            .create_table(
                Table::create()
                    .table(CampaignPixels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CampaignPixels::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CampaignPixels::CampaignId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignPixels::PixelId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CampaignPixels::EventName)
                            .string_len(128)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CampaignPixels::TestMode)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CampaignPixels::TestEventCode)
                            .string_len(128)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CampaignPixels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一个 campaign 只能绑定同一个 pixel 一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaign_pixels_pair")
                    .table(CampaignPixels::Table)
                    .col(CampaignPixels::CampaignId)
                    .col(CampaignPixels::PixelId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaign_pixels_pixel")
                    .table(CampaignPixels::Table)
                    .col(CampaignPixels::PixelId)
                    .to_owned(),
            )
            .await?;

        // 创建 integrations 表
        manager
            .create_table(
                Table::create()
                    .table(Integrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Integrations::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Integrations::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Integrations::Provider)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Integrations::Config).text().not_null())
                    .col(
                        ColumnDef::new(Integrations::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Integrations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Integrations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Integrations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CampaignPixels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pixels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Campaigns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Campaigns {
    #[sea_orm(iden = "campaigns")]
    Table,
    Id,
    Name,
    DestinationUrl,
    Status,
    DomainId,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Domains {
    #[sea_orm(iden = "domains")]
    Table,
    Id,
    Hostname,
    Status,
    SslStatus,
    CfHostnameId,
    VerificationErrors,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Pixels {
    #[sea_orm(iden = "pixels")]
    Table,
    Id,
    Name,
    Platform,
    PixelCode,
    AccessToken,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CampaignPixels {
    #[sea_orm(iden = "campaign_pixels")]
    Table,
    Id,
    CampaignId,
    PixelId,
    EventName,
    TestMode,
    TestEventCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Integrations {
    #[sea_orm(iden = "integrations")]
    Table,
    Id,
    Name,
    Provider,
    Config,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
