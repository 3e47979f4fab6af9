//! 追踪表迁移
//!
//! 创建 traces（点击记录）与 events（转化事件）表，以及分析查询需要的索引

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Traces::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Traces::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Traces::CampaignId).string_len(36).not_null())
                    .col(ColumnDef::new(Traces::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(Traces::UserAgent).text().null())
                    .col(ColumnDef::new(Traces::Browser).string_len(64).null())
                    .col(ColumnDef::new(Traces::Os).string_len(64).null())
                    .col(ColumnDef::new(Traces::Device).string_len(32).null())
                    .col(
                        ColumnDef::new(Traces::IsBot)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Traces::Referrer).text().null())
                    .col(ColumnDef::new(Traces::LandingUrl).text().null())
                    .col(ColumnDef::new(Traces::UtmSource).string_len(255).null())
                    .col(ColumnDef::new(Traces::UtmMedium).string_len(255).null())
                    .col(ColumnDef::new(Traces::UtmCampaign).string_len(255).null())
                    .col(ColumnDef::new(Traces::UtmTerm).string_len(255).null())
                    .col(ColumnDef::new(Traces::UtmContent).string_len(255).null())
                    .col(ColumnDef::new(Traces::Fbclid).string_len(512).null())
                    .col(ColumnDef::new(Traces::Ttclid).string_len(512).null())
                    .col(ColumnDef::new(Traces::Gclid).string_len(512).null())
                    .col(ColumnDef::new(Traces::Country).string_len(2).null())
                    .col(ColumnDef::new(Traces::Region).string_len(64).null())
                    .col(ColumnDef::new(Traces::City).string_len(100).null())
                    .col(
                        ColumnDef::new(Traces::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 单 campaign 时间序列查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_traces_campaign_time")
                    .table(Traces::Table)
                    .col(Traces::CampaignId)
                    .col(Traces::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_traces_created_at")
                    .table(Traces::Table)
                    .col(Traces::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::TraceId).string_len(36).not_null())
                    .col(ColumnDef::new(Events::CampaignId).string_len(36).not_null())
                    .col(ColumnDef::new(Events::EventName).string_len(128).not_null())
                    .col(ColumnDef::new(Events::Value).double().null())
                    .col(ColumnDef::new(Events::Currency).string_len(3).null())
                    .col(ColumnDef::new(Events::EmailHash).string_len(64).null())
                    .col(ColumnDef::new(Events::PhoneHash).string_len(64).null())
                    .col(ColumnDef::new(Events::SourceUrl).text().null())
                    .col(
                        ColumnDef::new(Events::ForwardStatus)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Events::ForwardResults).text().null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
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
                    .name("idx_events_trace_id")
                    .table(Events::Table)
                    .col(Events::TraceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_campaign_time")
                    .table(Events::Table)
                    .col(Events::CampaignId)
                    .col(Events::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_events_campaign_time").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_events_trace_id").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_traces_created_at").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_traces_campaign_time").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Traces::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Traces {
    #[sea_orm(iden = "traces")]
    Table,
    Id,
    CampaignId,
    IpAddress,
    UserAgent,
    Browser,
    Os,
    Device,
    IsBot,
    Referrer,
    LandingUrl,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    UtmTerm,
    UtmContent,
    Fbclid,
    Ttclid,
    Gclid,
    Country,
    Region,
    City,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Events {
    #[sea_orm(iden = "events")]
    Table,
    Id,
    TraceId,
    CampaignId,
    EventName,
    Value,
    Currency,
    EmailHash,
    PhoneHash,
    SourceUrl,
    ForwardStatus,
    ForwardResults,
    CreatedAt,
}
