//! Analytics 集成测试：地理报表与概览

mod common;

use chrono::{Duration, Utc};

use traki::errors::TrakiError;
use traki::services::{AnalyticsQuery, CreateCampaignRequest, RecordEventRequest, TraceInput};
use traki::storage::Trace;

use common::{setup, wait_for_forwards};

async fn create_campaign(env: &common::TestEnv, name: &str) -> String {
    env.services
        .campaigns
        .create(CreateCampaignRequest {
            name: name.to_string(),
            destination_url: "https://shop.example.com/landing".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
}

fn trace(id: &str, campaign_id: &str, city: Option<&str>, region: Option<&str>) -> Trace {
    Trace {
        id: id.to_string(),
        campaign_id: campaign_id.to_string(),
        country: Some("BR".to_string()),
        region: region.map(str::to_string),
        city: city.map(str::to_string),
        created_at: Utc::now(),
        ..Default::default()
    }
}

async fn insert_many(
    env: &common::TestEnv,
    campaign_id: &str,
    prefix: &str,
    n: usize,
    city: Option<&str>,
    region: Option<&str>,
) {
    for i in 0..n {
        env.storage
            .insert_trace(&trace(&format!("{}-{}", prefix, i), campaign_id, city, region))
            .await
            .unwrap();
    }
}

#[actix_rt::test]
async fn test_geo_report_merges_accent_variants_by_state() {
    let env = setup().await;
    let campaign = create_campaign(&env, "Geo").await;

    insert_many(&env, &campaign, "acc", 3, Some("São Paulo"), Some("SP")).await;
    insert_many(&env, &campaign, "plain", 2, Some("Sao Paulo"), Some("SP")).await;
    insert_many(&env, &campaign, "lis", 1, Some("Lisbon"), None).await;
    insert_many(&env, &campaign, "none", 2, None, None).await;

    let report = env
        .services
        .analytics
        .geo_report(&AnalyticsQuery::default())
        .await
        .unwrap();

    let count_of = |label: &str| {
        report
            .points
            .iter()
            .find(|p| p.city == label)
            .map(|p| p.count)
    };
    assert_eq!(count_of("São Paulo, SP"), Some(3));
    assert_eq!(count_of("Sao Paulo, SP"), Some(2));
    assert_eq!(count_of("Lisbon"), Some(1));
    assert_eq!(report.points.len(), 3);

    assert_eq!(report.aggregation.states.len(), 1);
    assert_eq!(report.aggregation.states.get("sp"), Some(&5));
    assert_eq!(report.aggregation.cities.get("sao paulo, sp"), Some(&5));
    // 没有逗号：只进城市桶
    assert_eq!(report.aggregation.cities.get("lisbon"), Some(&1));
}

#[actix_rt::test]
async fn test_geo_report_uses_lookup_location() {
    let env = setup().await;
    let campaign = create_campaign(&env, "Lookup").await;

    env.services
        .tracking
        .record_trace(
            &campaign,
            TraceInput {
                ip_address: Some("203.0.113.9".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // 私有地址不查询
    env.services
        .tracking
        .record_trace(
            &campaign,
            TraceInput {
                ip_address: Some("10.0.0.7".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let report = env
        .services
        .analytics
        .geo_report(&AnalyticsQuery::default())
        .await
        .unwrap();
    assert_eq!(report.points.len(), 1);
    assert_eq!(report.points[0].city, "São Paulo, SP");
    assert_eq!(report.points[0].count, 1);
}

#[actix_rt::test]
async fn test_geo_report_filters_by_campaign_and_range() {
    let env = setup().await;
    let first = create_campaign(&env, "First").await;
    let second = create_campaign(&env, "Second").await;

    insert_many(&env, &first, "f", 2, Some("Recife"), Some("PE")).await;
    insert_many(&env, &second, "s", 4, Some("Curitiba"), Some("PR")).await;

    let report = env
        .services
        .analytics
        .geo_report(&AnalyticsQuery {
            campaign_id: Some(first.clone()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(report.points.len(), 1);
    assert_eq!(report.points[0].city, "Recife, PE");
    assert_eq!(report.aggregation.states.get("pe"), Some(&2));
    assert!(report.aggregation.states.get("pr").is_none());

    let future = env
        .services
        .analytics
        .geo_report(&AnalyticsQuery {
            start: Some(Utc::now() + Duration::days(1)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(future.points.is_empty());
    assert!(future.aggregation.cities.is_empty());
}

#[actix_rt::test]
async fn test_overview_counts_and_conversion_rates() {
    let env = setup().await;
    let busy = create_campaign(&env, "Busy").await;
    let quiet = create_campaign(&env, "Quiet").await;

    insert_many(&env, &busy, "b", 4, None, None).await;
    insert_many(&env, &quiet, "q", 1, None, None).await;

    env.services
        .tracking
        .record_event(RecordEventRequest {
            trace_id: "b-0".to_string(),
            event_name: "Purchase".to_string(),
            value: Some(99.9),
            ..Default::default()
        })
        .await
        .unwrap();
    wait_for_forwards(&env).await;

    let overview = env
        .services
        .analytics
        .overview(&AnalyticsQuery::default())
        .await
        .unwrap();

    assert_eq!(overview.total_traces, 5);
    assert_eq!(overview.total_events, 1);
    assert!((overview.conversion_rate - 0.2).abs() < 1e-9);

    assert_eq!(overview.campaigns.len(), 2);
    let top = &overview.campaigns[0];
    assert_eq!(top.campaign_id, busy);
    assert_eq!(top.name.as_deref(), Some("Busy"));
    assert_eq!(top.traces, 4);
    assert_eq!(top.events, 1);
    assert!((top.conversion_rate - 0.25).abs() < 1e-9);

    let bottom = &overview.campaigns[1];
    assert_eq!(bottom.campaign_id, quiet);
    assert_eq!(bottom.events, 0);
    assert_eq!(bottom.conversion_rate, 0.0);
}

#[actix_rt::test]
async fn test_overview_empty_store_has_zero_rate() {
    let env = setup().await;
    let overview = env
        .services
        .analytics
        .overview(&AnalyticsQuery::default())
        .await
        .unwrap();
    assert_eq!(overview.total_traces, 0);
    assert_eq!(overview.conversion_rate, 0.0);
    assert!(overview.campaigns.is_empty());
}

#[actix_rt::test]
async fn test_inverted_range_rejected() {
    let env = setup().await;
    let now = Utc::now();
    let err = env
        .services
        .analytics
        .overview(&AnalyticsQuery {
            start: Some(now),
            end: Some(now - Duration::hours(1)),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TrakiError::Validation(_)));
}
