//! Admin API 集成测试
//!
//! 覆盖认证、各资源 CRUD、PATCH 语义与分页元数据。

mod common;

use actix_web::App;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use serde_json::{Value, json};

use traki::api::jwt::get_jwt_service;
use traki::errors::TrakiError;
use traki::services::cloudflare::CloudflareError;

use common::{ADMIN_TOKEN, exec_sql, setup};

fn bearer() -> (String, String) {
    let token = get_jwt_service()
        .generate_access_token()
        .expect("生成 token 失败");
    ("Authorization".to_string(), format!("Bearer {}", token))
}

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

// =============================================================================
// 认证
// =============================================================================

#[actix_rt::test]
async fn test_login_issues_usable_token() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "token": ADMIN_TOKEN }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["token_type"], "Bearer");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let req = TestRequest::get()
        .uri("/api/v1/auth/verify")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_login_rejects_wrong_token() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/auth/login")
        .peer_addr(peer())
        .set_json(json!({ "token": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 2000);
}

#[actix_rt::test]
async fn test_admin_routes_require_bearer_token() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::get().uri("/api/v1/campaigns").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 2002);

    let req = TestRequest::get()
        .uri("/api/v1/campaigns")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Campaigns
// =============================================================================

#[actix_rt::test]
async fn test_campaign_crud_and_partial_update() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/campaigns")
        .insert_header(bearer())
        .set_json(json!({
            "name": "Spring Sale",
            "destination_url": "https://shop.example.com/spring",
            "utm_source": "facebook",
            "utm_medium": "cpc"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let campaign = &body["data"];
    let id = campaign["id"].as_str().unwrap().to_string();
    assert_eq!(campaign["status"], "active");
    assert_eq!(campaign["utm_source"], "facebook");

    // 缺省字段保持不变
    let req = TestRequest::patch()
        .uri(&format!("/api/v1/campaigns/{}", id))
        .insert_header(bearer())
        .set_json(json!({ "name": "Spring Sale 2", "status": "paused" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["name"], "Spring Sale 2");
    assert_eq!(body["data"]["status"], "paused");
    assert_eq!(body["data"]["utm_source"], "facebook");
    assert_eq!(body["data"]["utm_medium"], "cpc");
    assert_eq!(body["data"]["destination_url"], "https://shop.example.com/spring");

    // 显式 null 清空
    let req = TestRequest::patch()
        .uri(&format!("/api/v1/campaigns/{}", id))
        .insert_header(bearer())
        .set_json(json!({ "utm_source": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"]["utm_source"].is_null());
    assert_eq!(body["data"]["utm_medium"], "cpc");
    assert_eq!(body["data"]["name"], "Spring Sale 2");

    let req = TestRequest::delete()
        .uri(&format!("/api/v1/campaigns/{}", id))
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri(&format!("/api/v1/campaigns/{}", id))
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1004);
}

#[actix_rt::test]
async fn test_campaign_validation_errors() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/campaigns")
        .insert_header(bearer())
        .set_json(json!({ "name": "Bad", "destination_url": "javascript:alert(1)" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::post()
        .uri("/api/v1/campaigns")
        .insert_header(bearer())
        .set_json(json!({
            "name": "Unknown domain",
            "destination_url": "https://shop.example.com",
            "domain_id": "does-not-exist"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_campaign_list_metadata() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    for i in 0..5 {
        let req = TestRequest::post()
            .uri("/api/v1/campaigns")
            .insert_header(bearer())
            .set_json(json!({
                "name": format!("Campaign {}", i),
                "destination_url": "https://shop.example.com"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = TestRequest::get()
        .uri("/api/v1/campaigns?page=2&page_size=2")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["metadata"]["page"], 2);
    assert_eq!(body["metadata"]["page_size"], 2);
    assert_eq!(body["metadata"]["total"], 5);
    assert_eq!(body["metadata"]["total_pages"], 3);

    let req = TestRequest::get()
        .uri("/api/v1/campaigns?page=3&page_size=2")
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_campaign_pixel_association() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/campaigns")
        .insert_header(bearer())
        .set_json(json!({ "name": "C", "destination_url": "https://shop.example.com" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let campaign_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = TestRequest::post()
        .uri("/api/v1/pixels")
        .insert_header(bearer())
        .set_json(json!({
            "name": "FB main",
            "platform": "facebook",
            "pixel_code": "123456",
            "access_token": "EAAB-secret-token-9876"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let pixel_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{}/pixels", campaign_id))
        .insert_header(bearer())
        .set_json(json!({ "pixel_id": pixel_id, "event_name": "Purchase" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // 重复关联
    let req = TestRequest::post()
        .uri(&format!("/api/v1/campaigns/{}/pixels", campaign_id))
        .insert_header(bearer())
        .set_json(json!({ "pixel_id": pixel_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = TestRequest::patch()
        .uri(&format!("/api/v1/campaigns/{}/pixels/{}", campaign_id, pixel_id))
        .insert_header(bearer())
        .set_json(json!({ "test_mode": true, "test_event_code": "TEST123" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["test_mode"], true);
    assert_eq!(body["data"]["test_event_code"], "TEST123");
    assert_eq!(body["data"]["event_name"], "Purchase");

    let req = TestRequest::get()
        .uri(&format!("/api/v1/campaigns/{}/pixels", campaign_id))
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = TestRequest::delete()
        .uri(&format!("/api/v1/campaigns/{}/pixels/{}", campaign_id, pixel_id))
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri(&format!("/api/v1/campaigns/{}/pixels", campaign_id))
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

// =============================================================================
// Pixels
// =============================================================================

#[actix_rt::test]
async fn test_pixel_access_token_is_masked() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/pixels")
        .insert_header(bearer())
        .set_json(json!({
            "name": "TikTok",
            "platform": "tiktok",
            "pixel_code": "CABC123",
            "access_token": "tt-secret-abcd"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let pixel = &body["data"];
    assert_eq!(pixel["access_token_masked"], "****abcd");
    assert!(pixel.get("access_token").is_none());
    let id = pixel["id"].as_str().unwrap().to_string();

    let req = TestRequest::patch()
        .uri(&format!("/api/v1/pixels/{}", id))
        .insert_header(bearer())
        .set_json(json!({ "name": "TikTok main" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["name"], "TikTok main");
    assert_eq!(body["data"]["pixel_code"], "CABC123");
    assert_eq!(body["data"]["access_token_masked"], "****abcd");
}

// =============================================================================
// Domains
// =============================================================================

#[actix_rt::test]
async fn test_domain_provisioning_lifecycle() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/domains")
        .insert_header(bearer())
        .set_json(json!({ "hostname": "Track.Example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let domain = &body["data"];
    assert_eq!(domain["hostname"], "track.example.com");
    assert_eq!(domain["status"], "pending");
    assert_eq!(domain["cf_hostname_id"], "cf-track.example.com");
    let id = domain["id"].as_str().unwrap().to_string();
    assert_eq!(
        env.provisioner.created.lock().unwrap().as_slice(),
        ["track.example.com".to_string()]
    );

    let req = TestRequest::post()
        .uri(&format!("/api/v1/domains/{}/refresh", id))
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["ssl_status"], "active");

    // 重复 hostname
    let req = TestRequest::post()
        .uri("/api/v1/domains")
        .insert_header(bearer())
        .set_json(json!({ "hostname": "track.example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = TestRequest::delete()
        .uri(&format!("/api/v1/domains/{}", id))
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        env.provisioner.deleted.lock().unwrap().as_slice(),
        ["cf-track.example.com".to_string()]
    );
}

#[actix_rt::test]
async fn test_domain_provisioning_failure_is_reported() {
    let env = setup().await;
    *env.provisioner.fail_with.lock().unwrap() =
        Some(CloudflareError::new(409, "Duplicate custom hostname found."));
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/domains")
        .insert_header(bearer())
        .set_json(json!({ "hostname": "dup.example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 4000);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Duplicate custom hostname found.")
    );

    // 失败时不落库
    let req = TestRequest::get()
        .uri("/api/v1/domains")
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["metadata"]["total"], 0);
}

#[actix_rt::test]
async fn test_domain_insert_failure_removes_upstream_hostname() {
    let env = setup().await;
    exec_sql(
        &env,
        "CREATE TRIGGER reject_domains BEFORE INSERT ON domains \
         BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
    )
    .await;

    let err = env
        .services
        .domains
        .create("shop.example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, TrakiError::DatabaseOperation(_)));

    assert_eq!(
        *env.provisioner.created.lock().unwrap(),
        vec!["shop.example.com".to_string()]
    );
    assert_eq!(
        *env.provisioner.deleted.lock().unwrap(),
        vec!["cf-shop.example.com".to_string()]
    );
}

// =============================================================================
// API keys & integrations
// =============================================================================

#[actix_rt::test]
async fn test_api_key_create_list_revoke() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/api-keys")
        .insert_header(bearer())
        .set_json(json!({ "name": "landing pages" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let plaintext = body["data"]["key"].as_str().unwrap().to_string();
    let id = body["data"]["api_key"]["id"].as_str().unwrap().to_string();
    assert!(plaintext.starts_with("trk_"));
    assert!(plaintext.starts_with(body["data"]["api_key"]["key_prefix"].as_str().unwrap()));

    let req = TestRequest::get()
        .uri("/api/v1/api-keys")
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let keys = body["data"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].get("key_hash").is_none());
    assert!(keys[0]["revoked_at"].is_null());

    let req = TestRequest::delete()
        .uri(&format!("/api/v1/api-keys/{}", id))
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get()
        .uri("/api/v1/api-keys")
        .insert_header(bearer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(!body["data"][0]["revoked_at"].is_null());
}

#[actix_rt::test]
async fn test_integration_crud() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::post()
        .uri("/api/v1/integrations")
        .insert_header(bearer())
        .set_json(json!({
            "name": "Shopify store",
            "provider": "Shopify",
            "config": { "shop": "demo.myshopify.com" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["provider"], "shopify");
    assert_eq!(body["data"]["enabled"], true);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let req = TestRequest::patch()
        .uri(&format!("/api/v1/integrations/{}", id))
        .insert_header(bearer())
        .set_json(json!({ "enabled": false }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["enabled"], false);
    assert_eq!(body["data"]["config"]["shop"], "demo.myshopify.com");

    let req = TestRequest::post()
        .uri("/api/v1/integrations")
        .insert_header(bearer())
        .set_json(json!({ "name": "Bad", "provider": "x", "config": [1, 2] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Analytics
// =============================================================================

#[actix_rt::test]
async fn test_analytics_rejects_bad_ranges() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::get()
        .uri("/api/v1/analytics/overview?start=2026-02-01T00:00:00Z&end=2026-01-01T00:00:00Z")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = TestRequest::get()
        .uri("/api/v1/analytics/geo?start=yesterday")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1012);
}

#[actix_rt::test]
async fn test_health_endpoint() {
    let env = setup().await;
    let app = test::init_service(App::new().configure(|cfg| env.services.configure(cfg))).await;

    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["storage"]["backend"], "sqlite");
    assert_eq!(body["data"]["geoip_provider"], "fixed");

    let req = TestRequest::get().uri("/health/live").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
