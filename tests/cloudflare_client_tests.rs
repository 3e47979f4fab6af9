//! Cloudflare custom hostname 客户端测试
//!
//! 在 127.0.0.1 上启动一个模拟 API，验证错误信息与状态码的传递。

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde_json::json;

use traki::services::cloudflare::{
    CloudflareClient, CloudflareProvisioner, CreateCustomHostname, HostnameProvisioner, ZoneParams,
};

const ZONE: &str = "zone-1";
const TOKEN: &str = "cf-test-token";

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

async fn create_hostname(req: HttpRequest, body: web::Json<serde_json::Value>) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Forbidden().json(json!({
            "result": null,
            "success": false,
            "errors": [{ "code": 10000, "message": "Authentication error" }]
        }));
    }
    if body["hostname"] == "taken.example.com" {
        return HttpResponse::Conflict().json(json!({
            "result": null,
            "success": false,
            "errors": [
                { "code": 1406, "message": "Duplicate custom hostname found." },
                { "code": 1407, "message": "second error" }
            ]
        }));
    }
    HttpResponse::Ok().json(json!({
        "result": {
            "id": "ch-1",
            "hostname": body["hostname"],
            "status": "pending",
            "ssl": { "status": "pending_validation", "method": body["ssl"]["method"] }
        },
        "success": true,
        "errors": []
    }))
}

async fn get_hostname(path: web::Path<(String, String)>) -> HttpResponse {
    let (_, id) = path.into_inner();
    match id.as_str() {
        "ch-1" => HttpResponse::Ok().json(json!({
            "result": {
                "id": "ch-1",
                "hostname": "go.example.com",
                "status": "active",
                "ssl": { "status": "active" }
            },
            "success": true,
            "errors": []
        })),
        "broken" => HttpResponse::BadGateway().body("<html>bad gateway</html>"),
        _ => HttpResponse::NotFound().json(json!({
            "result": null,
            "success": false,
            "errors": []
        })),
    }
}

async fn delete_hostname(path: web::Path<(String, String)>) -> HttpResponse {
    let (_, id) = path.into_inner();
    if id == "ch-1" {
        HttpResponse::Ok().json(json!({
            "result": { "id": "ch-1" },
            "success": true,
            "errors": []
        }))
    } else {
        HttpResponse::NotFound().json(json!({
            "result": null,
            "success": false,
            "errors": [{ "code": 1436, "message": "Custom hostname not found." }]
        }))
    }
}

/// 启动模拟 API，返回 base URL 与停止句柄
fn start_mock_api() -> (String, actix_web::dev::ServerHandle) {
    let server = HttpServer::new(|| {
        App::new()
            .route(
                "/zones/{zone}/custom_hostnames",
                web::post().to(create_hostname),
            )
            .route(
                "/zones/{zone}/custom_hostnames/{id}",
                web::get().to(get_hostname),
            )
            .route(
                "/zones/{zone}/custom_hostnames/{id}",
                web::delete().to(delete_hostname),
            )
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("绑定端口失败");

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);
    (format!("http://{}", addr), handle)
}

fn params(token: &str) -> ZoneParams {
    ZoneParams {
        zone_id: ZONE.to_string(),
        api_token: token.to_string(),
    }
}

#[actix_rt::test]
async fn test_failed_call_reports_first_error_and_status() {
    let (base, handle) = start_mock_api();
    let client = CloudflareClient::new(&base, 5);

    let err = client
        .create(CreateCustomHostname::http_dv("taken.example.com"), &params(TOKEN))
        .await
        .unwrap_err();
    assert_eq!(err.status, 409);
    assert_eq!(err.message, "Duplicate custom hostname found.");

    let err = client
        .create(CreateCustomHostname::http_dv("go.example.com"), &params("wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.status, 403);
    assert_eq!(err.message, "Authentication error");

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_error_without_message_falls_back_to_status() {
    let (base, handle) = start_mock_api();
    let client = CloudflareClient::new(&base, 5);

    let err = client.get("missing", &params(TOKEN)).await.unwrap_err();
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "HTTP 404");
    assert!(err.is_not_found());

    let err = client.get("broken", &params(TOKEN)).await.unwrap_err();
    assert_eq!(err.status, 502);
    assert_eq!(err.message, "HTTP 502");

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_successful_calls_return_result() {
    let (base, handle) = start_mock_api();
    let client = CloudflareClient::new(&base, 5);

    let created = client
        .create(CreateCustomHostname::http_dv("go.example.com"), &params(TOKEN))
        .await
        .unwrap();
    assert_eq!(created.id, "ch-1");
    assert_eq!(created.hostname, "go.example.com");
    assert_eq!(created.ssl_status().as_deref(), Some("pending_validation"));

    let fetched = client.get("ch-1", &params(TOKEN)).await.unwrap();
    assert_eq!(fetched.status.as_deref(), Some("active"));

    let deleted = client.delete("ch-1", &params(TOKEN)).await.unwrap();
    assert_eq!(deleted.id, "ch-1");

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_provisioner_over_mock_api() {
    let (base, handle) = start_mock_api();
    let provisioner = CloudflareProvisioner::new(CloudflareClient::new(&base, 5), params(TOKEN));

    let hostname = provisioner.get("ch-1").await.unwrap();
    assert_eq!(hostname.domain_status(), traki::storage::DomainStatus::Active);

    provisioner.delete("ch-1").await.unwrap();
    let err = provisioner.delete("gone").await.unwrap_err();
    assert_eq!(err.status, 404);
    assert_eq!(err.message, "Custom hostname not found.");

    handle.stop(true).await;
}
