//! 集成测试共享工具
//!
//! 每个测试使用独立的临时 SQLite 数据库；Cloudflare、平台投递与 GeoIP
//! 通过 fake 注入。

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use traki::config::{DatabaseConfig, StaticConfig, set_config};
use traki::runtime::lifetime::startup::AppServices;
use traki::services::cloudflare::{CloudflareError, CustomHostname, HostnameProvisioner, SslInfo};
use traki::services::conversions::{
    ConversionForwarder, DeliveryOutcome, DeliveryRequest, DeliveryTransport,
};
use traki::services::{GeoInfo, GeoIpLookup, GeoIpProvider};
use traki::storage::SeaOrmStorage;

pub const ADMIN_TOKEN: &str = "test-admin-token-123";
pub const JWT_SECRET: &str = "test-jwt-secret-for-integration-tests-0123456789";

/// 所有测试共用同一份全局配置
pub fn test_config() -> StaticConfig {
    let mut config = StaticConfig::default();
    config.api.admin_token = ADMIN_TOKEN.to_string();
    config.api.jwt_secret = JWT_SECRET.to_string();
    config.tracking.rate_limit_per_second = 1000;
    config.tracking.rate_limit_burst = 1000;
    config.conversions.enabled = true;
    config.conversions.facebook_api_base = "https://graph.test/v19.0".to_string();
    config.conversions.tiktok_api_base = "https://tiktok.test/open_api/v1.3".to_string();
    config
}

/// 记录请求并返回固定状态码的投递 fake
pub struct RecordingTransport {
    pub requests: Mutex<Vec<DeliveryRequest>>,
    status: u16,
}

impl RecordingTransport {
    pub fn new(status: u16) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            status,
        })
    }

    pub fn sent(&self) -> Vec<DeliveryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryTransport for RecordingTransport {
    async fn send(&self, request: DeliveryRequest) -> DeliveryOutcome {
        self.requests.lock().unwrap().push(request);
        DeliveryOutcome {
            status: self.status,
            body: r#"{"events_received":1}"#.to_string(),
        }
    }
}

/// 内存中的 custom hostname provisioner
#[derive(Default)]
pub struct FakeProvisioner {
    pub created: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    /// 设置后 create 失败
    pub fail_with: Mutex<Option<CloudflareError>>,
}

impl FakeProvisioner {
    fn hostname(id: &str, hostname: &str, status: &str) -> CustomHostname {
        CustomHostname {
            id: id.to_string(),
            hostname: hostname.to_string(),
            status: Some(status.to_string()),
            ssl: Some(SslInfo {
                status: Some(status.to_string()),
                ..Default::default()
            }),
            verification_errors: Vec::new(),
        }
    }
}

#[async_trait]
impl HostnameProvisioner for FakeProvisioner {
    async fn create(&self, hostname: &str) -> Result<CustomHostname, CloudflareError> {
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(err);
        }
        self.created.lock().unwrap().push(hostname.to_string());
        Ok(Self::hostname(&format!("cf-{}", hostname), hostname, "pending"))
    }

    async fn get(&self, id: &str) -> Result<CustomHostname, CloudflareError> {
        let hostname = id.trim_start_matches("cf-");
        Ok(Self::hostname(id, hostname, "active"))
    }

    async fn delete(&self, id: &str) -> Result<(), CloudflareError> {
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

/// 对公网地址返回固定位置
pub struct FixedGeo;

#[async_trait]
impl GeoIpLookup for FixedGeo {
    async fn lookup(&self, _ip: &str) -> Option<GeoInfo> {
        Some(GeoInfo {
            country: Some("BR".to_string()),
            region: Some("SP".to_string()),
            city: Some("São Paulo".to_string()),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

pub struct TestEnv {
    _dir: TempDir,
    pub storage: Arc<SeaOrmStorage>,
    pub services: AppServices,
    pub transport: Arc<RecordingTransport>,
    pub provisioner: Arc<FakeProvisioner>,
}

pub async fn setup() -> TestEnv {
    setup_with_transport(RecordingTransport::new(200)).await
}

pub async fn setup_with_transport(transport: Arc<RecordingTransport>) -> TestEnv {
    let config = test_config();
    set_config(config.clone());

    let dir = TempDir::new().expect("创建临时目录失败");
    let db_path = dir.path().join("traki_test.db");
    let database = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };
    let storage = Arc::new(
        SeaOrmStorage::new(&database)
            .await
            .expect("创建存储失败"),
    );

    let provisioner = Arc::new(FakeProvisioner::default());
    let forwarder = Arc::new(ConversionForwarder::new(
        storage.clone(),
        transport.clone(),
        config.conversions.clone(),
    ));
    let geoip = Arc::new(GeoIpProvider::from_lookup(Arc::new(FixedGeo)));

    let services = AppServices::new(
        storage.clone(),
        &config,
        Some(provisioner.clone()),
        forwarder,
        geoip,
    );

    TestEnv {
        _dir: dir,
        storage,
        services,
        transport,
        provisioner,
    }
}

/// 等待后台转发完成
pub async fn wait_for_forwards(env: &TestEnv) {
    let drained = env
        .services
        .tracking
        .forwarder()
        .drain(std::time::Duration::from_secs(5))
        .await;
    assert!(drained, "forwarding did not finish in time");
}

/// 直接在测试库上执行 SQL，用于制造存储故障
pub async fn exec_sql(env: &TestEnv, sql: &str) {
    use sea_orm::ConnectionTrait;
    env.storage
        .get_db()
        .execute_unprepared(sql)
        .await
        .expect("执行 SQL 失败");
}
