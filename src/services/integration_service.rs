//! Third-party integration records (provider + free-form JSON config)

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::info;

use crate::errors::{Result, TrakiError};
use crate::storage::{Integration, Page, PageRequest, SeaOrmStorage};
use crate::utils::new_id;

#[derive(Debug, Clone)]
pub struct CreateIntegrationRequest {
    pub name: String,
    pub provider: String,
    pub config: Option<Value>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateIntegrationRequest {
    pub name: Option<String>,
    pub config: Option<Value>,
    pub enabled: Option<bool>,
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TrakiError::validation(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

/// config 必须是 JSON 对象
fn object_config(config: Value) -> Result<Value> {
    if config.is_object() {
        Ok(config)
    } else {
        Err(TrakiError::validation("config must be a JSON object"))
    }
}

pub struct IntegrationService {
    storage: Arc<SeaOrmStorage>,
}

impl IntegrationService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Integration>> {
        self.storage.list_integrations(page).await
    }

    pub async fn get(&self, id: &str) -> Result<Integration> {
        self.storage
            .get_integration(id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Integration '{}' not found", id)))
    }

    pub async fn create(&self, req: CreateIntegrationRequest) -> Result<Integration> {
        let now = Utc::now();
        let integration = Integration {
            id: new_id(),
            name: required("name", &req.name)?,
            provider: required("provider", &req.provider)?.to_lowercase(),
            config: object_config(req.config.unwrap_or_else(|| Value::Object(Default::default())))?,
            enabled: req.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_integration(&integration).await?;
        info!(
            "IntegrationService: created {} integration '{}'",
            integration.provider, integration.name
        );
        Ok(integration)
    }

    pub async fn update(&self, id: &str, req: UpdateIntegrationRequest) -> Result<Integration> {
        let mut integration = self.get(id).await?;
        if let Some(name) = req.name {
            integration.name = required("name", &name)?;
        }
        if let Some(config) = req.config {
            integration.config = object_config(config)?;
        }
        if let Some(enabled) = req.enabled {
            integration.enabled = enabled;
        }
        integration.updated_at = Utc::now();
        self.storage.update_integration(&integration).await?;
        Ok(integration)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.storage.delete_integration(id).await
    }
}
