//! Campaign management service
//!
//! Campaign CRUD plus the campaign ↔ pixel associations that drive
//! conversion forwarding.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::errors::{Result, TrakiError};
use crate::storage::{
    Campaign, CampaignFilter, CampaignPixel, CampaignStatus, Page, PageRequest, SeaOrmStorage,
};
use crate::utils::url_validator::validate_url;
use crate::utils::{new_id, non_empty};

// ============ Request DTOs ============

#[derive(Debug, Clone, Default)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub destination_url: String,
    pub status: Option<CampaignStatus>,
    pub domain_id: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

/// Partial update: `None` keeps the stored value, `Some(None)` clears it
#[derive(Debug, Clone, Default)]
pub struct UpdateCampaignRequest {
    pub name: Option<String>,
    pub destination_url: Option<String>,
    pub status: Option<CampaignStatus>,
    pub domain_id: Option<Option<String>>,
    pub utm_source: Option<Option<String>>,
    pub utm_medium: Option<Option<String>>,
    pub utm_campaign: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct AttachPixelRequest {
    pub pixel_id: String,
    pub event_name: Option<String>,
    pub test_mode: bool,
    pub test_event_code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCampaignPixelRequest {
    pub event_name: Option<Option<String>>,
    pub test_mode: Option<bool>,
    pub test_event_code: Option<Option<String>>,
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrakiError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

// ============ CampaignService ============

pub struct CampaignService {
    storage: Arc<SeaOrmStorage>,
}

impl CampaignService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    async fn ensure_domain(&self, domain_id: Option<&str>) -> Result<()> {
        if let Some(id) = domain_id
            && self.storage.get_domain(id).await?.is_none()
        {
            return Err(TrakiError::validation(format!("Domain '{}' does not exist", id)));
        }
        Ok(())
    }

    pub async fn list(&self, filter: &CampaignFilter, page: PageRequest) -> Result<Page<Campaign>> {
        self.storage.list_campaigns(filter, page).await
    }

    pub async fn get(&self, id: &str) -> Result<Campaign> {
        self.storage
            .get_campaign(id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Campaign '{}' not found", id)))
    }

    pub async fn create(&self, req: CreateCampaignRequest) -> Result<Campaign> {
        let name = required_name(&req.name)?;
        validate_url(&req.destination_url)?;
        let destination_url = req.destination_url.trim().to_string();
        let domain_id = non_empty(req.domain_id);
        self.ensure_domain(domain_id.as_deref()).await?;

        let now = Utc::now();
        let campaign = Campaign {
            id: new_id(),
            name,
            destination_url,
            status: req.status.unwrap_or_default(),
            domain_id,
            utm_source: non_empty(req.utm_source),
            utm_medium: non_empty(req.utm_medium),
            utm_campaign: non_empty(req.utm_campaign),
            created_at: now,
            updated_at: now,
        };

        self.storage.insert_campaign(&campaign).await?;
        info!("CampaignService: created campaign '{}' ({})", campaign.name, campaign.id);
        Ok(campaign)
    }

    pub async fn update(&self, id: &str, req: UpdateCampaignRequest) -> Result<Campaign> {
        let mut campaign = self.get(id).await?;

        if let Some(name) = req.name {
            campaign.name = required_name(&name)?;
        }
        if let Some(url) = req.destination_url {
            validate_url(&url)?;
            campaign.destination_url = url.trim().to_string();
        }
        if let Some(status) = req.status {
            campaign.status = status;
        }
        if let Some(domain_id) = req.domain_id {
            let domain_id = non_empty(domain_id);
            self.ensure_domain(domain_id.as_deref()).await?;
            campaign.domain_id = domain_id;
        }
        if let Some(v) = req.utm_source {
            campaign.utm_source = non_empty(v);
        }
        if let Some(v) = req.utm_medium {
            campaign.utm_medium = non_empty(v);
        }
        if let Some(v) = req.utm_campaign {
            campaign.utm_campaign = non_empty(v);
        }
        campaign.updated_at = Utc::now();

        self.storage.update_campaign(&campaign).await?;
        Ok(campaign)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.storage.delete_campaign(id).await
    }

    // ============ Pixel associations ============

    pub async fn list_pixels(&self, campaign_id: &str) -> Result<Vec<CampaignPixel>> {
        self.get(campaign_id).await?;
        self.storage.list_campaign_pixels(campaign_id).await
    }

    pub async fn attach_pixel(
        &self,
        campaign_id: &str,
        req: AttachPixelRequest,
    ) -> Result<CampaignPixel> {
        self.get(campaign_id).await?;
        if self.storage.get_pixel(&req.pixel_id).await?.is_none() {
            return Err(TrakiError::not_found(format!("Pixel '{}' not found", req.pixel_id)));
        }
        if self
            .storage
            .get_campaign_pixel(campaign_id, &req.pixel_id)
            .await?
            .is_some()
        {
            return Err(TrakiError::conflict(format!(
                "Pixel '{}' is already attached to campaign '{}'",
                req.pixel_id, campaign_id
            )));
        }

        let association = CampaignPixel {
            id: new_id(),
            campaign_id: campaign_id.to_string(),
            pixel_id: req.pixel_id,
            event_name: non_empty(req.event_name),
            test_mode: req.test_mode,
            test_event_code: non_empty(req.test_event_code),
            created_at: Utc::now(),
        };
        self.storage.insert_campaign_pixel(&association).await?;
        Ok(association)
    }

    pub async fn update_pixel(
        &self,
        campaign_id: &str,
        pixel_id: &str,
        req: UpdateCampaignPixelRequest,
    ) -> Result<CampaignPixel> {
        let mut association = self
            .storage
            .get_campaign_pixel(campaign_id, pixel_id)
            .await?
            .ok_or_else(|| {
                TrakiError::not_found(format!(
                    "Pixel '{}' is not attached to campaign '{}'",
                    pixel_id, campaign_id
                ))
            })?;

        if let Some(v) = req.event_name {
            association.event_name = non_empty(v);
        }
        if let Some(v) = req.test_mode {
            association.test_mode = v;
        }
        if let Some(v) = req.test_event_code {
            association.test_event_code = non_empty(v);
        }

        self.storage.update_campaign_pixel(&association).await?;
        Ok(association)
    }

    pub async fn detach_pixel(&self, campaign_id: &str, pixel_id: &str) -> Result<()> {
        self.storage.delete_campaign_pixel(campaign_id, pixel_id).await
    }
}
