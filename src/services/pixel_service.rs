//! Pixel credential management

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::errors::{Result, TrakiError};
use crate::storage::{Page, PageRequest, Pixel, PixelPlatform, SeaOrmStorage};
use crate::utils::new_id;

#[derive(Debug, Clone)]
pub struct CreatePixelRequest {
    pub name: String,
    pub platform: PixelPlatform,
    pub pixel_code: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePixelRequest {
    pub name: Option<String>,
    pub pixel_code: Option<String>,
    pub access_token: Option<String>,
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TrakiError::validation(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

pub struct PixelService {
    storage: Arc<SeaOrmStorage>,
}

impl PixelService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Pixel>> {
        self.storage.list_pixels(page).await
    }

    pub async fn get(&self, id: &str) -> Result<Pixel> {
        self.storage
            .get_pixel(id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Pixel '{}' not found", id)))
    }

    pub async fn create(&self, req: CreatePixelRequest) -> Result<Pixel> {
        let now = Utc::now();
        let pixel = Pixel {
            id: new_id(),
            name: required("name", &req.name)?,
            platform: req.platform,
            pixel_code: required("pixel_code", &req.pixel_code)?,
            access_token: required("access_token", &req.access_token)?,
            created_at: now,
            updated_at: now,
        };
        self.storage.insert_pixel(&pixel).await?;
        info!("PixelService: created {} pixel '{}'", pixel.platform.as_ref(), pixel.name);
        Ok(pixel)
    }

    /// Platform is fixed after creation
    pub async fn update(&self, id: &str, req: UpdatePixelRequest) -> Result<Pixel> {
        let mut pixel = self.get(id).await?;
        if let Some(name) = req.name {
            pixel.name = required("name", &name)?;
        }
        if let Some(code) = req.pixel_code {
            pixel.pixel_code = required("pixel_code", &code)?;
        }
        if let Some(token) = req.access_token {
            pixel.access_token = required("access_token", &token)?;
        }
        pixel.updated_at = Utc::now();
        self.storage.update_pixel(&pixel).await?;
        Ok(pixel)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.storage.delete_pixel(id).await
    }
}
