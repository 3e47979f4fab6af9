//! API keys for the tracking ingestion endpoints
//!
//! Keys look like `trk_` + 40 alphanumerics. Only the SHA-256 hex is stored;
//! the plaintext is returned once at creation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use tracing::{debug, info, warn};

use crate::errors::{Result, TrakiError};
use crate::storage::{ApiKey, Page, PageRequest, SeaOrmStorage};
use crate::utils::hashing::sha256_hex;
use crate::utils::{generate_random_code, new_id};

pub const API_KEY_PREFIX: &str = "trk_";
const API_KEY_RANDOM_LEN: usize = 40;
/// 展示用前缀长度（含 `trk_`）
const DISPLAY_PREFIX_LEN: usize = 12;
const CACHE_MAX_CAPACITY: u64 = 10_000;

/// 新建结果，`plaintext` 仅此一次可见
#[derive(Debug, Clone)]
pub struct CreatedApiKey {
    pub key: ApiKey,
    pub plaintext: String,
}

pub fn generate_api_key() -> String {
    format!("{}{}", API_KEY_PREFIX, generate_random_code(API_KEY_RANDOM_LEN))
}

pub fn looks_like_api_key(candidate: &str) -> bool {
    candidate
        .strip_prefix(API_KEY_PREFIX)
        .is_some_and(|rest| {
            rest.len() == API_KEY_RANDOM_LEN && rest.chars().all(|c| c.is_ascii_alphanumeric())
        })
}

pub struct ApiKeyService {
    storage: Arc<SeaOrmStorage>,
    /// key_hash → 有效 key（None 为负缓存）
    cache: Cache<String, Option<ApiKey>>,
}

impl ApiKeyService {
    pub fn new(storage: Arc<SeaOrmStorage>, cache_ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(cache_ttl_secs.max(1)))
            .max_capacity(CACHE_MAX_CAPACITY)
            .build();
        Self { storage, cache }
    }

    pub async fn create(&self, name: &str) -> Result<CreatedApiKey> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrakiError::validation("name cannot be empty"));
        }

        let plaintext = generate_api_key();
        let key = ApiKey {
            id: new_id(),
            name: name.to_string(),
            key_prefix: plaintext[..DISPLAY_PREFIX_LEN].to_string(),
            key_hash: sha256_hex(&plaintext),
            last_used_at: None,
            revoked_at: None,
            created_at: Utc::now(),
        };
        self.storage.insert_api_key(&key).await?;
        info!("ApiKeyService: created key '{}' ({})", key.name, key.key_prefix);

        Ok(CreatedApiKey { key, plaintext })
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<ApiKey>> {
        self.storage.list_api_keys(page).await
    }

    /// 吊销并使缓存失效
    pub async fn revoke(&self, id: &str) -> Result<()> {
        let key = self
            .storage
            .get_api_key(id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("API key '{}' not found", id)))?;

        if !key.is_revoked() {
            self.storage.revoke_api_key(id, Utc::now()).await?;
        }
        self.cache.invalidate(&key.key_hash).await;
        Ok(())
    }

    /// 校验明文 key；成功后在后台更新 last_used_at
    pub async fn authenticate(&self, plaintext: &str) -> Result<ApiKey> {
        if !looks_like_api_key(plaintext) {
            return Err(TrakiError::unauthorized("Invalid API key"));
        }

        let hash = sha256_hex(plaintext);
        let storage = Arc::clone(&self.storage);
        let lookup_hash = hash.clone();

        let cached = self
            .cache
            .try_get_with(hash, async move {
                storage
                    .find_api_key_by_hash(&lookup_hash)
                    .await
                    .map(|found| found.filter(|k| !k.is_revoked()))
            })
            .await
            .map_err(|e: Arc<TrakiError>| (*e).clone())?;

        let key = cached.ok_or_else(|| TrakiError::unauthorized("Invalid or revoked API key"))?;

        let storage = Arc::clone(&self.storage);
        let key_id = key.id.clone();
        tokio::spawn(async move {
            if let Err(e) = storage.touch_api_key(&key_id, Utc::now()).await {
                warn!("Failed to update last_used_at for key {}: {}", key_id, e);
            } else {
                debug!("API key {} used", key_id);
            }
        });

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_shape() {
        let key = generate_api_key();
        assert!(key.starts_with("trk_"));
        assert_eq!(key.len(), 44);
        assert!(looks_like_api_key(&key));
    }

    #[test]
    fn test_looks_like_api_key_rejects_malformed() {
        assert!(!looks_like_api_key("trk_short"));
        assert!(!looks_like_api_key("sk_0123456789012345678901234567890123456789"));
        assert!(!looks_like_api_key(&format!("trk_{}!", "a".repeat(39))));
    }
}
