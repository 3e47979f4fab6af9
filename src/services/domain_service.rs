//! Custom domain management backed by Cloudflare custom hostnames

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::{Result, TrakiError};
use crate::services::cloudflare::{CustomHostname, HostnameProvisioner};
use crate::storage::{Domain, DomainStatus, Page, PageRequest, SeaOrmStorage};
use crate::utils::new_id;
use crate::utils::url_validator::normalize_hostname;

pub struct DomainService {
    storage: Arc<SeaOrmStorage>,
    provisioner: Option<Arc<dyn HostnameProvisioner>>,
}

fn apply_hostname(domain: &mut Domain, remote: &CustomHostname) {
    domain.cf_hostname_id = Some(remote.id.clone());
    domain.status = remote.domain_status();
    domain.ssl_status = remote.ssl_status();
    domain.verification_errors = remote.collect_errors();
}

impl DomainService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        provisioner: Option<Arc<dyn HostnameProvisioner>>,
    ) -> Self {
        if provisioner.is_none() {
            info!("DomainService: Cloudflare not configured, domains are stored unmanaged");
        }
        Self { storage, provisioner }
    }

    pub async fn list(&self, page: PageRequest) -> Result<Page<Domain>> {
        self.storage.list_domains(page).await
    }

    pub async fn get(&self, id: &str) -> Result<Domain> {
        self.storage
            .get_domain(id)
            .await?
            .ok_or_else(|| TrakiError::not_found(format!("Domain '{}' not found", id)))
    }

    pub async fn create(&self, hostname: &str) -> Result<Domain> {
        let hostname = normalize_hostname(hostname)?;
        if self.storage.find_domain_by_hostname(&hostname).await?.is_some() {
            return Err(TrakiError::conflict(format!("Domain '{}' already exists", hostname)));
        }

        let now = Utc::now();
        let mut domain = Domain {
            id: new_id(),
            hostname,
            status: DomainStatus::Unmanaged,
            ssl_status: None,
            cf_hostname_id: None,
            verification_errors: None,
            created_at: now,
            updated_at: now,
        };

        let mut provisioned = None;
        if let Some(ref provisioner) = self.provisioner {
            let remote = provisioner.create(&domain.hostname).await?;
            apply_hostname(&mut domain, &remote);
            provisioned = Some((provisioner, remote.id));
        }

        if let Err(e) = self.storage.insert_domain(&domain).await {
            // 本地保存失败时撤销远端 hostname
            if let Some((provisioner, remote_id)) = provisioned
                && let Err(cleanup) = provisioner.delete(&remote_id).await
            {
                warn!(
                    "Failed to remove custom hostname {} after insert error: {}",
                    remote_id, cleanup
                );
            }
            return Err(e);
        }
        info!(
            "DomainService: created domain '{}' ({})",
            domain.hostname,
            domain.status.as_ref()
        );
        Ok(domain)
    }

    /// 从 Cloudflare 拉取最新状态
    pub async fn refresh(&self, id: &str) -> Result<Domain> {
        let mut domain = self.get(id).await?;

        let (Some(provisioner), Some(remote_id)) =
            (&self.provisioner, domain.cf_hostname_id.clone())
        else {
            return Ok(domain);
        };

        let remote = provisioner.get(&remote_id).await?;
        apply_hostname(&mut domain, &remote);
        domain.updated_at = Utc::now();
        self.storage.update_domain(&domain).await?;
        Ok(domain)
    }

    /// 先删除远端（404 视为已删除），再删除本地记录
    pub async fn delete(&self, id: &str) -> Result<()> {
        let domain = self.get(id).await?;

        if let (Some(provisioner), Some(remote_id)) = (&self.provisioner, &domain.cf_hostname_id) {
            match provisioner.delete(remote_id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    warn!("Custom hostname {} already gone upstream", remote_id);
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.storage.delete_domain(id).await
    }
}
