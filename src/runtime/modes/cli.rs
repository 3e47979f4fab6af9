//! CLI mode
//!
//! 一次性子命令：迁移、生成配置、创建 API key。

use std::path::Path;

use anyhow::{Context, Result, bail};
use colored::Colorize;
use tracing::info;

use crate::cli::{ApiKeyCommands, Commands};
use crate::config::{StaticConfig, get_config};
use crate::services::ApiKeyService;
use crate::storage::StorageFactory;

const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// Run a non-server CLI command
pub async fn run_command(command: &Commands) -> Result<()> {
    match command {
        Commands::Serve => super::run_server().await,
        Commands::Migrate => migrate().await,
        Commands::GenerateConfig { output_path, force } => {
            generate_config(output_path.as_deref().unwrap_or(DEFAULT_SAMPLE_PATH), *force)
        }
        Commands::ApiKey {
            action: ApiKeyCommands::Create { name },
        } => create_api_key(name).await,
    }
}

async fn migrate() -> Result<()> {
    // 创建存储时执行迁移
    let storage = StorageFactory::create()
        .await
        .context("Failed to run migrations")?;
    info!(
        "Migrations applied on {} backend",
        storage.get_backend_config().storage_type
    );
    println!("{} Database is up to date", "✓".green().bold());
    Ok(())
}

fn generate_config(path: &str, force: bool) -> Result<()> {
    if Path::new(path).exists() && !force {
        bail!("{} already exists, use --force to overwrite", path);
    }
    std::fs::write(path, StaticConfig::generate_sample_config())
        .with_context(|| format!("Failed to write {}", path))?;
    println!("{} Sample configuration written to {}", "✓".green().bold(), path);
    Ok(())
}

async fn create_api_key(name: &str) -> Result<()> {
    let config = get_config();
    let storage = StorageFactory::create()
        .await
        .context("Failed to open storage")?;
    let service = ApiKeyService::new(storage, config.tracking.api_key_cache_ttl);

    let created = service
        .create(name)
        .await
        .map_err(|e| anyhow::anyhow!(e.format_simple()))?;

    println!("{} API key '{}' created", "✓".green().bold(), created.key.name);
    println!("  id:  {}", created.key.id);
    println!("  key: {}", created.plaintext.bold());
    println!(
        "{}",
        "Store this key now, it cannot be shown again.".yellow()
    );
    Ok(())
}
