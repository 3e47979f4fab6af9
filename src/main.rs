use anyhow::Result;
use clap::Parser;

use traki::cli::{Cli, Commands};
use traki::config::{get_config, init_config_from, load_stage_env};
use traki::runtime::modes::run_command;
use traki::system::logging::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env.<stage> 需在读取配置前加载
    let env_file = load_stage_env();
    init_config_from(&cli.config);
    let config = get_config();

    let command = cli.command_or_default();
    if let Commands::GenerateConfig { .. } = command {
        return run_command(command).await;
    }

    let _guard = init_logging(&config.logging);
    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    if let Err(e) = run_command(command).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
