//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// traki - conversion tracking edge API
#[derive(Parser, Debug)]
#[command(name = "traki")]
#[command(version)]
#[command(about = "Campaign click tracing and conversion forwarding", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Apply database migrations and exit
    Migrate,

    /// Generate an example configuration file
    GenerateConfig {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Manage tracking API keys
    ApiKey {
        #[command(subcommand)]
        action: ApiKeyCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ApiKeyCommands {
    /// Create a key and print its plaintext once
    Create {
        /// Display name of the key
        name: String,
    },
}

impl Cli {
    /// 未指定子命令时运行服务器
    pub fn command_or_default(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Serve)
    }
}
