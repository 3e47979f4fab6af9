//! Mode routing
//!
//! - Server mode（HTTP 服务）
//! - CLI 子命令（迁移、生成配置、创建 API key）

pub mod cli;
pub mod server;

pub use cli::run_command;
pub use server::run_server;
