use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{error, info, warn};

use crate::services::conversions::ConversionForwarder;

/// 等待后台转发任务的超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

pub async fn listen_for_shutdown(forwarder: Arc<ConversionForwarder>) {
    // 等待 Ctrl+C 信号
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, draining pending forwards...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }

    let pending = forwarder.in_flight();
    if pending == 0 {
        info!("No pending forwards, shutting down...");
        return;
    }

    info!("Waiting for {} pending forward(s)", pending);
    if forwarder
        .drain(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS))
        .await
    {
        info!("All pending forwards completed");
    } else {
        error!(
            "Pending forwards did not finish within {} seconds, {} left",
            SHUTDOWN_TIMEOUT_SECS,
            forwarder.in_flight()
        );
    }
}
