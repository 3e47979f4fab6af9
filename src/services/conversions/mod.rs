//! Conversions API forwarding
//!
//! 每个事件对所属 campaign 关联的 pixel 各投递一次，不重试。
//! 结果写回事件的 `forward_status` / `forward_results`。

mod payload;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::config::ConversionsConfig;
use crate::errors::Result;
use crate::storage::{CampaignPixel, Event, ForwardStatus, Pixel, SeaOrmStorage, Trace};

pub use payload::{
    DeliveryRequest, ForwardContext, build_facebook, build_request, build_tiktok,
    facebook_click_id,
};
pub use transport::{DeliveryOutcome, DeliveryTransport, HttpTransport};

/// 由各 pixel 的结果汇总出事件状态
pub fn summarize(delivered: usize, attempted: usize) -> ForwardStatus {
    match (delivered, attempted) {
        (_, 0) => ForwardStatus::Skipped,
        (d, a) if d == a => ForwardStatus::Sent,
        (0, _) => ForwardStatus::Failed,
        _ => ForwardStatus::Partial,
    }
}

/// 后台任务计数，任务结束（包括 panic）时递减
struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct ConversionForwarder {
    storage: Arc<SeaOrmStorage>,
    transport: Arc<dyn DeliveryTransport>,
    config: ConversionsConfig,
    in_flight: Arc<AtomicUsize>,
}

impl ConversionForwarder {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        transport: Arc<dyn DeliveryTransport>,
        config: ConversionsConfig,
    ) -> Self {
        Self {
            storage,
            transport,
            config,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn from_config(storage: Arc<SeaOrmStorage>, config: &ConversionsConfig) -> Self {
        let transport = Arc::new(HttpTransport::new(config.timeout_secs));
        Self::new(storage, transport, config.clone())
    }

    /// 在后台任务中转发，不阻塞调用方
    pub fn spawn(self: &Arc<Self>, event: Event, trace: Trace, dedup_id: String) {
        let forwarder = Arc::clone(self);
        let guard = InFlightGuard::new(&self.in_flight);
        tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = forwarder.forward(&event, &trace, &dedup_id).await {
                error!("Forwarding event {} failed: {}", event.id, e);
                // 事件不能停留在 pending
                if let Err(e) = forwarder
                    .storage
                    .set_event_forward_result(&event.id, ForwardStatus::Failed, None)
                    .await
                {
                    error!("Failed to mark event {} as failed: {}", event.id, e);
                }
            }
        });
    }

    /// 尚未完成的后台转发数量
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// 等待后台转发完成，超时返回 false
    pub async fn drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.in_flight() > 0 {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        true
    }

    /// 加载关联的 pixel，投递并持久化结果
    pub async fn forward(
        &self,
        event: &Event,
        trace: &Trace,
        dedup_id: &str,
    ) -> Result<ForwardStatus> {
        if !self.config.enabled {
            debug!("Conversion forwarding disabled, skipping event {}", event.id);
            self.storage
                .set_event_forward_result(&event.id, ForwardStatus::Skipped, None)
                .await?;
            return Ok(ForwardStatus::Skipped);
        }

        let associations = self.storage.list_campaign_pixels(&event.campaign_id).await?;
        let pixel_ids: Vec<String> = associations.iter().map(|a| a.pixel_id.clone()).collect();
        let pixels: HashMap<String, Pixel> = self
            .storage
            .get_pixels(&pixel_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let targets: Vec<(CampaignPixel, Pixel)> = associations
            .into_iter()
            .filter_map(|a| pixels.get(&a.pixel_id).cloned().map(|p| (a, p)))
            .collect();

        let (status, results) = self.deliver_all(event, trace, &targets, dedup_id).await;
        let results = (!targets.is_empty()).then_some(results);
        self.storage
            .set_event_forward_result(&event.id, status, results.as_ref())
            .await?;

        info!(
            "Event {} forwarded to {} pixel(s): {}",
            event.id,
            targets.len(),
            status.as_ref()
        );
        Ok(status)
    }

    /// 投递到每个 pixel，返回汇总状态与逐 pixel 结果
    pub async fn deliver_all(
        &self,
        event: &Event,
        trace: &Trace,
        targets: &[(CampaignPixel, Pixel)],
        dedup_id: &str,
    ) -> (ForwardStatus, Value) {
        let mut results = Vec::with_capacity(targets.len());
        let mut delivered = 0;

        for (association, pixel) in targets {
            let ctx = ForwardContext {
                event,
                trace,
                pixel,
                association,
                dedup_id,
            };

            let outcome = match build_request(&ctx, &self.config) {
                Ok(request) => self.transport.send(request).await,
                Err(e) => DeliveryOutcome {
                    status: 0,
                    body: e.message().to_string(),
                },
            };

            if outcome.is_success() {
                delivered += 1;
            } else {
                warn!(
                    "Delivery to {} pixel {} failed ({}): {}",
                    pixel.platform.as_ref(),
                    pixel.id,
                    outcome.status,
                    outcome.body
                );
            }

            results.push(json!({
                "pixel_id": pixel.id,
                "platform": pixel.platform,
                "event_name": ctx.event_name(),
                "success": outcome.is_success(),
                "status": outcome.status,
                "response": outcome.body,
            }));
        }

        (summarize(delivered, targets.len()), Value::Array(results))
    }
}
