use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use ureq::Agent;

use super::payload::DeliveryRequest;

/// 单次投递的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    /// 0 表示传输层失败
    pub status: u16,
    pub body: String,
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    async fn send(&self, request: DeliveryRequest) -> DeliveryOutcome;
}

/// 平台响应只保留前 512 字节
const MAX_BODY_LEN: usize = 512;

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_BODY_LEN {
        let mut cut = MAX_BODY_LEN;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    body
}

pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs.max(1))))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }
}

#[async_trait]
impl DeliveryTransport for HttpTransport {
    async fn send(&self, request: DeliveryRequest) -> DeliveryOutcome {
        let agent = self.agent.clone();
        let result = tokio::task::spawn_blocking(move || {
            let mut builder = agent.post(&request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match builder.send_json(&request.body) {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.into_body().read_to_string().unwrap_or_default();
                    DeliveryOutcome { status, body }
                }
                Err(e) => DeliveryOutcome {
                    status: 0,
                    body: e.to_string(),
                },
            }
        })
        .await;

        match result {
            Ok(outcome) => DeliveryOutcome {
                status: outcome.status,
                body: truncate_body(outcome.body),
            },
            Err(e) => {
                warn!("Conversion delivery task failed: {}", e);
                DeliveryOutcome {
                    status: 0,
                    body: format!("delivery task failed: {}", e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body_respects_char_boundary() {
        let body = "é".repeat(400);
        let truncated = truncate_body(body);
        assert!(truncated.len() <= MAX_BODY_LEN);
        assert!(truncated.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_outcome_success_range() {
        let ok = DeliveryOutcome { status: 200, body: String::new() };
        let failed = DeliveryOutcome { status: 0, body: "timeout".into() };
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }
}
