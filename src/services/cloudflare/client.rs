//! Minimal Cloudflare custom-hostname client
//!
//! One HTTP call per operation. No retries, pagination or local state.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use ureq::Agent;

use super::CloudflareError;
use super::types::{CreateCustomHostname, CustomHostname, DeletedHostname, Envelope, ZoneParams};

/// 解包 `{result, success, errors}` 信封
///
/// 2xx 且 success=true 时返回 result；否则取第一条错误信息，
/// 没有可用信息时回退为 `HTTP <status>`。
pub fn unwrap_envelope<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<T, CloudflareError> {
    let fallback = || CloudflareError::new(status, format!("HTTP {}", status));

    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            debug!("Cloudflare response is not an envelope: {}", e);
            return Err(fallback());
        }
    };

    if (200..300).contains(&status) && envelope.success {
        return envelope
            .result
            .ok_or_else(|| CloudflareError::new(status, "response has no result"));
    }

    match envelope.errors.into_iter().find(|e| !e.message.is_empty()) {
        Some(first) => Err(CloudflareError::new(status, first.message)),
        None => Err(fallback()),
    }
}

#[derive(Clone)]
pub struct CloudflareClient {
    api_base: String,
    agent: Agent,
}

impl CloudflareClient {
    pub fn new(api_base: &str, timeout_secs: u64) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs.max(1))))
            // 非 2xx 也要读取响应体中的错误信息
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn collection_url(&self, params: &ZoneParams) -> String {
        format!("{}/zones/{}/custom_hostnames", self.api_base, params.zone_id)
    }

    fn item_url(&self, params: &ZoneParams, id: &str) -> String {
        format!("{}/{}", self.collection_url(params), id)
    }

    pub async fn create(
        &self,
        body: CreateCustomHostname,
        params: &ZoneParams,
    ) -> Result<CustomHostname, CloudflareError> {
        let url = self.collection_url(params);
        let auth = bearer(params);
        let agent = self.agent.clone();

        run_blocking(move || {
            let resp = agent
                .post(&url)
                .header("Authorization", &auth)
                .send_json(&body)
                .map_err(CloudflareError::transport)?;
            read_response(resp)
        })
        .await
    }

    pub async fn get(
        &self,
        id: &str,
        params: &ZoneParams,
    ) -> Result<CustomHostname, CloudflareError> {
        let url = self.item_url(params, id);
        let auth = bearer(params);
        let agent = self.agent.clone();

        run_blocking(move || {
            let resp = agent
                .get(&url)
                .header("Authorization", &auth)
                .call()
                .map_err(CloudflareError::transport)?;
            read_response(resp)
        })
        .await
    }

    pub async fn delete(
        &self,
        id: &str,
        params: &ZoneParams,
    ) -> Result<DeletedHostname, CloudflareError> {
        let url = self.item_url(params, id);
        let auth = bearer(params);
        let agent = self.agent.clone();

        run_blocking(move || {
            let resp = agent
                .delete(&url)
                .header("Authorization", &auth)
                .call()
                .map_err(CloudflareError::transport)?;
            read_response(resp)
        })
        .await
    }
}

fn bearer(params: &ZoneParams) -> String {
    format!("Bearer {}", params.api_token)
}

fn read_response<T: DeserializeOwned>(
    resp: ureq::http::Response<ureq::Body>,
) -> Result<T, CloudflareError> {
    let status = resp.status().as_u16();
    let body = resp
        .into_body()
        .read_to_string()
        .map_err(CloudflareError::transport)?;
    unwrap_envelope(status, &body)
}

/// ureq 是同步客户端，放到阻塞线程池执行
async fn run_blocking<T, F>(f: F) -> Result<T, CloudflareError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CloudflareError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap_or_else(|e| {
        warn!("Cloudflare request task failed: {}", e);
        Err(CloudflareError::new(0, format!("request task failed: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_success() {
        let body = r#"{"result":{"id":"abc","hostname":"go.example.com","status":"pending"},"success":true,"errors":[]}"#;
        let hostname: CustomHostname = unwrap_envelope(200, body).unwrap();
        assert_eq!(hostname.id, "abc");
        assert_eq!(hostname.status.as_deref(), Some("pending"));
    }

    #[test]
    fn test_unwrap_uses_first_error_message() {
        let body = r#"{"result":null,"success":false,"errors":[{"code":1406,"message":"Duplicate custom hostname found."},{"code":1,"message":"second"}]}"#;
        let err = unwrap_envelope::<CustomHostname>(409, body).unwrap_err();
        assert_eq!(err.status, 409);
        assert_eq!(err.message, "Duplicate custom hostname found.");
    }

    #[test]
    fn test_unwrap_falls_back_to_http_status() {
        let err = unwrap_envelope::<CustomHostname>(503, "<html>upstream down</html>").unwrap_err();
        assert_eq!(err.status, 503);
        assert_eq!(err.message, "HTTP 503");

        let err = unwrap_envelope::<CustomHostname>(
            400,
            r#"{"result":null,"success":false,"errors":[]}"#,
        )
        .unwrap_err();
        assert_eq!(err.message, "HTTP 400");
    }

    #[test]
    fn test_unwrap_success_flag_false_on_2xx() {
        let body = r#"{"result":null,"success":false,"errors":[{"code":1000,"message":"Invalid zone"}]}"#;
        let err = unwrap_envelope::<CustomHostname>(200, body).unwrap_err();
        assert_eq!(err.status, 200);
        assert_eq!(err.message, "Invalid zone");
    }

    #[test]
    fn test_urls() {
        let client = CloudflareClient::new("https://api.cloudflare.com/client/v4/", 5);
        let params = ZoneParams {
            zone_id: "zone123".into(),
            api_token: "t".into(),
        };
        assert_eq!(
            client.item_url(&params, "h1"),
            "https://api.cloudflare.com/client/v4/zones/zone123/custom_hostnames/h1"
        );
    }
}
