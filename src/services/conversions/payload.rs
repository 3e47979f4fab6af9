//! Platform request builders for Conversions API forwarding

use serde_json::{Map, Value, json};
use url::Url;

use crate::config::ConversionsConfig;
use crate::errors::{Result, TrakiError};
use crate::storage::{CampaignPixel, Event, Pixel, PixelPlatform, Trace};

/// 一次待发送的平台请求
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

/// 构建 payload 所需的上下文
pub struct ForwardContext<'a> {
    pub event: &'a Event,
    pub trace: &'a Trace,
    pub pixel: &'a Pixel,
    pub association: &'a CampaignPixel,
    /// 去重 ID（调用方提供的 event_id，否则为事件 ID）
    pub dedup_id: &'a str,
}

impl ForwardContext<'_> {
    /// 关联上配置的事件名优先
    pub fn event_name(&self) -> &str {
        self.association
            .event_name
            .as_deref()
            .unwrap_or(&self.event.event_name)
    }

    pub fn test_event_code(&self) -> Option<&str> {
        if self.association.test_mode {
            self.association.test_event_code.as_deref()
        } else {
            None
        }
    }
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value);
    }
}

fn str_value(value: Option<&String>) -> Option<Value> {
    value.map(|s| Value::String(s.clone()))
}

fn custom_properties(event: &Event) -> Map<String, Value> {
    let mut props = Map::new();
    insert_opt(&mut props, "value", event.value.map(|v| json!(v)));
    insert_opt(&mut props, "currency", str_value(event.currency.as_ref()));
    props
}

/// `fb.1.<trace ms>.<fbclid>`
pub fn facebook_click_id(trace: &Trace) -> Option<String> {
    trace
        .fbclid
        .as_ref()
        .map(|fbclid| format!("fb.1.{}.{}", trace.created_at.timestamp_millis(), fbclid))
}

pub fn build_facebook(ctx: &ForwardContext<'_>, api_base: &str) -> Result<DeliveryRequest> {
    let mut url = Url::parse(&format!(
        "{}/{}/events",
        api_base.trim_end_matches('/'),
        ctx.pixel.pixel_code
    ))
    .map_err(|e| TrakiError::pixel_delivery(format!("invalid Facebook API URL: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("access_token", &ctx.pixel.access_token);

    let mut user_data = Map::new();
    insert_opt(&mut user_data, "em", ctx.event.email_hash.as_ref().map(|h| json!([h])));
    insert_opt(&mut user_data, "ph", ctx.event.phone_hash.as_ref().map(|h| json!([h])));
    insert_opt(&mut user_data, "client_ip_address", str_value(ctx.trace.ip_address.as_ref()));
    insert_opt(&mut user_data, "client_user_agent", str_value(ctx.trace.user_agent.as_ref()));
    insert_opt(&mut user_data, "fbc", facebook_click_id(ctx.trace).map(Value::String));

    let mut data = Map::new();
    data.insert("event_name".into(), json!(ctx.event_name()));
    data.insert("event_time".into(), json!(ctx.event.created_at.timestamp()));
    data.insert("event_id".into(), json!(ctx.dedup_id));
    data.insert("action_source".into(), json!("website"));
    insert_opt(&mut data, "event_source_url", str_value(ctx.event.source_url.as_ref()));
    data.insert("user_data".into(), Value::Object(user_data));
    let custom = custom_properties(ctx.event);
    if !custom.is_empty() {
        data.insert("custom_data".into(), Value::Object(custom));
    }

    let mut body = Map::new();
    body.insert("data".into(), json!([Value::Object(data)]));
    insert_opt(&mut body, "test_event_code", ctx.test_event_code().map(|c| json!(c)));

    Ok(DeliveryRequest {
        url: url.to_string(),
        headers: vec![],
        body: Value::Object(body),
    })
}

pub fn build_tiktok(ctx: &ForwardContext<'_>, api_base: &str) -> Result<DeliveryRequest> {
    let url = format!("{}/event/track/", api_base.trim_end_matches('/'));

    let mut user = Map::new();
    insert_opt(&mut user, "email", str_value(ctx.event.email_hash.as_ref()));
    insert_opt(&mut user, "phone", str_value(ctx.event.phone_hash.as_ref()));
    insert_opt(&mut user, "ip", str_value(ctx.trace.ip_address.as_ref()));
    insert_opt(&mut user, "user_agent", str_value(ctx.trace.user_agent.as_ref()));
    insert_opt(&mut user, "ttclid", str_value(ctx.trace.ttclid.as_ref()));

    let mut data = Map::new();
    data.insert("event".into(), json!(ctx.event_name()));
    data.insert("event_time".into(), json!(ctx.event.created_at.timestamp()));
    data.insert("event_id".into(), json!(ctx.dedup_id));
    data.insert("user".into(), Value::Object(user));
    let props = custom_properties(ctx.event);
    if !props.is_empty() {
        data.insert("properties".into(), Value::Object(props));
    }
    if let Some(ref source_url) = ctx.event.source_url {
        data.insert("page".into(), json!({ "url": source_url }));
    }

    let mut body = Map::new();
    body.insert("event_source".into(), json!("web"));
    body.insert("event_source_id".into(), json!(ctx.pixel.pixel_code));
    body.insert("data".into(), json!([Value::Object(data)]));
    insert_opt(&mut body, "test_event_code", ctx.test_event_code().map(|c| json!(c)));

    Ok(DeliveryRequest {
        url,
        headers: vec![("Access-Token".to_string(), ctx.pixel.access_token.clone())],
        body: Value::Object(body),
    })
}

pub fn build_request(
    ctx: &ForwardContext<'_>,
    config: &ConversionsConfig,
) -> Result<DeliveryRequest> {
    match ctx.pixel.platform {
        PixelPlatform::Facebook => build_facebook(ctx, &config.facebook_api_base),
        PixelPlatform::Tiktok => build_tiktok(ctx, &config.tiktok_api_base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ForwardStatus;
    use chrono::{TimeZone, Utc};

    fn fixtures(platform: PixelPlatform) -> (Event, Trace, Pixel, CampaignPixel) {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let event = Event {
            id: "evt-1".into(),
            trace_id: "tr-1".into(),
            campaign_id: "c-1".into(),
            event_name: "Purchase".into(),
            value: Some(49.9),
            currency: Some("BRL".into()),
            email_hash: Some("emailhash".into()),
            phone_hash: None,
            source_url: Some("https://shop.example.com/thanks".into()),
            forward_status: ForwardStatus::Pending,
            forward_results: None,
            created_at: created,
        };
        let trace = Trace {
            id: "tr-1".into(),
            campaign_id: "c-1".into(),
            ip_address: Some("203.0.113.7".into()),
            user_agent: Some("Mozilla/5.0".into()),
            fbclid: Some("IwAR123".into()),
            ttclid: Some("E.C.P.abc".into()),
            created_at: created,
            ..Trace::default()
        };
        let pixel = Pixel {
            id: "px-1".into(),
            name: "Main".into(),
            platform,
            pixel_code: "123456".into(),
            access_token: "tok en".into(),
            created_at: created,
            updated_at: created,
        };
        let association = CampaignPixel {
            id: "cp-1".into(),
            campaign_id: "c-1".into(),
            pixel_id: "px-1".into(),
            event_name: None,
            test_mode: false,
            test_event_code: Some("TEST42".into()),
            created_at: created,
        };
        (event, trace, pixel, association)
    }

    #[test]
    fn test_facebook_payload() {
        let (event, trace, pixel, association) = fixtures(PixelPlatform::Facebook);
        let ctx = ForwardContext {
            event: &event,
            trace: &trace,
            pixel: &pixel,
            association: &association,
            dedup_id: "order-9",
        };
        let req = build_facebook(&ctx, "https://graph.facebook.com/v19.0/").unwrap();

        assert_eq!(
            req.url,
            "https://graph.facebook.com/v19.0/123456/events?access_token=tok+en"
        );
        let data = &req.body["data"][0];
        assert_eq!(data["event_name"], "Purchase");
        assert_eq!(data["event_id"], "order-9");
        assert_eq!(data["action_source"], "website");
        assert_eq!(data["user_data"]["em"][0], "emailhash");
        assert!(data["user_data"].get("ph").is_none());
        assert_eq!(
            data["user_data"]["fbc"],
            format!("fb.1.{}.IwAR123", trace.created_at.timestamp_millis())
        );
        assert_eq!(data["custom_data"]["currency"], "BRL");
        // 非测试模式不带 test_event_code
        assert!(req.body.get("test_event_code").is_none());
    }

    #[test]
    fn test_tiktok_payload_with_override_and_test_mode() {
        let (event, trace, pixel, mut association) = fixtures(PixelPlatform::Tiktok);
        association.event_name = Some("CompletePayment".into());
        association.test_mode = true;
        let ctx = ForwardContext {
            event: &event,
            trace: &trace,
            pixel: &pixel,
            association: &association,
            dedup_id: "evt-1",
        };
        let req = build_tiktok(&ctx, "https://business-api.tiktok.com/open_api/v1.3").unwrap();

        assert_eq!(req.url, "https://business-api.tiktok.com/open_api/v1.3/event/track/");
        assert_eq!(req.headers, vec![("Access-Token".to_string(), "tok en".to_string())]);
        assert_eq!(req.body["event_source"], "web");
        assert_eq!(req.body["event_source_id"], "123456");
        assert_eq!(req.body["test_event_code"], "TEST42");
        let data = &req.body["data"][0];
        assert_eq!(data["event"], "CompletePayment");
        assert_eq!(data["user"]["ttclid"], "E.C.P.abc");
        assert_eq!(data["page"]["url"], "https://shop.example.com/thanks");
    }

    #[test]
    fn test_no_fbc_without_fbclid() {
        let (_, mut trace, _, _) = fixtures(PixelPlatform::Facebook);
        trace.fbclid = None;
        assert!(facebook_click_id(&trace).is_none());
    }
}
