use std::str::FromStr;

use sea_orm::ActiveValue::{NotSet, Set};
use tracing::warn;

use crate::errors::{Result, TrakiError};
use crate::storage::models::{
    ApiKey, Campaign, CampaignPixel, CampaignStatus, Domain, DomainStatus, Event, ForwardStatus,
    Integration, Pixel, PixelPlatform, Trace,
};
use migration::entities::{
    api_key, campaign, campaign_pixel, domain, event, integration, pixel, trace,
};

/// 解析存储的状态字符串，未知值回退为默认状态
fn parse_or_default<T: FromStr + Default>(column: &str, raw: &str) -> T {
    T::from_str(raw).unwrap_or_else(|_| {
        warn!("Unknown {} value '{}', falling back to default", column, raw);
        T::default()
    })
}

pub fn model_to_campaign(model: campaign::Model) -> Campaign {
    Campaign {
        status: parse_or_default::<CampaignStatus>("campaign.status", &model.status),
        id: model.id,
        name: model.name,
        destination_url: model.destination_url,
        domain_id: model.domain_id,
        utm_source: model.utm_source,
        utm_medium: model.utm_medium,
        utm_campaign: model.utm_campaign,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn campaign_to_active_model(c: &Campaign, is_new: bool) -> campaign::ActiveModel {
    campaign::ActiveModel {
        id: Set(c.id.clone()),
        name: Set(c.name.clone()),
        destination_url: Set(c.destination_url.clone()),
        status: Set(c.status.as_ref().to_string()),
        domain_id: Set(c.domain_id.clone()),
        utm_source: Set(c.utm_source.clone()),
        utm_medium: Set(c.utm_medium.clone()),
        utm_campaign: Set(c.utm_campaign.clone()),
        created_at: if is_new { Set(c.created_at) } else { NotSet },
        updated_at: Set(c.updated_at),
    }
}

pub fn model_to_domain(model: domain::Model) -> Domain {
    Domain {
        status: parse_or_default::<DomainStatus>("domain.status", &model.status),
        id: model.id,
        hostname: model.hostname,
        ssl_status: model.ssl_status,
        cf_hostname_id: model.cf_hostname_id,
        verification_errors: model.verification_errors,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn domain_to_active_model(d: &Domain, is_new: bool) -> domain::ActiveModel {
    domain::ActiveModel {
        id: Set(d.id.clone()),
        hostname: Set(d.hostname.clone()),
        status: Set(d.status.as_ref().to_string()),
        ssl_status: Set(d.ssl_status.clone()),
        cf_hostname_id: Set(d.cf_hostname_id.clone()),
        verification_errors: Set(d.verification_errors.clone()),
        created_at: if is_new { Set(d.created_at) } else { NotSet },
        updated_at: Set(d.updated_at),
    }
}

pub fn model_to_pixel(model: pixel::Model) -> Result<Pixel> {
    let platform = PixelPlatform::from_str(&model.platform).map_err(|_| {
        TrakiError::database_operation(format!(
            "Pixel {} has unknown platform '{}'",
            model.id, model.platform
        ))
    })?;
    Ok(Pixel {
        id: model.id,
        name: model.name,
        platform,
        pixel_code: model.pixel_code,
        access_token: model.access_token,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

pub fn pixel_to_active_model(p: &Pixel, is_new: bool) -> pixel::ActiveModel {
    pixel::ActiveModel {
        id: Set(p.id.clone()),
        name: Set(p.name.clone()),
        platform: Set(p.platform.as_ref().to_string()),
        pixel_code: Set(p.pixel_code.clone()),
        access_token: Set(p.access_token.clone()),
        created_at: if is_new { Set(p.created_at) } else { NotSet },
        updated_at: Set(p.updated_at),
    }
}

pub fn model_to_campaign_pixel(model: campaign_pixel::Model) -> CampaignPixel {
    CampaignPixel {
        id: model.id,
        campaign_id: model.campaign_id,
        pixel_id: model.pixel_id,
        event_name: model.event_name,
        test_mode: model.test_mode,
        test_event_code: model.test_event_code,
        created_at: model.created_at,
    }
}

pub fn campaign_pixel_to_active_model(
    cp: &CampaignPixel,
    is_new: bool,
) -> campaign_pixel::ActiveModel {
    campaign_pixel::ActiveModel {
        id: Set(cp.id.clone()),
        campaign_id: Set(cp.campaign_id.clone()),
        pixel_id: Set(cp.pixel_id.clone()),
        event_name: Set(cp.event_name.clone()),
        test_mode: Set(cp.test_mode),
        test_event_code: Set(cp.test_event_code.clone()),
        created_at: if is_new { Set(cp.created_at) } else { NotSet },
    }
}

pub fn model_to_api_key(model: api_key::Model) -> ApiKey {
    ApiKey {
        id: model.id,
        name: model.name,
        key_prefix: model.key_prefix,
        key_hash: model.key_hash,
        last_used_at: model.last_used_at,
        revoked_at: model.revoked_at,
        created_at: model.created_at,
    }
}

pub fn api_key_to_active_model(k: &ApiKey) -> api_key::ActiveModel {
    api_key::ActiveModel {
        id: Set(k.id.clone()),
        name: Set(k.name.clone()),
        key_prefix: Set(k.key_prefix.clone()),
        key_hash: Set(k.key_hash.clone()),
        last_used_at: Set(k.last_used_at),
        revoked_at: Set(k.revoked_at),
        created_at: Set(k.created_at),
    }
}

pub fn model_to_trace(model: trace::Model) -> Trace {
    Trace {
        id: model.id,
        campaign_id: model.campaign_id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        browser: model.browser,
        os: model.os,
        device: model.device,
        is_bot: model.is_bot,
        referrer: model.referrer,
        landing_url: model.landing_url,
        utm_source: model.utm_source,
        utm_medium: model.utm_medium,
        utm_campaign: model.utm_campaign,
        utm_term: model.utm_term,
        utm_content: model.utm_content,
        fbclid: model.fbclid,
        ttclid: model.ttclid,
        gclid: model.gclid,
        country: model.country,
        region: model.region,
        city: model.city,
        created_at: model.created_at,
    }
}

pub fn trace_to_active_model(t: &Trace) -> trace::ActiveModel {
    trace::ActiveModel {
        id: Set(t.id.clone()),
        campaign_id: Set(t.campaign_id.clone()),
        ip_address: Set(t.ip_address.clone()),
        user_agent: Set(t.user_agent.clone()),
        browser: Set(t.browser.clone()),
        os: Set(t.os.clone()),
        device: Set(t.device.clone()),
        is_bot: Set(t.is_bot),
        referrer: Set(t.referrer.clone()),
        landing_url: Set(t.landing_url.clone()),
        utm_source: Set(t.utm_source.clone()),
        utm_medium: Set(t.utm_medium.clone()),
        utm_campaign: Set(t.utm_campaign.clone()),
        utm_term: Set(t.utm_term.clone()),
        utm_content: Set(t.utm_content.clone()),
        fbclid: Set(t.fbclid.clone()),
        ttclid: Set(t.ttclid.clone()),
        gclid: Set(t.gclid.clone()),
        country: Set(t.country.clone()),
        region: Set(t.region.clone()),
        city: Set(t.city.clone()),
        created_at: Set(t.created_at),
    }
}

pub fn model_to_event(model: event::Model) -> Event {
    let forward_results = model.forward_results.as_deref().and_then(|raw| {
        serde_json::from_str(raw)
            .map_err(|e| warn!("Event {} has unreadable forward_results: {}", model.id, e))
            .ok()
    });
    Event {
        forward_status: parse_or_default::<ForwardStatus>(
            "event.forward_status",
            &model.forward_status,
        ),
        forward_results,
        id: model.id,
        trace_id: model.trace_id,
        campaign_id: model.campaign_id,
        event_name: model.event_name,
        value: model.value,
        currency: model.currency,
        email_hash: model.email_hash,
        phone_hash: model.phone_hash,
        source_url: model.source_url,
        created_at: model.created_at,
    }
}

pub fn event_to_active_model(e: &Event) -> event::ActiveModel {
    event::ActiveModel {
        id: Set(e.id.clone()),
        trace_id: Set(e.trace_id.clone()),
        campaign_id: Set(e.campaign_id.clone()),
        event_name: Set(e.event_name.clone()),
        value: Set(e.value),
        currency: Set(e.currency.clone()),
        email_hash: Set(e.email_hash.clone()),
        phone_hash: Set(e.phone_hash.clone()),
        source_url: Set(e.source_url.clone()),
        forward_status: Set(e.forward_status.as_ref().to_string()),
        forward_results: Set(e.forward_results.as_ref().map(|v| v.to_string())),
        created_at: Set(e.created_at),
    }
}

pub fn model_to_integration(model: integration::Model) -> Integration {
    let config = serde_json::from_str(&model.config).unwrap_or_else(|e| {
        warn!("Integration {} has unreadable config: {}", model.id, e);
        serde_json::Value::Object(Default::default())
    });
    Integration {
        id: model.id,
        name: model.name,
        provider: model.provider,
        config,
        enabled: model.enabled,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn integration_to_active_model(i: &Integration, is_new: bool) -> integration::ActiveModel {
    integration::ActiveModel {
        id: Set(i.id.clone()),
        name: Set(i.name.clone()),
        provider: Set(i.provider.clone()),
        config: Set(i.config.to_string()),
        enabled: Set(i.enabled),
        created_at: if is_new { Set(i.created_at) } else { NotSet },
        updated_at: Set(i.updated_at),
    }
}
