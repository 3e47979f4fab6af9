//! API key middleware for the tracking ingestion routes
//!
//! Accepts `X-Api-Key: trk_…` or `Authorization: Bearer trk_…`. The matched
//! key is stored in request extensions as [`ApiKey`].

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::CONTENT_TYPE,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{error, info, trace};

use crate::api::constants::API_KEY_HEADER;
use crate::api::services::admin::{ApiResponse, ErrorCode};
use crate::errors::TrakiError;
use crate::services::{API_KEY_PREFIX, ApiKeyService};

#[derive(Clone)]
pub struct ApiKeyAuth;

impl<S, B> Transform<S, ServiceRequest> for ApiKeyAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ApiKeyAuthMiddleware<S> {
    service: Rc<S>,
}

/// 取出请求中的 API Key（X-Api-Key 优先）
pub fn extract_api_key(req: &ServiceRequest) -> Option<String> {
    let headers = req.headers();
    headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|s| s.starts_with(API_KEY_PREFIX))
                .map(str::to_string)
        })
        .filter(|s| !s.is_empty())
}

fn reject<B>(
    req: ServiceRequest,
    code: ErrorCode,
    message: &str,
) -> ServiceResponse<EitherBody<B>> {
    let mut builder = if code == ErrorCode::ApiKeyInvalid {
        HttpResponse::Unauthorized()
    } else {
        HttpResponse::InternalServerError()
    };
    req.into_response(
        builder
            .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
            .json(ApiResponse::<()> {
                code,
                message: message.to_string(),
                data: None,
            })
            .map_into_right_body(),
    )
}

impl<S, B> Service<ServiceRequest> for ApiKeyAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            let Some(service) = req
                .app_data::<web::Data<Arc<ApiKeyService>>>()
                .map(|data| Arc::clone(data.get_ref()))
            else {
                error!("ApiKeyService is not registered as app data");
                return Ok(reject(
                    req,
                    ErrorCode::InternalServerError,
                    "API key service unavailable",
                ));
            };

            let Some(plaintext) = extract_api_key(&req) else {
                info!("Tracking request without API key");
                return Ok(reject(req, ErrorCode::ApiKeyInvalid, "Missing API key"));
            };

            match service.authenticate(&plaintext).await {
                Ok(key) => {
                    trace!("API key {} accepted", key.key_prefix);
                    req.extensions_mut().insert(key);
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                Err(TrakiError::Unauthorized(msg)) => {
                    info!("API key rejected: {}", msg);
                    Ok(reject(req, ErrorCode::ApiKeyInvalid, &msg))
                }
                Err(e) => {
                    error!("API key lookup failed: {}", e);
                    Ok(reject(req, ErrorCode::InternalServerError, "API key lookup failed"))
                }
            }
        })
    }
}
