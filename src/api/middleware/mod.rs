pub mod api_key;
pub mod auth;
pub mod request_id;

pub use api_key::ApiKeyAuth;
pub use auth::AdminAuth;
pub use request_id::{RequestId, RequestIdMiddleware};
