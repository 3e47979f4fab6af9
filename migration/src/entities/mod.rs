pub mod api_key;
pub mod campaign;
pub mod campaign_pixel;
pub mod domain;
pub mod event;
pub mod integration;
pub mod pixel;
pub mod trace;

pub use api_key::Entity as ApiKeyEntity;
pub use campaign::Entity as CampaignEntity;
pub use campaign_pixel::Entity as CampaignPixelEntity;
pub use domain::Entity as DomainEntity;
pub use event::Entity as EventEntity;
pub use integration::Entity as IntegrationEntity;
pub use pixel::Entity as PixelEntity;
pub use trace::Entity as TraceEntity;
