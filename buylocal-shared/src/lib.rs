pub mod models;
pub mod pii;

pub use models::events::{OfferEvent, OfferRedeemedEvent, RedemptionArtifact, RewardEarnedEvent};
pub use pii::Masked;
