use std::sync::Arc;

use buylocal_core::Notifier;
use buylocal_engagement::Reward;
use buylocal_shared::{OfferEvent, OfferRedeemedEvent, RewardEarnedEvent};
use buylocal_store::EngineConfig;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::models::Offer;

/// Publishes offer events to the notification collaborator.
///
/// Delivery is fire-and-forget: failures are logged and never reach the
/// caller of the operation that produced the event.
#[derive(Clone)]
pub struct OfferTelemetry {
    notifier: Arc<dyn Notifier>,
    on_redemption: bool,
    on_reward: bool,
}

impl OfferTelemetry {
    pub fn new(notifier: Arc<dyn Notifier>, config: &EngineConfig) -> Self {
        Self {
            notifier,
            on_redemption: config.notify_on_redemption,
            on_reward: config.notify_on_reward,
        }
    }

    pub async fn log_offer_redeemed(
        &self,
        offer: &Offer,
        member_id: i64,
        artifact_id: i64,
        now: DateTime<Utc>,
    ) {
        if !self.on_redemption {
            return;
        }
        self.publish(OfferEvent::OfferRedeemed(OfferRedeemedEvent {
            event_id: Uuid::new_v4(),
            offer_id: offer.id,
            member_id,
            institution_id: offer.institution_id,
            artifact: offer.redemption_artifact(),
            artifact_id,
            timestamp: now.timestamp(),
        }))
        .await;
    }

    pub async fn log_reward_earned(&self, reward: &Reward, now: DateTime<Utc>) {
        if !self.on_reward {
            return;
        }
        self.publish(OfferEvent::RewardEarned(RewardEarnedEvent {
            event_id: Uuid::new_v4(),
            reward_id: reward.id,
            offer_id: reward.offer_id,
            member_id: reward.member_id,
            expires_at: reward.expiration_date.timestamp(),
            timestamp: now.timestamp(),
        }))
        .await;
    }

    async fn publish(&self, event: OfferEvent) {
        if let Err(e) = self.notifier.notify(&event).await {
            warn!(
                event_type = event.event_type(),
                offer_id = event.offer_id(),
                member_id = event.member_id(),
                "Failed to deliver notification: {}",
                e
            );
        }
    }
}
