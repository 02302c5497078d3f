use uuid::Uuid;

/// What a redemption produced on the offer side.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionArtifact {
    Redemption,
    Reward,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct OfferRedeemedEvent {
    pub event_id: Uuid,
    pub offer_id: i64,
    pub member_id: i64,
    pub institution_id: i64,
    pub artifact: RedemptionArtifact,
    pub artifact_id: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RewardEarnedEvent {
    pub event_id: Uuid,
    pub reward_id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub expires_at: i64,
    pub timestamp: i64,
}

/// Events the offer engine hands to the notification collaborator.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferEvent {
    OfferRedeemed(OfferRedeemedEvent),
    RewardEarned(RewardEarnedEvent),
}

impl OfferEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            OfferEvent::OfferRedeemed(_) => "offer_redeemed",
            OfferEvent::RewardEarned(_) => "reward_earned",
        }
    }

    /// The member the event concerns, used to route notifications.
    pub fn member_id(&self) -> i64 {
        match self {
            OfferEvent::OfferRedeemed(e) => e.member_id,
            OfferEvent::RewardEarned(e) => e.member_id,
        }
    }

    pub fn offer_id(&self) -> i64 {
        match self {
            OfferEvent::OfferRedeemed(e) => e.offer_id,
            OfferEvent::RewardEarned(e) => e.offer_id,
        }
    }
}
