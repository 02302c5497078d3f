use buylocal_core::{Entity, SoftDelete};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Records owned by one offer.
pub trait OfferScoped: SoftDelete {
    fn offer_id(&self) -> i64;
}

/// Records owned by one member.
pub trait MemberScoped: SoftDelete {
    fn member_id(&self) -> i64;
}

macro_rules! offer_record {
    ($ty:ty, $kind:literal) => {
        impl Entity for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> i64 {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = id;
            }
        }

        impl SoftDelete for $ty {
            fn is_deleted(&self) -> bool {
                self.is_deleted
            }

            fn mark_deleted(&mut self) {
                self.is_deleted = true;
            }
        }

        impl OfferScoped for $ty {
            fn offer_id(&self) -> i64 {
                self.offer_id
            }
        }
    };
}

macro_rules! member_record {
    ($ty:ty) => {
        impl MemberScoped for $ty {
            fn member_id(&self) -> i64 {
                self.member_id
            }
        }
    };
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Like {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Like {
    pub fn new(offer_id: i64, member_id: i64, at: DateTime<Utc>) -> Self {
        Self { id: 0, offer_id, member_id, created_at: at, is_deleted: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Favorite {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Favorite {
    pub fn new(offer_id: i64, member_id: i64, at: DateTime<Utc>) -> Self {
        Self { id: 0, offer_id, member_id, created_at: at, is_deleted: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Share {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    /// Where the member shared the offer, e.g. "email" or "facebook".
    pub channel: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Share {
    pub fn new(offer_id: i64, member_id: i64, channel: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            offer_id,
            member_id,
            channel: channel.into(),
            created_at: at,
            is_deleted: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Comment {
    pub fn new(offer_id: i64, member_id: i64, body: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            offer_id,
            member_id,
            body: body.into(),
            created_at: at,
            is_deleted: false,
        }
    }
}

/// A basic offer claimed by a member. One record per claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Redemption {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub redeemed_at: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Redemption {
    pub fn new(offer_id: i64, member_id: i64, at: DateTime<Utc>) -> Self {
        Self { id: 0, offer_id, member_id, redeemed_at: at, is_deleted: false }
    }
}

/// Lifecycle of a reward. `Deleted` can follow either of the other two and
/// is terminal; a redeemed reward never returns to `Earned`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardState {
    Earned,
    Redeemed,
    Deleted,
}

/// A member's entitlement to redeem a loyalty or targeted offer once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reward {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub earned_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub redemption_date: Option<DateTime<Utc>>,
    pub is_deleted: bool,
}

impl Reward {
    pub fn new(
        offer_id: i64,
        member_id: i64,
        earned_date: DateTime<Utc>,
        expiration_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            offer_id,
            member_id,
            earned_date,
            expiration_date,
            redemption_date: None,
            is_deleted: false,
        }
    }

    pub fn state(&self) -> RewardState {
        if self.is_deleted {
            RewardState::Deleted
        } else if self.redemption_date.is_some() {
            RewardState::Redeemed
        } else {
            RewardState::Earned
        }
    }

    /// Held by `member_id`, unredeemed, not deleted, and expiring strictly
    /// after `now`.
    pub fn is_available_to(&self, member_id: i64, now: DateTime<Utc>) -> bool {
        self.member_id == member_id && self.state() == RewardState::Earned && self.expiration_date > now
    }

    /// Earned -> Redeemed. Returns false, leaving the reward untouched, from
    /// any other state or once expired.
    pub fn redeem(&mut self, now: DateTime<Utc>) -> bool {
        if self.state() != RewardState::Earned || self.expiration_date <= now {
            return false;
        }
        self.redemption_date = Some(now);
        true
    }
}

/// A purchase counted toward a loyalty offer's target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoyaltyTransaction {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub amount_cents: i64,
    pub terminal_code: Option<String>,
    pub transaction_date: DateTime<Utc>,
    /// Set once the transaction has been converted into a reward.
    pub reward_id: Option<i64>,
    pub is_deleted: bool,
}

impl LoyaltyTransaction {
    pub fn new(
        offer_id: i64,
        member_id: i64,
        amount_cents: i64,
        terminal_code: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            offer_id,
            member_id,
            amount_cents,
            terminal_code,
            transaction_date: at,
            reward_id: None,
            is_deleted: false,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.is_deleted && self.reward_id.is_none()
    }
}

/// Payment terminal at which a loyalty offer's transactions count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EligibleTerminal {
    pub id: i64,
    pub offer_id: i64,
    pub terminal_code: String,
    pub is_deleted: bool,
}

impl EligibleTerminal {
    pub fn new(offer_id: i64, terminal_code: impl Into<String>) -> Self {
        Self {
            id: 0,
            offer_id,
            terminal_code: terminal_code.into(),
            is_deleted: false,
        }
    }
}

/// A member-facing notification persisted from an offer event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub offer_id: i64,
    pub member_id: i64,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub is_deleted: bool,
}

offer_record!(Like, "like");
offer_record!(Favorite, "favorite");
offer_record!(Share, "share");
offer_record!(Comment, "comment");
offer_record!(Redemption, "redemption");
offer_record!(Reward, "reward");
offer_record!(LoyaltyTransaction, "loyalty_transaction");
offer_record!(EligibleTerminal, "eligible_terminal");
offer_record!(Notification, "notification");

member_record!(Like);
member_record!(Favorite);
member_record!(Share);
member_record!(Comment);
member_record!(Redemption);
member_record!(Reward);
member_record!(LoyaltyTransaction);
member_record!(Notification);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_reward_lifecycle() {
        let now = Utc::now();
        let mut reward = Reward::new(1, 2, now, now + Duration::days(10));
        assert_eq!(reward.state(), RewardState::Earned);
        assert!(reward.is_available_to(2, now));
        assert!(!reward.is_available_to(3, now));

        assert!(reward.redeem(now));
        assert_eq!(reward.state(), RewardState::Redeemed);
        assert_eq!(reward.redemption_date, Some(now));

        // No second redemption, and no way back to Earned.
        assert!(!reward.redeem(now + Duration::hours(1)));
        assert_eq!(reward.redemption_date, Some(now));

        reward.mark_deleted();
        assert_eq!(reward.state(), RewardState::Deleted);
    }

    #[test]
    fn test_reward_expiry_is_strict() {
        let now = Utc::now();
        let mut reward = Reward::new(1, 2, now - Duration::days(1), now);

        assert!(!reward.is_available_to(2, now));
        assert!(!reward.redeem(now));
        assert!(reward.redemption_date.is_none());
        assert!(reward.is_available_to(2, now - Duration::seconds(1)));
    }

    #[test]
    fn test_deleted_reward_cannot_be_redeemed() {
        let now = Utc::now();
        let mut reward = Reward::new(1, 2, now, now + Duration::days(1));
        reward.mark_deleted();

        assert!(!reward.redeem(now));
        assert!(!reward.is_available_to(2, now));
    }

    #[test]
    fn test_transaction_open_until_consumed() {
        let mut tx = LoyaltyTransaction::new(1, 2, 2500, None, Utc::now());
        assert!(tx.is_open());

        tx.reward_id = Some(9);
        assert!(!tx.is_open());
    }
}
