use buylocal_core::{Entity, SoftDelete};
use buylocal_shared::RedemptionArtifact;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MerchantLocation {
    pub id: i64,
    pub address: String,
    pub is_deleted: bool,
}

impl MerchantLocation {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            id: 0,
            address: address.into(),
            is_deleted: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Merchant {
    pub id: i64,
    pub name: String,
    pub locations: Vec<MerchantLocation>,
}

impl Merchant {
    pub fn new(name: impl Into<String>, locations: Vec<MerchantLocation>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            locations,
        }
    }

    /// An offer is only reachable through a merchant with somewhere to go.
    pub fn has_live_location(&self) -> bool {
        self.locations.iter().any(|l| !l.is_deleted)
    }
}

/// What a member has to spend before a loyalty offer pays out a reward.
/// Unset targets are ignored; every set target must be reached.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LoyaltyTerms {
    pub target_amount_cents: Option<i64>,
    pub target_transaction_count: Option<u32>,
}

impl LoyaltyTerms {
    pub fn has_targets(&self) -> bool {
        self.target_amount_cents.is_some() || self.target_transaction_count.is_some()
    }

    pub fn is_met(&self, amount_cents: i64, transaction_count: u32) -> bool {
        if !self.has_targets() {
            return false;
        }
        let amount_met = self.target_amount_cents.map_or(true, |t| amount_cents >= t);
        let count_met = self.target_transaction_count.map_or(true, |t| transaction_count >= t);
        amount_met && count_met
    }
}

/// Offer variant. Basic offers are claimed directly and leave a
/// `Redemption`; loyalty and targeted offers are claimed by spending a
/// `Reward`, earned in the first case and pre-assigned in the second.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferKind {
    Basic,
    Loyalty(LoyaltyTerms),
    Targeted,
}

/// A merchant promotion published to one institution's members.
///
/// Likes, favorites, shares, comments, redemptions and rewards reference the
/// offer by `offer_id` and live in their own repositories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: i64,
    pub institution_id: i64,
    pub merchant: Merchant,
    pub title: String,
    pub description: String,
    pub creation_date: DateTime<Utc>,
    /// Last-modified marker.
    pub timestamp: DateTime<Utc>,
    pub start_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub is_admin_approved: bool,
    pub is_hidden: bool,
    pub is_featured: bool,
    pub is_deleted: bool,
    pub kind: OfferKind,
}

impl Offer {
    pub fn new(institution_id: i64, kind: OfferKind) -> Self {
        Self {
            id: 0,
            institution_id,
            merchant: Merchant::default(),
            title: String::new(),
            description: String::new(),
            creation_date: DateTime::<Utc>::default(),
            timestamp: DateTime::<Utc>::default(),
            start_date: DateTime::<Utc>::default(),
            expiration_date: DateTime::<Utc>::default(),
            is_admin_approved: false,
            is_hidden: false,
            is_featured: false,
            is_deleted: false,
            kind,
        }
    }

    pub fn basic(institution_id: i64) -> Self {
        Self::new(institution_id, OfferKind::Basic)
    }

    pub fn loyalty(institution_id: i64, terms: LoyaltyTerms) -> Self {
        Self::new(institution_id, OfferKind::Loyalty(terms))
    }

    pub fn targeted(institution_id: i64) -> Self {
        Self::new(institution_id, OfferKind::Targeted)
    }

    pub fn with_merchant(mut self, merchant: Merchant) -> Self {
        self.merchant = merchant;
        self
    }

    pub fn with_window(mut self, start_date: DateTime<Utc>, expiration_date: DateTime<Utc>) -> Self {
        self.start_date = start_date;
        self.expiration_date = expiration_date;
        self
    }

    pub fn is_targeted(&self) -> bool {
        matches!(self.kind, OfferKind::Targeted)
    }

    pub fn loyalty_terms(&self) -> Option<&LoyaltyTerms> {
        match &self.kind {
            OfferKind::Loyalty(terms) => Some(terms),
            _ => None,
        }
    }

    /// The record a redemption of this offer produces, and the one its
    /// removal cascades to.
    pub fn redemption_artifact(&self) -> RedemptionArtifact {
        match self.kind {
            OfferKind::Basic => RedemptionArtifact::Redemption,
            OfferKind::Loyalty(_) | OfferKind::Targeted => RedemptionArtifact::Reward,
        }
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now
    }

    pub fn has_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }
}

impl Entity for Offer {
    const KIND: &'static str = "offer";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl SoftDelete for Offer {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc::now();
        let offer = Offer::basic(1).with_window(now, now);

        assert!(offer.has_started(now));
        assert!(!offer.has_expired(now));
        assert!(offer.has_expired(now + Duration::seconds(1)));
        assert!(!offer.has_started(now - Duration::seconds(1)));
    }

    #[test]
    fn test_live_location_ignores_deleted_ones() {
        let mut merchant = Merchant::new("Corner Bakery", vec![MerchantLocation::new("12 Main St")]);
        assert!(merchant.has_live_location());

        merchant.locations[0].is_deleted = true;
        assert!(!merchant.has_live_location());
        assert!(!Merchant::default().has_live_location());
    }

    #[test]
    fn test_loyalty_terms_require_every_target() {
        let both = LoyaltyTerms {
            target_amount_cents: Some(10_000),
            target_transaction_count: Some(3),
        };
        assert!(!both.is_met(12_000, 2));
        assert!(!both.is_met(9_000, 5));
        assert!(both.is_met(10_000, 3));

        let amount_only = LoyaltyTerms {
            target_amount_cents: Some(10_000),
            target_transaction_count: None,
        };
        assert!(amount_only.is_met(10_000, 1));

        assert!(!LoyaltyTerms::default().is_met(1_000_000, 100));
    }

    #[test]
    fn test_artifact_follows_variant() {
        assert_eq!(Offer::basic(1).redemption_artifact(), RedemptionArtifact::Redemption);
        assert_eq!(
            Offer::loyalty(1, LoyaltyTerms::default()).redemption_artifact(),
            RedemptionArtifact::Reward
        );
        assert_eq!(Offer::targeted(1).redemption_artifact(), RedemptionArtifact::Reward);
    }

    #[test]
    fn test_kind_is_tagged_in_json() {
        let offer = Offer::loyalty(
            1,
            LoyaltyTerms {
                target_amount_cents: Some(100),
                target_transaction_count: None,
            },
        );
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["kind"]["type"], "LOYALTY");
        assert_eq!(json["kind"]["target_amount_cents"], 100);
    }
}
