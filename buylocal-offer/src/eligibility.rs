use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Offer;

/// Why an offer cannot be listed, redeemed or earned against right now.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ineligibility {
    WrongInstitution,
    NotApproved,
    Deleted,
    Hidden,
    NotStarted,
    Expired,
    NoLiveLocation,
    /// Loyalty and targeted offers need an unredeemed, unexpired reward.
    NoEligibleReward,
    NotLoyalty,
    TerminalNotEligible,
}

impl Ineligibility {
    /// Stable code for callers that report rejections.
    pub fn code(&self) -> &'static str {
        match self {
            Ineligibility::WrongInstitution => "OFFER_WRONG_INSTITUTION",
            Ineligibility::NotApproved => "OFFER_NOT_APPROVED",
            Ineligibility::Deleted => "OFFER_DELETED",
            Ineligibility::Hidden => "OFFER_HIDDEN",
            Ineligibility::NotStarted => "OFFER_NOT_STARTED",
            Ineligibility::Expired => "OFFER_EXPIRED",
            Ineligibility::NoLiveLocation => "MERCHANT_NO_LIVE_LOCATION",
            Ineligibility::NoEligibleReward => "NO_ELIGIBLE_REWARD",
            Ineligibility::NotLoyalty => "OFFER_NOT_LOYALTY",
            Ineligibility::TerminalNotEligible => "TERMINAL_NOT_ELIGIBLE",
        }
    }
}

impl std::fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One condition an offer must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Institution(i64),
    Approved,
    NotDeleted,
    Visible,
    Started,
    NotExpired,
    LiveLocation,
}

impl Gate {
    fn check(&self, offer: &Offer, now: DateTime<Utc>) -> Result<(), Ineligibility> {
        let passed = match self {
            Gate::Institution(id) => offer.institution_id == *id,
            Gate::Approved => offer.is_admin_approved,
            Gate::NotDeleted => !offer.is_deleted,
            Gate::Visible => !offer.is_hidden,
            Gate::Started => offer.has_started(now),
            Gate::NotExpired => !offer.has_expired(now),
            Gate::LiveLocation => offer.merchant.has_live_location(),
        };

        if passed {
            return Ok(());
        }

        Err(match self {
            Gate::Institution(_) => Ineligibility::WrongInstitution,
            Gate::Approved => Ineligibility::NotApproved,
            Gate::NotDeleted => Ineligibility::Deleted,
            Gate::Visible => Ineligibility::Hidden,
            Gate::Started => Ineligibility::NotStarted,
            Gate::NotExpired => Ineligibility::Expired,
            Gate::LiveLocation => Ineligibility::NoLiveLocation,
        })
    }
}

/// An ordered list of gates. Evaluation stops at the first failure, so the
/// order decides which reason a caller sees.
#[derive(Debug, Clone)]
pub struct EligibilityPolicy {
    gates: Vec<Gate>,
}

impl EligibilityPolicy {
    pub fn new(gates: Vec<Gate>) -> Self {
        Self { gates }
    }

    /// Offers a member of `institution_id` may see in listings.
    pub fn listing(institution_id: i64) -> Self {
        Self::new(vec![
            Gate::Institution(institution_id),
            Gate::NotDeleted,
            Gate::Approved,
            Gate::Visible,
            Gate::Started,
            Gate::NotExpired,
            Gate::LiveLocation,
        ])
    }

    /// Single-offer lookup by institution. Approval and schedule are not
    /// checked; hidden offers pass only when asked for.
    pub fn institution_lookup(institution_id: i64, include_hidden: bool) -> Self {
        let mut gates = vec![Gate::Institution(institution_id), Gate::NotDeleted];
        if !include_hidden {
            gates.push(Gate::Visible);
        }
        gates.push(Gate::LiveLocation);
        Self::new(gates)
    }

    /// Preconditions for claiming a basic offer.
    pub fn basic_redemption() -> Self {
        Self::new(vec![Gate::NotDeleted, Gate::Approved, Gate::Started, Gate::NotExpired])
    }

    pub fn evaluate(&self, offer: &Offer, now: DateTime<Utc>) -> Result<(), Ineligibility> {
        self.gates.iter().try_for_each(|gate| gate.check(offer, now))
    }

    pub fn admits(&self, offer: &Offer, now: DateTime<Utc>) -> bool {
        self.evaluate(offer, now).is_ok()
    }
}

/// Listing order: featured first, then targeted, then newest first.
/// The sort is stable, so equal offers keep repository order.
pub fn order_for_listing(offers: &mut [Offer]) {
    offers.sort_by(listing_cmp);
}

fn listing_cmp(a: &Offer, b: &Offer) -> Ordering {
    b.is_featured
        .cmp(&a.is_featured)
        .then_with(|| b.is_targeted().cmp(&a.is_targeted()))
        .then_with(|| b.creation_date.cmp(&a.creation_date))
}
