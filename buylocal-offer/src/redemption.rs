use buylocal_engagement::{Redemption, Reward};
use serde::Serialize;

use crate::eligibility::Ineligibility;

/// What a successful redemption left behind.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "artifact", content = "record", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionReceipt {
    /// A basic offer claim.
    Basic(Redemption),
    /// The loyalty or targeted reward that was spent.
    Reward(Reward),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionOutcome {
    Redeemed(RedemptionReceipt),
    /// Nothing was written.
    Rejected(Ineligibility),
}

impl RedemptionOutcome {
    pub fn is_redeemed(&self) -> bool {
        matches!(self, RedemptionOutcome::Redeemed(_))
    }

    pub fn rejection(&self) -> Option<Ineligibility> {
        match self {
            RedemptionOutcome::Rejected(reason) => Some(*reason),
            RedemptionOutcome::Redeemed(_) => None,
        }
    }
}
