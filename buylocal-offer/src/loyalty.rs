use buylocal_engagement::{LoyaltyTransaction, Reward};
use serde::Serialize;

use crate::eligibility::Ineligibility;
use crate::models::LoyaltyTerms;

/// A member's standing on a loyalty offer since their last reward.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoyaltyProgress {
    pub offer_id: i64,
    pub member_id: i64,
    pub amount_cents: i64,
    pub transaction_count: u32,
    pub target_amount_cents: Option<i64>,
    pub target_transaction_count: Option<u32>,
}

impl LoyaltyProgress {
    pub fn tally(offer_id: i64, member_id: i64, terms: &LoyaltyTerms, open: &[LoyaltyTransaction]) -> Self {
        Self {
            offer_id,
            member_id,
            amount_cents: open.iter().map(|t| t.amount_cents).sum(),
            transaction_count: u32::try_from(open.len()).unwrap_or(u32::MAX),
            target_amount_cents: terms.target_amount_cents,
            target_transaction_count: terms.target_transaction_count,
        }
    }

    pub fn is_complete(&self) -> bool {
        LoyaltyTerms {
            target_amount_cents: self.target_amount_cents,
            target_transaction_count: self.target_transaction_count,
        }
        .is_met(self.amount_cents, self.transaction_count)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionOutcome {
    /// Recorded; the targets are not met yet.
    Progress(LoyaltyProgress),
    /// Recorded, and the open transactions were converted into this reward.
    RewardEarned(Reward),
    /// Nothing was recorded.
    Rejected(Ineligibility),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_tally_counts_open_transactions() {
        let terms = LoyaltyTerms {
            target_amount_cents: Some(5_000),
            target_transaction_count: None,
        };
        let open = vec![
            LoyaltyTransaction::new(1, 2, 2_000, None, Utc::now()),
            LoyaltyTransaction::new(1, 2, 2_500, Some("T-1".to_string()), Utc::now()),
        ];

        let progress = LoyaltyProgress::tally(1, 2, &terms, &open);
        assert_eq!(progress.amount_cents, 4_500);
        assert_eq!(progress.transaction_count, 2);
        assert!(!progress.is_complete());

        let open = [open, vec![LoyaltyTransaction::new(1, 2, 500, None, Utc::now())]].concat();
        assert!(LoyaltyProgress::tally(1, 2, &terms, &open).is_complete());
    }
}
