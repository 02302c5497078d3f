use std::sync::Arc;

use buylocal_core::{CoreResult, Repository};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument};

use crate::models::{
    Comment, EligibleTerminal, Favorite, Like, LoyaltyTransaction, MemberScoped, OfferScoped,
    Redemption, Reward, Share,
};

/// Thin service over one offer-linked record type.
///
/// Records are only ever soft-deleted through this service.
#[derive(Clone)]
pub struct EngagementService<T> {
    repository: Arc<dyn Repository<T>>,
}

pub type LikeService = EngagementService<Like>;
pub type FavoriteService = EngagementService<Favorite>;
pub type ShareService = EngagementService<Share>;
pub type CommentService = EngagementService<Comment>;
pub type RedemptionService = EngagementService<Redemption>;
pub type RewardService = EngagementService<Reward>;
pub type LoyaltyTransactionService = EngagementService<LoyaltyTransaction>;
pub type EligibleTerminalService = EngagementService<EligibleTerminal>;

impl<T: OfferScoped> EngagementService<T> {
    pub fn new(repository: Arc<dyn Repository<T>>) -> Self {
        Self { repository }
    }

    pub async fn add(&self, record: T) -> CoreResult<T> {
        let record = self.repository.add(record).await?;
        debug!(kind = T::KIND, id = record.id(), offer_id = record.offer_id(), "Record added");
        Ok(record)
    }

    pub async fn update(&self, record: T) -> CoreResult<T> {
        self.repository.update(record).await
    }

    pub async fn find_by_id(&self, id: i64) -> CoreResult<Option<T>> {
        self.repository.find_by_id(id).await
    }

    /// Every record attached to the offer, deleted ones included.
    pub async fn for_offer(&self, offer_id: i64) -> CoreResult<Vec<T>> {
        self.repository.query(&|r: &T| r.offer_id() == offer_id).await
    }

    /// Flag each record deleted and persist it. Already-deleted records are
    /// written back unchanged.
    pub async fn mark_deleted(&self, records: Vec<T>) -> CoreResult<Vec<T>> {
        let mut deleted = Vec::with_capacity(records.len());
        for mut record in records {
            record.mark_deleted();
            deleted.push(self.repository.update(record).await?);
        }
        debug!(kind = T::KIND, count = deleted.len(), "Records marked deleted");
        Ok(deleted)
    }
}

impl<T: OfferScoped + MemberScoped> EngagementService<T> {
    /// The member's live records, in store order.
    pub async fn for_member(&self, member_id: i64) -> CoreResult<Vec<T>> {
        self.repository
            .query(&|r: &T| r.member_id() == member_id && !r.is_deleted())
            .await
    }
}

impl EngagementService<Redemption> {
    #[instrument(skip(self, at))]
    pub async fn record(&self, offer_id: i64, member_id: i64, at: DateTime<Utc>) -> CoreResult<Redemption> {
        let redemption = self.repository.add(Redemption::new(offer_id, member_id, at)).await?;
        info!(redemption_id = redemption.id, "Redemption recorded");
        Ok(redemption)
    }
}

impl EngagementService<Reward> {
    pub async fn available_for_member(&self, member_id: i64, now: DateTime<Utc>) -> CoreResult<Vec<Reward>> {
        self.repository
            .query(&|r: &Reward| r.is_available_to(member_id, now))
            .await
    }

    /// The member's available reward on this offer that expires soonest.
    /// Ties go to the earlier record in store order.
    pub async fn find_redeemable(
        &self,
        member_id: i64,
        offer_id: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<Option<Reward>> {
        let rewards = self
            .repository
            .query(&|r: &Reward| r.offer_id == offer_id && r.is_available_to(member_id, now))
            .await?;
        Ok(rewards.into_iter().min_by_key(|r| r.expiration_date))
    }

    /// Move the stored reward to Redeemed. Returns `None` when the stored copy
    /// is no longer redeemable, e.g. another request redeemed it first. The
    /// check and the write happen as one repository `modify`.
    #[instrument(skip(self, reward, now), fields(reward_id = reward.id))]
    pub async fn redeem(&self, reward: &Reward, now: DateTime<Utc>) -> CoreResult<Option<Reward>> {
        let redeemed = self
            .repository
            .modify(reward.id, &|r: &mut Reward| r.redeem(now))
            .await?;

        match &redeemed {
            Some(_) => info!("Reward redeemed"),
            None => debug!("Reward no longer redeemable"),
        }
        Ok(redeemed)
    }

    #[instrument(skip(self, now, validity))]
    pub async fn issue(
        &self,
        offer_id: i64,
        member_id: i64,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> CoreResult<Reward> {
        let reward = self
            .repository
            .add(Reward::new(offer_id, member_id, now, now + validity))
            .await?;
        info!(reward_id = reward.id, expires_at = %reward.expiration_date, "Reward issued");
        Ok(reward)
    }
}

impl EngagementService<LoyaltyTransaction> {
    /// Transactions not yet converted into a reward, oldest first.
    pub async fn open_for(&self, member_id: i64, offer_id: i64) -> CoreResult<Vec<LoyaltyTransaction>> {
        let mut open = self
            .repository
            .query(&|t: &LoyaltyTransaction| {
                t.member_id == member_id && t.offer_id == offer_id && t.is_open()
            })
            .await?;
        open.sort_by_key(|t| t.transaction_date);
        Ok(open)
    }

    /// Stamp each transaction with the reward it paid for.
    pub async fn consume(&self, transactions: Vec<LoyaltyTransaction>, reward_id: i64) -> CoreResult<()> {
        let count = transactions.len();
        for mut tx in transactions {
            tx.reward_id = Some(reward_id);
            self.repository.update(tx).await?;
        }
        debug!(reward_id, count, "Loyalty transactions consumed");
        Ok(())
    }
}

impl EngagementService<EligibleTerminal> {
    /// An offer without live terminals accepts any terminal.
    pub async fn accepts(&self, offer_id: i64, terminal_code: &str) -> CoreResult<bool> {
        let terminals = self
            .repository
            .query(&|t: &EligibleTerminal| t.offer_id == offer_id && !t.is_deleted)
            .await?;

        Ok(terminals.is_empty() || terminals.iter().any(|t| t.terminal_code == terminal_code))
    }
}
