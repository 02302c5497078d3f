use std::collections::HashSet;
use std::sync::Arc;

use buylocal_core::{Clock, Entity, Notifier, Repository, User};
use buylocal_engagement::{
    CommentService, EligibleTerminalService, FavoriteService, LikeService, LoyaltyTransaction,
    LoyaltyTransactionService, RedemptionService, RewardService, ShareService,
};
use buylocal_member::Member;
use buylocal_store::{EngineConfig, InMemoryRepository};
use chrono::Duration;
use tracing::{debug, info, instrument};

use crate::eligibility::{order_for_listing, EligibilityPolicy, Ineligibility};
use crate::error::{OfferError, Result};
use crate::events::OfferTelemetry;
use crate::loyalty::{LoyaltyProgress, TransactionOutcome};
use crate::models::{Offer, OfferKind};
use crate::redemption::{RedemptionOutcome, RedemptionReceipt};

/// Everything the offer engine reads or writes besides offers themselves.
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub likes: LikeService,
    pub favorites: FavoriteService,
    pub shares: ShareService,
    pub comments: CommentService,
    pub redemptions: RedemptionService,
    pub rewards: RewardService,
    pub transactions: LoyaltyTransactionService,
    pub terminals: EligibleTerminalService,
}

impl Collaborators {
    /// Every satellite service backed by its own empty in-memory repository.
    pub fn in_memory(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            likes: LikeService::new(memory_repository()),
            favorites: FavoriteService::new(memory_repository()),
            shares: ShareService::new(memory_repository()),
            comments: CommentService::new(memory_repository()),
            redemptions: RedemptionService::new(memory_repository()),
            rewards: RewardService::new(memory_repository()),
            transactions: LoyaltyTransactionService::new(memory_repository()),
            terminals: EligibleTerminalService::new(memory_repository()),
        }
    }
}

fn memory_repository<T: Entity>() -> Arc<dyn Repository<T>> {
    Arc::new(InMemoryRepository::<T>::new())
}

/// Offer lifecycle, eligibility and redemption.
///
/// The service holds no state of its own; concurrent calls are isolated by
/// the repositories behind it.
#[derive(Clone)]
pub struct OfferService {
    offers: Arc<dyn Repository<Offer>>,
    likes: LikeService,
    favorites: FavoriteService,
    shares: ShareService,
    comments: CommentService,
    redemptions: RedemptionService,
    rewards: RewardService,
    transactions: LoyaltyTransactionService,
    terminals: EligibleTerminalService,
    telemetry: OfferTelemetry,
    clock: Arc<dyn Clock>,
    reward_validity: Duration,
}

impl OfferService {
    pub fn new(
        offers: Arc<dyn Repository<Offer>>,
        collaborators: Collaborators,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Self {
        Self {
            offers,
            likes: collaborators.likes,
            favorites: collaborators.favorites,
            shares: collaborators.shares,
            comments: collaborators.comments,
            redemptions: collaborators.redemptions,
            rewards: collaborators.rewards,
            transactions: collaborators.transactions,
            terminals: collaborators.terminals,
            telemetry: OfferTelemetry::new(collaborators.notifier, &config),
            clock,
            reward_validity: Duration::days(config.reward_validity_days),
        }
    }

    #[instrument(skip(self))]
    pub async fn find(&self, offer_id: i64) -> Result<Offer> {
        self.offers
            .find_by_id(offer_id)
            .await?
            .ok_or(OfferError::NotFound(offer_id))
    }

    /// Persist a new offer. Creation and modification dates are stamped here
    /// and the offer always starts unapproved, whoever submits it. Schedule
    /// dates are stored as given.
    #[instrument(skip(self, offer, actor), fields(institution_id = offer.institution_id, actor = actor.user_id))]
    pub async fn add(&self, mut offer: Offer, actor: &User) -> Result<Offer> {
        let now = self.clock.now();
        offer.id = 0;
        offer.creation_date = now;
        offer.timestamp = now;
        offer.is_admin_approved = false;

        let offer = self.offers.add(offer).await?;
        info!(offer_id = offer.id, role = ?actor.role, "Offer added");
        Ok(offer)
    }

    /// Persist edits and refresh the timestamp. Creation date, approval and
    /// the deleted flag keep their stored values. Lapsed schedules are
    /// accepted.
    #[instrument(skip(self, offer, actor), fields(offer_id = offer.id, actor = actor.user_id))]
    pub async fn update(&self, mut offer: Offer, actor: &User) -> Result<Offer> {
        let stored = self.find(offer.id).await?;
        offer.creation_date = stored.creation_date;
        offer.is_admin_approved = stored.is_admin_approved;
        offer.is_deleted = stored.is_deleted;
        offer.timestamp = self.clock.now();

        let offer = self.offers.update(offer).await?;
        debug!("Offer updated");
        Ok(offer)
    }

    /// Soft-delete the offer and everything hanging off it. Dependents go
    /// first, the offer last. Safe to repeat.
    #[instrument(skip(self, offer, actor), fields(offer_id = offer.id, actor = actor.user_id))]
    pub async fn remove(&self, offer: &Offer, actor: &User) -> Result<Offer> {
        let mut stored = self.find(offer.id).await?;

        self.likes.mark_deleted(self.likes.for_offer(stored.id).await?).await?;
        self.favorites.mark_deleted(self.favorites.for_offer(stored.id).await?).await?;
        self.shares.mark_deleted(self.shares.for_offer(stored.id).await?).await?;
        self.comments.mark_deleted(self.comments.for_offer(stored.id).await?).await?;

        match stored.kind {
            OfferKind::Basic => {
                self.redemptions
                    .mark_deleted(self.redemptions.for_offer(stored.id).await?)
                    .await?;
            }
            OfferKind::Loyalty(_) | OfferKind::Targeted => {
                self.rewards.mark_deleted(self.rewards.for_offer(stored.id).await?).await?;
            }
        }

        stored.is_deleted = true;
        stored.timestamp = self.clock.now();
        let stored = self.offers.update(stored).await?;
        info!("Offer removed");
        Ok(stored)
    }

    /// Offers the member can see right now, in listing order. Targeted offers
    /// appear only while the member holds a live reward for them.
    #[instrument(skip(self, member), fields(member_id = member.id, institution_id = member.institution_id))]
    pub async fn get_available_offers(&self, member: &Member) -> Result<Vec<Offer>> {
        let now = self.clock.now();
        let policy = EligibilityPolicy::listing(member.institution_id);
        let candidates = self.offers.query(&|o: &Offer| policy.admits(o, now)).await?;

        let rewarded: HashSet<i64> = if candidates.iter().any(Offer::is_targeted) {
            self.rewards
                .available_for_member(member.id, now)
                .await?
                .into_iter()
                .map(|r| r.offer_id)
                .collect()
        } else {
            HashSet::new()
        };

        let mut offers: Vec<Offer> = candidates
            .into_iter()
            .filter(|o| !o.is_targeted() || rewarded.contains(&o.id))
            .collect();
        order_for_listing(&mut offers);

        debug!(count = offers.len(), "Available offers");
        Ok(offers)
    }

    /// Listing for visitors without a member context. Targeted offers never
    /// appear here.
    #[instrument(skip(self))]
    pub async fn get_available_public_offers(&self, institution_id: i64) -> Result<Vec<Offer>> {
        let now = self.clock.now();
        let policy = EligibilityPolicy::listing(institution_id);
        let mut offers = self
            .offers
            .query(&|o: &Offer| !o.is_targeted() && policy.admits(o, now))
            .await?;
        order_for_listing(&mut offers);
        Ok(offers)
    }

    /// `None` when the offer is absent or fails the institution lookup gates.
    #[instrument(skip(self))]
    pub async fn find_by_institution(
        &self,
        offer_id: i64,
        institution_id: i64,
        include_hidden: bool,
    ) -> Result<Option<Offer>> {
        let now = self.clock.now();
        let policy = EligibilityPolicy::institution_lookup(institution_id, include_hidden);

        Ok(self
            .offers
            .find_by_id(offer_id)
            .await?
            .filter(|o| policy.admits(o, now)))
    }

    /// Every offer of the institution in any state.
    #[instrument(skip(self))]
    pub async fn get_by_institution(&self, institution_id: i64) -> Result<Vec<Offer>> {
        Ok(self
            .offers
            .query(&|o: &Offer| o.institution_id == institution_id)
            .await?)
    }

    /// Claim the offer for the member.
    ///
    /// Basic offers record a new redemption. Loyalty and targeted offers spend
    /// the member's soonest-expiring available reward. Any unmet precondition
    /// comes back as `Rejected` with nothing written. Eligibility is judged on
    /// the stored offer, never on the caller's copy.
    #[instrument(skip(self, offer, member), fields(offer_id = offer.id, member_id = member.id))]
    pub async fn redeem(&self, offer: &Offer, member: &Member) -> Result<RedemptionOutcome> {
        let offer = self.find(offer.id).await?;
        let now = self.clock.now();

        let (receipt, artifact_id) = match offer.kind {
            OfferKind::Basic => {
                if let Err(reason) = EligibilityPolicy::basic_redemption().evaluate(&offer, now) {
                    return Ok(self.reject(reason));
                }
                let redemption = self.redemptions.record(offer.id, member.id, now).await?;
                let id = redemption.id;
                (RedemptionReceipt::Basic(redemption), id)
            }
            OfferKind::Loyalty(_) | OfferKind::Targeted => {
                if offer.is_deleted {
                    return Ok(self.reject(Ineligibility::Deleted));
                }
                let Some(reward) = self.rewards.find_redeemable(member.id, offer.id, now).await? else {
                    return Ok(self.reject(Ineligibility::NoEligibleReward));
                };
                let Some(reward) = self.rewards.redeem(&reward, now).await? else {
                    return Ok(self.reject(Ineligibility::NoEligibleReward));
                };
                let id = reward.id;
                (RedemptionReceipt::Reward(reward), id)
            }
        };

        info!(artifact_id, "Offer redeemed");
        self.telemetry
            .log_offer_redeemed(&offer, member.id, artifact_id, now)
            .await;
        Ok(RedemptionOutcome::Redeemed(receipt))
    }

    /// Count a purchase toward a loyalty offer and pay out a reward once
    /// every configured target is reached. A missing offer is `NotFound`.
    #[instrument(skip(self, offer, member), fields(offer_id = offer.id, member_id = member.id))]
    pub async fn record_transaction(
        &self,
        offer: &Offer,
        member: &Member,
        amount_cents: i64,
        terminal_code: Option<&str>,
    ) -> Result<TransactionOutcome> {
        if amount_cents <= 0 {
            return Err(OfferError::Validation(format!(
                "transaction amount must be positive, got {}",
                amount_cents
            )));
        }

        let offer = self.find(offer.id).await?;
        let now = self.clock.now();
        let Some(terms) = offer.loyalty_terms() else {
            return Ok(TransactionOutcome::Rejected(Ineligibility::NotLoyalty));
        };
        if let Err(reason) = EligibilityPolicy::listing(member.institution_id).evaluate(&offer, now) {
            debug!(reason = reason.code(), "Transaction rejected");
            return Ok(TransactionOutcome::Rejected(reason));
        }
        if let Some(code) = terminal_code {
            if !self.terminals.accepts(offer.id, code).await? {
                debug!(terminal_code = code, "Transaction rejected at terminal");
                return Ok(TransactionOutcome::Rejected(Ineligibility::TerminalNotEligible));
            }
        }

        self.transactions
            .add(LoyaltyTransaction::new(
                offer.id,
                member.id,
                amount_cents,
                terminal_code.map(str::to_string),
                now,
            ))
            .await?;

        let open = self.transactions.open_for(member.id, offer.id).await?;
        let progress = LoyaltyProgress::tally(offer.id, member.id, terms, &open);
        if !progress.is_complete() {
            debug!(amount_cents = progress.amount_cents, count = progress.transaction_count, "Loyalty progress");
            return Ok(TransactionOutcome::Progress(progress));
        }

        let reward = self
            .rewards
            .issue(offer.id, member.id, now, self.reward_validity)
            .await?;
        self.transactions.consume(open, reward.id).await?;

        info!(reward_id = reward.id, "Loyalty reward earned");
        self.telemetry.log_reward_earned(&reward, now).await;
        Ok(TransactionOutcome::RewardEarned(reward))
    }

    fn reject(&self, reason: Ineligibility) -> RedemptionOutcome {
        debug!(reason = reason.code(), "Redemption rejected");
        RedemptionOutcome::Rejected(reason)
    }
}
