use std::sync::Arc;

use buylocal_core::{FixedClock, Notifier};
use buylocal_engagement::{
    EligibleTerminal, EligibleTerminalService, Like, LikeService, LoyaltyTransaction,
    LoyaltyTransactionService, Notification, NotificationService, Redemption, RedemptionService, Reward,
    RewardService, RewardState,
};
use buylocal_shared::{OfferEvent, RewardEarnedEvent};
use buylocal_store::InMemoryRepository;
use chrono::{Duration, TimeZone, Utc};

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

#[tokio::test]
async fn test_mark_deleted_keeps_records() {
    let repository = Arc::new(InMemoryRepository::<Like>::new());
    let likes = LikeService::new(repository.clone());

    likes.add(Like::new(1, 10, now())).await.unwrap();
    likes.add(Like::new(1, 11, now())).await.unwrap();
    likes.add(Like::new(2, 10, now())).await.unwrap();

    let attached = likes.for_offer(1).await.unwrap();
    assert_eq!(attached.len(), 2);

    let deleted = likes.mark_deleted(attached).await.unwrap();
    assert!(deleted.iter().all(|l| l.is_deleted));

    // Soft delete only: rows stay, and deleting again changes nothing.
    assert_eq!(repository.len().await, 3);
    let again = likes.mark_deleted(likes.for_offer(1).await.unwrap()).await.unwrap();
    assert_eq!(again.len(), 2);
    assert!(!likes.find_by_id(3).await.unwrap().unwrap().is_deleted);
}

#[tokio::test]
async fn test_for_member_skips_deleted() {
    let likes = LikeService::new(Arc::new(InMemoryRepository::<Like>::new()));
    let first = likes.add(Like::new(1, 10, now())).await.unwrap();
    likes.add(Like::new(2, 10, now())).await.unwrap();

    likes.mark_deleted(vec![first]).await.unwrap();

    let live = likes.for_member(10).await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].offer_id, 2);
}

#[tokio::test]
async fn test_record_redemption() {
    let redemptions = RedemptionService::new(Arc::new(InMemoryRepository::<Redemption>::new()));

    let redemption = redemptions.record(4, 7, now()).await.unwrap();
    assert_eq!(redemption.id, 1);
    assert_eq!(redemption.redeemed_at, now());
    assert_eq!(redemptions.for_offer(4).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_find_redeemable_prefers_soonest_expiry() {
    let rewards = RewardService::new(Arc::new(
        InMemoryRepository::with_rows(vec![
            Reward { id: 1, ..Reward::new(3, 7, now(), now() + Duration::days(20)) },
            Reward { id: 2, ..Reward::new(3, 7, now(), now() + Duration::days(5)) },
            Reward { id: 3, ..Reward::new(3, 8, now(), now() + Duration::days(1)) },
            Reward { id: 4, ..Reward::new(3, 7, now(), now() - Duration::days(1)) },
        ])
        .unwrap(),
    ));

    let reward = rewards.find_redeemable(7, 3, now()).await.unwrap().unwrap();
    assert_eq!(reward.id, 2);

    assert_eq!(rewards.available_for_member(7, now()).await.unwrap().len(), 2);
    assert!(rewards.find_redeemable(7, 99, now()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reward_redeems_once() {
    let rewards = RewardService::new(Arc::new(InMemoryRepository::<Reward>::new()));
    let reward = rewards.issue(3, 7, now(), Duration::days(30)).await.unwrap();
    assert_eq!(reward.expiration_date, now() + Duration::days(30));

    let redeemed = rewards.redeem(&reward, now()).await.unwrap().unwrap();
    assert_eq!(redeemed.state(), RewardState::Redeemed);
    assert_eq!(redeemed.redemption_date, Some(now()));

    // A stale copy still says Earned; the stored row decides.
    assert!(rewards.redeem(&reward, now()).await.unwrap().is_none());
    assert!(rewards.find_redeemable(7, 3, now()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_redemptions_spend_reward_once() {
    let rewards = RewardService::new(Arc::new(InMemoryRepository::<Reward>::new()));
    let reward = rewards.issue(3, 7, now(), Duration::days(30)).await.unwrap();

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let rewards = rewards.clone();
            let reward = reward.clone();
            tokio::spawn(async move { rewards.redeem(&reward, now()).await.unwrap().is_some() })
        })
        .collect();

    let mut spent = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            spent += 1;
        }
    }
    assert_eq!(spent, 1);
}

#[tokio::test]
async fn test_consume_closes_open_transactions() {
    let transactions = LoyaltyTransactionService::new(Arc::new(InMemoryRepository::<LoyaltyTransaction>::new()));
    transactions
        .add(LoyaltyTransaction::new(3, 7, 1500, None, now() + Duration::hours(2)))
        .await
        .unwrap();
    transactions
        .add(LoyaltyTransaction::new(3, 7, 1000, None, now()))
        .await
        .unwrap();
    transactions
        .add(LoyaltyTransaction::new(3, 8, 900, None, now()))
        .await
        .unwrap();

    let open = transactions.open_for(7, 3).await.unwrap();
    assert_eq!(open.iter().map(|t| t.amount_cents).collect::<Vec<_>>(), vec![1000, 1500]);

    transactions.consume(open, 12).await.unwrap();
    assert!(transactions.open_for(7, 3).await.unwrap().is_empty());
    assert_eq!(transactions.find_by_id(1).await.unwrap().unwrap().reward_id, Some(12));
    assert_eq!(transactions.open_for(8, 3).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_terminal_restrictions() {
    let terminals = EligibleTerminalService::new(Arc::new(InMemoryRepository::<EligibleTerminal>::new()));

    // Nothing configured: any terminal counts.
    assert!(terminals.accepts(3, "T-100").await.unwrap());

    let listed = terminals.add(EligibleTerminal::new(3, "T-100")).await.unwrap();
    assert!(terminals.accepts(3, "T-100").await.unwrap());
    assert!(!terminals.accepts(3, "T-200").await.unwrap());

    terminals.mark_deleted(vec![listed]).await.unwrap();
    assert!(terminals.accepts(3, "T-200").await.unwrap());
}

#[tokio::test]
async fn test_notification_service_stores_events() {
    let clock = Arc::new(FixedClock::at(now()));
    let notifications = NotificationService::new(Arc::new(InMemoryRepository::<Notification>::new()), clock);

    let event = OfferEvent::RewardEarned(RewardEarnedEvent {
        event_id: uuid::Uuid::new_v4(),
        reward_id: 5,
        offer_id: 3,
        member_id: 7,
        expires_at: 0,
        timestamp: 0,
    });
    notifications.notify(&event).await.unwrap();

    let unread = notifications.unread_for_member(7).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].event_type, "reward_earned");
    assert_eq!(unread[0].offer_id, 3);
    assert_eq!(unread[0].created_at, now());
    assert_eq!(unread[0].payload["reward_id"], 5);

    notifications.mark_read(unread[0].id).await.unwrap();
    assert!(notifications.unread_for_member(7).await.unwrap().is_empty());
}
