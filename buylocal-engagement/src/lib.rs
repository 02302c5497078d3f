//! Records that hang off an offer: member reactions (likes, favorites, shares,
//! comments), redemption artifacts (redemptions, rewards), loyalty bookkeeping
//! (transactions, eligible terminals) and persisted notifications.
//!
//! Every record points at its offer and member by id and is soft-deleted only.

pub mod models;
pub mod notification;
pub mod service;

pub use models::{
    Comment, EligibleTerminal, Favorite, Like, LoyaltyTransaction, MemberScoped, Notification,
    OfferScoped, Redemption, Reward, RewardState, Share,
};
pub use notification::NotificationService;
pub use service::{
    CommentService, EligibleTerminalService, EngagementService, FavoriteService, LikeService,
    LoyaltyTransactionService, RedemptionService, RewardService, ShareService,
};
