//! The offer engine: lifecycle, eligibility, listing order, redemption and
//! loyalty progress for basic, loyalty and targeted offers.

pub mod eligibility;
pub mod error;
pub mod events;
pub mod loyalty;
pub mod models;
pub mod redemption;
pub mod service;

pub use eligibility::{order_for_listing, EligibilityPolicy, Gate, Ineligibility};
pub use error::{OfferError, Result};
pub use events::OfferTelemetry;
pub use loyalty::{LoyaltyProgress, TransactionOutcome};
pub use models::{LoyaltyTerms, Merchant, MerchantLocation, Offer, OfferKind};
pub use redemption::{RedemptionOutcome, RedemptionReceipt};
pub use service::{Collaborators, OfferService};
