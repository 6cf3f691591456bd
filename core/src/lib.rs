//! promo-core: offer eligibility & fulfilment engine for time-bound
//! retail promotions.
//!
//! An offer ties a campaign window to one product variant and takes one
//! of four shapes:
//!   festival/hit_counter     — first N unique customers
//!   festival/amount_based    — minimum single-purchase spend
//!   regular/visit_count      — minimum number of qualifying purchases
//!   regular/purchase_amount  — minimum cumulative spend
//!
//! The evaluator computes who currently qualifies from the invoice log,
//! the winner selector draws three ranked prize winners for hit-counter
//! offers, and the progress projector renders live counts for display.
//! All persistence goes through [`store::PromoStore`].

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod offer;
pub mod progress;
pub mod rng;
pub mod store;
pub mod types;
pub mod winner;
