//! Progress projection for live display.
//!
//! Read-only and recomputed on every call: the POS banner polls this on
//! a timer. Each view pairs the live eligibility count with the offer's
//! static target and the time left in the campaign window. Nothing here
//! ever writes back to the offer record.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    evaluator,
    offer::{EligibilityResult, Offer, OfferKind},
    store::PromoStore,
    types::OfferId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemainingTime {
    pub days:    i64,
    pub hours:   i64,
    pub minutes: i64,
}

impl RemainingTime {
    /// Breakdown of end - now, clamped at zero once the window is past.
    pub fn until(now: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let delta = end - now;
        if delta <= chrono::Duration::zero() {
            return Self {
                days: 0,
                hours: 0,
                minutes: 0,
            };
        }
        Self {
            days:    delta.num_days(),
            hours:   delta.num_hours() % 24,
            minutes: delta.num_minutes() % 60,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }
}

/// One previewed eligible entry. `reference` is the invoice id for
/// festival offers and the customer id for regular offers; `metric` is
/// the invoice total or the qualifying count/sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
    pub display_name: String,
    pub reference:    String,
    pub metric:       f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    pub offer_id:      OfferId,
    pub title:         String,
    pub kind:          String,
    pub current_count: usize,
    /// Variant-specific: customer_limit for hit_counter, visit_count for
    /// visit_count offers, None for the amount thresholds.
    pub target_count:  Option<u32>,
    pub preview:       Vec<PreviewEntry>,
    pub remaining:     RemainingTime,
}

/// Project one offer's live progress.
pub fn project_one(
    store: &PromoStore,
    offer: &Offer,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> EngineResult<ProgressView> {
    let result = evaluator::evaluate(store, offer, now)?;
    let current_count = result.count();

    let preview = match &result {
        EligibilityResult::Invoices(rows) => rows
            .iter()
            .take(config.preview_limit)
            .map(|r| PreviewEntry {
                display_name: r.customer_name.clone(),
                reference:    r.invoice_id.clone(),
                metric:       r.total_payable,
            })
            .collect(),
        EligibilityResult::Customers(rows) => rows
            .iter()
            .take(config.preview_limit)
            .map(|r| PreviewEntry {
                display_name: r.display_name.clone(),
                reference:    r.customer_id.clone(),
                metric:       r.metric,
            })
            .collect(),
    };

    let (title, target_count) = match &offer.kind {
        OfferKind::HitCounter {
            festival_name,
            customer_limit,
            ..
        } => (festival_name.clone(), Some(*customer_limit)),
        OfferKind::AmountBased { festival_name, .. } => (festival_name.clone(), None),
        OfferKind::VisitCount {
            visit_count,
            prize_name,
            ..
        } => (prize_name.clone(), Some(*visit_count)),
        OfferKind::PurchaseAmount { prize_name, .. } => (prize_name.clone(), None),
    };

    Ok(ProgressView {
        offer_id: offer.offer_id.clone(),
        title,
        kind: offer.kind.label().to_string(),
        current_count,
        target_count,
        preview,
        remaining: RemainingTime::until(now, offer.end_date),
    })
}

/// Project a batch of offers. An offer whose evaluation fails is logged
/// and skipped so the rest of the batch still renders.
pub fn project(
    store: &PromoStore,
    offers: &[Offer],
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Vec<ProgressView> {
    let mut views = Vec::with_capacity(offers.len());
    for offer in offers {
        match project_one(store, offer, now, config) {
            Ok(view) => views.push(view),
            Err(e) => log::warn!("progress projection skipped offer {}: {e}", offer.offer_id),
        }
    }
    views
}
