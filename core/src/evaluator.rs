//! Eligibility evaluator — pure reads over the invoice log.
//!
//! One algorithm per offer shape, all over the same base relation:
//! active invoices inside [start_date, min(end_date, as_of)] containing
//! the offer's product variant.
//!
//!   hit_counter      — earliest invoice per customer, first N
//!   amount_based     — latest invoice per customer at/above the minimum
//!   visit_count      — customers with >= N qualifying invoices
//!   purchase_amount  — customers with cumulative spend >= target
//!
//! `evaluate` never writes. `recompute_and_persist` is the one place the
//! cached snapshot on the offer record is refreshed, and it always
//! overwrites wholesale.

use crate::{
    error::EngineResult,
    offer::{EligibilityResult, Offer, OfferKind},
    store::PromoStore,
};
use chrono::{DateTime, Utc};

/// Compute the qualifying set for one offer as of an instant.
pub fn evaluate(
    store: &PromoStore,
    offer: &Offer,
    as_of: DateTime<Utc>,
) -> EngineResult<EligibilityResult> {
    let window_end = offer.end_date.min(as_of);

    match &offer.kind {
        OfferKind::HitCounter { customer_limit, .. } => store
            .first_purchases(&offer.variant_id, offer.start_date, window_end, *customer_limit)
            .map(EligibilityResult::Invoices),
        OfferKind::AmountBased { minimum_amount, .. } => store
            .latest_qualifying_purchases(
                &offer.variant_id,
                offer.start_date,
                window_end,
                *minimum_amount,
            )
            .map(EligibilityResult::Invoices),
        OfferKind::VisitCount { visit_count, .. } => store
            .customers_by_visit_count(&offer.variant_id, offer.start_date, window_end, *visit_count)
            .map(EligibilityResult::Customers),
        OfferKind::PurchaseAmount { target_amount, .. } => store
            .customers_by_spend(&offer.variant_id, offer.start_date, window_end, *target_amount)
            .map(EligibilityResult::Customers),
    }
}

/// Load, decode and evaluate one offer by id.
pub fn evaluate_offer(
    store: &PromoStore,
    offer_id: &str,
    as_of: DateTime<Utc>,
) -> EngineResult<EligibilityResult> {
    let offer = store.get_offer(offer_id)?;
    evaluate(store, &offer, as_of)
}

/// Administrative recompute: evaluate live and overwrite the offer's
/// cached snapshot with the result. Returns the freshly computed set.
pub fn recompute_and_persist(
    store: &PromoStore,
    offer_id: &str,
    as_of: DateTime<Utc>,
) -> EngineResult<EligibilityResult> {
    let offer = store.get_offer(offer_id)?;
    let result = evaluate(store, &offer, as_of)?;

    match &result {
        EligibilityResult::Invoices(rows) => {
            let ids: Vec<_> = rows.iter().map(|r| r.invoice_id.clone()).collect();
            store.replace_eligible_invoices(offer_id, &ids, as_of)?;
        }
        EligibilityResult::Customers(rows) => {
            store.replace_eligible_customers(offer_id, rows, as_of)?;
        }
    }

    log::info!(
        "recomputed eligibility for offer {offer_id} ({}): {} rows",
        offer.kind.label(),
        result.count()
    );
    Ok(result)
}
