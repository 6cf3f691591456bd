//! Winner selection for hit-counter offers.
//!
//! The draw always re-runs the evaluator against "now" — the cached
//! snapshot on the offer record is never consulted. Three distinct
//! entries are drawn without replacement by a partial Fisher–Yates and
//! ranked in draw order. Persisting the winners and flipping the offer
//! to completed happens in one conditional update, so of two racing
//! draws exactly one commits and the other gets AlreadyCompleted.

use crate::{
    error::{EngineError, EngineResult},
    evaluator,
    offer::{EligibilityResult, OfferKind, OfferStatus, PrizeRank, Winner},
    rng::DrawRng,
    store::PromoStore,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Three prize ranks, three winners. A hard business minimum independent
/// of the offer's customer_limit.
pub const WINNER_COUNT: usize = 3;

pub fn select_winners(
    store: &PromoStore,
    offer_id: &str,
    now: DateTime<Utc>,
    rng: &mut DrawRng,
) -> EngineResult<Vec<Winner>> {
    let offer = store.get_offer(offer_id)?;

    match offer.kind {
        OfferKind::HitCounter { .. } => {}
        ref other => {
            return Err(EngineError::WrongVariant {
                id:   offer.offer_id.clone(),
                kind: other.label(),
            })
        }
    }

    // Fast path before evaluating; the commit re-checks under the
    // transaction, this just gives a clean error without a draw.
    match offer.status {
        OfferStatus::Active => {}
        OfferStatus::Completed => {
            return Err(EngineError::AlreadyCompleted {
                id: offer.offer_id.clone(),
            })
        }
        OfferStatus::Inactive => {
            return Err(EngineError::OfferInactive {
                id: offer.offer_id.clone(),
            })
        }
    }

    let mut eligible = match evaluator::evaluate(store, &offer, now)? {
        EligibilityResult::Invoices(rows) => rows,
        EligibilityResult::Customers(_) => unreachable!("hit_counter evaluates to invoices"),
    };

    if eligible.len() < WINNER_COUNT {
        return Err(EngineError::InsufficientEligible {
            found:    eligible.len(),
            required: WINNER_COUNT,
        });
    }

    rng.partial_shuffle(&mut eligible, WINNER_COUNT);

    let draw_id = Uuid::new_v4().to_string();
    let winners: Vec<Winner> = PrizeRank::ALL
        .iter()
        .zip(eligible.iter())
        .map(|(rank, row)| Winner {
            rank:           *rank,
            invoice_id:     row.invoice_id.clone(),
            customer_name:  row.customer_name.clone(),
            customer_phone: row.customer_phone.clone(),
            announced_at:   now,
            draw_id:        draw_id.clone(),
        })
        .collect();

    store.commit_draw(&offer.offer_id, &winners)?;

    log::info!(
        "offer {offer_id}: draw {draw_id} committed, winners {:?}",
        winners
            .iter()
            .map(|w| w.customer_name.as_str())
            .collect::<Vec<_>>()
    );

    Ok(winners)
}
