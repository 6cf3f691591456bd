//! Operation boundary — the request/response surface callers consume.
//!
//! Every operation returns a tagged success/failure envelope. Failure
//! messages are human-readable display text, not machine-parsed codes;
//! no error escapes this boundary as a panic. Each operation is
//! independently retryable: the reads are pure, the recompute overwrites
//! wholesale, and the draw's only non-idempotent effect is guarded by
//! the conditional status update.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    evaluator,
    offer::{EligibilityResult, Offer, Winner},
    progress::{self, ProgressView},
    rng::DrawRng,
    store::PromoStore,
    winner,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn fail(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
            data: None,
        }
    }

    fn wrap(result: EngineResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                log::warn!("operation failed: {e}");
                Self::fail(e.to_string())
            }
        }
    }
}

pub struct OfferEngine {
    store:  PromoStore,
    config: EngineConfig,
    rng:    DrawRng,
}

impl OfferEngine {
    pub fn new(store: PromoStore) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: PromoStore, config: EngineConfig) -> Self {
        let rng = match config.draw_seed {
            Some(seed) => DrawRng::seeded(seed),
            None => DrawRng::from_entropy(),
        };
        Self { store, config, rng }
    }

    pub fn store(&self) -> &PromoStore {
        &self.store
    }

    /// Transient evaluation for display; never writes.
    pub fn live_eligibility(
        &self,
        offer_id: &str,
        as_of: DateTime<Utc>,
    ) -> Envelope<EligibilityResult> {
        Envelope::wrap(evaluator::evaluate_offer(&self.store, offer_id, as_of))
    }

    /// Administrative recompute: evaluate and refresh the cached snapshot.
    pub fn recompute_eligibility(
        &self,
        offer_id: &str,
        as_of: DateTime<Utc>,
    ) -> Envelope<EligibilityResult> {
        Envelope::wrap(evaluator::recompute_and_persist(
            &self.store,
            offer_id,
            as_of,
        ))
    }

    /// Operator-triggered winner draw for a hit-counter offer.
    pub fn draw_winners(&mut self, offer_id: &str) -> Envelope<Vec<Winner>> {
        Envelope::wrap(winner::select_winners(
            &self.store,
            offer_id,
            Utc::now(),
            &mut self.rng,
        ))
    }

    /// Live progress views for every active offer, one per offer.
    pub fn project_active(&self, now: DateTime<Utc>) -> Envelope<Vec<ProgressView>> {
        Envelope::wrap(self.store.active_offers().map(|offers| {
            progress::project(&self.store, &offers, now, &self.config)
        }))
    }

    /// Live progress for one specific offer.
    pub fn project_offer(&self, offer_id: &str, now: DateTime<Utc>) -> Envelope<ProgressView> {
        Envelope::wrap(
            self.store
                .get_offer(offer_id)
                .and_then(|offer| progress::project_one(&self.store, &offer, now, &self.config)),
        )
    }

    /// Register a new campaign (created active by the admin collaborator).
    pub fn create_offer(&self, offer: &Offer) -> Envelope<()> {
        Envelope::wrap(self.store.insert_offer(offer))
    }

    /// Full-row update of a campaign's definition fields.
    pub fn update_offer(&self, offer: &Offer) -> Envelope<()> {
        Envelope::wrap(self.store.update_offer(offer))
    }

    /// Simple hard remove.
    pub fn remove_offer(&self, offer_id: &str) -> Envelope<()> {
        Envelope::wrap(self.store.delete_offer(offer_id))
    }
}
