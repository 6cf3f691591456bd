use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Offer '{id}' not found")]
    OfferNotFound { id: String },

    #[error("Offer '{id}' has an unrecognized shape: {offer_type}/{sub_type}")]
    InvalidOfferShape {
        id: String,
        offer_type: String,
        sub_type: String,
    },

    #[error("Offer '{id}' is a {kind} offer; winner draws apply to hit-counter offers only")]
    WrongVariant { id: String, kind: &'static str },

    #[error("Winner draw found {found} eligible customers, need at least {required}")]
    InsufficientEligible { found: usize, required: usize },

    #[error("Offer '{id}' is already completed; winners were drawn previously")]
    AlreadyCompleted { id: String },

    #[error("Offer '{id}' is inactive; winner draws require an active offer")]
    OfferInactive { id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
