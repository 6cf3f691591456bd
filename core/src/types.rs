//! Shared primitive types used across the engine.

use chrono::{DateTime, Utc};

/// Stable identifier of an offer campaign.
pub type OfferId = String;

/// Stable identifier of a customer record.
pub type CustomerId = String;

/// Stable identifier of a completed sale.
pub type InvoiceId = String;

/// Stable identifier of a purchasable product variant.
pub type VariantId = String;

/// Convert a persisted unix-seconds column back to an instant.
/// Out-of-range values collapse to the epoch rather than failing a read.
pub fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Convert an instant to the unix-seconds form every table stores.
pub fn to_unix(at: DateTime<Utc>) -> i64 {
    at.timestamp()
}
