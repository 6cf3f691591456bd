//! Offer data model — campaign definitions and their derived results.
//!
//! An offer is persisted as a flat row with free-text offer_type/sub_type
//! columns (that is what the admin CRUD collaborator writes). The engine
//! only ever works on the decoded [`Offer`] with its [`OfferKind`]; a row
//! outside the four legal (offer_type, sub_type) pairs fails to decode.
//!
//! Cached eligibility snapshots and winners are derived, not
//! authoritative: every decision path re-evaluates against the invoice
//! log, the snapshots exist for audit and reporting only.

use crate::{
    error::{EngineError, EngineResult},
    types::{CustomerId, InvoiceId, OfferId, VariantId},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Active,
    Completed,
    Inactive,
}

impl OfferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> EngineResult<Self> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "inactive" => Ok(Self::Inactive),
            other => Err(anyhow::anyhow!("unknown offer status '{other}'").into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrizeRank {
    First,
    Second,
    Third,
}

impl PrizeRank {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Third => "third",
        }
    }

    pub fn parse(s: &str) -> EngineResult<Self> {
        match s {
            "first" => Ok(Self::First),
            "second" => Ok(Self::Second),
            "third" => Ok(Self::Third),
            other => Err(anyhow::anyhow!("unknown prize rank '{other}'").into()),
        }
    }

    /// Ranks in draw order.
    pub const ALL: [PrizeRank; 3] = [PrizeRank::First, PrizeRank::Second, PrizeRank::Third];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prize {
    pub rank:      PrizeRank,
    pub name:      String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub rank:           PrizeRank,
    pub invoice_id:     InvoiceId,
    pub customer_name:  String,
    pub customer_phone: String,
    pub announced_at:   DateTime<Utc>,
    /// Shared by the three winners of one draw, for audit.
    pub draw_id:        String,
}

/// One row of a regular-offer eligibility result: who qualified and the
/// metric that qualified them (visit count or cumulative spend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleCustomer {
    pub customer_id:  CustomerId,
    pub display_name: String,
    pub metric:       f64,
}

/// One row of a festival-offer eligibility result: the qualifying invoice
/// joined with its customer for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibleInvoice {
    pub invoice_id:     InvoiceId,
    pub customer_id:    CustomerId,
    pub customer_name:  String,
    pub customer_phone: String,
    pub created_at:     DateTime<Utc>,
    pub total_payable:  f64,
}

/// The four legal campaign shapes. Exactly one sub-type field set exists
/// per shape; anything else never makes it past [`Offer::from_row`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OfferKind {
    /// Festival: first `customer_limit` unique customers, three ranked prizes.
    HitCounter {
        festival_name:  String,
        customer_limit: u32,
        prizes:         Vec<Prize>,
    },
    /// Festival: minimum single-purchase spend.
    AmountBased {
        festival_name:   String,
        minimum_amount:  f64,
        prize_name:      String,
        prize_image_url: String,
    },
    /// Regular: minimum number of qualifying purchases.
    VisitCount {
        visit_count:     u32,
        prize_name:      String,
        prize_image_url: String,
    },
    /// Regular: minimum cumulative spend.
    PurchaseAmount {
        target_amount:   f64,
        prize_name:      String,
        prize_image_url: String,
    },
}

impl OfferKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HitCounter { .. } => "hit_counter",
            Self::AmountBased { .. } => "amount_based",
            Self::VisitCount { .. } => "visit_count",
            Self::PurchaseAmount { .. } => "purchase_amount",
        }
    }

    pub fn offer_type(&self) -> &'static str {
        match self {
            Self::HitCounter { .. } | Self::AmountBased { .. } => "festival",
            Self::VisitCount { .. } | Self::PurchaseAmount { .. } => "regular",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id:           OfferId,
    pub variant_id:         VariantId,
    pub status:             OfferStatus,
    pub start_date:         DateTime<Utc>,
    pub end_date:           DateTime<Utc>,
    pub kind:               OfferKind,
    pub last_recomputed_at: Option<DateTime<Utc>>,
}

/// Raw persisted form of an offer — the flat nullable-column row the
/// admin collaborator writes. Decoding validates the shape.
#[derive(Debug, Clone)]
pub struct OfferRow {
    pub offer_id:           OfferId,
    pub variant_id:         VariantId,
    pub status:             String,
    pub offer_type:         String,
    pub sub_type:           String,
    pub festival_name:      Option<String>,
    pub customer_limit:     Option<i64>,
    pub minimum_amount:     Option<f64>,
    pub visit_count:        Option<i64>,
    pub target_amount:      Option<f64>,
    pub prize_name:         Option<String>,
    pub prize_image_url:    Option<String>,
    pub start_date:         i64,
    pub end_date:           i64,
    pub last_recomputed_at: Option<i64>,
}

impl Offer {
    /// Decode a raw row (plus its prize rows, for hit-counter offers).
    /// Rejects any (offer_type, sub_type) outside the four legal pairs,
    /// and any count column outside the u32 range.
    pub fn from_row(row: OfferRow, prizes: Vec<Prize>) -> EngineResult<Offer> {
        let invalid = || EngineError::InvalidOfferShape {
            id:         row.offer_id.clone(),
            offer_type: row.offer_type.clone(),
            sub_type:   row.sub_type.clone(),
        };
        let count = |v: Option<i64>| {
            v.and_then(|v| u32::try_from(v).ok()).ok_or_else(invalid)
        };

        let kind = match (row.offer_type.as_str(), row.sub_type.as_str()) {
            ("festival", "hit_counter") => OfferKind::HitCounter {
                festival_name:  row.festival_name.clone().ok_or_else(invalid)?,
                customer_limit: count(row.customer_limit)?,
                prizes,
            },
            ("festival", "amount_based") => OfferKind::AmountBased {
                festival_name:   row.festival_name.clone().ok_or_else(invalid)?,
                minimum_amount:  row.minimum_amount.ok_or_else(invalid)?,
                prize_name:      row.prize_name.clone().unwrap_or_default(),
                prize_image_url: row.prize_image_url.clone().unwrap_or_default(),
            },
            ("regular", "visit_count") => OfferKind::VisitCount {
                visit_count:     count(row.visit_count)?,
                prize_name:      row.prize_name.clone().unwrap_or_default(),
                prize_image_url: row.prize_image_url.clone().unwrap_or_default(),
            },
            ("regular", "purchase_amount") => OfferKind::PurchaseAmount {
                target_amount:   row.target_amount.ok_or_else(invalid)?,
                prize_name:      row.prize_name.clone().unwrap_or_default(),
                prize_image_url: row.prize_image_url.clone().unwrap_or_default(),
            },
            _ => return Err(invalid()),
        };

        Ok(Offer {
            offer_id: row.offer_id,
            variant_id: row.variant_id,
            status: OfferStatus::parse(&row.status)?,
            start_date: crate::types::from_unix(row.start_date),
            end_date: crate::types::from_unix(row.end_date),
            kind,
            last_recomputed_at: row.last_recomputed_at.map(crate::types::from_unix),
        })
    }

    /// Flatten back to the persisted form. Prize rows are carried
    /// separately (see `PromoStore::insert_offer`).
    pub fn to_row(&self) -> OfferRow {
        let mut row = OfferRow {
            offer_id:           self.offer_id.clone(),
            variant_id:         self.variant_id.clone(),
            status:             self.status.as_str().to_string(),
            offer_type:         self.kind.offer_type().to_string(),
            sub_type:           self.kind.label().to_string(),
            festival_name:      None,
            customer_limit:     None,
            minimum_amount:     None,
            visit_count:        None,
            target_amount:      None,
            prize_name:         None,
            prize_image_url:    None,
            start_date:         crate::types::to_unix(self.start_date),
            end_date:           crate::types::to_unix(self.end_date),
            last_recomputed_at: self.last_recomputed_at.map(crate::types::to_unix),
        };
        match &self.kind {
            OfferKind::HitCounter {
                festival_name,
                customer_limit,
                ..
            } => {
                row.festival_name = Some(festival_name.clone());
                row.customer_limit = Some(i64::from(*customer_limit));
            }
            OfferKind::AmountBased {
                festival_name,
                minimum_amount,
                prize_name,
                prize_image_url,
            } => {
                row.festival_name = Some(festival_name.clone());
                row.minimum_amount = Some(*minimum_amount);
                row.prize_name = Some(prize_name.clone());
                row.prize_image_url = Some(prize_image_url.clone());
            }
            OfferKind::VisitCount {
                visit_count,
                prize_name,
                prize_image_url,
            } => {
                row.visit_count = Some(i64::from(*visit_count));
                row.prize_name = Some(prize_name.clone());
                row.prize_image_url = Some(prize_image_url.clone());
            }
            OfferKind::PurchaseAmount {
                target_amount,
                prize_name,
                prize_image_url,
            } => {
                row.target_amount = Some(*target_amount);
                row.prize_name = Some(prize_name.clone());
                row.prize_image_url = Some(prize_image_url.clone());
            }
        }
        row
    }

    pub fn prizes(&self) -> &[Prize] {
        match &self.kind {
            OfferKind::HitCounter { prizes, .. } => prizes,
            _ => &[],
        }
    }
}

/// The evaluator's output: a discriminated payload matching the offer
/// variant. Festival variants return qualifying invoices, regular
/// variants return qualifying customers with their metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", content = "rows", rename_all = "snake_case")]
pub enum EligibilityResult {
    Invoices(Vec<EligibleInvoice>),
    Customers(Vec<EligibleCustomer>),
}

impl EligibilityResult {
    pub fn count(&self) -> usize {
        match self {
            Self::Invoices(rows) => rows.len(),
            Self::Customers(rows) => rows.len(),
        }
    }
}
