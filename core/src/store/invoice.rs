//! Eligibility aggregation queries over the invoice log.
//!
//! Every query shares the same base relation: active invoices inside the
//! campaign window that contain at least one line item for the offer's
//! product variant. The per-variant aggregation happens in SQL; the
//! bare-column MIN/MAX trick picks the row belonging to the extreme
//! created_at per customer group.
//!
//! Customer joins are LEFT JOINs with a placeholder so an invoice whose
//! customer record no longer resolves still renders.

use super::PromoStore;
use crate::{
    error::EngineResult,
    offer::{EligibleCustomer, EligibleInvoice},
    types::{from_unix, to_unix, VariantId},
};
use chrono::{DateTime, Utc};
use rusqlite::params;

const UNKNOWN_CUSTOMER: &str = "Unknown customer";

impl PromoStore {
    /// hit_counter: earliest qualifying invoice per distinct customer,
    /// first-come-first-served, capped at `limit` rows.
    pub fn first_purchases(
        &self,
        variant_id: &VariantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: u32,
    ) -> EngineResult<Vec<EligibleInvoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.invoice_id, i.customer_id,
                    COALESCE(c.display_name, ?5), COALESCE(c.phone, ''),
                    MIN(i.created_at) AS first_at, i.total_payable
             FROM invoice i
             LEFT JOIN customer c ON c.customer_id = i.customer_id
             WHERE i.status = 'active'
               AND i.created_at >= ?1 AND i.created_at <= ?2
               AND EXISTS (SELECT 1 FROM invoice_item li
                           WHERE li.invoice_id = i.invoice_id
                             AND li.variant_id = ?3)
             GROUP BY i.customer_id
             ORDER BY first_at ASC, i.invoice_id ASC
             LIMIT ?4",
        )?;
        let rows = stmt
            .query_map(
                params![
                    to_unix(window_start),
                    to_unix(window_end),
                    variant_id,
                    limit as i64,
                    UNKNOWN_CUSTOMER,
                ],
                eligible_invoice_mapper,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// amount_based: latest invoice per distinct customer among those at
    /// or above the minimum single-purchase spend. No upper bound.
    pub fn latest_qualifying_purchases(
        &self,
        variant_id: &VariantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        minimum_amount: f64,
    ) -> EngineResult<Vec<EligibleInvoice>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.invoice_id, i.customer_id,
                    COALESCE(c.display_name, ?5), COALESCE(c.phone, ''),
                    MAX(i.created_at) AS last_at, i.total_payable
             FROM invoice i
             LEFT JOIN customer c ON c.customer_id = i.customer_id
             WHERE i.status = 'active'
               AND i.created_at >= ?1 AND i.created_at <= ?2
               AND i.total_payable >= ?4
               AND EXISTS (SELECT 1 FROM invoice_item li
                           WHERE li.invoice_id = i.invoice_id
                             AND li.variant_id = ?3)
             GROUP BY i.customer_id
             ORDER BY last_at ASC, i.invoice_id ASC",
        )?;
        let rows = stmt
            .query_map(
                params![
                    to_unix(window_start),
                    to_unix(window_end),
                    variant_id,
                    minimum_amount,
                    UNKNOWN_CUSTOMER,
                ],
                eligible_invoice_mapper,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// visit_count: customers with at least `min_visits` qualifying
    /// invoices in the window. Metric = the invoice count.
    pub fn customers_by_visit_count(
        &self,
        variant_id: &VariantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        min_visits: u32,
    ) -> EngineResult<Vec<EligibleCustomer>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.customer_id, COALESCE(c.display_name, ?5),
                    CAST(COUNT(*) AS REAL) AS visits
             FROM invoice i
             LEFT JOIN customer c ON c.customer_id = i.customer_id
             WHERE i.status = 'active'
               AND i.created_at >= ?1 AND i.created_at <= ?2
               AND EXISTS (SELECT 1 FROM invoice_item li
                           WHERE li.invoice_id = i.invoice_id
                             AND li.variant_id = ?3)
             GROUP BY i.customer_id
             HAVING COUNT(*) >= ?4
             ORDER BY visits DESC, i.customer_id ASC",
        )?;
        let rows = stmt
            .query_map(
                params![
                    to_unix(window_start),
                    to_unix(window_end),
                    variant_id,
                    min_visits as i64,
                    UNKNOWN_CUSTOMER,
                ],
                eligible_customer_mapper,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// purchase_amount: customers whose cumulative spend over qualifying
    /// invoices reaches `min_spend`. Metric = the sum.
    pub fn customers_by_spend(
        &self,
        variant_id: &VariantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        min_spend: f64,
    ) -> EngineResult<Vec<EligibleCustomer>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.customer_id, COALESCE(c.display_name, ?5),
                    SUM(i.total_payable) AS spend
             FROM invoice i
             LEFT JOIN customer c ON c.customer_id = i.customer_id
             WHERE i.status = 'active'
               AND i.created_at >= ?1 AND i.created_at <= ?2
               AND EXISTS (SELECT 1 FROM invoice_item li
                           WHERE li.invoice_id = i.invoice_id
                             AND li.variant_id = ?3)
             GROUP BY i.customer_id
             HAVING SUM(i.total_payable) >= ?4
             ORDER BY spend DESC, i.customer_id ASC",
        )?;
        let rows = stmt
            .query_map(
                params![
                    to_unix(window_start),
                    to_unix(window_end),
                    variant_id,
                    min_spend,
                    UNKNOWN_CUSTOMER,
                ],
                eligible_customer_mapper,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn eligible_invoice_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<EligibleInvoice> {
    Ok(EligibleInvoice {
        invoice_id:     row.get(0)?,
        customer_id:    row.get(1)?,
        customer_name:  row.get(2)?,
        customer_phone: row.get(3)?,
        created_at:     from_unix(row.get::<_, i64>(4)?),
        total_payable:  row.get(5)?,
    })
}

fn eligible_customer_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<EligibleCustomer> {
    Ok(EligibleCustomer {
        customer_id:  row.get(0)?,
        display_name: row.get(1)?,
        metric:       row.get(2)?,
    })
}
