//! Offer persistence: campaign rows, prize rows, the derived
//! eligibility snapshots, and the winner commit.
//!
//! The winner commit is the one state transition this engine owns. It is
//! a single transaction whose status update is conditional on
//! status = 'active'; the affected-row count decides whether this draw
//! won the race or loses with AlreadyCompleted.

use super::PromoStore;
use crate::{
    error::{EngineError, EngineResult},
    offer::{EligibleCustomer, Offer, OfferRow, OfferStatus, Prize, PrizeRank, Winner},
    types::{from_unix, to_unix, InvoiceId, OfferId},
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

impl PromoStore {
    // ── Offer CRUD ─────────────────────────────────────────────

    /// Insert a decoded offer plus its prize rows (hit-counter only).
    pub fn insert_offer(&self, offer: &Offer) -> EngineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        insert_offer_row(&tx, &offer.to_row())?;
        for prize in offer.prizes() {
            tx.execute(
                "INSERT INTO offer_prize (offer_id, rank, name, image_url)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    offer.offer_id,
                    prize.rank.as_str(),
                    prize.name,
                    prize.image_url
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Insert a raw row as the admin collaborator would, shape unchecked.
    pub fn insert_offer_row(&self, row: &OfferRow) -> EngineResult<()> {
        insert_offer_row(&self.conn, row)?;
        Ok(())
    }

    /// Insert a raw prize row, rank unchecked.
    pub fn insert_prize_row(
        &self,
        offer_id: &str,
        rank: &str,
        name: &str,
        image_url: &str,
    ) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO offer_prize (offer_id, rank, name, image_url)
             VALUES (?1, ?2, ?3, ?4)",
            params![offer_id, rank, name, image_url],
        )?;
        Ok(())
    }

    /// Load and decode one offer. Missing id is a not-found failure;
    /// an illegal (offer_type, sub_type) pair is an invalid-shape failure.
    pub fn get_offer(&self, offer_id: &str) -> EngineResult<Offer> {
        let row = self
            .conn
            .query_row(
                "SELECT offer_id, variant_id, status, offer_type, sub_type,
                        festival_name, customer_limit, minimum_amount,
                        visit_count, target_amount, prize_name, prize_image_url,
                        start_date, end_date, last_recomputed_at
                 FROM offer WHERE offer_id = ?1",
                params![offer_id],
                offer_row_mapper,
            )
            .optional()?
            .ok_or_else(|| EngineError::OfferNotFound {
                id: offer_id.to_string(),
            })?;
        let prizes = self.offer_prizes(offer_id)?;
        Offer::from_row(row, prizes)
    }

    /// All offers currently in 'active' status, decoded. Rows with an
    /// unrecognized shape are skipped with a warning so one malformed
    /// campaign cannot take down a batch operation.
    pub fn active_offers(&self) -> EngineResult<Vec<Offer>> {
        let mut stmt = self.conn.prepare(
            "SELECT offer_id, variant_id, status, offer_type, sub_type,
                    festival_name, customer_limit, minimum_amount,
                    visit_count, target_amount, prize_name, prize_image_url,
                    start_date, end_date, last_recomputed_at
             FROM offer WHERE status = 'active'
             ORDER BY end_date ASC",
        )?;
        let rows = stmt
            .query_map([], offer_row_mapper)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut offers = Vec::with_capacity(rows.len());
        for row in rows {
            let offer_id = row.offer_id.clone();
            let decoded = self
                .offer_prizes(&offer_id)
                .and_then(|prizes| Offer::from_row(row, prizes));
            match decoded {
                Ok(offer) => offers.push(offer),
                Err(e) => log::warn!("skipping offer {offer_id}: {e}"),
            }
        }
        Ok(offers)
    }

    /// Full-row update of an offer's definition fields, as the admin
    /// edit form writes: everything except status, cache and winners.
    pub fn update_offer(&self, offer: &Offer) -> EngineResult<()> {
        let row = offer.to_row();
        self.conn.execute(
            "UPDATE offer
             SET variant_id = ?2, offer_type = ?3, sub_type = ?4,
                 festival_name = ?5, customer_limit = ?6, minimum_amount = ?7,
                 visit_count = ?8, target_amount = ?9,
                 prize_name = ?10, prize_image_url = ?11,
                 start_date = ?12, end_date = ?13
             WHERE offer_id = ?1",
            params![
                row.offer_id,
                row.variant_id,
                row.offer_type,
                row.sub_type,
                row.festival_name,
                row.customer_limit,
                row.minimum_amount,
                row.visit_count,
                row.target_amount,
                row.prize_name,
                row.prize_image_url,
                row.start_date,
                row.end_date,
            ],
        )?;
        Ok(())
    }

    /// Simple hard remove of a campaign and its dependent rows.
    pub fn delete_offer(&self, offer_id: &str) -> EngineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM offer_eligible_invoice WHERE offer_id = ?1",
            params![offer_id],
        )?;
        tx.execute(
            "DELETE FROM offer_eligible_customer WHERE offer_id = ?1",
            params![offer_id],
        )?;
        tx.execute(
            "DELETE FROM offer_winner WHERE offer_id = ?1",
            params![offer_id],
        )?;
        tx.execute(
            "DELETE FROM offer_prize WHERE offer_id = ?1",
            params![offer_id],
        )?;
        tx.execute("DELETE FROM offer WHERE offer_id = ?1", params![offer_id])?;
        tx.commit()?;
        Ok(())
    }

    pub fn offer_status(&self, offer_id: &str) -> EngineResult<OfferStatus> {
        let status: String = self
            .conn
            .query_row(
                "SELECT status FROM offer WHERE offer_id = ?1",
                params![offer_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| EngineError::OfferNotFound {
                id: offer_id.to_string(),
            })?;
        OfferStatus::parse(&status)
    }

    pub fn offer_prizes(&self, offer_id: &str) -> EngineResult<Vec<Prize>> {
        let mut stmt = self.conn.prepare(
            "SELECT rank, name, image_url FROM offer_prize
             WHERE offer_id = ?1
             ORDER BY CASE rank WHEN 'first' THEN 0 WHEN 'second' THEN 1 ELSE 2 END",
        )?;
        let raw = stmt
            .query_map(params![offer_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter()
            .map(|(rank, name, image_url)| {
                Ok(Prize {
                    rank: PrizeRank::parse(&rank)?,
                    name,
                    image_url,
                })
            })
            .collect()
    }

    // ── Eligibility snapshots (audit only) ─────────────────────

    /// Overwrite the cached eligible-invoice snapshot wholesale and stamp
    /// the recompute instant. No incremental merge.
    pub fn replace_eligible_invoices(
        &self,
        offer_id: &str,
        invoice_ids: &[InvoiceId],
        as_of: DateTime<Utc>,
    ) -> EngineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM offer_eligible_invoice WHERE offer_id = ?1",
            params![offer_id],
        )?;
        for (position, invoice_id) in invoice_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO offer_eligible_invoice (offer_id, position, invoice_id)
                 VALUES (?1, ?2, ?3)",
                params![offer_id, position as i64, invoice_id],
            )?;
        }
        tx.execute(
            "UPDATE offer SET last_recomputed_at = ?2 WHERE offer_id = ?1",
            params![offer_id, to_unix(as_of)],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Overwrite the cached eligible-customer snapshot wholesale.
    pub fn replace_eligible_customers(
        &self,
        offer_id: &str,
        customers: &[EligibleCustomer],
        as_of: DateTime<Utc>,
    ) -> EngineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM offer_eligible_customer WHERE offer_id = ?1",
            params![offer_id],
        )?;
        for (position, c) in customers.iter().enumerate() {
            tx.execute(
                "INSERT INTO offer_eligible_customer
                     (offer_id, position, customer_id, display_name, metric)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    offer_id,
                    position as i64,
                    c.customer_id,
                    c.display_name,
                    c.metric
                ],
            )?;
        }
        tx.execute(
            "UPDATE offer SET last_recomputed_at = ?2 WHERE offer_id = ?1",
            params![offer_id, to_unix(as_of)],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn cached_eligible_invoices(&self, offer_id: &str) -> EngineResult<Vec<InvoiceId>> {
        let mut stmt = self.conn.prepare(
            "SELECT invoice_id FROM offer_eligible_invoice
             WHERE offer_id = ?1 ORDER BY position ASC",
        )?;
        let ids = stmt
            .query_map(params![offer_id], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn cached_eligible_customers(&self, offer_id: &str) -> EngineResult<Vec<EligibleCustomer>> {
        let mut stmt = self.conn.prepare(
            "SELECT customer_id, display_name, metric FROM offer_eligible_customer
             WHERE offer_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map(params![offer_id], |row| {
                Ok(EligibleCustomer {
                    customer_id:  row.get(0)?,
                    display_name: row.get(1)?,
                    metric:       row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Winner commit ──────────────────────────────────────────

    /// Persist a completed draw: three winner rows plus the one-way
    /// active → completed transition, in one transaction. The UPDATE is
    /// the compare-and-swap; zero affected rows means another draw
    /// committed first (or the offer was never active) and this draw is
    /// discarded.
    pub fn commit_draw(&self, offer_id: &OfferId, winners: &[Winner]) -> EngineResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        let flipped = tx.execute(
            "UPDATE offer SET status = 'completed'
             WHERE offer_id = ?1 AND status = 'active'",
            params![offer_id],
        )?;
        if flipped == 0 {
            return Err(EngineError::AlreadyCompleted {
                id: offer_id.clone(),
            });
        }
        for w in winners {
            tx.execute(
                "INSERT INTO offer_winner
                     (offer_id, rank, invoice_id, customer_name, customer_phone,
                      announced_at, draw_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    offer_id,
                    w.rank.as_str(),
                    w.invoice_id,
                    w.customer_name,
                    w.customer_phone,
                    to_unix(w.announced_at),
                    w.draw_id,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn winners(&self, offer_id: &str) -> EngineResult<Vec<Winner>> {
        let mut stmt = self.conn.prepare(
            "SELECT rank, invoice_id, customer_name, customer_phone, announced_at, draw_id
             FROM offer_winner WHERE offer_id = ?1
             ORDER BY CASE rank WHEN 'first' THEN 0 WHEN 'second' THEN 1 ELSE 2 END",
        )?;
        let raw = stmt
            .query_map(params![offer_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        raw.into_iter()
            .map(|(rank, invoice_id, name, phone, at, draw_id)| {
                Ok(Winner {
                    rank: PrizeRank::parse(&rank)?,
                    invoice_id,
                    customer_name: name,
                    customer_phone: phone,
                    announced_at: from_unix(at),
                    draw_id,
                })
            })
            .collect()
    }
}

fn offer_row_mapper(row: &rusqlite::Row<'_>) -> rusqlite::Result<OfferRow> {
    Ok(OfferRow {
        offer_id:           row.get(0)?,
        variant_id:         row.get(1)?,
        status:             row.get(2)?,
        offer_type:         row.get(3)?,
        sub_type:           row.get(4)?,
        festival_name:      row.get(5)?,
        customer_limit:     row.get(6)?,
        minimum_amount:     row.get(7)?,
        visit_count:        row.get(8)?,
        target_amount:      row.get(9)?,
        prize_name:         row.get(10)?,
        prize_image_url:    row.get(11)?,
        start_date:         row.get(12)?,
        end_date:           row.get(13)?,
        last_recomputed_at: row.get(14)?,
    })
}

fn insert_offer_row(conn: &rusqlite::Connection, row: &OfferRow) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO offer (
            offer_id, variant_id, status, offer_type, sub_type,
            festival_name, customer_limit, minimum_amount,
            visit_count, target_amount, prize_name, prize_image_url,
            start_date, end_date, last_recomputed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            row.offer_id,
            row.variant_id,
            row.status,
            row.offer_type,
            row.sub_type,
            row.festival_name,
            row.customer_limit,
            row.minimum_amount,
            row.visit_count,
            row.target_amount,
            row.prize_name,
            row.prize_image_url,
            row.start_date,
            row.end_date,
            row.last_recomputed_at,
        ],
    )?;
    Ok(())
}
