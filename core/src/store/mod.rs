//! SQLite persistence layer.
//!
//! RULE: Only the store modules talk to the database.
//! The evaluator, winner selector and projector call store methods —
//! they never execute SQL directly.
//!
//! The invoice log and customer records are owned by external
//! collaborators; the writes for them here exist for tests and the demo
//! runner. The engine itself only writes offer state.

use crate::error::EngineResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

mod invoice;
mod offer;

pub struct PromoStore {
    conn: Connection,
}

impl PromoStore {
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_offers.sql"))?;
        Ok(())
    }

    // ── Customer ───────────────────────────────────────────────

    pub fn insert_customer(
        &self,
        customer_id: &str,
        display_name: &str,
        phone: &str,
    ) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO customer (customer_id, display_name, phone) VALUES (?1, ?2, ?3)",
            params![customer_id, display_name, phone],
        )?;
        Ok(())
    }

    pub fn customer_count(&self) -> EngineResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM customer", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // ── Product variant ────────────────────────────────────────

    pub fn insert_variant(&self, variant_id: &str, label: &str) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO product_variant (variant_id, label) VALUES (?1, ?2)",
            params![variant_id, label],
        )?;
        Ok(())
    }

    // ── Invoice log ────────────────────────────────────────────

    pub fn insert_invoice(
        &self,
        invoice_id: &str,
        customer_id: &str,
        total_payable: f64,
        created_at: DateTime<Utc>,
    ) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO invoice (invoice_id, customer_id, total_payable, created_at, status)
             VALUES (?1, ?2, ?3, ?4, 'active')",
            params![
                invoice_id,
                customer_id,
                total_payable,
                crate::types::to_unix(created_at)
            ],
        )?;
        Ok(())
    }

    pub fn insert_invoice_item(
        &self,
        invoice_id: &str,
        variant_id: &str,
        quantity: i64,
        unit_price: f64,
    ) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO invoice_item (invoice_id, variant_id, quantity, unit_price, line_total)
             VALUES (?1, ?2, ?3, ?4, ?3 * ?4)",
            params![invoice_id, variant_id, quantity, unit_price],
        )?;
        Ok(())
    }

    pub fn cancel_invoice(&self, invoice_id: &str) -> EngineResult<()> {
        self.conn.execute(
            "UPDATE invoice SET status = 'cancelled' WHERE invoice_id = ?1",
            params![invoice_id],
        )?;
        Ok(())
    }

    pub fn invoice_count(&self) -> EngineResult<i64> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM invoice WHERE status = 'active'",
                [],
                |row| row.get(0),
            )
            .map_err(Into::into)
    }
}
