#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use promo_core::offer::{Offer, OfferKind, OfferStatus, Prize, PrizeRank};
use promo_core::store::PromoStore;

/// The product variant every fixture offer targets.
pub const VARIANT: &str = "variant-espresso-250g";

/// A second variant used to prove the product filter.
pub const OTHER_VARIANT: &str = "variant-teapot";

pub fn store() -> PromoStore {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = PromoStore::in_memory().unwrap();
    store.migrate().unwrap();
    store.insert_variant(VARIANT, "Espresso beans 250g").unwrap();
    store.insert_variant(OTHER_VARIANT, "Teapot").unwrap();
    store
}

/// Noon UTC on a day in January 2026 — the standard campaign month.
pub fn jan(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap()
}

pub fn jan_at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, day, hour, minute, 0).unwrap()
}

/// Campaign window covering all of January 2026.
pub fn january_window() -> (DateTime<Utc>, DateTime<Utc>) {
    (
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap(),
    )
}

pub fn seed_customer(store: &PromoStore, id: &str, name: &str) {
    store
        .insert_customer(id, name, &format!("555-{id}"))
        .unwrap();
}

/// Insert an active invoice with one line item for [`VARIANT`].
pub fn seed_sale(
    store: &PromoStore,
    invoice_id: &str,
    customer_id: &str,
    total: f64,
    at: DateTime<Utc>,
) {
    store
        .insert_invoice(invoice_id, customer_id, total, at)
        .unwrap();
    store
        .insert_invoice_item(invoice_id, VARIANT, 1, total)
        .unwrap();
}

/// Insert an active invoice whose only item is a different variant.
pub fn seed_sale_other_product(
    store: &PromoStore,
    invoice_id: &str,
    customer_id: &str,
    total: f64,
    at: DateTime<Utc>,
) {
    store
        .insert_invoice(invoice_id, customer_id, total, at)
        .unwrap();
    store
        .insert_invoice_item(invoice_id, OTHER_VARIANT, 1, total)
        .unwrap();
}

pub fn three_prizes() -> Vec<Prize> {
    vec![
        Prize {
            rank:      PrizeRank::First,
            name:      "Grinder".into(),
            image_url: "img/grinder.png".into(),
        },
        Prize {
            rank:      PrizeRank::Second,
            name:      "Mug set".into(),
            image_url: "img/mugs.png".into(),
        },
        Prize {
            rank:      PrizeRank::Third,
            name:      "Gift card".into(),
            image_url: "img/card.png".into(),
        },
    ]
}

pub fn hit_counter_offer(id: &str, customer_limit: u32) -> Offer {
    let (start, end) = january_window();
    Offer {
        offer_id:           id.into(),
        variant_id:         VARIANT.into(),
        status:             OfferStatus::Active,
        start_date:         start,
        end_date:           end,
        kind:               OfferKind::HitCounter {
            festival_name: "New Year Festival".into(),
            customer_limit,
            prizes: three_prizes(),
        },
        last_recomputed_at: None,
    }
}

pub fn amount_based_offer(id: &str, minimum_amount: f64) -> Offer {
    let (start, end) = january_window();
    Offer {
        offer_id:           id.into(),
        variant_id:         VARIANT.into(),
        status:             OfferStatus::Active,
        start_date:         start,
        end_date:           end,
        kind:               OfferKind::AmountBased {
            festival_name: "New Year Festival".into(),
            minimum_amount,
            prize_name: "Hamper".into(),
            prize_image_url: "img/hamper.png".into(),
        },
        last_recomputed_at: None,
    }
}

pub fn visit_count_offer(id: &str, visit_count: u32) -> Offer {
    let (start, end) = january_window();
    Offer {
        offer_id:           id.into(),
        variant_id:         VARIANT.into(),
        status:             OfferStatus::Active,
        start_date:         start,
        end_date:           end,
        kind:               OfferKind::VisitCount {
            visit_count,
            prize_name: "Loyalty tumbler".into(),
            prize_image_url: "img/tumbler.png".into(),
        },
        last_recomputed_at: None,
    }
}

pub fn purchase_amount_offer(id: &str, target_amount: f64) -> Offer {
    let (start, end) = january_window();
    Offer {
        offer_id:           id.into(),
        variant_id:         VARIANT.into(),
        status:             OfferStatus::Active,
        start_date:         start,
        end_date:           end,
        kind:               OfferKind::PurchaseAmount {
            target_amount,
            prize_name: "Big spender basket".into(),
            prize_image_url: "img/basket.png".into(),
        },
        last_recomputed_at: None,
    }
}
