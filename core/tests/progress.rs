mod common;

use common::*;
use chrono::Duration;
use promo_core::config::EngineConfig;
use promo_core::progress::{project, project_one, RemainingTime};

fn config() -> EngineConfig {
    EngineConfig::default()
}

#[test]
fn view_pairs_live_count_with_static_target() {
    let store = store();
    seed_customer(&store, "cust-a", "Asha");
    seed_customer(&store, "cust-b", "Bharat");
    seed_sale(&store, "inv-a", "cust-a", 100.0, jan(2));
    seed_sale(&store, "inv-b", "cust-b", 100.0, jan(3));
    let offer = hit_counter_offer("offer-hc", 50);
    store.insert_offer(&offer).unwrap();

    let view = project_one(&store, &offer, jan(10), &config()).unwrap();
    assert_eq!(view.current_count, 2);
    assert_eq!(view.target_count, Some(50));
    assert_eq!(view.title, "New Year Festival");
    assert_eq!(view.kind, "hit_counter");
}

/// The display target is variant-specific: customer_limit for
/// hit_counter, visit_count for visit_count, none for amount thresholds.
#[test]
fn target_is_variant_specific() {
    let store = store();
    let vc = visit_count_offer("offer-vc", 4);
    let ab = amount_based_offer("offer-ab", 500.0);
    let pa = purchase_amount_offer("offer-pa", 1000.0);
    store.insert_offer(&vc).unwrap();
    store.insert_offer(&ab).unwrap();
    store.insert_offer(&pa).unwrap();

    assert_eq!(
        project_one(&store, &vc, jan(10), &config()).unwrap().target_count,
        Some(4)
    );
    assert_eq!(
        project_one(&store, &ab, jan(10), &config()).unwrap().target_count,
        None
    );
    assert_eq!(
        project_one(&store, &pa, jan(10), &config()).unwrap().target_count,
        None
    );
}

#[test]
fn preview_is_bounded_at_the_configured_limit() {
    let store = store();
    for i in 0..8u32 {
        let id = format!("cust-{i}");
        seed_customer(&store, &id, &format!("Customer {i}"));
        seed_sale(&store, &format!("inv-{i}"), &id, 100.0, jan(2 + i));
    }
    let offer = hit_counter_offer("offer-hc", 20);
    store.insert_offer(&offer).unwrap();

    let view = project_one(&store, &offer, jan(31), &config()).unwrap();
    assert_eq!(view.current_count, 8);
    assert_eq!(view.preview.len(), 5);
    assert_eq!(view.preview[0].display_name, "Customer 0");

    let tighter = EngineConfig {
        preview_limit: 2,
        ..EngineConfig::default()
    };
    let view = project_one(&store, &offer, jan(31), &tighter).unwrap();
    assert_eq!(view.preview.len(), 2);
}

#[test]
fn remaining_time_breaks_down_days_hours_minutes() {
    let end = jan(31);
    let now = end - Duration::days(2) - Duration::hours(3) - Duration::minutes(30);
    let remaining = RemainingTime::until(now, end);
    assert_eq!(remaining.days, 2);
    assert_eq!(remaining.hours, 3);
    assert_eq!(remaining.minutes, 30);
    assert!(!remaining.is_elapsed());
}

#[test]
fn remaining_time_clamps_to_zero_after_end() {
    let end = jan(31);
    let remaining = RemainingTime::until(end + Duration::days(4), end);
    assert_eq!(remaining.days, 0);
    assert_eq!(remaining.hours, 0);
    assert_eq!(remaining.minutes, 0);
    assert!(remaining.is_elapsed());
}

/// An invoice whose customer record no longer resolves renders with a
/// placeholder instead of failing the view.
#[test]
fn missing_customer_record_gets_a_placeholder() {
    let store = store();
    // No customer row inserted for cust-ghost.
    seed_sale(&store, "inv-ghost", "cust-ghost", 100.0, jan(2));
    let offer = hit_counter_offer("offer-hc", 10);
    store.insert_offer(&offer).unwrap();

    let view = project_one(&store, &offer, jan(10), &config()).unwrap();
    assert_eq!(view.current_count, 1);
    assert_eq!(view.preview[0].display_name, "Unknown customer");
}

/// Batch projection renders every decodable active offer and skips the
/// malformed one instead of failing the whole batch.
#[test]
fn batch_projection_tolerates_a_malformed_offer() {
    let store = store();
    seed_customer(&store, "cust-a", "Asha");
    seed_sale(&store, "inv-a", "cust-a", 100.0, jan(2));
    store.insert_offer(&hit_counter_offer("offer-good", 10)).unwrap();

    let (start, end) = january_window();
    store
        .insert_offer_row(&promo_core::offer::OfferRow {
            offer_id:           "offer-mangled".into(),
            variant_id:         VARIANT.into(),
            status:             "active".into(),
            offer_type:         "regular".into(),
            sub_type:           "hit_counter".into(),
            festival_name:      None,
            customer_limit:     Some(5),
            minimum_amount:     None,
            visit_count:        None,
            target_amount:      None,
            prize_name:         None,
            prize_image_url:    None,
            start_date:         start.timestamp(),
            end_date:           end.timestamp(),
            last_recomputed_at: None,
        })
        .unwrap();

    let offers = store.active_offers().unwrap();
    assert_eq!(offers.len(), 1, "malformed offer should be skipped");

    let views = project(&store, &offers, jan(10), &config());
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].offer_id, "offer-good");
}

/// A corrupt prize rank on one offer is skipped like a malformed shape,
/// not allowed to fail the whole batch listing.
#[test]
fn batch_listing_tolerates_a_corrupt_prize_row() {
    let store = store();
    store.insert_offer(&hit_counter_offer("offer-good", 10)).unwrap();

    let offer = hit_counter_offer("offer-corrupt", 10);
    store.insert_offer_row(&offer.to_row()).unwrap();
    store
        .insert_prize_row("offer-corrupt", "zeroth", "Mystery box", "img/box.png")
        .unwrap();

    let offers = store.active_offers().unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].offer_id, "offer-good");
}

/// Projection is read-only: it never touches the cached snapshot or the
/// recompute stamp.
#[test]
fn projection_never_writes_back() {
    let store = store();
    seed_customer(&store, "cust-a", "Asha");
    seed_sale(&store, "inv-a", "cust-a", 100.0, jan(2));
    let offer = hit_counter_offer("offer-hc", 10);
    store.insert_offer(&offer).unwrap();

    project_one(&store, &offer, jan(10), &config()).unwrap();

    assert!(store.cached_eligible_invoices("offer-hc").unwrap().is_empty());
    assert_eq!(store.get_offer("offer-hc").unwrap().last_recomputed_at, None);
}
