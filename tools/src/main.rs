//! promo-runner: headless demo runner for the offer engine.
//!
//! Usage:
//!   promo-runner --db promo.db --seed 42
//!   promo-runner --customers 40 --days 21 --json

use anyhow::Result;
use chrono::{Duration, Utc};
use promo_core::{
    config::EngineConfig,
    engine::OfferEngine,
    offer::{Offer, OfferKind, OfferStatus, Prize, PrizeRank},
    store::PromoStore,
};
use std::env;
use uuid::Uuid;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let customers = parse_arg(&args, "--customers", 25u32);
    let days = parse_arg(&args, "--days", 14i64);
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");

    if !json {
        println!("promo-runner");
        println!("  seed:      {seed}");
        println!("  customers: {customers}");
        println!("  days:      {days}");
        println!("  db:        {db}");
        println!();
    }

    let store = if db == ":memory:" {
        PromoStore::in_memory()?
    } else {
        PromoStore::open(db)?
    };
    store.migrate()?;

    let variant_id = seed_demo_data(&store, customers, days)?;
    let offer_ids = seed_demo_offers(&store, &variant_id, days)?;

    let config = EngineConfig {
        draw_seed: Some(seed),
        ..EngineConfig::default()
    };
    let mut engine = OfferEngine::with_config(store, config);
    let now = Utc::now();

    // Refresh every cached snapshot, then render the live views.
    for offer_id in &offer_ids {
        let env = engine.recompute_eligibility(offer_id, now);
        if !env.success {
            log::warn!(
                "recompute failed for {offer_id}: {}",
                env.message.unwrap_or_default()
            );
        }
    }

    if json {
        // Machine-readable mode: emit the envelopes as JSON lines.
        println!("{}", serde_json::to_string(&engine.project_active(now))?);
        let draw = engine.draw_winners(&offer_ids[0]);
        println!("{}", serde_json::to_string(&draw)?);
        return Ok(());
    }

    let views = engine
        .project_active(now)
        .data
        .unwrap_or_default();
    println!("=== ACTIVE OFFERS ===");
    for view in &views {
        let target = view
            .target_count
            .map(|t| format!("/{t}"))
            .unwrap_or_default();
        println!(
            "  {:<24} [{}] {}{} eligible, ends in {}d {}h {}m",
            view.title,
            view.kind,
            view.current_count,
            target,
            view.remaining.days,
            view.remaining.hours,
            view.remaining.minutes,
        );
        for entry in &view.preview {
            println!("      {:<20} {:>10.2}  ({})", entry.display_name, entry.metric, entry.reference);
        }
    }
    println!();

    // Draw winners on the festival hit-counter offer.
    println!("=== WINNER DRAW ===");
    let env = engine.draw_winners(&offer_ids[0]);
    match env.data {
        Some(winners) => {
            for w in &winners {
                println!(
                    "  {:<7} {} ({})  invoice {}",
                    format!("{:?}", w.rank),
                    w.customer_name,
                    w.customer_phone,
                    w.invoice_id,
                );
            }
        }
        None => println!("  draw failed: {}", env.message.unwrap_or_default()),
    }
    println!();

    print_summary(&engine, &offer_ids)?;
    Ok(())
}

/// Seed a product variant, customers and a spread of invoices over the
/// past `days` days. Purchase patterns are deterministic in the customer
/// index so repeated runs against :memory: look the same.
fn seed_demo_data(store: &PromoStore, customers: u32, days: i64) -> Result<String> {
    let variant_id = "variant-espresso-250g".to_string();
    store.insert_variant(&variant_id, "Espresso beans 250g")?;

    let now = Utc::now();
    for i in 0..customers {
        let customer_id = format!("cust-{i:03}");
        store.insert_customer(
            &customer_id,
            &format!("Customer {i:03}"),
            &format!("555-{i:04}"),
        )?;

        // Customer i makes (i % 5) + 1 purchases, spread over the window.
        let purchases = (i % 5) + 1;
        for p in 0..purchases {
            let invoice_id = Uuid::new_v4().to_string();
            let at = now - Duration::days((p as i64 * days) / (purchases as i64 + 1) + 1);
            let total = 80.0 + f64::from(i % 7) * 60.0;
            store.insert_invoice(&invoice_id, &customer_id, total, at)?;
            store.insert_invoice_item(&invoice_id, &variant_id, 1, total)?;
        }
    }

    log::info!(
        "seeded {} customers, {} invoices",
        store.customer_count()?,
        store.invoice_count()?
    );
    Ok(variant_id)
}

/// One offer of each shape, all active over a window spanning `days`
/// back and a week forward.
fn seed_demo_offers(store: &PromoStore, variant_id: &str, days: i64) -> Result<Vec<String>> {
    let now = Utc::now();
    let start = now - Duration::days(days);
    let end = now + Duration::days(7);

    let offers = vec![
        Offer {
            offer_id:           Uuid::new_v4().to_string(),
            variant_id:         variant_id.to_string(),
            status:             OfferStatus::Active,
            start_date:         start,
            end_date:           end,
            kind:               OfferKind::HitCounter {
                festival_name: "Harvest Festival".into(),
                customer_limit: 100,
                prizes: vec![
                    Prize {
                        rank:      PrizeRank::First,
                        name:      "Espresso machine".into(),
                        image_url: "img/machine.png".into(),
                    },
                    Prize {
                        rank:      PrizeRank::Second,
                        name:      "Grinder".into(),
                        image_url: "img/grinder.png".into(),
                    },
                    Prize {
                        rank:      PrizeRank::Third,
                        name:      "Mug set".into(),
                        image_url: "img/mugs.png".into(),
                    },
                ],
            },
            last_recomputed_at: None,
        },
        Offer {
            offer_id:           Uuid::new_v4().to_string(),
            variant_id:         variant_id.to_string(),
            status:             OfferStatus::Active,
            start_date:         start,
            end_date:           end,
            kind:               OfferKind::AmountBased {
                festival_name: "Harvest Festival".into(),
                minimum_amount: 300.0,
                prize_name: "Gift hamper".into(),
                prize_image_url: "img/hamper.png".into(),
            },
            last_recomputed_at: None,
        },
        Offer {
            offer_id:           Uuid::new_v4().to_string(),
            variant_id:         variant_id.to_string(),
            status:             OfferStatus::Active,
            start_date:         start,
            end_date:           end,
            kind:               OfferKind::VisitCount {
                visit_count: 3,
                prize_name: "Loyalty tumbler".into(),
                prize_image_url: "img/tumbler.png".into(),
            },
            last_recomputed_at: None,
        },
        Offer {
            offer_id:           Uuid::new_v4().to_string(),
            variant_id:         variant_id.to_string(),
            status:             OfferStatus::Active,
            start_date:         start,
            end_date:           end,
            kind:               OfferKind::PurchaseAmount {
                target_amount: 500.0,
                prize_name: "Big spender basket".into(),
                prize_image_url: "img/basket.png".into(),
            },
            last_recomputed_at: None,
        },
    ];

    let mut ids = Vec::with_capacity(offers.len());
    for offer in &offers {
        store.insert_offer(offer)?;
        ids.push(offer.offer_id.clone());
    }
    Ok(ids)
}

fn print_summary(engine: &OfferEngine, offer_ids: &[String]) -> Result<()> {
    println!("=== RUN SUMMARY ===");
    for offer_id in offer_ids {
        let offer = match engine.store().get_offer(offer_id) {
            Ok(o) => o,
            Err(e) => {
                log::warn!("summary skipped {offer_id}: {e}");
                continue;
            }
        };
        let winners = engine.store().winners(offer_id)?;
        println!(
            "  {:<16} {:<10} winners: {}",
            offer.kind.label(),
            offer.status.as_str(),
            winners.len(),
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
