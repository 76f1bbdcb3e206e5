//! Behavioural tests for `CatalogFeed` driven by in-memory page sources.

use std::sync::Mutex;

use aip_catalog::{CatalogFeed, FetchOutcome, MemoryCatalog, PageSource, ScrollMetrics};
use aip_core::{CatalogFilters, CatalogQuery, Product, PAGE_SIZE};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

fn product(id: i64, name: &str, price: i64) -> Product {
    Product {
        product_id: id,
        product_name: name.to_string(),
        description: format!("{name} description"),
        short_description: String::new(),
        price: Decimal::new(price, 0),
        is_sale: false,
        sales_price: Decimal::ZERO,
        stock_quantity: 1,
        is_in_stock: true,
        low_stock_threshold: 5,
        size: "M".to_string(),
        images: Vec::new(),
        colors: Vec::new(),
        // Higher ids are newer.
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(id),
    }
}

fn products(ids: std::ops::Range<i64>) -> Vec<Product> {
    ids.map(|id| product(id, &format!("item-{id}"), 100)).collect()
}

fn ids(items: &[Product]) -> Vec<i64> {
    items.iter().map(|p| p.product_id).collect()
}

fn bottom() -> ScrollMetrics {
    ScrollMetrics {
        scroll_top: 1000.0,
        viewport_height: 600.0,
        content_height: 1600.0,
    }
}

/// Serves pre-scripted page results in call order.
struct ScriptedSource {
    pages: Mutex<Vec<Result<Vec<Product>, String>>>,
}

impl ScriptedSource {
    fn new(mut pages: Vec<Result<Vec<Product>, String>>) -> Self {
        pages.reverse();
        Self {
            pages: Mutex::new(pages),
        }
    }
}

impl PageSource for ScriptedSource {
    type Error = String;

    async fn fetch_page(&self, _query: &CatalogQuery, _page: u32) -> Result<Vec<Product>, String> {
        self.pages
            .lock()
            .expect("lock")
            .pop()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scroll_loads_pages_until_a_short_page() {
    let catalog = MemoryCatalog::new(products(1..26));
    let mut feed = CatalogFeed::new();

    for _ in 0..5 {
        if let Some(ticket) = feed.on_scroll(bottom()) {
            feed.run(&catalog, &ticket).await;
        }
    }

    assert_eq!(feed.items().len(), 25);
    assert!(!feed.has_more());
    assert_eq!(feed.items()[0].product_id, 25, "newest first");
    assert!(feed.on_scroll(bottom()).is_none(), "exhausted feed never fetches");
}

#[test]
fn full_page_keeps_has_more_and_short_page_clears_it() {
    let mut feed = CatalogFeed::new();

    let ticket = feed.begin_fetch().expect("page 0");
    feed.complete_fetch::<String>(&ticket, Ok(products(0..i64::from(PAGE_SIZE))));
    assert!(feed.has_more());

    let ticket = feed.begin_fetch().expect("page 1");
    assert_eq!(ticket.page, 1);
    feed.complete_fetch::<String>(&ticket, Ok(products(100..109)));
    assert!(!feed.has_more());
}

#[test]
fn empty_first_page_ends_the_feed() {
    let mut feed = CatalogFeed::new();
    let ticket = feed.begin_fetch().expect("page 0");
    let outcome = feed.complete_fetch::<String>(&ticket, Ok(Vec::new()));
    assert_eq!(outcome, FetchOutcome::Applied { added: 0 });
    assert!(!feed.has_more());
    assert!(feed.items().is_empty());
}

#[test]
fn overlapping_pages_merge_each_id_once_in_first_seen_order() {
    let mut feed = CatalogFeed::new();

    let ticket = feed.begin_fetch().expect("page 0");
    feed.complete_fetch::<String>(&ticket, Ok(products(0..10)));

    // A product inserted upstream shifts the offset window by two rows.
    let mut shifted = products(8..10);
    shifted.extend(products(20..28));
    let ticket = feed.begin_fetch().expect("page 1");
    let outcome = feed.complete_fetch::<String>(&ticket, Ok(shifted));

    assert_eq!(outcome, FetchOutcome::Applied { added: 8 });
    let mut expected: Vec<i64> = (0..10).collect();
    expected.extend(20..28);
    assert_eq!(ids(feed.items()), expected);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filter_change_resets_to_exactly_the_first_page() {
    let mut fixture = products(1..21);
    fixture.push(product(50, "Signal Tee", 900));
    fixture.push(product(51, "Static Tee", 1200));
    let catalog = MemoryCatalog::new(fixture);

    let mut feed = CatalogFeed::new();
    feed.load_more(&catalog).await;
    feed.load_more(&catalog).await;
    assert_eq!(feed.items().len(), 20);

    let ticket = feed
        .set_filters(CatalogFilters {
            search: "tee".to_string(),
            ..CatalogFilters::default()
        })
        .expect("filters changed");
    assert!(feed.items().is_empty(), "list cleared before the new page lands");
    assert_eq!(ticket.page, 0);

    feed.run(&catalog, &ticket).await;
    assert_eq!(ids(feed.items()), vec![51, 50]);
    assert!(!feed.has_more());
}

#[tokio::test]
async fn search_and_price_bounds_select_matching_rows_newest_first() {
    let mut fixture: Vec<Product> = (1..=12)
        .map(|id| product(id, &format!("Hoodie {id}"), 100 * id))
        .collect();
    fixture.push(product(13, "Pocket Tee", 600));
    fixture.push(product(14, "Long Sleeve Tee", 1400));
    fixture.push(product(15, "Tee Dress", 1000));
    fixture.push(product(16, "Budget Tee", 200));
    fixture.push(product(17, "Luxe Tee", 2000));
    // Drop two hoodies so the fixture holds 15 rows with 3 matches.
    fixture.retain(|p| p.product_id > 2);
    assert_eq!(fixture.len(), 15);
    let catalog = MemoryCatalog::new(fixture);

    let mut feed = CatalogFeed::with_filters(CatalogFilters {
        search: "tee".to_string(),
        min_price: "500".to_string(),
        max_price: "1500".to_string(),
        ..CatalogFilters::default()
    });
    feed.load_more(&catalog).await;

    assert_eq!(ids(feed.items()), vec![15, 14, 13]);
    assert!(!feed.has_more());
}

// ---------------------------------------------------------------------------
// Fencing and failures
// ---------------------------------------------------------------------------

#[test]
fn stale_response_leaves_the_feed_untouched() {
    let mut feed = CatalogFeed::new();
    let stale = feed.begin_fetch().expect("page 0");

    let fresh = feed
        .set_filters(CatalogFilters {
            color: "black".to_string(),
            ..CatalogFilters::default()
        })
        .expect("filters changed");

    let outcome = feed.complete_fetch::<String>(&stale, Ok(products(0..10)));
    assert_eq!(outcome, FetchOutcome::Stale);
    assert!(feed.items().is_empty());
    assert!(feed.is_loading(), "the fresh fetch is still pending");

    feed.complete_fetch::<String>(&fresh, Ok(products(40..43)));
    assert_eq!(ids(feed.items()), vec![40, 41, 42]);
}

#[tokio::test]
async fn failed_fetch_keeps_state_and_allows_a_retry() {
    let source = ScriptedSource::new(vec![
        Ok(products(0..10)),
        Err("connection reset".to_string()),
        Ok(products(10..13)),
    ]);
    let mut feed = CatalogFeed::new();

    assert_eq!(
        feed.load_more(&source).await,
        Some(FetchOutcome::Applied { added: 10 })
    );
    assert_eq!(feed.load_more(&source).await, Some(FetchOutcome::Failed));
    assert_eq!(feed.items().len(), 10);
    assert!(feed.has_more());
    assert!(!feed.is_loading());

    let retry = feed.on_scroll(bottom()).expect("retry allowed");
    assert_eq!(retry.page, 1, "retry asks for the same page");
    feed.run(&source, &retry).await;
    assert_eq!(feed.items().len(), 13);
    assert!(!feed.has_more());
}
