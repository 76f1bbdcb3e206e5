//! Infinite-scroll state for the storefront product grid.
//!
//! [`CatalogFeed`] owns the accumulated product list and decides when a page
//! fetch should happen. It performs no I/O itself: callers take a
//! [`FetchTicket`], run it against a [`PageSource`] and hand the result back
//! through [`CatalogFeed::complete_fetch`]. Every ticket carries the filter
//! generation it was issued under, so a response that arrives after the
//! filters changed is dropped instead of being appended to the new listing.

use std::collections::HashSet;
use std::fmt::Display;

use aip_core::{page_is_full, CatalogFilters, CatalogQuery, Product};

use crate::source::PageSource;

/// Distance from the bottom of the content, in pixels, at which the next
/// page is requested.
pub const SCROLL_THRESHOLD_PX: f64 = 100.0;

/// Scroll position of the product grid's container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub content_height: f64,
}

impl ScrollMetrics {
    #[must_use]
    pub fn near_bottom(&self) -> bool {
        self.viewport_height + self.scroll_top >= self.content_height - SCROLL_THRESHOLD_PX
    }
}

/// A page fetch the feed has committed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub page: u32,
    pub query: CatalogQuery,
}

/// What [`CatalogFeed::complete_fetch`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows were merged; `added` excludes duplicates.
    Applied { added: usize },
    /// The filters changed after the ticket was issued; nothing changed.
    Stale,
    /// The source failed; list and `has_more` are untouched.
    Failed,
}

#[derive(Debug, Clone)]
pub struct CatalogFeed {
    filters: CatalogFilters,
    query: CatalogQuery,
    items: Vec<Product>,
    seen: HashSet<i64>,
    next_page: u32,
    has_more: bool,
    in_flight: bool,
    generation: u64,
}

impl Default for CatalogFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::with_filters(CatalogFilters::default())
    }

    #[must_use]
    pub fn with_filters(filters: CatalogFilters) -> Self {
        Self {
            query: filters.to_query(),
            filters,
            items: Vec::new(),
            seen: HashSet::new(),
            next_page: 0,
            has_more: true,
            in_flight: false,
            generation: 0,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn filters(&self) -> &CatalogFilters {
        &self.filters
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the filters. Any change discards the accumulated list and
    /// returns the ticket for the new first page; unchanged filters return
    /// `None`.
    pub fn set_filters(&mut self, filters: CatalogFilters) -> Option<FetchTicket> {
        if filters == self.filters {
            return None;
        }
        self.query = filters.to_query();
        self.filters = filters;
        self.generation += 1;
        self.items.clear();
        self.seen.clear();
        self.next_page = 0;
        self.has_more = true;
        self.in_flight = false;
        tracing::debug!(generation = self.generation, "catalog filters changed");
        self.begin_fetch()
    }

    /// Claims the next page fetch, or `None` when one is already in flight
    /// or the listing is exhausted.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.in_flight || !self.has_more {
            return None;
        }
        self.in_flight = true;
        Some(FetchTicket {
            generation: self.generation,
            page: self.next_page,
            query: self.query.clone(),
        })
    }

    /// Scroll handler: claims a fetch once the viewport is within
    /// [`SCROLL_THRESHOLD_PX`] of the bottom.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<FetchTicket> {
        if metrics.near_bottom() {
            self.begin_fetch()
        } else {
            None
        }
    }

    /// Applies the result of a fetch issued by [`begin_fetch`](Self::begin_fetch).
    pub fn complete_fetch<E: Display>(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Vec<Product>, E>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket_generation = ticket.generation,
                current_generation = self.generation,
                page = ticket.page,
                "dropping stale catalog page"
            );
            return FetchOutcome::Stale;
        }
        self.in_flight = false;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(page = ticket.page, error = %e, "catalog page fetch failed");
                return FetchOutcome::Failed;
            }
        };

        self.has_more = page_is_full(rows.len());
        self.next_page = ticket.page + 1;
        let before = self.items.len();
        for product in rows {
            if self.seen.insert(product.product_id) {
                self.items.push(product);
            }
        }
        FetchOutcome::Applied {
            added: self.items.len() - before,
        }
    }

    /// Claims, runs and applies the next page fetch in one step. Returns
    /// `None` when no fetch was due.
    pub async fn load_more<S: PageSource>(&mut self, source: &S) -> Option<FetchOutcome> {
        let ticket = self.begin_fetch()?;
        Some(self.run(source, &ticket).await)
    }

    /// Runs a ticket against `source` and applies the result.
    pub async fn run<S: PageSource>(&mut self, source: &S, ticket: &FetchTicket) -> FetchOutcome {
        let result = source.fetch_page(&ticket.query, ticket.page).await;
        self.complete_fetch(ticket, result)
    }
}
