//! Catalog filter inputs and the parsed query shared by the SQL page query,
//! the HTTP API and the client-side feed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::colors::encode_colors;
use crate::products::Product;

/// Rows per catalog page.
pub const PAGE_SIZE: u32 = 10;

/// Raw filter inputs exactly as a shopper typed them.
///
/// Every field is free text; [`CatalogFilters::to_query`] decides which ones
/// actually constrain the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub min_price: String,
    #[serde(default)]
    pub max_price: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

impl CatalogFilters {
    /// Parses the raw inputs. Blank fields and price bounds that do not parse
    /// as a finite number are dropped rather than rejected.
    #[must_use]
    pub fn to_query(&self) -> CatalogQuery {
        CatalogQuery {
            search: non_blank(&self.search),
            min_price: parse_price_bound(&self.min_price),
            max_price: parse_price_bound(&self.max_price),
            size: non_blank(&self.size),
            color: non_blank(&self.color),
        }
    }
}

/// The effective predicates of a catalog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring of `product_name` or `description`.
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Exact match on the free-text `size` column.
    pub size: Option<String>,
    /// Case-insensitive substring of the stored color string.
    pub color: Option<String>,
}

impl CatalogQuery {
    /// `search` as an `ILIKE` pattern with `%`, `_` and `\` escaped.
    #[must_use]
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(contains_pattern)
    }

    /// `color` as an `ILIKE` pattern with `%`, `_` and `\` escaped.
    #[must_use]
    pub fn color_pattern(&self) -> Option<String> {
        self.color.as_deref().map(contains_pattern)
    }

    /// Evaluates the query against a product in memory, with the same
    /// semantics as the SQL page query.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(q) = &self.search {
            let q = q.to_lowercase();
            if !product.product_name.to_lowercase().contains(&q)
                && !product.description.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if self.size.as_ref().is_some_and(|s| *s != product.size) {
            return false;
        }
        if let Some(color) = &self.color {
            let stored = encode_colors(&product.colors).to_lowercase();
            if !stored.contains(&color.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Zero-based row offset of a page.
#[must_use]
pub fn page_offset(page: u32) -> i64 {
    i64::from(page) * i64::from(PAGE_SIZE)
}

/// One page of catalog results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub page: u32,
    /// `true` iff `items` filled the whole page.
    pub has_more: bool,
}

impl ProductPage {
    #[must_use]
    pub fn new(items: Vec<Product>, page: u32) -> Self {
        let has_more = page_is_full(items.len());
        Self {
            items,
            page,
            has_more,
        }
    }
}

/// A page with fewer than [`PAGE_SIZE`] rows, including an empty one, is the
/// last page.
#[must_use]
pub fn page_is_full(len: usize) -> bool {
    len == PAGE_SIZE as usize
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Finite numbers beyond the `Decimal` range clamp to its ends, so an
/// absurdly high minimum still excludes everything. Magnitudes too small to
/// represent become zero.
fn parse_price_bound(raw: &str) -> Option<Decimal> {
    let value = raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(Decimal::try_from(value).unwrap_or(if value.abs() < 1.0 {
        Decimal::ZERO
    } else if value > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    }))
}

fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
