use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;

use aip_core::{CatalogQuery, Product, PAGE_SIZE};

/// Anything that can serve one page of a filtered catalog listing.
///
/// Implementations must order rows by `created_at` descending (ties by
/// `product_id` descending) and return at most [`PAGE_SIZE`] rows starting at
/// `page * PAGE_SIZE`.
pub trait PageSource {
    type Error: Display;

    fn fetch_page(
        &self,
        query: &CatalogQuery,
        page: u32,
    ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send;
}

/// A page source over a fixed product list, evaluated with
/// [`CatalogQuery::matches`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Vec<Product>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new(mut products: Vec<Product>) -> Self {
        products.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.product_id.cmp(&a.product_id))
        });
        Self { products }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Synchronous form of [`PageSource::fetch_page`].
    #[must_use]
    pub fn page(&self, query: &CatalogQuery, page: u32) -> Vec<Product> {
        let page_size = PAGE_SIZE as usize;
        self.products
            .iter()
            .filter(|p| query.matches(p))
            .skip(page as usize * page_size)
            .take(page_size)
            .cloned()
            .collect()
    }
}

impl PageSource for MemoryCatalog {
    type Error = Infallible;

    async fn fetch_page(&self, query: &CatalogQuery, page: u32) -> Result<Vec<Product>, Infallible> {
        Ok(self.page(query, page))
    }
}
