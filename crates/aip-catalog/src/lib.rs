//! Client-side catalog feed: filter state, infinite-scroll pagination and
//! the page sources it pulls from.

pub mod debounce;
pub mod error;
pub mod feed;
pub mod http;
pub mod source;

pub use debounce::{SearchDebounce, SEARCH_DEBOUNCE};
pub use error::CatalogError;
pub use feed::{CatalogFeed, FetchOutcome, FetchTicket, ScrollMetrics, SCROLL_THRESHOLD_PX};
pub use http::HttpCatalogSource;
pub use source::{MemoryCatalog, PageSource};
