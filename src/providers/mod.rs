//! Upstream order sources and the paginated walk over them.

pub mod filter;
pub mod paginator;
pub mod shopify;
pub mod traits;

pub use filter::OrderFilter;
pub use paginator::{FetchError, OrderPaginator, PAGE_SIZE};
pub use shopify::ShopifyClient;
pub use traits::{OrderPage, OrderSelection, OrderSource, PageRequest, SourceError};
