pub mod catalog;
pub mod core;
pub mod extract;
pub mod http;
pub mod publish;
pub mod stats;
pub mod store;

pub use crate::catalog::{CatalogWalker, DedupTracker, Item, ItemOutcome, ItemPipeline};
pub use crate::core::{
    Category, FetchError, FetchErrorKind, ScrapeError, ScrapeResult, WalkConfig,
};
pub use crate::extract::{extract_product, rewrite_affiliate, ExtractedProduct};
pub use crate::http::{FetchPolicy, Fetcher, HttpFetcher, PageResponse};
pub use crate::publish::{share_pending, LogPublisher, Publisher};
pub use crate::stats::{StatsTracker, WalkStats};
pub use crate::store::{
    CatalogRecord, CatalogStore, MemoryStore, ShareStatus, UpsertOutcome,
};
