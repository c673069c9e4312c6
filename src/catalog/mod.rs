mod dedup;
mod listing;
mod pipeline;
mod rate;
mod walker;


pub use dedup::DedupTracker;
pub use listing::{is_supported_product, parse_listing, ListingPage};
pub use pipeline::{ItemOutcome, ItemPipeline};
pub use rate::RateGate;
pub use walker::{CatalogWalker, Item};
