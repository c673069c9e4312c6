mod config;
mod errors;

pub use config::{default_categories, Category, WalkConfig};
pub use errors::{FetchError, FetchErrorKind, ScrapeError, ScrapeResult};
