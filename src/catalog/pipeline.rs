use log::{debug, info, warn};
use scraper::Html;
use std::sync::Arc;
use url::Url;

use super::rate::RateGate;
use crate::core::ScrapeResult;
use crate::extract::{extract_product, ExtractedProduct};
use crate::http::Fetcher;
use crate::stats::StatsTracker;
use crate::store::{CatalogRecord, CatalogStore, UpsertOutcome};

/// What happened to one candidate item.
#[derive(Debug, Clone)]
pub enum ItemOutcome {
    Saved(CatalogRecord),
    Updated(CatalogRecord),
    Unchanged(CatalogRecord),
    /// The item page was a challenge page; the caller drops the rest of
    /// the current listing page.
    Blocked,
    Failed,
}

/// Per-item flow: rate-gated fetch, parse, extract, upsert. Failures are
/// contained here — an item can fail without touching its siblings.
pub struct ItemPipeline {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn CatalogStore>,
    rate: Arc<RateGate>,
    affiliate_tag: String,
    stats: StatsTracker,
}

impl ItemPipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn CatalogStore>,
        rate: Arc<RateGate>,
        affiliate_tag: String,
        stats: StatsTracker,
    ) -> Self {
        Self {
            fetcher,
            store,
            rate,
            affiliate_tag,
            stats,
        }
    }

    pub async fn process(&self, url: &Url) -> ItemOutcome {
        self.rate.wait().await;

        let response = match self.fetcher.get(url).await {
            Ok(response) => response,
            Err(error) => {
                warn!("Item fetch failed: {}", error);
                self.stats.record_failed();
                return ItemOutcome::Failed;
            }
        };

        let product = match scrape_item(&response.body, url, &self.affiliate_tag) {
            Ok(product) => product,
            Err(error) if error.is_blocked() => {
                warn!("Challenge page served for item {}", url);
                return ItemOutcome::Blocked;
            }
            Err(error) => {
                warn!("Extraction failed: {}", error);
                self.stats.record_failed();
                return ItemOutcome::Failed;
            }
        };

        match self.store.upsert(product).await {
            Ok(UpsertOutcome::Created(record)) => {
                info!("Product saved: {}", record.product.title);
                self.stats.record_saved();
                ItemOutcome::Saved(record)
            }
            Ok(UpsertOutcome::Updated(record)) => {
                info!("Product price updated: {}", record.product.title);
                self.stats.record_updated();
                ItemOutcome::Updated(record)
            }
            Ok(UpsertOutcome::Unchanged(record)) => {
                debug!("Product already exists: {}", record.product.title);
                self.stats.record_unchanged();
                ItemOutcome::Unchanged(record)
            }
            Err(error) => {
                warn!("Store rejected item {}: {}", url, error);
                self.stats.record_failed();
                ItemOutcome::Failed
            }
        }
    }
}

/// Parse and extract in one synchronous step so the document never lives
/// across an await point.
fn scrape_item(body: &str, url: &Url, affiliate_tag: &str) -> ScrapeResult<ExtractedProduct> {
    let doc = Html::parse_document(body);
    extract_product(&doc, url, affiliate_tag)
}
