use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::time::sleep;
use url::Url;

use super::dedup::DedupTracker;
use super::listing::parse_listing;
use super::pipeline::{ItemOutcome, ItemPipeline};
use super::rate::RateGate;
use crate::core::{Category, WalkConfig};
use crate::extract::identifier_from_url;
use crate::http::Fetcher;
use crate::stats::{StatsTracker, WalkStats};
use crate::store::CatalogStore;

/// A candidate scrape target. Items without an identifier are processed
/// but never deduplicated.
#[derive(Debug, Clone)]
pub struct Item {
    pub url: Url,
    pub identifier: Option<String>,
}

impl Item {
    pub fn from_url(url: Url) -> Self {
        let identifier = identifier_from_url(&url);
        Self { url, identifier }
    }
}

/// Walks the category catalog: fetches listing pages, filters candidates
/// through the dedup tracker and content-type allowlist, and feeds the
/// survivors to the item pipeline under the walk's rate budget.
pub struct CatalogWalker {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn CatalogStore>,
    config: WalkConfig,
    stats: StatsTracker,
}

impl CatalogWalker {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn CatalogStore>,
        config: WalkConfig,
    ) -> Self {
        Self {
            fetcher,
            store,
            config,
            stats: StatsTracker::new(),
        }
    }

    pub fn stats(&self) -> StatsTracker {
        self.stats.clone()
    }

    /// Runs one complete walk and reports the aggregate summary. Item,
    /// page and category failures are absorbed along the way; nothing
    /// short of the caller cancelling stops the walk.
    pub async fn run(&self) -> WalkStats {
        let total = self.config.categories.len();
        info!("Starting catalog walk over {} categories", total);

        let dedup = DedupTracker::new();
        let rate = Arc::new(RateGate::new(self.config.inter_item_delay));
        let pipeline = ItemPipeline::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.store),
            rate,
            self.config.affiliate_tag.clone(),
            self.stats.clone(),
        );

        for (index, category) in self.config.categories.iter().enumerate() {
            info!("[{}/{}] Walking category: {}", index + 1, total, category.name);
            self.walk_category(category, &dedup, &pipeline).await;

            if index + 1 < total {
                sleep(self.config.inter_category_delay).await;
            }
        }

        self.stats.finish();
        let summary = self.stats.summary();
        info!(
            "Catalog walk complete: {} unique items seen, {} processed, {} saved",
            dedup.len(),
            summary.items_processed,
            summary.items_saved
        );
        summary
    }

    async fn walk_category(
        &self,
        category: &Category,
        dedup: &DedupTracker,
        pipeline: &ItemPipeline,
    ) {
        let mut page = 1;
        let mut saved = 0usize;

        while page <= self.config.max_pages_per_category {
            debug!("Listing page {} for {}", page, category.name);

            let page_url = match Url::parse(&category.page_url(page)) {
                Ok(url) => url,
                Err(error) => {
                    warn!("Bad listing URL for {}: {}", category.name, error);
                    break;
                }
            };

            let response = match self.fetcher.get(&page_url).await {
                Ok(response) => response,
                Err(error) => {
                    warn!(
                        "Listing fetch failed for {} page {}: {}",
                        category.name, page, error
                    );
                    self.stats.record_page_failure();
                    break;
                }
            };

            let listing = parse_listing(&response.body, &self.config.base_url);
            if listing.blocked {
                warn!("Listing page blocked for {} page {}", category.name, page);
                self.stats.record_blocked_page();
                break;
            }
            self.stats.record_page();

            let candidates = self.filter_candidates(listing.candidates, dedup);
            saved += self
                .process_candidates(
                    candidates,
                    pipeline,
                    dedup,
                    self.config.per_category_quota - saved,
                )
                .await;

            info!(
                "{} new products from {} so far (page {})",
                saved, category.name, page
            );

            if saved >= self.config.per_category_quota {
                debug!("Quota reached for {}", category.name);
                break;
            }
            if !listing.has_next {
                debug!("No next page for {}", category.name);
                break;
            }

            page += 1;
            sleep(self.config.inter_page_delay).await;
        }
    }

    /// Drops candidates whose identifier was already seen this walk.
    /// Candidates without an identifier always pass through. Marking
    /// happens at processing time, so an item the quota cuts off can
    /// still be picked up from another category's listing.
    fn filter_candidates(&self, candidates: Vec<Url>, dedup: &DedupTracker) -> Vec<Item> {
        let mut fresh = Vec::new();
        for item in candidates.into_iter().map(Item::from_url) {
            if dedup.seen(item.identifier.as_deref()) {
                debug!("Skipping already-seen item: {}", item.url);
                self.stats.record_skipped();
                continue;
            }
            fresh.push(item);
        }
        fresh
    }

    /// Processes candidates up to the remaining quota of newly saved
    /// items. Sequential by default; with `item_concurrency > 1` each
    /// batch runs with all-settled semantics, so one failing item never
    /// cancels its siblings. A blocked item drops the rest of the page.
    async fn process_candidates(
        &self,
        candidates: Vec<Item>,
        pipeline: &ItemPipeline,
        dedup: &DedupTracker,
        quota_remaining: usize,
    ) -> usize {
        let mut saved = 0usize;

        if self.config.item_concurrency <= 1 {
            for item in candidates {
                if saved >= quota_remaining {
                    break;
                }
                dedup.mark(item.identifier.as_deref());
                match pipeline.process(&item.url).await {
                    ItemOutcome::Saved(_) => saved += 1,
                    ItemOutcome::Blocked => {
                        self.stats.record_blocked_page();
                        break;
                    }
                    _ => {}
                }
            }
            return saved;
        }

        for batch in candidates.chunks(self.config.item_concurrency) {
            if saved >= quota_remaining {
                break;
            }
            for item in batch {
                dedup.mark(item.identifier.as_deref());
            }
            let outcomes = join_all(batch.iter().map(|item| pipeline.process(&item.url))).await;
            let blocked = outcomes
                .iter()
                .any(|outcome| matches!(outcome, ItemOutcome::Blocked));
            saved += outcomes
                .iter()
                .filter(|outcome| matches!(outcome, ItemOutcome::Saved(_)))
                .count();
            if blocked {
                self.stats.record_blocked_page();
                break;
            }
        }
        saved
    }
}
