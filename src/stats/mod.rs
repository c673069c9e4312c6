use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Aggregate counters for one catalog walk.
#[derive(Debug, Clone, Serialize)]
pub struct WalkStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub pages_fetched: usize,
    pub page_failures: usize,
    pub blocked_pages: usize,
    pub items_processed: usize,
    pub items_saved: usize,
    pub items_updated: usize,
    pub items_unchanged: usize,
    pub items_skipped: usize,
    pub items_failed: usize,
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<WalkStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(WalkStats {
                start_time: Utc::now(),
                end_time: None,
                pages_fetched: 0,
                page_failures: 0,
                blocked_pages: 0,
                items_processed: 0,
                items_saved: 0,
                items_updated: 0,
                items_unchanged: 0,
                items_skipped: 0,
                items_failed: 0,
            })),
        }
    }

    pub fn record_page(&self) {
        self.stats.write().pages_fetched += 1;
    }

    pub fn record_page_failure(&self) {
        self.stats.write().page_failures += 1;
    }

    pub fn record_blocked_page(&self) {
        self.stats.write().blocked_pages += 1;
    }

    pub fn record_saved(&self) {
        let mut stats = self.stats.write();
        stats.items_processed += 1;
        stats.items_saved += 1;
    }

    pub fn record_updated(&self) {
        let mut stats = self.stats.write();
        stats.items_processed += 1;
        stats.items_updated += 1;
    }

    pub fn record_unchanged(&self) {
        let mut stats = self.stats.write();
        stats.items_processed += 1;
        stats.items_unchanged += 1;
    }

    pub fn record_failed(&self) {
        let mut stats = self.stats.write();
        stats.items_processed += 1;
        stats.items_failed += 1;
    }

    pub fn record_skipped(&self) {
        self.stats.write().items_skipped += 1;
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn summary(&self) -> WalkStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        println!("\nWalk Statistics:");
        println!("================");
        println!("Duration: {} seconds", duration.num_seconds());
        println!("Listing Pages Fetched: {}", stats.pages_fetched);
        println!("Listing Page Failures: {}", stats.page_failures);
        println!("Blocked Pages: {}", stats.blocked_pages);
        println!("Items Processed: {}", stats.items_processed);
        println!("  Saved: {}", stats.items_saved);
        println!("  Updated: {}", stats.items_updated);
        println!("  Unchanged: {}", stats.items_unchanged);
        println!("  Failed: {}", stats.items_failed);
        println!("Items Skipped: {}", stats.items_skipped);
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
