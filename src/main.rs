use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use dealharvest::{
    share_pending, CatalogStore, CatalogWalker, FetchPolicy, HttpFetcher, LogPublisher, MemoryStore,
    WalkConfig,
};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .filter_module("selectors", log::LevelFilter::Warn)
        .filter_module("html5ever", log::LevelFilter::Error)
        .init();

    let config = WalkConfig::default();
    let fetcher = Arc::new(HttpFetcher::new(FetchPolicy::default())?);
    let store: Arc<dyn CatalogStore> = Arc::new(MemoryStore::new());

    let walker = CatalogWalker::new(fetcher, Arc::clone(&store), config);
    let stats = walker.stats();
    let summary = walker.run().await;
    stats.print_summary();

    let publisher = LogPublisher;
    let shared = share_pending(store.as_ref(), &publisher, Duration::from_secs(4)).await?;
    info!("Shared {} new deals", shared);

    if summary.blocked_pages > 0 {
        bail!(
            "walk finished with {} blocked pages; target site is refusing automated access",
            summary.blocked_pages
        );
    }

    Ok(())
}
