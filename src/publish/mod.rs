use async_trait::async_trait;
use log::{info, warn};
use std::time::Duration;
use tokio::time::sleep;

use crate::core::ScrapeResult;
use crate::store::{CatalogRecord, CatalogStore};

/// Hands a catalog record to the messaging channel. Rate-limit retries
/// are the implementation's own concern, not the caller's.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, record: &CatalogRecord) -> ScrapeResult<()>;
}

/// Deal message with a call-to-action link, formatted the way the
/// messaging channel presents it.
pub fn format_message(record: &CatalogRecord) -> String {
    let mut message = format!(
        "{}\nPrice: ₹{}\n",
        record.product.title, record.product.price
    );
    if record.product.discount > 0 {
        message.push_str(&format!("Discount: {}% off\n", record.product.discount));
    }
    message.push_str(&format!("Buy: {}", record.product.affiliate_url));
    message
}

/// Writes formatted deal messages to the log. Stands in for a real
/// messaging-channel publisher.
#[derive(Debug, Default)]
pub struct LogPublisher;

#[async_trait]
impl Publisher for LogPublisher {
    async fn publish(&self, record: &CatalogRecord) -> ScrapeResult<()> {
        info!("Publishing deal:\n{}", format_message(record));
        Ok(())
    }
}

/// Drains pending records to the publisher, newest first, flipping each
/// to shared on success. A failed publish leaves the record pending for
/// the next drain; the inter-message delay applies either way.
pub async fn share_pending(
    store: &dyn CatalogStore,
    publisher: &dyn Publisher,
    delay: Duration,
) -> ScrapeResult<usize> {
    let pending = store.pending().await?;
    let total = pending.len();
    info!("Sharing {} pending records", total);

    let mut shared = 0usize;
    for (index, record) in pending.iter().enumerate() {
        match publisher.publish(record).await {
            Ok(()) => {
                store.mark_shared(record.key()).await?;
                shared += 1;
            }
            Err(error) => {
                warn!("Failed to publish {}: {}", record.product.title, error);
            }
        }
        if index + 1 < total {
            sleep(delay).await;
        }
    }
    Ok(shared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScrapeError;
    use crate::extract::ExtractedProduct;
    use crate::store::{MemoryStore, ShareStatus};
    use parking_lot::Mutex;

    fn product(identifier: &str, title: &str, price: f64) -> ExtractedProduct {
        ExtractedProduct {
            title: title.to_string(),
            price,
            original_price: Some(price * 2.0),
            discount: 50,
            image: String::new(),
            rating: None,
            review_count: 0,
            category: "Unknown".to_string(),
            features: vec!["No features listed".to_string()],
            description: String::new(),
            identifier: identifier.to_string(),
            source: "Amazon".to_string(),
            source_url: format!("https://www.amazon.in/dp/{identifier}"),
            affiliate_url: format!("https://www.amazon.in/dp/{identifier}?tag=cartiva-21-in"),
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<String>>,
        fail_title: Option<String>,
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(&self, record: &CatalogRecord) -> ScrapeResult<()> {
            if self.fail_title.as_deref() == Some(record.product.title.as_str()) {
                return Err(ScrapeError::Publish("channel unavailable".to_string()));
            }
            self.published.lock().push(record.product.title.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn shares_pending_records_and_marks_them() {
        let store = MemoryStore::new();
        store.upsert(product("B0AAAAAAA1", "Widget One", 500.0)).await.unwrap();
        store.upsert(product("B0AAAAAAA2", "Widget Two", 600.0)).await.unwrap();

        let publisher = RecordingPublisher::default();
        let shared = share_pending(&store, &publisher, Duration::ZERO).await.unwrap();

        assert_eq!(shared, 2);
        assert_eq!(publisher.published.lock().len(), 2);
        assert!(store
            .all()
            .iter()
            .all(|record| record.share_status == ShareStatus::Shared));
    }

    #[tokio::test]
    async fn failed_publish_leaves_record_pending() {
        let store = MemoryStore::new();
        store.upsert(product("B0AAAAAAA1", "Widget One", 500.0)).await.unwrap();
        store.upsert(product("B0AAAAAAA2", "Widget Two", 600.0)).await.unwrap();

        let publisher = RecordingPublisher {
            fail_title: Some("Widget One".to_string()),
            ..Default::default()
        };
        let shared = share_pending(&store, &publisher, Duration::ZERO).await.unwrap();

        assert_eq!(shared, 1);
        let still_pending = store.pending().await.unwrap();
        assert_eq!(still_pending.len(), 1);
        assert_eq!(still_pending[0].product.title, "Widget One");
    }

    #[test]
    fn message_omits_zero_discount() {
        let store_record = CatalogRecord {
            product: ExtractedProduct {
                discount: 0,
                original_price: None,
                ..product("B0AAAAAAA1", "Widget", 500.0)
            },
            price_history: vec![500.0],
            share_status: ShareStatus::Pending,
            added_at: chrono::Utc::now(),
        };
        let message = format_message(&store_record);
        assert!(message.contains("Widget"));
        assert!(message.contains("₹500"));
        assert!(!message.contains("Discount"));
        assert!(message.contains("tag=cartiva-21-in"));
    }
}
