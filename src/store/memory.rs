use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::base::{CatalogRecord, CatalogStore, ShareStatus, StoreError, StoreResult, UpsertOutcome};
use crate::extract::ExtractedProduct;

/// In-memory catalog store. Upsert atomicity comes from holding the
/// write lock across the whole read-modify-write.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<CatalogRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn all(&self) -> Vec<CatalogRecord> {
        self.records.read().clone()
    }
}

fn matches(record: &CatalogRecord, identifier: &str, title: &str) -> bool {
    (!identifier.is_empty() && record.product.identifier == identifier)
        || record.product.title == title
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_by_identifier_or_title(
        &self,
        identifier: &str,
        title: &str,
    ) -> StoreResult<Option<CatalogRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|record| matches(record, identifier, title))
            .cloned())
    }

    async fn upsert(&self, product: ExtractedProduct) -> StoreResult<UpsertOutcome> {
        let mut records = self.records.write();

        let position = records
            .iter()
            .position(|record| matches(record, &product.identifier, &product.title));

        let Some(position) = position else {
            let record = CatalogRecord {
                price_history: vec![product.price],
                share_status: ShareStatus::Pending,
                added_at: Utc::now(),
                product,
            };
            records.push(record.clone());
            return Ok(UpsertOutcome::Created(record));
        };

        let record = &mut records[position];
        if (record.product.price - product.price).abs() < f64::EPSILON {
            return Ok(UpsertOutcome::Unchanged(record.clone()));
        }

        let old_price = record.product.price;
        record.price_history.push(old_price);
        record.product.price = product.price;
        record.product.original_price = product.original_price;
        record.product.discount = product.discount;
        Ok(UpsertOutcome::Updated(record.clone()))
    }

    async fn pending(&self) -> StoreResult<Vec<CatalogRecord>> {
        let mut pending: Vec<CatalogRecord> = self
            .records
            .read()
            .iter()
            .filter(|record| record.share_status == ShareStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(pending)
    }

    async fn mark_shared(&self, key: &str) -> StoreResult<()> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|record| record.key() == key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        record.share_status = ShareStatus::Shared;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(identifier: &str, title: &str, price: f64) -> ExtractedProduct {
        ExtractedProduct {
            title: title.to_string(),
            price,
            original_price: None,
            discount: 0,
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

    #[tokio::test]
    async fn first_sighting_creates_with_seeded_history() {
        let store = MemoryStore::new();
        let outcome = store.upsert(product("B0AAAAAAA1", "Widget", 500.0)).await.unwrap();

        let record = outcome.record();
        assert!(matches!(outcome, UpsertOutcome::Created(_)));
        assert_eq!(record.price_history, vec![500.0]);
        assert_eq!(record.share_status, ShareStatus::Pending);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn price_change_updates_in_place_and_appends_history() {
        let store = MemoryStore::new();
        store.upsert(product("B0AAAAAAA1", "Widget", 500.0)).await.unwrap();
        let outcome = store.upsert(product("B0AAAAAAA1", "Widget", 450.0)).await.unwrap();

        assert!(matches!(outcome, UpsertOutcome::Updated(_)));
        let record = outcome.record();
        assert_eq!(record.product.price, 450.0);
        assert_eq!(record.price_history[0], 500.0);
        assert!(record.price_history.contains(&500.0));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn same_price_is_unchanged() {
        let store = MemoryStore::new();
        store.upsert(product("B0AAAAAAA1", "Widget", 500.0)).await.unwrap();
        let outcome = store.upsert(product("B0AAAAAAA1", "Widget", 500.0)).await.unwrap();

        assert!(matches!(outcome, UpsertOutcome::Unchanged(_)));
        assert_eq!(outcome.record().price_history, vec![500.0]);
    }

    #[tokio::test]
    async fn update_preserves_share_status() {
        let store = MemoryStore::new();
        store.upsert(product("B0AAAAAAA1", "Widget", 500.0)).await.unwrap();
        store.mark_shared("B0AAAAAAA1").await.unwrap();

        let outcome = store.upsert(product("B0AAAAAAA1", "Widget", 450.0)).await.unwrap();
        assert_eq!(outcome.record().share_status, ShareStatus::Shared);
    }

    #[tokio::test]
    async fn matches_on_title_when_identifier_missing() {
        let store = MemoryStore::new();
        store.upsert(product("", "Widget", 500.0)).await.unwrap();
        let outcome = store.upsert(product("", "Widget", 450.0)).await.unwrap();

        assert!(matches!(outcome, UpsertOutcome::Updated(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn pending_excludes_shared_and_is_newest_first() {
        let store = MemoryStore::new();
        store.upsert(product("B0AAAAAAA1", "First", 100.0)).await.unwrap();
        store.upsert(product("B0AAAAAAA2", "Second", 200.0)).await.unwrap();
        store.mark_shared("B0AAAAAAA1").await.unwrap();

        let pending = store.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].product.title, "Second");
    }

    #[tokio::test]
    async fn mark_shared_unknown_key_is_not_found() {
        let store = MemoryStore::new();
        let error = store.mark_shared("missing").await.unwrap_err();
        assert!(matches!(error, StoreError::NotFound(_)));
    }
}
