use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::ExtractedProduct;

#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("store operation failed: {0}")]
    Operation(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareStatus {
    Pending,
    Shared,
}

/// A persisted product with its observation history. Owned by the store;
/// the pipeline holds no reference after upsert returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    #[serde(flatten)]
    pub product: ExtractedProduct,
    /// Observed prices, oldest first, append-only.
    pub price_history: Vec<f64>,
    pub share_status: ShareStatus,
    pub added_at: DateTime<Utc>,
}

impl CatalogRecord {
    /// Match key for duplicate detection and share-status updates: the
    /// item identifier, or the title when no identifier was recovered.
    pub fn key(&self) -> &str {
        if self.product.identifier.is_empty() {
            &self.product.title
        } else {
            &self.product.identifier
        }
    }
}

#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    /// First sighting; record inserted with a fresh price history.
    Created(CatalogRecord),
    /// Known item at a different price; history extended in place.
    Updated(CatalogRecord),
    /// Known item at the same price; record untouched.
    Unchanged(CatalogRecord),
}

impl UpsertOutcome {
    pub fn record(&self) -> &CatalogRecord {
        match self {
            UpsertOutcome::Created(record)
            | UpsertOutcome::Updated(record)
            | UpsertOutcome::Unchanged(record) => record,
        }
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_identifier_or_title(
        &self,
        identifier: &str,
        title: &str,
    ) -> StoreResult<Option<CatalogRecord>>;

    /// Insert-or-update keyed on `(identifier OR title)`. On a price
    /// change the old price is appended to the history and
    /// price/original price/discount are replaced; share status is never
    /// touched here. Records are never deleted through this contract.
    async fn upsert(&self, product: ExtractedProduct) -> StoreResult<UpsertOutcome>;

    /// Records awaiting publication, newest first.
    async fn pending(&self) -> StoreResult<Vec<CatalogRecord>>;

    async fn mark_shared(&self, key: &str) -> StoreResult<()>;
}
