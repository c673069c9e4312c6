mod base;
mod memory;

pub use base::{CatalogRecord, CatalogStore, ShareStatus, StoreError, StoreResult, UpsertOutcome};
pub use memory::MemoryStore;
