use parking_lot::RwLock;
use std::collections::HashSet;

/// Seen-identifier set for one catalog walk. Created at walk start and
/// dropped at walk end; cross-run duplicate suppression is the catalog
/// store's job. Items without an identifier are never marked and always
/// report unseen.
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: RwLock<HashSet<String>>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, identifier: Option<&str>) -> bool {
        match identifier {
            Some(id) if !id.is_empty() => self.seen.read().contains(id),
            _ => false,
        }
    }

    pub fn mark(&self, identifier: Option<&str>) {
        if let Some(id) = identifier {
            if !id.is_empty() {
                self.seen.write().insert(id.to_string());
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_until_marked() {
        let tracker = DedupTracker::new();
        assert!(!tracker.seen(Some("B0AAAAAAA1")));
        tracker.mark(Some("B0AAAAAAA1"));
        assert!(tracker.seen(Some("B0AAAAAAA1")));
        assert!(!tracker.seen(Some("B0AAAAAAA2")));
    }

    #[test]
    fn missing_identifiers_are_never_tracked() {
        let tracker = DedupTracker::new();
        tracker.mark(None);
        tracker.mark(Some(""));
        assert!(!tracker.seen(None));
        assert!(!tracker.seen(Some("")));
        assert!(tracker.is_empty());
        assert!(!tracker.seen(Some("B0AAAAAAA1")));
    }
}
