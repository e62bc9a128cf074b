use tokio::sync::RwLock;

use super::types::{HistoryEntry, HistoryKind};

/// Append-only ledger of terminal events.
///
/// Entries are never mutated after append; `clear` is the only removal
/// path. Order reflects completion order, not submission order.
#[derive(Default)]
pub struct HistoryLedger {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, entry: HistoryEntry) {
        self.entries.write().await.push(entry);
    }

    /// All entries, oldest first.
    pub async fn all(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.clone()
    }

    pub async fn count_kind(&self, kind: HistoryKind) -> usize {
        self.entries
            .read()
            .await
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[tokio::test]
    async fn test_append_preserves_order() {
        let ledger = HistoryLedger::new();
        ledger
            .append(HistoryEntry::skipped("bad-url", "Invalid URL"))
            .await;
        ledger
            .append(HistoryEntry::completed(
                "http://example.com/a",
                Path::new("/downloads/f/a.bin"),
            ))
            .await;

        let all = ledger.all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, HistoryKind::Skipped);
        assert_eq!(all[1].kind, HistoryKind::Completed);
    }

    #[tokio::test]
    async fn test_count_kind() {
        let ledger = HistoryLedger::new();
        ledger
            .append(HistoryEntry::failed("http://example.com/a", "boom"))
            .await;
        ledger
            .append(HistoryEntry::archived(Path::new("/downloads/f.zip")))
            .await;
        assert_eq!(ledger.count_kind(HistoryKind::Error).await, 1);
        assert_eq!(ledger.count_kind(HistoryKind::Archived).await, 1);
        assert_eq!(ledger.count_kind(HistoryKind::Completed).await, 0);
    }

    #[tokio::test]
    async fn test_clear_empties_ledger() {
        let ledger = HistoryLedger::new();
        ledger
            .append(HistoryEntry::skipped("bad-url", "Invalid URL"))
            .await;
        ledger.clear().await;
        assert!(ledger.is_empty().await);
    }
}
