// In-memory document store
// Serves fixed JSON fixtures without touching the filesystem

use serde_json::Value;
use std::collections::HashMap;

use super::{Document, DocumentStore, StoreError};

/// Document store holding fixtures in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<Document, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style fixture registration
    #[must_use]
    pub fn with(mut self, document: Document, value: Value) -> Self {
        self.documents.insert(document, value);
        self
    }
}

impl DocumentStore for MemoryStore {
    async fn load(&self, document: Document) -> Result<Value, StoreError> {
        self.documents
            .get(&document)
            .cloned()
            .ok_or(StoreError::Missing { document })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_returns_registered_fixture() {
        let store = MemoryStore::new().with(Document::ReportDetails, json!({"id": "R1"}));
        assert_eq!(
            store.load(Document::ReportDetails).await.unwrap(),
            json!({"id": "R1"})
        );
    }

    #[tokio::test]
    async fn test_unregistered_fixture_is_missing() {
        let store = MemoryStore::new();
        let err = store.load(Document::ReportsList).await.unwrap_err();
        assert_eq!(err.to_string(), "reports list document is not available");
    }
}
