// Filesystem document store
// Reads and parses the backing file on every request

use serde_json::Value;
use tokio::fs;

use super::{Document, DocumentStore, StoreError};
use crate::config::DataConfig;

/// Document store backed by JSON files in a data directory
#[derive(Debug, Clone)]
pub struct FsStore {
    data: DataConfig,
}

impl FsStore {
    pub const fn new(data: DataConfig) -> Self {
        Self { data }
    }

    /// Report which documents cannot currently be read, for startup diagnostics
    pub async fn unreadable_documents(&self) -> Vec<Document> {
        let mut unreadable = Vec::new();
        for document in Document::ALL {
            if fs::metadata(self.data.path_for(document)).await.is_err() {
                unreadable.push(document);
            }
        }
        unreadable
    }
}

impl DocumentStore for FsStore {
    async fn load(&self, document: Document) -> Result<Value, StoreError> {
        let path = self.data.path_for(document);
        let content = fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::Missing { document }
            } else {
                StoreError::Io {
                    document,
                    path: path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_slice(&content).map_err(|source| StoreError::Malformed { document, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn store_in(dir: &Path) -> FsStore {
        FsStore::new(DataConfig {
            dir: dir.to_path_buf(),
            ..DataConfig::default()
        })
    }

    #[tokio::test]
    async fn test_load_parses_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("report-details.json"),
            r#"{"id": "R1", "municipality": "Sorriso"}"#,
        )
        .unwrap();

        let store = store_in(dir.path());
        let doc = store.load(Document::ReportDetails).await.unwrap();
        assert_eq!(doc, json!({"id": "R1", "municipality": "Sorriso"}));
    }

    #[tokio::test]
    async fn test_load_rereads_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports-list.json");
        std::fs::write(&path, r#"{"type": "FeatureCollection", "features": []}"#).unwrap();

        let store = store_in(dir.path());
        let first = store.load(Document::ReportsList).await.unwrap();
        assert_eq!(first["features"], json!([]));

        std::fs::write(&path, r#"{"type": "FeatureCollection", "features": [{"id": "R9"}]}"#)
            .unwrap();
        let second = store.load(Document::ReportsList).await.unwrap();
        assert_eq!(second["features"][0]["id"], "R9");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let err = store.load(Document::ReportImages).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Missing {
                document: Document::ReportImages
            }
        ));
        assert_eq!(
            store.unreadable_documents().await,
            Document::ALL.to_vec()
        );
    }

    #[tokio::test]
    async fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("reports-list.json"), "{ not json").unwrap();

        let store = store_in(dir.path());
        let err = store.load(Document::ReportsList).await.unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
        assert!(err.to_string().starts_with("reports list document is not valid JSON"));
    }
}
