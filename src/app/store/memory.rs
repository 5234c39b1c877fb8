use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::app::forecast::WeatherRecord;
use crate::app::store::{DocumentId, RecordStore, StoredDocument, StoreError};

/// In-process store. Clones share the same documents, so one instance built
/// at startup serves every worker.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Stores an arbitrary document next to the weather records.
    pub fn insert_raw(&self, data: serde_json::Value) -> Result<DocumentId, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.lock()?.push(StoredDocument::new(id.clone(), data));

        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredDocument>>, StoreError> {
        self.documents
            .lock()
            .map_err(|_| StoreError::Request(String::from("memory store lock poisoned")))
    }
}

#[async_trait(?Send)]
impl RecordStore for MemoryStore {
    async fn create_record(&self, record: &WeatherRecord) -> Result<DocumentId, StoreError> {
        let data = serde_json::to_value(record).map_err(|e| StoreError::Request(e.to_string()))?;

        self.insert_raw(data)
    }

    async fn list_all_records(&self) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self.lock()?.clone())
    }
}

#[cfg(test)]
mod memory_store_test {
    use super::*;
    use serde_json::json;

    fn create_record(location: &str) -> WeatherRecord {
        WeatherRecord {
            location: location.to_owned(),
            date: String::from("2024-01-01"),
            temperature: 5.2,
            precipitation: 0.0,
        }
    }

    #[actix_web::test]
    async fn test_create_then_list_work_as_expected() {
        let store = MemoryStore::new();

        let id = store.create_record(&create_record("Paris")).await.unwrap();
        let docs = store.list_all_records().await.unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].decode().unwrap(), create_record("Paris"));
    }

    #[actix_web::test]
    async fn test_create_never_overwrites() {
        let store = MemoryStore::new();

        let first = store.create_record(&create_record("Paris")).await.unwrap();
        let second = store.create_record(&create_record("Paris")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.len(), 2);
    }

    #[actix_web::test]
    async fn test_clones_share_documents() {
        let store = MemoryStore::new();
        let worker_copy = store.clone();

        worker_copy.create_record(&create_record("Oslo")).await.unwrap();
        store.insert_raw(json!({"unrelated": true})).unwrap();

        assert_eq!(store.list_all_records().await.unwrap().len(), 2);
    }
}
