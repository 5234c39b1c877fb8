use async_trait::async_trait;
use serde::Deserialize;

use crate::app::forecast::WeatherRecord;

pub mod firestore;
pub mod memory;

pub type DocumentId = String;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("store answered with status {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("store authentication failed: {0}")]
    Auth(String),

    #[error("store sent an undecodable answer: {0}")]
    InvalidResponse(String),

    #[error("document {id} does not hold a weather record: {reason}")]
    Decode { id: DocumentId, reason: String },
}

/// One raw document as listed by a store, decoded lazily so a single bad
/// document does not spoil the whole listing.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub data: serde_json::Value,
}

impl StoredDocument {
    pub fn new(id: DocumentId, data: serde_json::Value) -> Self {
        StoredDocument { id, data }
    }

    pub fn decode(&self) -> Result<WeatherRecord, StoreError> {
        WeatherRecord::deserialize(&self.data).map_err(|e| StoreError::Decode {
            id: self.id.clone(),
            reason: e.to_string(),
        })
    }
}

/// Document store holding the `weather_data` collection.
#[async_trait(?Send)]
pub trait RecordStore {
    async fn create_record(&self, record: &WeatherRecord) -> Result<DocumentId, StoreError>;

    async fn list_all_records(&self) -> Result<Vec<StoredDocument>, StoreError>;
}
