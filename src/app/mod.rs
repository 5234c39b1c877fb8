use self::forecast::{ForecastQuery, ForecastResponse, WeatherRecord};
use self::provider::{ForecastProvider, ProviderError};
use self::store::{RecordStore, StoreError};

pub mod forecast;
pub mod provider;
pub mod store;

type Date = String;
type Location = String;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("invalid query: {0}")]
    InvalidInput(String),

    #[error("weather API unreachable: {0}")]
    UpstreamUnavailable(String),

    #[error("weather API answered with status {status}")]
    UpstreamError { status: u16 },

    #[error("weather API response undecodable: {0}")]
    UpstreamMalformed(String),

    #[error("storing record failed after {written} writes: {source}")]
    StorageError { written: usize, source: StoreError },

    #[error("store unreachable: {0}")]
    StorageUnavailable(#[source] StoreError),
}

impl From<ProviderError> for IngestError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Unavailable(reason) => IngestError::UpstreamUnavailable(reason),
            ProviderError::Status(status) => IngestError::UpstreamError { status },
            ProviderError::Malformed(reason) => IngestError::UpstreamMalformed(reason),
        }
    }
}

/// Relays forecast queries to the provider and keeps the answers in the store.
pub struct WeatherIngestManager {
    provider: Box<dyn ForecastProvider>,
    store: Box<dyn RecordStore>,
}

impl WeatherIngestManager {
    pub fn new(provider: Box<dyn ForecastProvider>, store: Box<dyn RecordStore>) -> Self {
        WeatherIngestManager { provider, store }
    }

    pub fn decode_query(body: &[u8]) -> Result<ForecastQuery, IngestError> {
        serde_json::from_slice::<ForecastQuery>(body).map_err(|e| IngestError::InvalidInput(e.to_string()))
    }

    /// Writes one record per forecast day, in order. The first failing write
    /// aborts the batch; records written before it stay in the store.
    pub async fn ingest(&self, query: &ForecastQuery) -> Result<ForecastResponse, IngestError> {
        let response = self.provider.fetch_forecast(query).await?;

        for (written, record) in response.to_records(&query.location).iter().enumerate() {
            self.store
                .create_record(record)
                .await
                .map_err(|source| IngestError::StorageError { written, source })?;
        }

        info!("Stored {} days for {}", response.days.len(), query.location);

        Ok(response)
    }

    /// Documents that do not decode into a record are skipped.
    pub async fn list_records(&self) -> Result<Vec<WeatherRecord>, IngestError> {
        let documents = self
            .store
            .list_all_records()
            .await
            .map_err(IngestError::StorageUnavailable)?;

        Ok(documents
            .iter()
            .filter_map(|doc| match doc.decode() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping document: {}", e);
                    None
                }
            })
            .collect())
    }
}
