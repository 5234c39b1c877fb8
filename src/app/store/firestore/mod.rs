use std::fs;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use awc::http::StatusCode;
use awc::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use crate::app::forecast::WeatherRecord;
use crate::app::store::{DocumentId, RecordStore, StoredDocument, StoreError};
use crate::config::{ConfigError, StoreSettings};

pub mod auth;
pub mod value;

use self::auth::{ServiceAccountKey, ServiceAccountTokens, TokenSource};

const PRODUCTION_HOST: &str = "https://firestore.googleapis.com";
const EMULATOR_TOKEN: &str = "owner";
const PAGE_SIZE: &str = "300";
const MAX_PAGE_BYTES: usize = 16 * 1024 * 1024;

/// Where and how to reach the collection; resolved once at startup.
pub struct FirestoreConfig {
    pub collection_url: String,
    pub auth: TokenSource,
    pub timeout_secs: u64,
}

impl FirestoreConfig {
    /// The emulator and `store.access_token` take a fixed token; otherwise
    /// tokens are minted from the service-account key in `store.credentials`.
    pub fn load(settings: &StoreSettings) -> Result<Self, ConfigError> {
        let credentials_error = |reason: String| ConfigError::Credentials {
            path: settings.credentials.clone(),
            reason,
        };

        let raw = fs::read_to_string(&settings.credentials).map_err(|e| credentials_error(e.to_string()))?;
        let account: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| credentials_error(e.to_string()))?;

        let (host, auth) = match (&settings.emulator_host, &settings.access_token) {
            (Some(emulator), token) => (
                format!("http://{}", emulator),
                TokenSource::Static(token.clone().unwrap_or_else(|| String::from(EMULATOR_TOKEN))),
            ),
            (None, Some(token)) => (String::from(PRODUCTION_HOST), TokenSource::Static(token.clone())),
            (None, None) => (
                String::from(PRODUCTION_HOST),
                TokenSource::ServiceAccount(ServiceAccountTokens::new(&account).map_err(credentials_error)?),
            ),
        };

        Ok(FirestoreConfig {
            collection_url: format!(
                "{}/v1/projects/{}/databases/(default)/documents/{}",
                host, account.project_id, settings.collection
            ),
            auth,
            timeout_secs: settings.timeout_secs,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreDocument {
    fn into_stored(self) -> StoredDocument {
        StoredDocument::new(document_id(&self.name), value::from_fields(&self.fields))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

/// `projects/p/databases/(default)/documents/weather_data/<id>` -> `<id>`
fn document_id(name: &str) -> DocumentId {
    name.rsplit('/').next().unwrap_or(name).to_owned()
}

/// Firestore REST v1 client for one collection.
pub struct FirestoreStore {
    client: Client,
    config: Arc<FirestoreConfig>,
}

impl FirestoreStore {
    pub fn new(config: Arc<FirestoreConfig>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .finish();

        FirestoreStore { client, config }
    }

    fn page_url(&self, page_token: Option<&str>) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.config.collection_url).map_err(|e| StoreError::Request(e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("pageSize", PAGE_SIZE);
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }

        Ok(url)
    }
}

fn check_status(status: StatusCode, body: &[u8]) -> Result<(), StoreError> {
    if status.is_success() {
        return Ok(());
    }

    Err(StoreError::Status {
        status: status.as_u16(),
        reason: String::from_utf8_lossy(body).into_owned(),
    })
}

#[async_trait(?Send)]
impl RecordStore for FirestoreStore {
    async fn create_record(&self, record: &WeatherRecord) -> Result<DocumentId, StoreError> {
        let fields = match serde_json::to_value(record) {
            Ok(Value::Object(object)) => value::to_fields(&object),
            Ok(other) => return Err(StoreError::Request(format!("record is not an object: {}", other))),
            Err(e) => return Err(StoreError::Request(e.to_string())),
        };

        let token = self.config.auth.bearer(&self.client).await?;

        let mut response = self
            .client
            .post(self.config.collection_url.as_str())
            .bearer_auth(&token)
            .send_json(&json!({ "fields": fields }))
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let body = response
            .body()
            .limit(MAX_PAGE_BYTES)
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        check_status(response.status(), &body)?;

        let document: FirestoreDocument =
            serde_json::from_slice(&body).map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        Ok(document_id(&document.name))
    }

    async fn list_all_records(&self) -> Result<Vec<StoredDocument>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.page_url(page_token.as_deref())?;
            let token = self.config.auth.bearer(&self.client).await?;

            let mut response = self
                .client
                .get(url.as_str())
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| StoreError::Request(e.to_string()))?;

            let body = response
                .body()
                .limit(MAX_PAGE_BYTES)
                .await
                .map_err(|e| StoreError::Request(e.to_string()))?;
            check_status(response.status(), &body)?;

            let page: ListDocumentsResponse =
                serde_json::from_slice(&body).map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

            documents.extend(page.documents.into_iter().map(FirestoreDocument::into_stored));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("Listed {} documents from {}", documents.len(), self.config.collection_url);

        Ok(documents)
    }
}
