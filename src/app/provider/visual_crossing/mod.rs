use std::time::Duration;

use async_trait::async_trait;
use awc::http::{header, StatusCode};
use awc::Client;
use url::Url;

use crate::app::forecast::{ForecastQuery, ForecastResponse};
use crate::app::provider::{ForecastProvider, ProviderError};
use crate::config::ProviderSettings;


/// Visual Crossing timeline API.
pub struct VisualCrossingProvider {
    client: Client,
    settings: ProviderSettings,
}

impl VisualCrossingProvider {
    pub fn new(settings: ProviderSettings) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .finish();

        VisualCrossingProvider { client, settings }
    }

    /// `{base}{location}/{start_date}/{end_date}?key=..&unitGroup=..`
    pub fn build_url(&self, query: &ForecastQuery) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.settings.base_url)
            .map_err(|e| ProviderError::Unavailable(format!("invalid base url: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable(String::from("base url cannot carry a path")))?
            .pop_if_empty()
            .push(&query.location)
            .push(&query.start_date)
            .push(&query.end_date);

        url.query_pairs_mut()
            .append_pair("key", &self.settings.api_key)
            .append_pair("unitGroup", &self.settings.unit_group);

        Ok(url)
    }
}

/// Decodes the body of a 200 answer.
pub fn decode_body(body: &[u8]) -> Result<ForecastResponse, ProviderError> {
    serde_json::from_slice::<ForecastResponse>(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

#[async_trait(?Send)]
impl ForecastProvider for VisualCrossingProvider {
    async fn fetch_forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, ProviderError> {
        let url = self.build_url(query)?;

        // the key is part of the query string, keep it out of the logs
        info!("Requesting weather data for {} from {}{}", query.location, url.origin().ascii_serialization(), url.path());

        let mut response = self
            .client
            .get(url.as_str())
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let detail = response
                .body()
                .limit(self.settings.max_response_bytes)
                .await
                .map(|body| String::from_utf8_lossy(&body).into_owned())
                .unwrap_or_default();
            warn!("Weather API answered {}: {}", status, detail);

            return Err(ProviderError::Status(status.as_u16()));
        }

        let body = response
            .body()
            .limit(self.settings.max_response_bytes)
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        decode_body(&body)
    }
}
