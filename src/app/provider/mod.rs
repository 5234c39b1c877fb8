use async_trait::async_trait;

use crate::app::forecast::{ForecastQuery, ForecastResponse};

pub mod visual_crossing;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("weather API unreachable: {0}")]
    Unavailable(String),

    #[error("weather API answered with status {0}")]
    Status(u16),

    #[error("weather API sent an undecodable body: {0}")]
    Malformed(String),
}

/// Source of daily forecasts for a location and date range.
#[async_trait(?Send)]
pub trait ForecastProvider {
    async fn fetch_forecast(&self, query: &ForecastQuery) -> Result<ForecastResponse, ProviderError>;
}
