use serde::{Deserialize, Deserializer, Serialize};

use crate::app::{Date, Location};

/// Query submitted by the client to the ingest endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastQuery {
    pub location: Location,
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyForecast {
    #[serde(rename = "datetime")]
    pub date: Date,

    #[serde(rename = "temp", default, deserialize_with = "null_as_zero")]
    pub temperature: f64,

    #[serde(rename = "precip", default, deserialize_with = "null_as_zero")]
    pub precipitation: f64,
}

/// Provider payload, handed back to the caller after it has been stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ForecastResponse {
    #[serde(default)]
    pub days: Vec<DailyForecast>,
}

impl ForecastResponse {
    pub fn to_records(&self, location: &str) -> Vec<WeatherRecord> {
        self.days
            .iter()
            .map(|day| WeatherRecord::from_daily(location, day))
            .collect()
    }
}

/// Persisted form of one day of forecast. Stored documents missing a
/// measurement read it back as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherRecord {
    pub location: Location,
    pub date: Date,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub temperature: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub precipitation: f64,
}

impl WeatherRecord {
    pub fn from_daily(location: &str, day: &DailyForecast) -> Self {
        WeatherRecord {
            location: location.to_owned(),
            date: day.date.clone(),
            temperature: day.temperature,
            precipitation: day.precipitation,
        }
    }
}

// Measurements with no data arrive as null.
fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}
