//! [`ReadingSource`] backed by the Bright Sky weather API (DWD observations).

use crate::blanket::{LatLon, LOCATION};
use crate::cache::reading_cache::date_key;
use crate::source::error::FetchError;
use crate::source::ReadingSource;
use crate::types::reading::{Reading, NOON_HOUR};
use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

const BRIGHT_SKY_URL: &str = "https://api.brightsky.dev/weather";

#[derive(Debug, Deserialize)]
struct WeatherPayload {
    weather: Vec<HourlyObservation>,
}

#[derive(Debug, Deserialize)]
struct HourlyObservation {
    timestamp: DateTime<FixedOffset>,
    temperature: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BrightSkySource {
    client: Client,
    base_url: String,
    location: LatLon,
}

impl BrightSkySource {
    pub fn new() -> Self {
        Self::with_base_url(BRIGHT_SKY_URL)
    }

    /// Points the source at a mirror of the Bright Sky `/weather` endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            location: LOCATION,
        }
    }

    fn request_url(&self, date: NaiveDate) -> String {
        format!(
            "{}?lat={}&lon={}&date={}",
            self.base_url,
            self.location.0,
            self.location.1,
            date_key(date)
        )
    }

    fn parse_payload(date: NaiveDate, url: &str, body: &[u8]) -> Result<Reading, FetchError> {
        let payload: WeatherPayload =
            serde_json::from_slice(body).map_err(|e| FetchError::Parse {
                url: url.to_string(),
                source: e,
            })?;
        Ok(Self::midday_reading(date, &payload))
    }

    /// Picks the observation at hour 12 of the timestamp's own offset. When the
    /// payload holds several, the first one in response order wins.
    fn midday_reading(date: NaiveDate, payload: &WeatherPayload) -> Reading {
        let mut at_noon = payload
            .weather
            .iter()
            .filter(|observation| observation.timestamp.hour() == NOON_HOUR);

        let Some(first) = at_noon.next() else {
            debug!("No noon observation for {}", date);
            return Reading::missing(date);
        };
        let others = at_noon.count();
        if others > 0 {
            debug!(
                "{} noon observations for {}, using the one at {}",
                others + 1,
                date,
                first.timestamp
            );
        }
        Reading::new(date, first.temperature)
    }
}

impl Default for BrightSkySource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSource for BrightSkySource {
    async fn fetch(&self, date: NaiveDate) -> Result<Reading, FetchError> {
        let url = self.request_url(date);
        debug!("Fetching reading from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    },
                    None => FetchError::NetworkRequest(url, e),
                })
            }
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(url.clone(), e))?;
        Self::parse_payload(date, &url, &body)
    }
}
