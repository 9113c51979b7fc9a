use std::time::Duration;

use agronomy::ForecastSample;
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;

const GEOCODE_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
const FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// Upstream calls are bounded; a stuck weather API surfaces as an
/// upstream error instead of a hung request.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(20);

/// A geocoding candidate returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeoPlace {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl GeoPlace {
    /// Canonical "name, state, country" form, omitting absent parts. This
    /// string doubles as the place-cache key.
    pub fn display_name(&self) -> String {
        let mut bits: Vec<&str> = Vec::new();
        if !self.name.is_empty() {
            bits.push(&self.name);
        }
        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            bits.push(state);
        }
        if let Some(country) = self.country.as_deref().filter(|c| !c.is_empty()) {
            bits.push(country);
        }
        bits.join(", ")
    }
}

/// Raw 5-day/3-hour forecast payload. Only the fields the summarizer
/// needs are modelled; anything the upstream omits arrives as a default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastEntry {
    #[serde(default)]
    pub main: MainReading,
    #[serde(default)]
    pub rain: RainVolume,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainReading {
    #[serde(default)]
    pub temp: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RainVolume {
    /// Precipitation accumulated over the 3-hour interval.
    #[serde(default, rename = "3h")]
    pub three_hour: Option<f64>,
}

impl ForecastResponse {
    /// Flattens the payload into the samples the summarizer consumes.
    pub fn samples(&self) -> Vec<ForecastSample> {
        self.list
            .iter()
            .map(|entry| ForecastSample {
                temp_c: entry.main.temp,
                rain_3h_mm: entry.rain.three_hour,
            })
            .collect()
    }
}

/// Appends the India country bias unless the query already names a
/// country with one of the recognized markers (case-insensitive).
pub fn apply_country_bias(query: &str) -> String {
    let q = query.trim();
    let upper = q.to_uppercase();
    if upper.contains(",IN") || upper.contains(", INDIA") {
        q.to_string()
    } else {
        format!("{q}, IN")
    }
}

/// Geocoding seam: place resolution talks to this trait so tests can
/// substitute a scripted implementation.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<GeoPlace>, ApiError>;
}

/// Client for the upstream weather API (geocoding + forecast).
#[derive(Debug)]
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(api_key: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .user_agent(concat!("cropwise/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build weather HTTP client")?;
        Ok(Self { http, api_key })
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ApiError::Configuration("OPENWEATHER_API_KEY not set on server".to_string())
            })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("Upstream request failed: {e}")))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            // Bubble up any upstream message (the API sends JSON or text).
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Upstream error {status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|_| ApiError::Upstream("Upstream returned non-JSON response".to_string()))
    }

    /// Fetches the 3-hour-interval forecast in metric units.
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, ApiError> {
        let key = self.api_key()?;
        debug!(lat, lon, "fetching forecast");
        let request = self.http.get(FORECAST_URL).query(&[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", key.to_string()),
            ("units", "metric".to_string()),
        ]);
        self.get_json(request).await
    }
}

#[async_trait]
impl Geocoder for WeatherClient {
    async fn geocode(&self, query: &str, limit: usize) -> Result<Vec<GeoPlace>, ApiError> {
        let key = self.api_key()?;
        let biased = apply_country_bias(query);
        debug!(query, biased = %biased, "geocoding place");
        let request = self.http.get(GEOCODE_URL).query(&[
            ("q", biased),
            ("limit", limit.to_string()),
            ("appid", key.to_string()),
        ]);
        self.get_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_bias_appended_by_default() {
        assert_eq!(apply_country_bias("Guntur"), "Guntur, IN");
        assert_eq!(apply_country_bias("  Guntur  "), "Guntur, IN");
        assert_eq!(apply_country_bias("Guntur, AP"), "Guntur, AP, IN");
    }

    #[test]
    fn test_country_bias_skipped_when_marker_present() {
        assert_eq!(apply_country_bias("Guntur,IN"), "Guntur,IN");
        assert_eq!(apply_country_bias("Guntur,in"), "Guntur,in");
        assert_eq!(apply_country_bias("Guntur, India"), "Guntur, India");
        // A marker anywhere in the query counts as a country choice.
        assert_eq!(apply_country_bias("guntur, INDIA"), "guntur, INDIA");
    }

    #[test]
    fn test_display_name_omits_absent_parts() {
        let full = GeoPlace {
            name: "Guntur".to_string(),
            state: Some("Andhra Pradesh".to_string()),
            country: Some("IN".to_string()),
            lat: 16.3,
            lon: 80.44,
        };
        assert_eq!(full.display_name(), "Guntur, Andhra Pradesh, IN");

        let no_state = GeoPlace {
            state: None,
            ..full.clone()
        };
        assert_eq!(no_state.display_name(), "Guntur, IN");

        let bare = GeoPlace {
            state: None,
            country: None,
            ..full
        };
        assert_eq!(bare.display_name(), "Guntur");
    }

    #[test]
    fn test_forecast_deserializes_sparse_payload() {
        let payload = serde_json::json!({
            "cod": "200",
            "list": [
                { "main": { "temp": 28.5, "humidity": 70 }, "rain": { "3h": 1.2 } },
                { "main": { "temp": 30.0 } },
                { "main": {}, "rain": {} },
            ]
        });

        let forecast: ForecastResponse = serde_json::from_value(payload).unwrap();
        let samples = forecast.samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].temp_c, Some(28.5));
        assert_eq!(samples[0].rain_3h_mm, Some(1.2));
        assert_eq!(samples[1].rain_3h_mm, None);
        assert_eq!(samples[2].temp_c, None);
    }

    #[test]
    fn test_forecast_without_list_is_empty() {
        let forecast: ForecastResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(forecast.samples().is_empty());
    }

    #[test]
    fn test_missing_api_key_is_a_configuration_error() {
        let client = WeatherClient::new(None).unwrap();
        assert!(matches!(
            client.api_key(),
            Err(ApiError::Configuration(_))
        ));

        let blank = WeatherClient::new(Some(String::new())).unwrap();
        assert!(blank.api_key().is_err());

        let set = WeatherClient::new(Some("k".to_string())).unwrap();
        assert_eq!(set.api_key().unwrap(), "k");
    }
}
