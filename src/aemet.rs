//! This module provides the main entry point for interacting with the AEMET
//! OpenData API. It exposes the dataset operations (station inventory,
//! recent observations, daily climatologies, climate normals) plus
//! nearest-station lookup, all running through the response cache and the
//! resilient two-step fetcher.

use crate::cache::response_cache::{CacheTtl, MemoryCache, ResponseCache};
use crate::error::AemetError;
use crate::fetch::backoff::RetryPolicy;
use crate::fetch::fetcher::DataFetcher;
use crate::geo::nearest::find_nearest;
use crate::types::observation::{ClimateDay, ClimateNormal, Observation};
use crate::types::station::{NearestStation, Station};
use bon::bon;
use chrono::NaiveDate;
use log::debug;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Public base URL of the AEMET OpenData API.
pub const DEFAULT_BASE_URL: &str = "https://opendata.aemet.es/opendata";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A date bound for the daily climatology range.
///
/// The API wants `YYYY-MM-DDT00:00:00UTC`; a [`NaiveDate`] is formatted that
/// way, and a raw string passes through unchanged when it already carries
/// the `T...UTC` suffix, or gets the midnight suffix appended otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClimateDate {
    Day(NaiveDate),
    Raw(String),
}

impl ClimateDate {
    fn format_for_api(&self) -> String {
        match self {
            ClimateDate::Day(day) => format!("{}T00:00:00UTC", day.format("%Y-%m-%d")),
            ClimateDate::Raw(raw) => {
                if raw.contains('T') && raw.contains("UTC") {
                    raw.clone()
                } else {
                    format!("{raw}T00:00:00UTC")
                }
            }
        }
    }
}

impl From<NaiveDate> for ClimateDate {
    fn from(day: NaiveDate) -> Self {
        ClimateDate::Day(day)
    }
}

impl From<&str> for ClimateDate {
    fn from(raw: &str) -> Self {
        ClimateDate::Raw(raw.to_string())
    }
}

impl From<String> for ClimateDate {
    fn from(raw: String) -> Self {
        ClimateDate::Raw(raw)
    }
}

/// The main client for the AEMET OpenData API.
///
/// Every dataset operation checks the response cache first and otherwise
/// runs the two-step fetch protocol (metadata request returning a transient
/// `datos` URL, then the payload request) with retry/backoff against rate
/// limiting and transient server failures.
///
/// Construction fails fast when the API key is missing; everything else is
/// optional with sensible defaults.
///
/// # Examples
///
/// ```rust,no_run
/// # use aemet_opendata::{Aemet, AemetError};
/// # #[tokio::main]
/// # async fn main() -> Result<(), AemetError> {
/// let client = Aemet::builder().api_key("your-api-key").build()?;
///
/// let stations = client.get_all_stations().await?;
/// println!("{} stations in the inventory", stations.len());
///
/// let nearest = client.find_nearest_station(40.4167, -3.7038).await?;
/// if let Some(found) = nearest {
///     println!("{:?} at {} km", found.station.nombre, found.distance_km);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Aemet {
    fetcher: DataFetcher,
    cache: Box<dyn ResponseCache>,
    ttl: CacheTtl,
}

#[bon]
impl Aemet {
    /// Creates a new `Aemet` client.
    ///
    /// # Arguments
    ///
    /// * `.api_key(...)`: **Required.** The OpenData API key, sent as the
    ///   `api_key` header on metadata requests.
    /// * `.base_url(...)`: Optional. Defaults to [`DEFAULT_BASE_URL`].
    /// * `.cache_ttl(...)`: Optional. Per-category lifetimes, see [`CacheTtl`].
    /// * `.retry(...)`: Optional. Retry bounds and pacing, see [`RetryPolicy`].
    /// * `.timeout(...)`: Optional. Per-request HTTP timeout, default 30s.
    /// * `.cache(...)`: Optional. An injected [`ResponseCache`]; defaults to
    ///   an in-process [`MemoryCache`].
    ///
    /// # Errors
    ///
    /// Returns [`AemetError::MissingApiKey`] when the key is empty or blank,
    /// and [`AemetError::HttpClient`] when the HTTP client cannot be built.
    #[builder(on(String, into))]
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        cache_ttl: Option<CacheTtl>,
        retry: Option<RetryPolicy>,
        timeout: Option<Duration>,
        cache: Option<Box<dyn ResponseCache>>,
    ) -> Result<Self, AemetError> {
        if api_key.trim().is_empty() {
            return Err(AemetError::MissingApiKey);
        }
        let fetcher = DataFetcher::new(
            api_key,
            base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            retry.unwrap_or_default(),
            timeout.unwrap_or(DEFAULT_TIMEOUT),
        )
        .map_err(AemetError::HttpClient)?;
        Ok(Self {
            fetcher,
            cache: cache.unwrap_or_else(|| Box::new(MemoryCache::new())),
            ttl: cache_ttl.unwrap_or_default(),
        })
    }

    /// Fetches the full weather-station inventory.
    ///
    /// Cached for [`CacheTtl::stations`] (24 hours by default).
    pub async fn get_all_stations(&self) -> Result<Vec<Station>, AemetError> {
        let endpoint = "/api/valores/climatologicos/inventarioestaciones/todasestaciones";
        let payload = self
            .cached_dataset("stations:all", self.ttl.stations, endpoint)
            .await?;
        decode(endpoint, payload)
    }

    /// Fetches recent observations (last 24 hours) for the whole
    /// conventional network.
    ///
    /// Cached for [`CacheTtl::recent_observations`] (1 hour by default).
    pub async fn get_recent_observations(&self) -> Result<Vec<Observation>, AemetError> {
        let endpoint = "/api/observacion/convencional/todas";
        let payload = self
            .cached_dataset(
                "observations:recent",
                self.ttl.recent_observations,
                endpoint,
            )
            .await?;
        decode(endpoint, payload)
    }

    /// Fetches recent observations for a single station by `idema`.
    pub async fn get_station_observations(
        &self,
        station_id: &str,
    ) -> Result<Vec<Observation>, AemetError> {
        let endpoint = format!("/api/observacion/convencional/datos/estacion/{station_id}");
        let key = format!("observations:station:{station_id}");
        let payload = self
            .cached_dataset(&key, self.ttl.recent_observations, &endpoint)
            .await?;
        decode(&endpoint, payload)
    }

    /// Fetches the daily climatological series for a station over an
    /// inclusive date range.
    ///
    /// Callers are responsible for `start <= end`; the bounds accept either
    /// [`NaiveDate`] or raw strings (see [`ClimateDate`]). Cached for
    /// [`CacheTtl::climatology`] (7 days by default).
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use aemet_opendata::{Aemet, AemetError};
    /// # use chrono::NaiveDate;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), AemetError> {
    /// # let client = Aemet::builder().api_key("your-api-key").build()?;
    /// let days = client
    ///     .get_daily_climate_data(
    ///         "3195",
    ///         NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
    ///         NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
    ///     )
    ///     .await?;
    /// for day in &days {
    ///     println!("{:?}: tmax {:?}", day.date(), day.value("tmax"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_daily_climate_data(
        &self,
        station_id: &str,
        start: impl Into<ClimateDate>,
        end: impl Into<ClimateDate>,
    ) -> Result<Vec<ClimateDay>, AemetError> {
        let start = start.into().format_for_api();
        let end = end.into().format_for_api();
        let endpoint = format!(
            "/api/valores/climatologicos/diarios/datos/fechaini/{start}/fechafin/{end}/estacion/{station_id}"
        );
        let key = format!("climate:daily:{station_id}:{start}:{end}");
        let payload = self
            .cached_dataset(&key, self.ttl.climatology, &endpoint)
            .await?;
        decode(&endpoint, payload)
    }

    /// Fetches the 1991-2020 climate normals for a station.
    pub async fn get_climate_normals(
        &self,
        station_id: &str,
    ) -> Result<Vec<ClimateNormal>, AemetError> {
        let endpoint = format!("/api/valores/climatologicos/normales/estacion/{station_id}");
        let key = format!("climate:normals:{station_id}");
        let payload = self
            .cached_dataset(&key, self.ttl.climatology, &endpoint)
            .await?;
        decode(&endpoint, payload)
    }

    /// Finds the station nearest to `(latitude, longitude)`.
    ///
    /// Runs a great-circle scan over the (cached) station inventory; the
    /// only network activity is the inventory fetch on a cache miss.
    /// Callers validate `latitude ∈ [-90, 90]` and `longitude ∈ [-180, 180]`.
    /// Returns `Ok(None)` when no station in the inventory has coordinates.
    pub async fn find_nearest_station(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<NearestStation>, AemetError> {
        let stations = self.get_all_stations().await?;
        Ok(find_nearest(latitude, longitude, &stations))
    }

    /// Cache-through fetch: hit returns the stored payload, miss runs the
    /// two-step protocol once and stores the result with `ttl`.
    async fn cached_dataset(
        &self,
        key: &str,
        ttl: Duration,
        endpoint: &str,
    ) -> Result<Value, AemetError> {
        if let Some(payload) = self.cache.get(key).await {
            debug!("cache hit for {}", key);
            return Ok(payload);
        }
        debug!("cache miss for {}, fetching {}", key, endpoint);
        let payload = self.fetcher.fetch_dataset(endpoint).await?;
        self.cache.set(key, payload.clone(), ttl).await;
        Ok(payload)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, payload: Value) -> Result<T, AemetError> {
    serde_json::from_value(payload).map_err(|source| AemetError::PayloadShape {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_dates_get_the_midnight_utc_suffix() {
        let date = ClimateDate::from(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert_eq!(date.format_for_api(), "2023-01-01T00:00:00UTC");

        let raw = ClimateDate::from("2023-06-15");
        assert_eq!(raw.format_for_api(), "2023-06-15T00:00:00UTC");
    }

    #[test]
    fn suffixed_dates_pass_through_unchanged() {
        let raw = ClimateDate::from("2023-01-01T12:30:00UTC");
        assert_eq!(raw.format_for_api(), "2023-01-01T12:30:00UTC");
    }

    #[test]
    fn missing_api_key_fails_at_construction() {
        // `.err()` rather than `unwrap_err()`: the client holds a cache
        // trait object and does not implement Debug.
        let err = Aemet::builder().api_key("").build().err().unwrap();
        assert!(matches!(err, AemetError::MissingApiKey));

        let blank = Aemet::builder().api_key("   ").build().err().unwrap();
        assert!(matches!(blank, AemetError::MissingApiKey));
    }

    #[test]
    fn construction_succeeds_with_defaults() {
        let client = Aemet::builder().api_key("some-key").build();
        assert!(client.is_ok());
    }
}
