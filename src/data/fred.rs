//! FRED API integration for unemployment and recession series.

use std::cell::Cell;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{Observation, ObservationSeries, Sample, Series};
use crate::error::AppError;

use super::source::SeriesSource;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// FRED asks clients to stay well under 120 requests per minute.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

pub fn default_observation_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub struct FredClient {
    client: Client,
    api_key: String,
    observation_start: NaiveDate,
    request_delay: Duration,
    last_request: Cell<Option<Instant>>,
}

impl FredClient {
    pub fn from_env(observation_start: NaiveDate, request_delay_ms: u64) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("FRED_API_KEY")
            .map_err(|_| AppError::new(2, "Missing FRED_API_KEY in environment (.env)."))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            observation_start,
            request_delay: Duration::from_millis(request_delay_ms),
            last_request: Cell::new(None),
        })
    }

    /// Sleep until `request_delay` has passed since the previous request.
    fn throttle(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.request_delay {
                std::thread::sleep(self.request_delay - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }

    fn fetch_series(&self, series_id: &str) -> Result<ObservationSeries, AppError> {
        self.throttle();
        log::info!("fetching {series_id} from FRED (from {})", self.observation_start);

        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", &self.api_key),
                ("file_type", "json"),
                ("sort_order", "asc"),
                ("observation_start", &self.observation_start.to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("FRED request for {series_id} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            // FRED reports bad series ids and keys as JSON with an error message.
            let detail = resp
                .json::<ErrorResponse>()
                .map(|e| e.error_message)
                .unwrap_or_default();
            return Err(AppError::new(
                4,
                format!("FRED request for {series_id} failed with status {status}. {detail}"),
            ));
        }

        let body: ObservationsResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse FRED response for {series_id}: {e}")))?;

        let mut samples = Vec::with_capacity(body.observations.len());
        for obs in body.observations {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
                .map_err(|e| AppError::new(4, format!("Invalid FRED date '{}': {e}", obs.date)))?;
            samples.push(Sample::new(date, Observation::raw(parse_value(&obs.value))));
        }

        if samples.is_empty() {
            return Err(AppError::new(
                3,
                format!("No observations returned for series {series_id}."),
            ));
        }

        let series = Series::from_unsorted(samples)?;
        let missing = series.iter().filter(|s| s.value.value.is_none()).count();
        if missing > 0 {
            log::warn!("{series_id}: {missing} of {} observations are missing", series.len());
        }
        Ok(series)
    }
}

impl SeriesSource for FredClient {
    fn observations(&self, series_id: &str) -> Result<ObservationSeries, AppError> {
        self.fetch_series(series_id)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error_message: String,
}

/// FRED marks missing observations with `"."`; those stay missing.
pub(crate) fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
