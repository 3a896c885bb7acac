use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    model::{ForecastDay, WeatherQuery, WeatherResult},
};

use super::WeatherProvider;

pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const FORECAST_DAYS: usize = 3;

#[derive(Debug, Clone, Copy)]
enum Endpoint {
    Current,
    Forecast,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Current => "/data/2.5/weather",
            Endpoint::Forecast => "/data/2.5/forecast",
        }
    }

    fn send_action(self) -> &'static str {
        match self {
            Endpoint::Current => "requesting current weather",
            Endpoint::Forecast => "requesting the forecast",
        }
    }

    fn read_action(self) -> &'static str {
        match self {
            Endpoint::Current => "reading the current weather response",
            Endpoint::Forecast => "reading the forecast response",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Clone)]
pub struct OpenWeatherProviderBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenWeatherProviderBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenWeatherProvider, WeatherError> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|source| WeatherError::Network { action: "building the HTTP client", source })?;

        Ok(OpenWeatherProvider { api_key: self.api_key, base_url: self.base_url, http })
    }
}

impl OpenWeatherProvider {
    pub fn builder(api_key: String) -> OpenWeatherProviderBuilder {
        OpenWeatherProviderBuilder {
            api_key,
            base_url: OPENWEATHER_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Issue one GET against `endpoint` and return the body of a successful response.
    async fn fetch(&self, endpoint: Endpoint, query: &WeatherQuery) -> Result<String, WeatherError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        let location = query.location();
        debug!(%url, %location, "{}", endpoint.send_action());

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", location.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|source| WeatherError::Network {
                action: endpoint.send_action(),
                source: source.without_url(),
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Network {
                action: endpoint.read_action(),
                source: source.without_url(),
            })?;

        debug!(status = status.as_u16(), bytes = body.len(), "OpenWeather responded");

        if !status.is_success() {
            return Err(status_error(status, &body, query));
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
        let body = self.fetch(Endpoint::Current, query).await?;
        let mut result = parse_current(&body, query)?;
        info!(location = %result.location_name, "resolved current conditions");

        if query.forecast {
            let body = self.fetch(Endpoint::Forecast, query).await?;
            result.forecast = parse_forecast(&body, Utc::now())?;
        }

        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: Option<u8>,
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    visibility: Option<u32>,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    /// Shift from UTC in seconds.
    #[serde(default)]
    timezone: i32,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: Option<String>,
}

fn parse_current(body: &str, query: &WeatherQuery) -> Result<WeatherResult, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::MalformedResponse(format!("current weather: {e}")))?;

    let observation_time = parsed
        .dt
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    let (condition, condition_group) = match parsed.weather.first() {
        Some(w) => (w.description.clone(), Some(w.main.clone())),
        None => {
            warn!("OpenWeather returned no weather description");
            ("Unknown".to_string(), None)
        }
    };

    let location_name =
        if parsed.name.is_empty() { query.city().to_string() } else { parsed.name };

    let country = parsed
        .sys
        .and_then(|s| s.country)
        .or_else(|| query.country().map(str::to_string));

    Ok(WeatherResult {
        location_name,
        country,
        temperature_c: parsed.main.temp,
        feels_like_c: parsed.main.feels_like,
        condition,
        condition_group,
        humidity_pct: parsed.main.humidity,
        pressure_hpa: parsed.main.pressure,
        wind_speed_mps: parsed.wind.map(|w| w.speed),
        visibility_m: parsed.visibility,
        observation_time,
        forecast: Vec::new(),
    })
}

fn parse_forecast(body: &str, now: DateTime<Utc>) -> Result<Vec<ForecastDay>, WeatherError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)
        .map_err(|e| WeatherError::MalformedResponse(format!("forecast: {e}")))?;

    let offset = FixedOffset::east_opt(parsed.city.timezone).unwrap_or_else(|| Utc.fix());
    let today = now.with_timezone(&offset).date_naive();

    Ok(daily_summaries(&parsed.list, offset, today))
}

/// Fold 3-hourly entries into per-day min/max, skipping `today` and earlier.
fn daily_summaries(
    entries: &[OwForecastEntry],
    offset: FixedOffset,
    today: NaiveDate,
) -> Vec<ForecastDay> {
    let mut days: BTreeMap<NaiveDate, ForecastDay> = BTreeMap::new();

    for entry in entries {
        let Some(ts) = DateTime::from_timestamp(entry.dt, 0) else {
            warn!(dt = entry.dt, "skipping forecast entry with invalid timestamp");
            continue;
        };

        let date = ts.with_timezone(&offset).date_naive();
        if date <= today {
            continue;
        }

        days.entry(date)
            .and_modify(|day| {
                day.temp_min_c = day.temp_min_c.min(entry.main.temp_min);
                day.temp_max_c = day.temp_max_c.max(entry.main.temp_max);
            })
            .or_insert_with(|| ForecastDay {
                date,
                temp_min_c: entry.main.temp_min,
                temp_max_c: entry.main.temp_max,
                condition: entry
                    .weather
                    .first()
                    .map(|w| w.description.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            });
    }

    days.into_values().take(FORECAST_DAYS).collect()
}

fn status_error(status: StatusCode, body: &str, query: &WeatherQuery) -> WeatherError {
    match status {
        StatusCode::NOT_FOUND => WeatherError::InvalidCity { city: query.location() },
        StatusCode::UNAUTHORIZED => WeatherError::InvalidApiKey,
        _ => {
            let message = serde_json::from_str::<OwErrorBody>(body)
                .ok()
                .and_then(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| truncate_body(body));

            WeatherError::Provider { status: status.as_u16(), message }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
