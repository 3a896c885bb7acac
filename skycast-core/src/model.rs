use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::WeatherError;

/// Unit system used when presenting a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    /// Convert a Celsius value into this unit system.
    pub fn temperature(&self, celsius: f64) -> f64 {
        match self {
            Units::Metric => celsius,
            Units::Imperial => celsius * 9.0 / 5.0 + 32.0,
            Units::Standard => celsius + 273.15,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    /// Convert a speed in metres per second into this unit system.
    pub fn speed(&self, mps: f64) -> f64 {
        match self {
            Units::Imperial => mps * 2.236_936,
            Units::Metric | Units::Standard => mps,
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(Units::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(Units::Imperial),
            "standard" | "k" | "kelvin" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

/// One lookup as requested by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherQuery {
    city: String,
    country: Option<String>,
    pub units: Units,
    pub forecast: bool,
}

impl WeatherQuery {
    /// Build a query for `city`. Blank names are rejected before any request exists.
    pub fn new(city: impl Into<String>) -> Result<Self, WeatherError> {
        let city = city.into().trim().to_string();
        if city.is_empty() {
            return Err(WeatherError::InvalidQuery("city name must not be empty".into()));
        }

        Ok(Self { city, country: None, units: Units::default(), forecast: false })
    }

    /// Restrict the lookup to a country code (e.g. "GB"). Blank codes are ignored.
    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_forecast(mut self, forecast: bool) -> Self {
        self.forecast = forecast;
        self
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// Location string in the provider's `q` format: `city` or `city,CC`.
    pub fn location(&self) -> String {
        match &self.country {
            Some(cc) => format!("{},{}", self.city, cc),
            None => self.city.clone(),
        }
    }
}

/// Parsed weather for one query. Temperatures are Celsius, speeds m/s.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherResult {
    pub location_name: String,
    pub country: Option<String>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    /// Coarse condition family reported by the provider, e.g. "Rain".
    pub condition_group: Option<String>,
    pub humidity_pct: Option<u8>,
    pub pressure_hpa: Option<u32>,
    pub wind_speed_mps: Option<f64>,
    pub visibility_m: Option<u32>,
    pub observation_time: DateTime<Utc>,
    pub forecast: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub condition: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_city_is_rejected() {
        for city in ["", "   ", "\t\n"] {
            let err = WeatherQuery::new(city).unwrap_err();
            assert!(matches!(err, WeatherError::InvalidQuery(_)));
        }
    }

    #[test]
    fn query_location_includes_country_when_present() {
        let q = WeatherQuery::new("  London ").unwrap();
        assert_eq!(q.location(), "London");

        let q = q.with_country(Some(" gb ".into()));
        assert_eq!(q.location(), "London,GB");
        assert_eq!(q.country(), Some("GB"));

        let q = q.with_country(Some("  ".into()));
        assert_eq!(q.location(), "London");
    }

    #[test]
    fn units_parse_roundtrip() {
        for units in Units::all() {
            let parsed: Units = units.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }

        let err = "rankine".parse::<Units>().unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn temperature_conversions() {
        assert_eq!(Units::Metric.temperature(21.5), 21.5);
        assert!((Units::Imperial.temperature(100.0) - 212.0).abs() < 1e-9);
        assert!((Units::Standard.temperature(0.0) - 273.15).abs() < 1e-9);
    }
}
