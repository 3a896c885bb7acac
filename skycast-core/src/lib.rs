//! Core library for the `skycast` CLI.
//!
//! This crate defines:
//! - Configuration & credential resolution
//! - The OpenWeather provider behind a `WeatherProvider` trait
//! - Shared domain models (queries, results, forecast days)
//! - Plain-text rendering of results
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

use anyhow::Context;
use std::io::Write;

pub mod config;
pub mod error;
pub mod model;
pub mod present;
pub mod provider;

pub use config::{API_KEY_ENV, Config};
pub use error::WeatherError;
pub use model::{ForecastDay, Units, WeatherQuery, WeatherResult};
pub use present::{Style, render};
pub use provider::{WeatherProvider, provider_from_config};

/// Fetch weather for `query` and write the report to `out`.
///
/// Nothing is written unless the provider returned a complete result.
pub async fn report<W: Write>(
    provider: &dyn WeatherProvider,
    query: &WeatherQuery,
    style: &Style,
    out: &mut W,
) -> anyhow::Result<()> {
    let result = provider.get_weather(query).await?;

    present::write_report(out, &result, style).context("Failed to write weather report")?;

    Ok(())
}
