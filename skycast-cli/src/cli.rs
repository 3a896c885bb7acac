use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::{
    io,
    path::{Path, PathBuf},
};
use tracing::debug;

use skycast_core::{API_KEY_ENV, Config, Style, Units, WeatherQuery, provider_from_config};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather and a short forecast for any city")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default settings.
    Configure,

    /// Show weather for a city.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// City name, e.g. "London".
    pub city: String,

    /// Two-letter country code, e.g. "GB".
    #[arg(long)]
    pub country: Option<String>,

    /// Unit system: metric, imperial or standard.
    #[arg(long)]
    pub units: Option<Units>,

    /// Also show a 3-day forecast.
    #[arg(long)]
    pub forecast: bool,

    /// Decorate the output with weather icons.
    #[arg(long)]
    pub emoji: bool,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config_path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };
        debug!(path = %config_path.display(), "using config file");

        match self.command {
            Command::Configure => configure(&config_path),
            Command::Show(args) => show(args, &config_path).await,
        }
    }
}

async fn show(args: ShowArgs, config_path: &Path) -> Result<()> {
    let query = WeatherQuery::new(args.city)?;
    let config = Config::load_from(config_path)?;

    let units = args.units.or(config.units).unwrap_or_default();
    let query = query
        .with_country(args.country.or(config.country.clone()))
        .with_units(units)
        .with_forecast(args.forecast);

    let env_key = std::env::var(API_KEY_ENV).ok();
    let provider = provider_from_config(&config, env_key.as_deref())?;

    let style = Style { units, emoji: args.emoji };
    skycast_core::report(provider.as_ref(), &query, &style, &mut io::stdout()).await
}

fn configure(config_path: &Path) -> Result<()> {
    let mut config = Config::load_from(config_path)?;

    let help = if config.api_key.is_some() {
        "Leave empty to keep the stored key"
    } else {
        "Get a free key at https://openweathermap.org/api"
    };
    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()
        .context("Failed to read API key")?;

    if !api_key.trim().is_empty() {
        config.set_api_key(&api_key);
    }

    let current = config.units.unwrap_or_default();
    let cursor = Units::all().iter().position(|u| *u == current).unwrap_or(0);
    let units = Select::new("Default units:", Units::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read default units")?;
    config.units = Some(units);

    let country = Text::new("Default country code (optional):")
        .with_default(config.country.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read default country")?;
    config.country = Some(country.trim().to_uppercase()).filter(|c| !c.is_empty());

    config.save_to(config_path)?;
    println!("Saved configuration to {}", config_path.display());

    Ok(())
}
