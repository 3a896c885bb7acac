//! Plain-text rendering of a [`WeatherResult`] for the terminal.

use std::io::{self, Write};

use crate::model::{Units, WeatherResult};

const RULE_WIDTH: usize = 40;

/// How a result is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub units: Units,
    /// Prefix the headline and conditions with icons.
    pub emoji: bool,
}

/// Render `result` as report lines joined by newlines, without a trailing newline.
pub fn render(result: &WeatherResult, style: &Style) -> String {
    let units = style.units;
    let temp = |c: f64| format!("{:.1}{}", units.temperature(c), units.temperature_suffix());

    let place = match &result.country {
        Some(country) => format!("{}, {}", result.location_name, country),
        None => result.location_name.clone(),
    };

    let mut lines = Vec::new();

    if style.emoji {
        lines.push(format!("🌍 Weather for {place}"));
    } else {
        lines.push(format!("Weather for {place}"));
    }
    lines.push("=".repeat(RULE_WIDTH));

    let icon = if style.emoji {
        format!("{} ", condition_icon(result.condition_group.as_deref()))
    } else {
        String::new()
    };

    lines.push(format!(
        "Current: {icon}{} {} (Feels like {})",
        title_case(&result.condition),
        temp(result.temperature_c),
        temp(result.feels_like_c),
    ));

    let mut details = Vec::new();
    if let Some(humidity) = result.humidity_pct {
        details.push(format!("  Humidity: {humidity}%"));
    }
    if let Some(pressure) = result.pressure_hpa {
        details.push(format!("  Pressure: {pressure} hPa"));
    }
    if let Some(speed) = result.wind_speed_mps {
        details.push(format!("  Wind Speed: {:.1} {}", units.speed(speed), units.speed_suffix()));
    }
    if let Some(visibility) = result.visibility_m {
        details.push(format!("  Visibility: {:.1} km", f64::from(visibility) / 1000.0));
    }

    if !details.is_empty() {
        lines.push(String::new());
        lines.push("Additional Details:".to_string());
        lines.extend(details);
    }

    if !result.forecast.is_empty() {
        lines.push(String::new());
        lines.push(format!("{}-Day Forecast:", result.forecast.len()));
        lines.push("-".repeat(RULE_WIDTH));

        for day in &result.forecast {
            lines.push(format!("{}: {}", day.date.format("%Y-%m-%d"), title_case(&day.condition)));
            lines.push(format!("  Max: {}, Min: {}", temp(day.temp_max_c), temp(day.temp_min_c)));
        }
    }

    lines.join("\n")
}

/// Write the rendered report followed by a newline.
pub fn write_report<W: Write>(out: &mut W, result: &WeatherResult, style: &Style) -> io::Result<()> {
    writeln!(out, "{}", render(result, style))?;
    out.flush()
}

fn condition_icon(group: Option<&str>) -> &'static str {
    match group {
        Some("Clear") => "☀️",
        Some("Clouds") => "☁️",
        Some("Rain") => "🌧️",
        Some("Drizzle") => "🌦️",
        Some("Thunderstorm") => "⛈️",
        Some("Snow") => "❄️",
        Some("Mist" | "Fog" | "Haze") => "🌫️",
        Some("Smoke") => "💨",
        _ => "🌈",
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastDay;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample() -> WeatherResult {
        WeatherResult {
            location_name: "Puchong".into(),
            country: Some("MY".into()),
            temperature_c: 28.5,
            feels_like_c: 32.1,
            condition: "scattered clouds".into(),
            condition_group: Some("Clouds".into()),
            humidity_pct: Some(78),
            pressure_hpa: Some(1009),
            wind_speed_mps: Some(2.6),
            visibility_m: Some(8000),
            observation_time: Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
            forecast: vec![ForecastDay {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                temp_min_c: 24.0,
                temp_max_c: 31.5,
                condition: "light rain".into(),
            }],
        }
    }

    #[test]
    fn renders_current_conditions_and_forecast() {
        let out = render(&sample(), &Style::default());

        let expected = "\
Weather for Puchong, MY
========================================
Current: Scattered Clouds 28.5°C (Feels like 32.1°C)

Additional Details:
  Humidity: 78%
  Pressure: 1009 hPa
  Wind Speed: 2.6 m/s
  Visibility: 8.0 km

1-Day Forecast:
----------------------------------------
2024-01-02: Light Rain
  Max: 31.5°C, Min: 24.0°C";

        assert_eq!(out, expected);
    }

    #[test]
    fn rendering_is_deterministic() {
        let result = sample();
        let style = Style { units: Units::Imperial, emoji: true };

        assert_eq!(render(&result, &style), render(&result, &style));
    }

    #[test]
    fn omits_empty_sections() {
        let mut result = sample();
        result.humidity_pct = None;
        result.pressure_hpa = None;
        result.wind_speed_mps = None;
        result.visibility_m = None;
        result.forecast.clear();
        result.country = None;

        let out = render(&result, &Style::default());

        assert!(out.starts_with("Weather for Puchong\n"));
        assert!(!out.contains("Additional Details"));
        assert!(!out.contains("Forecast"));
    }

    #[test]
    fn converts_units_for_display() {
        let style = Style { units: Units::Imperial, emoji: false };
        let out = render(&sample(), &style);

        assert!(out.contains("83.3°F"));
        assert!(out.contains("5.8 mph"));
    }

    #[test]
    fn emoji_style_uses_condition_group() {
        let style = Style { units: Units::Metric, emoji: true };
        let out = render(&sample(), &style);

        assert!(out.starts_with("🌍 Weather for"));
        assert!(out.contains("Current: ☁️ Scattered Clouds"));
    }

    #[test]
    fn write_report_appends_newline() {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample(), &Style::default()).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("Min: 24.0°C\n"));
    }

    #[test]
    fn title_case_normalizes_words() {
        assert_eq!(title_case("light  RAIN"), "Light Rain");
        assert_eq!(title_case(""), "");
    }
}
