use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::model::WeatherData;

/// Shown in place of a number the provider did not send.
pub const UNAVAILABLE: &str = "unavailable";

/// Scale used to display temperatures.
///
/// Stored under the names `Kelvin`, `Celsius` and `Farenheit`; the last one
/// keeps the spelling of existing settings files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TemperatureScale {
    #[default]
    Kelvin,
    Celsius,
    #[serde(rename = "Farenheit", alias = "Fahrenheit")]
    Fahrenheit,
}

impl TemperatureScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureScale::Kelvin => "Kelvin",
            TemperatureScale::Celsius => "Celsius",
            TemperatureScale::Fahrenheit => "Fahrenheit",
        }
    }

    pub const fn all() -> &'static [TemperatureScale] {
        &[
            TemperatureScale::Celsius,
            TemperatureScale::Fahrenheit,
            TemperatureScale::Kelvin,
        ]
    }
}

impl fmt::Display for TemperatureScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureScale {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "kelvin" | "k" => Ok(TemperatureScale::Kelvin),
            "celsius" | "c" => Ok(TemperatureScale::Celsius),
            "fahrenheit" | "farenheit" | "f" => Ok(TemperatureScale::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature scale '{value}'. \
                 Supported scales: celsius, fahrenheit, kelvin."
            )),
        }
    }
}

/// Renders the temperature of `data` in `scale`.
///
/// Celsius and Fahrenheit are rounded and signed (`+20 °C`), Kelvin keeps one
/// decimal (`280.0 K`). A missing temperature renders as [`UNAVAILABLE`].
pub fn format_temperature(data: &WeatherData, scale: TemperatureScale) -> String {
    match scale {
        TemperatureScale::Celsius => signed_degrees(data.temperature_in_celsius(), "°C"),
        TemperatureScale::Fahrenheit => signed_degrees(data.temperature_in_fahrenheit(), "°F"),
        TemperatureScale::Kelvin => match data.temperature {
            Some(kelvin) => format!("{kelvin:.1} K"),
            None => UNAVAILABLE.to_string(),
        },
    }
}

fn signed_degrees(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:+} {unit}", v.round() as i64),
        None => UNAVAILABLE.to_string(),
    }
}

/// Picks a display scale from a POSIX or BCP 47 locale such as `en_US.UTF-8`.
///
/// US gets Fahrenheit, any other region Celsius. Without a usable region
/// (`C`, `POSIX`, `en`, nothing at all) the scale falls back to Kelvin.
pub fn default_scale_for_locale(locale: Option<&str>) -> TemperatureScale {
    match locale.and_then(region) {
        Some(r) if r.eq_ignore_ascii_case("US") => TemperatureScale::Fahrenheit,
        Some(_) => TemperatureScale::Celsius,
        None => TemperatureScale::Kelvin,
    }
}

fn region(locale: &str) -> Option<&str> {
    let base = locale.split(['.', '@']).next()?;
    let (_, rest) = base.split_once(['_', '-'])?;
    let region = rest.rsplit(['_', '-']).next()?;

    let is_alpha2 = region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic());
    let is_num3 = region.len() == 3 && region.chars().all(|c| c.is_ascii_digit());
    (is_alpha2 || is_num3).then_some(region)
}
