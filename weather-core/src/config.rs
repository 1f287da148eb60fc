use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    client::WeatherClient,
    geocode::{DEFAULT_GEOCODING_URL, OpenWeatherGeocoder, geocoding_url_for},
    units::{TemperatureScale, default_scale_for_locale},
};

/// Settings stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// TemperatureScale = "Celsius"
/// Address = "Saint Petersburg"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_key: Option<String>,

    /// Override for the current-weather endpoint, for compatible providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Root of the geocoding API. Unset means the `/geo/1.0` root on the
    /// host of `base_url`, or the default provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoding_url: Option<String>,

    /// Preferred display scale; unset means "derive from locale".
    #[serde(rename = "TemperatureScale", default, skip_serializing_if = "Option::is_none")]
    pub temperature_scale: Option<TemperatureScale>,

    /// Last resolved or entered address.
    #[serde(rename = "Address", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `weather configure` and enter your OpenWeatherMap API key."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Stored scale, or the default for `locale` when none was chosen.
    pub fn temperature_scale(&self, locale: Option<&str>) -> TemperatureScale {
        self.temperature_scale
            .unwrap_or_else(|| default_scale_for_locale(locale))
    }

    pub fn set_temperature_scale(&mut self, scale: TemperatureScale) {
        self.temperature_scale = Some(scale);
    }

    pub fn last_address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn set_last_address(&mut self, address: impl Into<String>) {
        self.address = Some(address.into());
    }

    pub fn weather_client(&self) -> Result<WeatherClient> {
        let api_key = self.api_key()?.to_owned();
        Ok(match &self.base_url {
            Some(url) => WeatherClient::with_base_url(api_key, url.clone()),
            None => WeatherClient::new(api_key),
        })
    }

    /// Geocoding root in effect: explicit setting, then derived from
    /// `base_url`, then the default provider.
    pub fn geocoding_url(&self) -> Result<String> {
        if let Some(url) = &self.geocoding_url {
            return Ok(url.clone());
        }

        match &self.base_url {
            Some(base) => geocoding_url_for(base).ok_or_else(|| {
                anyhow!(
                    "Cannot derive a geocoding URL from base_url '{base}'.\n\
                     Hint: set geocoding_url in the config file."
                )
            }),
            None => Ok(DEFAULT_GEOCODING_URL.to_string()),
        }
    }

    pub fn geocoder(&self) -> Result<OpenWeatherGeocoder> {
        Ok(OpenWeatherGeocoder::with_base_url(
            self.api_key()?.to_owned(),
            self.geocoding_url()?,
        ))
    }
}
