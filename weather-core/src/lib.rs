//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - The location model (coordinates or a free-text address)
//! - The current-weather client and its success/failure outcome
//! - Address geocoding with a fallback to search by name, and place names
//!   for coordinates
//! - Temperature scales and display formatting
//! - Settings stored on disk
//! - The presenter tying these together for a front end
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod geocode;
pub mod location;
pub mod model;
pub mod presenter;
pub mod units;

pub use client::{WeatherClient, decode_response};
pub use config::Config;
pub use error::{FetchError, GENERIC_FAILURE_MESSAGE};
pub use geocode::{
    GeocodeError, Geocoder, OpenWeatherGeocoder, geocoding_url_for, place_label, resolve_address,
};
pub use location::{Coordinate, Location, latest_fix};
pub use model::{WeatherData, WeatherFetchResult};
pub use presenter::{Presenter, alert_text};
pub use units::{TemperatureScale, UNAVAILABLE, default_scale_for_locale, format_temperature};
