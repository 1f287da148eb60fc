//! Glue between location sources, the weather client and the screen.
//!
//! The presenter owns the current location and the last weather data. Both
//! change only through `&mut self`, so updates from overlapping refreshes
//! simply overwrite each other: the last one to finish wins.

use crate::{
    client::WeatherClient,
    error::FetchError,
    geocode::{Geocoder, place_label, resolve_address},
    location::{Coordinate, Location, latest_fix},
    model::WeatherData,
    units::{TemperatureScale, format_temperature},
};

struct Shown {
    location: Location,
    label: String,
    data: WeatherData,
}

pub struct Presenter {
    client: WeatherClient,
    geocoder: Box<dyn Geocoder>,
    scale: TemperatureScale,
    shown: Option<Shown>,
}

impl Presenter {
    pub fn new(
        client: WeatherClient,
        geocoder: Box<dyn Geocoder>,
        scale: TemperatureScale,
    ) -> Self {
        Self {
            client,
            geocoder,
            scale,
            shown: None,
        }
    }

    pub fn set_scale(&mut self, scale: TemperatureScale) {
        self.scale = scale;
    }

    /// Location for a batch of position fixes; `None` for an empty batch.
    pub fn location_for_fixes(&self, fixes: &[Coordinate]) -> Option<Location> {
        latest_fix(fixes)
    }

    /// Location for typed text, precise when the geocoder knows the place.
    pub async fn location_for_address(&self, text: &str) -> Location {
        resolve_address(self.geocoder.as_ref(), text).await
    }

    /// Fetches weather for `location` and returns the text to display.
    ///
    /// Coordinates are labelled with their place name, looked up once per
    /// location. On failure the previously shown weather stays in place.
    pub async fn refresh(&mut self, location: Location) -> Result<String, FetchError> {
        let data = self.client.fetch_weather(&location).await?;

        let label = match self.shown.take() {
            Some(shown) if shown.location == location => shown.label,
            _ => place_label(self.geocoder.as_ref(), &location).await,
        };

        let shown = Shown {
            location,
            label,
            data,
        };
        let text = render(&shown, self.scale);
        self.shown = Some(shown);
        Ok(text)
    }

    /// Display text for what is currently shown, in the current scale.
    pub fn render(&self) -> Option<String> {
        self.shown.as_ref().map(|shown| render(shown, self.scale))
    }
}

fn render(shown: &Shown, scale: TemperatureScale) -> String {
    format!("{}: {}", shown.label, format_temperature(&shown.data, scale))
}

/// Alert text for a failed fetch. Every failure kind reads the same.
pub fn alert_text(err: &FetchError) -> String {
    format!("Error: {}", err.user_message())
}
