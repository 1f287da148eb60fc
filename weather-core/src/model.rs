use crate::error::FetchError;

const KELVIN_OFFSET: f64 = 273.15;

/// Current conditions as reported by the provider.
///
/// `temperature` is in Kelvin. Any field may be missing from the response,
/// so all of them are optional.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeatherData {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

impl WeatherData {
    pub fn new(temperature: Option<f64>, humidity: Option<f64>, pressure: Option<f64>) -> Self {
        Self {
            temperature,
            humidity,
            pressure,
        }
    }

    pub fn temperature_in_celsius(&self) -> Option<f64> {
        self.temperature.map(|k| k - KELVIN_OFFSET)
    }

    pub fn temperature_in_fahrenheit(&self) -> Option<f64> {
        self.temperature_in_celsius().map(|c| c * 1.8 + 32.0)
    }
}

/// Outcome of one fetch: data on success, the reason otherwise.
pub type WeatherFetchResult = Result<WeatherData, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn derived_temperatures() {
        let data = WeatherData::new(Some(300.0), None, None);

        assert!(close(data.temperature_in_celsius().unwrap(), 26.85));
        assert!(close(data.temperature_in_fahrenheit().unwrap(), 80.33));
    }

    #[test]
    fn derived_temperatures_follow_missing_temperature() {
        let data = WeatherData::new(None, Some(40.0), Some(1012.0));

        assert_eq!(data.temperature_in_celsius(), None);
        assert_eq!(data.temperature_in_fahrenheit(), None);
    }

    #[test]
    fn freezing_point() {
        let data = WeatherData::new(Some(273.15), None, None);
        assert!(close(data.temperature_in_celsius().unwrap(), 0.0));
        assert!(close(data.temperature_in_fahrenheit().unwrap(), 32.0));
    }
}
