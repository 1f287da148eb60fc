//! Geocoding in both directions: typed address to coordinates, and
//! coordinates to a place name for display.
//! Uses the provider's geocoding API with the same API key.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    client::REQUEST_TIMEOUT,
    location::{Coordinate, Location},
};

/// Root of the geocoding API; `/direct` and `/reverse` hang off it.
pub const DEFAULT_GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No place found for '{0}'")]
    NotFound(String),

    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoding service returned status {0}")]
    Status(reqwest::StatusCode),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Coordinates of a typed address.
    async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError>;

    /// Place name for a coordinate, e.g. `"Saint Petersburg, RU"`.
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct PlaceHit {
    name: String,
    lat: f64,
    lon: f64,
    country: Option<String>,
}

impl PlaceHit {
    fn display_name(&self) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() && country != self.name => {
                format!("{}, {country}", self.name)
            }
            _ => self.name.clone(),
        }
    }
}

#[derive(Clone)]
pub struct OpenWeatherGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherGeocoder {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_GEOCODING_URL.to_string())
    }

    /// `base_url` is the API root, without `/direct` or `/reverse`.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn lookup(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<PlaceHit>, GeocodeError> {
        let res = self
            .http
            .get(format!("{}/{endpoint}", self.base_url))
            .query(params)
            .query(&[("limit", "1"), ("appid", self.api_key.as_str())])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !res.status().is_success() {
            return Err(GeocodeError::Status(res.status()));
        }

        Ok(res.json().await.map_err(reqwest::Error::without_url)?)
    }
}

impl std::fmt::Debug for OpenWeatherGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherGeocoder")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl Geocoder for OpenWeatherGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let hits = self.lookup("direct", &[("q", address)]).await?;
        let hit = hits
            .first()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

        Ok(Coordinate::new(hit.lat, hit.lon))
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();

        let hits = self
            .lookup("reverse", &[("lat", lat.as_str()), ("lon", lon.as_str())])
            .await?;
        let hit = hits
            .first()
            .ok_or_else(|| GeocodeError::NotFound(format!("{lat}, {lon}")))?;

        Ok(hit.display_name())
    }
}

/// Geocoding root on the same host as a weather endpoint.
///
/// `http://localhost:8080/data/2.5/weather` gives
/// `http://localhost:8080/geo/1.0`. `None` if `weather_url` does not parse.
pub fn geocoding_url_for(weather_url: &str) -> Option<String> {
    let url = Url::parse(weather_url).ok()?;
    let origin = url.origin();
    origin
        .is_tuple()
        .then(|| format!("{}/geo/1.0", origin.ascii_serialization()))
}

/// Resolves typed text into a [`Location`].
///
/// A successful lookup gives a precise location. Otherwise the raw text is
/// kept as an address so the weather provider can still try it by name.
pub async fn resolve_address(geocoder: &dyn Geocoder, text: &str) -> Location {
    match geocoder.geocode(text).await {
        Ok(coordinate) => {
            tracing::debug!(address = text, ?coordinate, "Address resolved");
            Location::from(coordinate)
        }
        Err(e) => {
            tracing::info!(address = text, error = %e, "Geocoding failed, searching by name");
            Location::address(text)
        }
    }
}

/// Display label for `location`.
///
/// Coordinates are reverse geocoded to a place name; on failure the
/// numeric label is kept. Addresses are shown as typed.
pub async fn place_label(geocoder: &dyn Geocoder, location: &Location) -> String {
    let Some(coordinate) = location.coordinate() else {
        return location.label();
    };

    match geocoder.reverse_geocode(coordinate).await {
        Ok(name) => {
            tracing::debug!(?coordinate, place = %name, "Reverse geocoded");
            name
        }
        Err(e) => {
            tracing::debug!(?coordinate, error = %e, "Reverse geocoding failed");
            location.label()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixed(Option<Coordinate>);

    #[async_trait]
    impl Geocoder for Fixed {
        async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
            self.0
                .ok_or_else(|| GeocodeError::NotFound(address.to_string()))
        }

        async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, GeocodeError> {
            match self.0 {
                Some(c) if c == coordinate => Ok("Paris, FR".to_string()),
                _ => Err(GeocodeError::NotFound(format!("{coordinate:?}"))),
            }
        }
    }

    fn geocoder_for(server: &MockServer) -> OpenWeatherGeocoder {
        OpenWeatherGeocoder::with_base_url("KEY".into(), format!("{}/geo/1.0/", server.uri()))
    }

    #[tokio::test]
    async fn resolved_address_becomes_precise() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let location = resolve_address(&Fixed(Some(paris)), "Paris").await;

        assert_eq!(location, Location::from(paris));
    }

    #[tokio::test]
    async fn unresolved_address_falls_back_to_text() {
        let location = resolve_address(&Fixed(None), "Atlantis").await;
        assert_eq!(location, Location::address("Atlantis"));
    }

    #[tokio::test]
    async fn place_label_uses_reverse_lookup() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let geocoder = Fixed(Some(paris));

        let label = place_label(&geocoder, &Location::from(paris)).await;
        assert_eq!(label, "Paris, FR");

        let label = place_label(&geocoder, &Location::from(Coordinate::new(1.0, 2.0))).await;
        assert_eq!(label, "1.0000, 2.0000");

        let label = place_label(&geocoder, &Location::address("Lyon")).await;
        assert_eq!(label, "Lyon");
    }

    #[test]
    fn geocoding_root_follows_weather_host() {
        assert_eq!(
            geocoding_url_for("http://localhost:8080/data/2.5/weather").as_deref(),
            Some("http://localhost:8080/geo/1.0")
        );
        assert_eq!(
            geocoding_url_for(crate::client::DEFAULT_BASE_URL).as_deref(),
            Some(DEFAULT_GEOCODING_URL)
        );
        assert_eq!(geocoding_url_for("not a url"), None);
    }

    #[tokio::test]
    async fn direct_geocoding_takes_first_hit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "London"))
            .and(query_param("limit", "1"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "London", "lat": 51.5073, "lon": -0.1276, "country": "GB"}
            ])))
            .mount(&mock_server)
            .await;

        let c = geocoder_for(&mock_server).geocode("London").await.unwrap();

        assert_eq!(c, Coordinate::new(51.5073, -0.1276));
    }

    #[tokio::test]
    async fn direct_geocoding_empty_list_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let result = geocoder_for(&mock_server).geocode("Atlantis").await;

        assert!(matches!(result, Err(GeocodeError::NotFound(_))));
    }

    #[tokio::test]
    async fn direct_geocoding_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let result = geocoder_for(&mock_server).geocode("London").await;

        assert!(matches!(result, Err(GeocodeError::Status(s)) if s.as_u16() == 401));
    }

    #[tokio::test]
    async fn reverse_geocoding_names_the_place() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .and(query_param("lat", "59.94"))
            .and(query_param("lon", "30.31"))
            .and(query_param("limit", "1"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Saint Petersburg", "lat": 59.9387, "lon": 30.3162, "country": "RU"}
            ])))
            .mount(&mock_server)
            .await;

        let name = geocoder_for(&mock_server)
            .reverse_geocode(Coordinate::new(59.94, 30.31))
            .await
            .unwrap();

        assert_eq!(name, "Saint Petersburg, RU");
    }

    #[tokio::test]
    async fn reverse_geocoding_without_country() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "Null Island", "lat": 0.0, "lon": 0.0}
            ])))
            .mount(&mock_server)
            .await;

        let name = geocoder_for(&mock_server)
            .reverse_geocode(Coordinate::new(0.0, 0.0))
            .await
            .unwrap();

        assert_eq!(name, "Null Island");
    }

    #[tokio::test]
    async fn reverse_geocoding_nothing_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/geo/1.0/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let geocoder = geocoder_for(&mock_server);
        let result = geocoder.reverse_geocode(Coordinate::new(-60.0, -140.0)).await;
        assert!(matches!(result, Err(GeocodeError::NotFound(_))));

        let label = place_label(&geocoder, &Location::from(Coordinate::new(-60.0, -140.0))).await;
        assert_eq!(label, "-60.0000, -140.0000");
    }
}
