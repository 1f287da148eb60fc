//! HTTP client for the provider's current-weather endpoint.
//!
//! One call to [`WeatherClient::fetch_weather`] is one GET and one decode.
//! There is no cache and no retry: every call goes to the network.

use std::{fmt, time::Duration};

use reqwest::{Client, Url};
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{
    error::FetchError,
    location::Location,
    model::{WeatherData, WeatherFetchResult},
};

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl WeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url,
            timeout: REQUEST_TIMEOUT,
            http: Client::new(),
        }
    }

    /// Replaces the default per-request timeout of [`REQUEST_TIMEOUT`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the GET URL for `location`.
    ///
    /// Coordinates go out as `lat`/`lon`, addresses as `q`, and `APPID` is
    /// always appended. Address text is forwarded as-is.
    pub fn request_url(&self, location: &Location) -> Result<Url, FetchError> {
        let mut params: Vec<(&str, String)> = match location {
            Location::Precise {
                latitude,
                longitude,
            } => vec![
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ],
            Location::Address { text } => vec![("q", text.clone())],
        };
        params.push(("APPID", self.api_key.clone()));

        Url::parse_with_params(&self.base_url, &params)
            .map_err(|e| FetchError::UrlEncoding(format!("{}: {e}", self.base_url)))
    }

    /// Fetches current weather for `location`.
    ///
    /// Transport failures are returned without looking at a body. Anything
    /// that came back is handed to [`decode_response`] whatever its HTTP
    /// status, because the provider reports its own errors in the body.
    /// A request that takes longer than the timeout is a transport failure.
    pub async fn fetch_weather(&self, location: &Location) -> WeatherFetchResult {
        let url = self.request_url(location).inspect_err(|e| {
            tracing::warn!(location = %location, error = %e, "Could not build weather request");
        })?;

        tracing::debug!(location = %location, "Requesting current weather");

        let res = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let err = FetchError::from(e);
                tracing::warn!(location = %location, error = %err, "Weather request failed");
                err
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            let err = FetchError::from(e);
            tracing::warn!(
                location = %location,
                error = %err,
                "Failed to read weather response body"
            );
            err
        })?;

        let result = decode_response(&body);
        match &result {
            Ok(data) => tracing::info!(
                location = %location,
                %status,
                temperature = ?data.temperature,
                "Weather fetched"
            ),
            Err(e) => tracing::warn!(
                location = %location,
                %status,
                kind = e.kind(),
                error = %e,
                "Weather fetch failed"
            ),
        }
        result
    }

    /// Runs [`fetch_weather`](Self::fetch_weather) in the background and
    /// hands the result to `on_complete`.
    ///
    /// Returns immediately. `on_complete` is called exactly once, on a tokio
    /// worker. Must be called from within a tokio runtime.
    pub fn spawn_fetch<F>(&self, location: Location, on_complete: F) -> JoinHandle<()>
    where
        F: FnOnce(WeatherFetchResult) + Send + 'static,
    {
        let client = self.clone();
        tokio::spawn(async move {
            let result = client.fetch_weather(&location).await;
            on_complete(result);
        })
    }
}

impl fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Classifies a response body.
///
/// A top-level `cod` together with `message` is a provider failure.
/// Everything else is a success, with `main.temp`, `main.humidity` and
/// `main.pressure` picked out when present and numeric. A body without
/// `main` still counts as a success with every field missing.
pub fn decode_response(body: &str) -> WeatherFetchResult {
    let json: Value =
        serde_json::from_str(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    let Value::Object(root) = json else {
        return Err(FetchError::InvalidResponse("expected a JSON object".to_string()));
    };

    if let (Some(code), Some(message)) = (root.get("cod"), root.get("message")) {
        return Err(FetchError::api(value_text(code), value_text(message)));
    }

    let main = root.get("main");
    let field = |name: &str| main.and_then(|m| m.get(name)).and_then(Value::as_f64);

    Ok(WeatherData::new(field("temp"), field("humidity"), field("pressure")))
}

// `cod` is a string on some endpoints and a number on others.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
