// Geolocation capability backed by an HTTP position endpoint
use crate::application::sensor_feed::{FeedKind, FeedSink, SensorCapability, SensorError, Subscription};
use crate::domain::location::LocationSnapshot;
use crate::domain::observed::FeedUpdate;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Watch options, mirroring the platform geolocation contract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    pub max_cached_age: Duration,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(5_000),
            max_cached_age: Duration::ZERO,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    longitude: f64,
    #[serde(alias = "accuracy_meters")]
    accuracy: f64,
}

#[derive(Debug, Clone)]
pub struct HttpGeolocation {
    endpoint: Option<String>,
    options: GeolocationOptions,
    poll_interval: Duration,
    client: reqwest::Client,
}

impl HttpGeolocation {
    pub fn new(
        endpoint: Option<String>,
        options: GeolocationOptions,
        poll_interval: Duration,
    ) -> Result<Self, SensorError> {
        // Position endpoints are contacted directly, never through a proxy
        let client = reqwest::Client::builder().no_proxy().build()?;
        Ok(Self {
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            options,
            poll_interval,
            client,
        })
    }

    fn build_position_url(endpoint: &str, options: &GeolocationOptions) -> String {
        let accuracy = if options.high_accuracy { "high" } else { "low" };
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}{}accuracy={}",
            endpoint,
            separator,
            urlencoding::encode(accuracy)
        )
    }

    async fn fetch_position(
        client: &reqwest::Client,
        url: &str,
        options: &GeolocationOptions,
    ) -> Result<LocationSnapshot, SensorError> {
        let timeout_ms = options.timeout.as_millis() as u64;
        let response = client
            .get(url)
            .header("Accept", "application/json")
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SensorError::Timeout(timeout_ms)
                } else {
                    SensorError::Request(e)
                }
            })?;

        if !response.status().is_success() {
            return Err(SensorError::Parse {
                what: "position response status",
                value: response.status().to_string(),
            });
        }

        let body = response.text().await?;
        let position: PositionResponse =
            serde_json::from_str(&body).map_err(|e| SensorError::Parse {
                what: "position response",
                value: e.to_string(),
            })?;

        Ok(LocationSnapshot::new(
            position.latitude,
            position.longitude,
            position.accuracy,
            chrono::Utc::now().timestamp_millis(),
        ))
    }
}

#[async_trait]
impl SensorCapability for HttpGeolocation {
    fn kind(&self) -> FeedKind {
        FeedKind::Geolocation
    }

    async fn subscribe(&self, sink: FeedSink) -> Result<Option<Subscription>, SensorError> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(None);
        };

        let url = Self::build_position_url(endpoint, &self.options);
        let client = self.client.clone();
        let options = self.options;
        let poll_interval = self.poll_interval;
        tracing::info!(url = %url, "watching position");

        let closer = sink.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            let mut last_fix: Option<LocationSnapshot> = None;

            loop {
                interval.tick().await;

                if let Some(fix) = &last_fix {
                    let age_ms = chrono::Utc::now().timestamp_millis() - fix.observed_at_ms;
                    if age_ms >= 0 && (age_ms as u128) < options.max_cached_age.as_millis() {
                        tracing::debug!(age_ms, "re-emitting cached position");
                        if !sink.publish(FeedUpdate::LocationFix(fix.clone())) {
                            break;
                        }
                        continue;
                    }
                }

                let update = match Self::fetch_position(&client, &url, &options).await {
                    Ok(fix) => {
                        tracing::debug!(accuracy = fix.accuracy_meters, "position updated");
                        last_fix = Some(fix.clone());
                        FeedUpdate::LocationFix(fix)
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "position unavailable");
                        FeedUpdate::LocationError(e.to_string())
                    }
                };
                if !sink.publish(update) {
                    break;
                }
            }
        });

        Ok(Some(Subscription::from_task(FeedKind::Geolocation, closer, handle)))
    }
}
