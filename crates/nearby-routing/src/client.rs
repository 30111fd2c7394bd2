//! HTTP client for an OSRM-compatible `route` endpoint.
//!
//! Wraps `reqwest` with a per-attempt timeout, optional retry on transient
//! failures, and conversion of the route length from meters to miles. The
//! attempt timeout is [`RoutingConfig::attempt_timeout`], so every retry fits
//! inside the caller's per-call timeout.

use std::future::Future;
use std::time::Duration;

use nearby_core::{Point, RoutingConfig};
use reqwest::{Client, Url};

use crate::error::RoutingError;
use crate::retry::retry_with_backoff;
use crate::types::RouteResponse;

pub const METERS_TO_MILES: f64 = 0.000_621_371;

const PROFILE: &str = "driving";

/// Anything that can answer "how far by road from `origin` to `destination`".
///
/// The returned future must be `Send` so resolution batches can run on a
/// spawned task.
pub trait RoutingService: Send + Sync {
    fn road_distance_miles(
        &self,
        origin: Point,
        destination: Point,
    ) -> impl Future<Output = Result<f64, RoutingError>> + Send;
}

/// Client for an OSRM-style routing service.
///
/// Point it at a mock server in tests by setting [`RoutingConfig::base_url`].
pub struct OsrmClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl OsrmClient {
    /// # Errors
    ///
    /// Returns [`RoutingError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`RoutingError::InvalidBaseUrl`] if
    /// `config.base_url` does not parse.
    pub fn new(config: &RoutingConfig) -> Result<Self, RoutingError> {
        let attempt_timeout = config.attempt_timeout();
        let client = Client::builder()
            .timeout(attempt_timeout)
            .connect_timeout(attempt_timeout.min(Duration::from_secs(10)))
            .user_agent(config.user_agent.as_str())
            .build()?;

        // Exactly one trailing slash, so `join` appends below the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| RoutingError::InvalidBaseUrl(format!("'{}': {e}", config.base_url)))?;

        Ok(Self {
            client,
            base_url,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// `route/v1/driving/{lon},{lat};{lon},{lat}?overview=false` below the base URL.
    /// OSRM takes coordinates longitude first.
    fn route_url(&self, origin: Point, destination: Point) -> Result<Url, RoutingError> {
        let path = format!(
            "route/v1/{PROFILE}/{},{};{},{}",
            origin.lon(),
            origin.lat(),
            destination.lon(),
            destination.lat()
        );
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| RoutingError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut().append_pair("overview", "false");
        Ok(url)
    }

    /// Sends the GET and parses the JSON envelope. 5xx is surfaced as
    /// [`RoutingError::Http`] so it can be retried; 4xx bodies still carry an
    /// OSRM `code` and are parsed.
    async fn request_route(&self, url: &Url) -> Result<RouteResponse, RoutingError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = if response.status().is_server_error() {
            response.error_for_status()?
        } else {
            response
        };
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RoutingError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }
}

impl RoutingService for OsrmClient {
    async fn road_distance_miles(
        &self,
        origin: Point,
        destination: Point,
    ) -> Result<f64, RoutingError> {
        let url = self.route_url(origin, destination)?;
        tracing::debug!(%url, "requesting road route");

        let response = retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.request_route(&url)
        })
        .await?;

        if response.code != "Ok" {
            if let Some(message) = &response.message {
                tracing::debug!(code = %response.code, %message, "routing service rejected request");
            }
            return Err(RoutingError::NoRoute {
                code: response.code,
            });
        }

        let route = response.routes.first().ok_or(RoutingError::EmptyRoutes)?;
        Ok(route.distance * METERS_TO_MILES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OsrmClient {
        OsrmClient::new(&RoutingConfig {
            base_url: base_url.to_owned(),
            ..RoutingConfig::default()
        })
        .expect("client construction should not fail")
    }

    fn p(lat: f64, lon: f64) -> Point {
        Point::new(lat, lon).unwrap()
    }

    #[test]
    fn route_url_puts_longitude_first() {
        let url = client("http://router.local")
            .route_url(p(36.0, -86.0), p(36.5, -86.25))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://router.local/route/v1/driving/-86,36;-86.25,36.5?overview=false"
        );
    }

    #[test]
    fn route_url_keeps_base_path_prefix() {
        let url = client("http://router.local/osrm/")
            .route_url(p(1.0, 2.0), p(3.0, 4.0))
            .unwrap();
        assert!(
            url.as_str()
                .starts_with("http://router.local/osrm/route/v1/driving/2,1;4,3"),
            "got {url}"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = OsrmClient::new(&RoutingConfig {
            base_url: "not a url".to_owned(),
            ..RoutingConfig::default()
        });
        assert!(matches!(result, Err(RoutingError::InvalidBaseUrl(_))));
    }
}
