//! Wire types for the OSRM `route` endpoint.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
pub struct Route {
    /// Route length in meters.
    pub distance: f64,
}
