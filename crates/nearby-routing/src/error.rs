use thiserror::Error;

/// Errors returned by the road-routing client.
///
/// None of these escape the refinement engine: each one collapses into an
/// "unavailable" road distance for the affected facility.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Network or TLS failure, or a non-2xx status, from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The routing service answered with a status code other than `"Ok"`.
    #[error("routing service reported no route: {code}")]
    NoRoute { code: String },

    /// `"Ok"` status but an empty route list.
    #[error("routing service returned no routes")]
    EmptyRoutes,

    #[error("invalid routing base URL: {0}")]
    InvalidBaseUrl(String),
}
