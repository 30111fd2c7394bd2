use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Settings for the external road-routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    pub base_url: String,
    /// Upper bound on a single routing call, including retries of the HTTP request.
    pub timeout_secs: u64,
    /// Maximum number of routing calls in flight during one resolution batch.
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
}

impl RoutingConfig {
    #[must_use]
    pub fn per_call_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Budget for a single HTTP attempt: the per-call timeout split evenly
    /// across the first attempt and every retry, so a retry after a timed-out
    /// attempt still fits inside the per-call timeout.
    #[must_use]
    pub fn attempt_timeout(&self) -> Duration {
        self.per_call_timeout() / self.max_retries.saturating_add(1)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://router.project-osrm.org".to_string(),
            timeout_secs: 5,
            max_concurrent: 8,
            max_retries: 0,
            retry_backoff_base_ms: 500,
            user_agent: "nearby/0.1 (facility-ranking)".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub facilities_path: PathBuf,
    pub references_path: PathBuf,
    pub facility_id_column: String,
    pub reference_id_column: String,
    pub default_radius_miles: f64,
    pub routing: RoutingConfig,
}
