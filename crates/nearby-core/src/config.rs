use crate::app_config::{AppConfig, Environment, RoutingConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("NEARBY_ENV", "development"))?;
    let log_level = or_default("NEARBY_LOG_LEVEL", "info");

    let facilities_path = PathBuf::from(or_default(
        "NEARBY_FACILITIES_PATH",
        "./data/facilities.csv",
    ));
    let references_path = PathBuf::from(or_default(
        "NEARBY_REFERENCES_PATH",
        "./data/references.csv",
    ));
    let facility_id_column = or_default("NEARBY_FACILITY_ID_COLUMN", "Name");
    let reference_id_column = or_default("NEARBY_REFERENCE_ID_COLUMN", "Name");

    let radius_var = "NEARBY_DEFAULT_RADIUS_MILES";
    let default_radius_miles = or_default(radius_var, "5.0")
        .parse::<f64>()
        .map_err(|e| invalid(radius_var, e.to_string()))?;
    if !default_radius_miles.is_finite() || default_radius_miles <= 0.0 {
        return Err(invalid(
            radius_var,
            format!("radius must be positive, got {default_radius_miles}"),
        ));
    }

    let defaults = RoutingConfig::default();
    let routing = RoutingConfig {
        base_url: or_default("NEARBY_ROUTING_BASE_URL", &defaults.base_url),
        timeout_secs: parse_u64("NEARBY_ROUTING_TIMEOUT_SECS", "5")?,
        max_concurrent: parse_usize("NEARBY_ROUTING_MAX_CONCURRENT", "8")?.max(1),
        max_retries: parse_u32("NEARBY_ROUTING_MAX_RETRIES", "0")?,
        retry_backoff_base_ms: parse_u64("NEARBY_ROUTING_RETRY_BACKOFF_BASE_MS", "500")?,
        user_agent: or_default("NEARBY_ROUTING_USER_AGENT", &defaults.user_agent),
    };

    Ok(AppConfig {
        env,
        log_level,
        facilities_path,
        references_path,
        facility_id_column,
        reference_id_column,
        default_radius_miles,
        routing,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NEARBY_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
