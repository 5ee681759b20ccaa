use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_OVERPASS_ENDPOINTS: &str =
    "https://overpass-api.de/api/interpreter,https://overpass.kumi.systems/api/interpreter";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can use a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("DERMLOC_ENV", "development"));

    let bind_addr = or_default("DERMLOC_BIND_ADDR", "127.0.0.1:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("DERMLOC_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("DERMLOC_LOG_LEVEL", "info");

    let overpass_endpoints =
        parse_endpoint_list(&or_default("DERMLOC_OVERPASS_ENDPOINTS", DEFAULT_OVERPASS_ENDPOINTS));
    if overpass_endpoints.is_empty() {
        return Err(invalid(
            "DERMLOC_OVERPASS_ENDPOINTS",
            "at least one endpoint is required".to_string(),
        ));
    }

    let nominatim_url = or_default(
        "DERMLOC_NOMINATIM_URL",
        "https://nominatim.openstreetmap.org/search",
    );
    let charts_api_base = or_default("DERMLOC_CHARTS_API_BASE", "http://127.0.0.1:5000");
    let request_timeout_secs = parse_u64("DERMLOC_REQUEST_TIMEOUT_SECS", "40")?;
    let user_agent = or_default(
        "DERMLOC_USER_AGENT",
        "dermloc/0.1 (dermatology-care-finder)",
    );

    let geolocation_timeout_secs = parse_u64("DERMLOC_GEOLOCATION_TIMEOUT_SECS", "15")?;
    if !(1..=60).contains(&geolocation_timeout_secs) {
        return Err(invalid(
            "DERMLOC_GEOLOCATION_TIMEOUT_SECS",
            format!("{geolocation_timeout_secs} is outside 1..=60"),
        ));
    }

    let max_results = or_default("DERMLOC_MAX_RESULTS", "30")
        .parse::<usize>()
        .map_err(|e| invalid("DERMLOC_MAX_RESULTS", e.to_string()))?;
    if max_results == 0 {
        return Err(invalid("DERMLOC_MAX_RESULTS", "must be positive".to_string()));
    }

    let prefs_path = PathBuf::from(or_default("DERMLOC_PREFS_PATH", "./.dermloc/prefs.json"));

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        overpass_endpoints,
        nominatim_url,
        charts_api_base,
        request_timeout_secs,
        user_agent,
        geolocation_timeout_secs,
        max_results,
        prefs_path,
    })
}

fn parse_endpoint_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
