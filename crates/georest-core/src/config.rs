use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if env var values are invalid.
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
/// Returns `ConfigError` if env var values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
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

    let env = parse_environment(&or_default("GEOREST_ENV", "development"))?;
    let log_level = or_default("GEOREST_LOG_LEVEL", "info");

    let elastic_url = or_default("GEOREST_ELASTIC_URL", "http://localhost:9200");
    let photon_url = or_default("GEOREST_PHOTON_URL", "http://localhost:2322/api");
    let nominatim_url = or_default(
        "GEOREST_NOMINATIM_URL",
        "https://nominatim.openstreetmap.org",
    );
    let geocoder_url = or_default("GEOREST_GEOCODER_URL", "https://maps.googleapis.com");
    let geocoder_api_key = lookup("GEOREST_GEOCODER_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let language = or_default("GEOREST_LANGUAGE", "ru");

    let http_timeout_secs = parse_u64("GEOREST_HTTP_TIMEOUT_SECS", "10")?;
    let http_user_agent = or_default("GEOREST_HTTP_USER_AGENT", "georest/0.1 (geo-resolution)");
    let http_max_retries = parse_u32("GEOREST_HTTP_MAX_RETRIES", "2")?;
    let http_retry_backoff_ms = parse_u64("GEOREST_HTTP_RETRY_BACKOFF_MS", "250")?;

    let lookup_concurrency = parse_usize("GEOREST_LOOKUP_CONCURRENCY", "4")?;
    if lookup_concurrency == 0 {
        return Err(invalid(
            "GEOREST_LOOKUP_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    let engines_path = PathBuf::from(or_default("GEOREST_ENGINES_PATH", "./config/engines.yaml"));
    let optional = |var: &str| lookup(var).ok().filter(|v| !v.trim().is_empty());
    let couriers_index = optional("GEOREST_COURIERS_INDEX");
    let orders_index = optional("GEOREST_ORDERS_INDEX");

    Ok(AppConfig {
        env,
        log_level,
        elastic_url,
        photon_url,
        nominatim_url,
        geocoder_url,
        geocoder_api_key,
        language,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_retry_backoff_ms,
        lookup_concurrency,
        engines_path,
        couriers_index,
        orders_index,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GEOREST_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
