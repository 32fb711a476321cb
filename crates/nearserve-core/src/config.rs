use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinate;
use crate::ConfigError;

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
/// Parsing is decoupled from the process environment so tests can drive it
/// with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(invalid(var, format!("\"{raw}\" is not an http(s) URL")));
        }
        Ok(trimmed.to_string())
    };

    let env = parse_environment(&or_default("NEARSERVE_ENV", "development"))?;
    let log_level = or_default("NEARSERVE_LOG_LEVEL", "info");

    let api_base_url = parse_url("NEARSERVE_API_BASE_URL", "http://localhost:5000/api")?;
    let geocoder_url = parse_url(
        "NEARSERVE_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    )?;
    let user_agent = or_default("NEARSERVE_USER_AGENT", "nearserve/0.1 (service-discovery)");

    let default_lat = parse_f64("NEARSERVE_DEFAULT_LAT", "28.6139")?;
    let default_lng = parse_f64("NEARSERVE_DEFAULT_LNG", "77.2090")?;
    let default_center = Coordinate::new(default_lat, default_lng)
        .map_err(|e| invalid("NEARSERVE_DEFAULT_LAT/NEARSERVE_DEFAULT_LNG", e.to_string()))?;
    let default_country = or_default("NEARSERVE_DEFAULT_COUNTRY", "India");
    let country_codes = or_default("NEARSERVE_COUNTRY_CODES", "in");

    let geocode_timeout_secs = parse_u64("NEARSERVE_GEOCODE_TIMEOUT_SECS", "5")?;
    let request_timeout_secs = parse_u64("NEARSERVE_REQUEST_TIMEOUT_SECS", "15")?;
    let page_size = parse_u32("NEARSERVE_PAGE_SIZE", "50")?;
    if page_size == 0 {
        return Err(invalid("NEARSERVE_PAGE_SIZE", "must be at least 1".to_string()));
    }
    let max_retries = parse_u32("NEARSERVE_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("NEARSERVE_RETRY_BACKOFF_BASE_MS", "250")?;
    let auto_expand = parse_bool("NEARSERVE_AUTO_EXPAND", "false")?;

    Ok(AppConfig {
        env,
        log_level,
        api_base_url,
        geocoder_url,
        user_agent,
        default_center,
        default_country,
        country_codes,
        geocode_timeout_secs,
        request_timeout_secs,
        page_size,
        max_retries,
        retry_backoff_base_ms,
        auto_expand,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "NEARSERVE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
