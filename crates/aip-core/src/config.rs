use crate::app_config::{AppConfig, Environment};
use crate::passwords::{DEFAULT_COST, MAX_COST, MIN_COST};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(invalid(var, format!("expected a boolean, got '{raw}'"))),
        }
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("AIP_ENV", "development"));
    let bind_addr = parse_addr("AIP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("AIP_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("AIP_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AIP_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AIP_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let media_url = lookup("CLOUDINARY_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let media_api_base = or_default("AIP_MEDIA_API_BASE", "https://api.cloudinary.com");
    let media_timeout_secs = parse_u64("AIP_MEDIA_TIMEOUT_SECS", "30")?;

    let session_ttl_hours = parse_u32("AIP_SESSION_TTL_HOURS", "8")?;
    if session_ttl_hours == 0 {
        return Err(invalid(
            "AIP_SESSION_TTL_HOURS",
            "must be at least 1".to_string(),
        ));
    }
    let allow_sign_up = parse_bool("AIP_ALLOW_SIGN_UP", "false")?;
    let password_cost = parse_u32("AIP_PASSWORD_COST", &DEFAULT_COST.to_string())?;
    if !(MIN_COST..=MAX_COST).contains(&password_cost) {
        return Err(invalid(
            "AIP_PASSWORD_COST",
            format!("must be between {MIN_COST} and {MAX_COST}"),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        password_cost,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        media_url,
        media_api_base,
        media_timeout_secs,
        session_ttl_hours,
        allow_sign_up,
    })
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
