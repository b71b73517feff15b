use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Server settings read from the environment at startup.
///
/// | Env Var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `HOST`                  | `0.0.0.0`               |
/// | `PORT`                  | `3000`                  |
/// | `CORS_ORIGINS`          | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
/// | `LOG_FORMAT`            | `pretty` (or `json`)    |
///
/// Token settings are documented on [`JwtConfig::from_env`]. The text
/// generation provider is configured separately by `homestead_ai::AiConfig`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins of the tenant-facing and owner-facing frontends.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Grace period for background tasks once the listener has closed.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
}

/// Read `key`, falling back to `default` when unset or blank.
///
/// # Panics
///
/// Panics when the value is set but does not parse.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has invalid value '{raw}': {e}")),
        _ => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ServerConfig {
    /// # Panics
    ///
    /// A misconfigured server should not start: unparseable values and a
    /// missing `JWT_SECRET` panic.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins: split_origins(&env_or(
                "CORS_ORIGINS",
                "http://localhost:5173".to_string(),
            )),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt: JwtConfig::from_env(),
        }
    }

    /// Whether logs should be emitted as JSON lines.
    pub fn json_logs() -> bool {
        env_or("LOG_FORMAT", String::new()).eq_ignore_ascii_case("json")
    }
}
