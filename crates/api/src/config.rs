use std::str::FromStr;

/// Runtime settings for the console service, read from the environment.
///
/// Every setting has a default that works against a vtctld on localhost.
///
/// | Env Var                 | Default                  | Meaning                                      |
/// |-------------------------|--------------------------|----------------------------------------------|
/// | `HOST`                  | `0.0.0.0`                | bind address                                 |
/// | `PORT`                  | `3000`                   | bind port                                    |
/// | `CORS_ORIGINS`          | `http://localhost:5173`  | comma-separated console origins              |
/// | `REQUEST_TIMEOUT_SECS`  | `30`                     | per-request timeout                          |
/// | `SHUTDOWN_TIMEOUT_SECS` | `30`                     | grace period for pending dispatches          |
/// | `DIALOG_IDLE_SECS`      | `1800`                   | untouched dialogs are evicted after this     |
/// | `VTCTLD_URL`            | `http://localhost:15000` | vtctld HTTP API                              |
/// | `VTCTLD_TIMEOUT_SECS`   | `60`                     | timeout of one vtctld call                   |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub shutdown_timeout_secs: u64,
    pub dialog_idle_secs: u64,
    pub vtctld_url: String,
    pub vtctld_timeout_secs: u64,
}

impl ServerConfig {
    /// Read the settings. Panics on a malformed value so the service fails
    /// at startup rather than on first use.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            dialog_idle_secs: env_or("DIALOG_IDLE_SECS", 1800),
            vtctld_url: env_or("VTCTLD_URL", "http://localhost:15000".to_string()),
            vtctld_timeout_secs: env_or("VTCTLD_TIMEOUT_SECS", 60),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}
