//! Configuration loading from environment variables.
//!
//! All values come from `ARTIFACT_IO_*` environment variables with sensible
//! defaults. Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `ARTIFACT_IO_HTTP_TIMEOUT` | 0 | Per-request HTTP timeout (secs, 0 = none) |
//! | `ARTIFACT_IO_USER_AGENT` | `artifact-io/<version>` | HTTP user agent |
//! | `ARTIFACT_IO_SERVER_RUNTIME` | true | Whether the HTTP backend may run |
//! | `ARTIFACT_IO_LOG_LEVEL` | info | Tracing filter directive |
//! | `ARTIFACT_IO_LOG_FORMAT` | json | `json` or `pretty` |

use std::time::Duration;

use crate::environment::ProcessEnvironment;
use crate::telemetry::{LogConfig, LogFormat};

/// Default user agent sent with HTTP requests.
pub const DEFAULT_USER_AGENT: &str = concat!("artifact-io/", env!("CARGO_PKG_VERSION"));

/// HTTP client settings shared by every HTTP handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// All configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub http: HttpClientConfig,
    pub environment: ProcessEnvironment,
    pub log: LogConfig,
}

/// Flat summary of effective values.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub server_runtime: bool,
    pub log_level: String,
    pub log_format: &'static str,
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a boolean env var (`true/false/1/0/yes/no`).
fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

fn load_http_config() -> HttpClientConfig {
    let timeout_secs = parse_u64("ARTIFACT_IO_HTTP_TIMEOUT", 0);
    let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
    let user_agent = std::env::var("ARTIFACT_IO_USER_AGENT")
        .ok()
        .filter(|ua| !ua.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    HttpClientConfig { timeout, user_agent }
}

fn load_log_config() -> LogConfig {
    let level = std::env::var("ARTIFACT_IO_LOG_LEVEL")
        .ok()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| "info".to_string());
    let format = std::env::var("ARTIFACT_IO_LOG_FORMAT")
        .ok()
        .and_then(|f| LogFormat::parse(&f))
        .unwrap_or_default();
    LogConfig { format, level, output_path: None }
}

/// Load all configuration from environment variables.
pub fn load() -> EnvConfig {
    EnvConfig {
        http: load_http_config(),
        environment: ProcessEnvironment::new(parse_bool("ARTIFACT_IO_SERVER_RUNTIME", true)),
        log: load_log_config(),
    }
}

impl EnvConfig {
    pub fn effective_config(&self) -> EffectiveConfig {
        use crate::environment::Environment;

        EffectiveConfig {
            http_timeout_secs: self.http.timeout.map_or(0, |t| t.as_secs()),
            user_agent: self.http.user_agent.clone(),
            server_runtime: self.environment.is_server_runtime(),
            log_level: self.log.level.clone(),
            log_format: self.log.format.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "ARTIFACT_IO_HTTP_TIMEOUT",
        "ARTIFACT_IO_USER_AGENT",
        "ARTIFACT_IO_SERVER_RUNTIME",
        "ARTIFACT_IO_LOG_LEVEL",
        "ARTIFACT_IO_LOG_FORMAT",
    ];

    fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg.http.timeout, None);
        assert_eq!(cfg.http.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.environment, ProcessEnvironment::new(true));
        assert_eq!(cfg.log.level, "info");
        assert_eq!(cfg.log.format, LogFormat::Json);
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("ARTIFACT_IO_HTTP_TIMEOUT", "30");
        std::env::set_var("ARTIFACT_IO_USER_AGENT", "trainer/2.0");
        std::env::set_var("ARTIFACT_IO_SERVER_RUNTIME", "false");
        std::env::set_var("ARTIFACT_IO_LOG_FORMAT", "pretty");
        let cfg = load();
        assert_eq!(cfg.http.timeout, Some(Duration::from_secs(30)));
        assert_eq!(cfg.http.user_agent, "trainer/2.0");
        assert_eq!(cfg.environment, ProcessEnvironment::new(false));
        assert_eq!(cfg.log.format, LogFormat::Pretty);
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("ARTIFACT_IO_HTTP_TIMEOUT", "soon");
        std::env::set_var("ARTIFACT_IO_SERVER_RUNTIME", "maybe");
        std::env::set_var("ARTIFACT_IO_LOG_FORMAT", "xml");
        std::env::set_var("ARTIFACT_IO_USER_AGENT", "   ");
        let cfg = load();
        assert_eq!(cfg.http.timeout, None);
        assert_eq!(cfg.http.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.environment, ProcessEnvironment::new(true));
        assert_eq!(cfg.log.format, LogFormat::Json);
        clear_env_vars();
    }

    #[test]
    fn test_effective_config_reflects_values() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("ARTIFACT_IO_HTTP_TIMEOUT", "5");
        let eff = load().effective_config();
        assert_eq!(eff.http_timeout_secs, 5);
        assert!(eff.server_runtime);
        assert_eq!(eff.log_format, "json");
        clear_env_vars();
    }
}
