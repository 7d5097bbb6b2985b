// Configuration module entry point
// Loads typed configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{
    Config, HttpConfig, InvocationConfig, LoggingConfig, RenderConfig, ServerConfig,
    StaticFilesConfig,
};

/// Environment variable prefix for nested keys, e.g. `SSR__LOGGING__LEVEL`
const ENV_PREFIX: &str = "SSR";

impl Config {
    /// Load configuration from the process environment.
    /// Default config file is "config.toml" when no path specified
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args().nth(1);
        Self::load_from(path.as_deref().unwrap_or("config"))
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Load configuration, resolving the `PORT` and `RUN_MODE`/`NODE_ENV`
    /// overrides through `env`.
    pub fn load_with(
        config_path: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        let mode = env("RUN_MODE").or_else(|| env("NODE_ENV"));

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", env("PORT"))?
            .set_override_option("server.mode", mode)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Ephemeral loopback address used for a single invocation
    pub fn get_invocation_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:0", self.invocation.bind_host)
            .parse()
            .map_err(|e| format!("Invalid invocation bind host: {e}"))
    }

    pub const fn invocation_timeout(&self) -> Duration {
        Duration::from_millis(self.invocation.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_with("does-not-exist", no_env).unwrap();
        assert_eq!(cfg.invocation.timeout_ms, 29_000);
        assert_eq!(cfg.invocation_timeout(), Duration::from_secs(29));
        assert_eq!(cfg.server.port, 3000);
        assert!(!cfg.server.is_production());
        assert_eq!(cfg.static_files.index_files, vec!["index.html".to_string()]);
        assert_eq!(cfg.render.client_entry, "/assets/entry.client.js");
    }

    #[test]
    fn test_port_and_mode_overrides() {
        let cfg = Config::load_with("does-not-exist", |key| match key {
            "PORT" => Some("8123".to_string()),
            "NODE_ENV" => Some("production".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.server.port, 8123);
        assert!(cfg.server.is_production());
    }

    #[test]
    fn test_run_mode_takes_precedence() {
        let cfg = Config::load_with("does-not-exist", |key| match key {
            "RUN_MODE" => Some("development".to_string()),
            "NODE_ENV" => Some("production".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(!cfg.server.is_production());
    }

    #[test]
    fn test_socket_addrs() {
        let cfg = Config::default();
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 3000);
        assert_eq!(cfg.get_invocation_addr().unwrap().port(), 0);

        let mut bad = Config::default();
        bad.invocation.bind_host = "not a host".to_string();
        assert!(bad.get_invocation_addr().is_err());
    }
}
