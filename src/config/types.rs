// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub invocation: InvocationConfig,
    pub static_files: StaticFilesConfig,
    pub render: RenderConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
}

/// Local development server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `production` disables the local listener; anything else is development
    pub mode: String,
    pub workers: Option<usize>,
    pub keep_alive: bool,
    /// Per-connection timeout in seconds
    pub connection_timeout: u64,
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.mode.trim().eq_ignore_ascii_case("production")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            mode: "development".to_string(),
            workers: None,
            keep_alive: true,
            connection_timeout: 30,
        }
    }
}

/// Per-invocation adapter configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InvocationConfig {
    /// Wall-clock budget for one invocation, kept below the platform limit
    pub timeout_ms: u64,
    /// Loopback host the ephemeral listener binds to
    pub bind_host: String,
}

impl Default for InvocationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 29_000,
            bind_host: "127.0.0.1".to_string(),
        }
    }
}

/// Static asset configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StaticFilesConfig {
    pub enabled: bool,
    pub dir: String,
    pub index_files: Vec<String>,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "static".to_string(),
            index_files: vec!["index.html".to_string()],
        }
    }
}

/// Fallback page configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RenderConfig {
    /// Client bootstrap script referenced by the fallback page
    pub client_entry: String,
    pub title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            client_entry: "/assets/entry.client.js".to_string(),
            title: "Loading…".to_string(),
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10_485_760, // 10MB
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: "combined".to_string(),
        }
    }
}
