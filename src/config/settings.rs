//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Broadcast hub configuration
    pub hub: HubSettings,

    /// WebSocket connection configuration
    pub websocket: WebSocketSettings,

    /// Access gate configuration
    pub auth: AuthSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// Broadcast hub configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubSettings {
    /// Capacity of each client's outbound queue. A client whose queue is
    /// full when a message is broadcast gets evicted.
    pub message_buffer_size: usize,
}

/// WebSocket configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketSettings {
    /// Read and write buffer size in bytes
    pub socket_buffer_size: usize,

    /// Maximum inbound message size in bytes (default: 64KB)
    pub max_message_size: usize,

    /// Idle keepalive ping interval in seconds, 0 disables pings
    pub ping_interval_secs: u64,
}

/// Access gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Name of the session cookie whose presence marks a request authenticated
    pub cookie_name: String,

    /// Where unauthenticated requests are redirected
    pub login_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            hub: HubSettings::default(),
            websocket: WebSocketSettings::default(),
            auth: AuthSettings::default(),
            environment: "development".into(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            message_buffer_size: 256,
        }
    }
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self {
            socket_buffer_size: 1024,
            max_message_size: 65536,
            ping_interval_secs: 30,
        }
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            cookie_name: "auth".into(),
            login_path: "/login".into(),
        }
    }
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. Built-in defaults
    /// 2. config/default.toml (base configuration)
    /// 3. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 4. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        let settings: Self = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .set_override("environment", environment.clone())?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__HUB__MESSAGE_BUFFER_SIZE=512 -> hub.message_buffer_size = 512
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the relay cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.message_buffer_size == 0 {
            return Err(ConfigError::Message(
                "hub.message_buffer_size must be at least 1".into(),
            ));
        }
        if self.websocket.socket_buffer_size == 0 {
            return Err(ConfigError::Message(
                "websocket.socket_buffer_size must be at least 1".into(),
            ));
        }
        if self.auth.cookie_name.trim().is_empty() {
            return Err(ConfigError::Message("auth.cookie_name must not be empty".into()));
        }
        if !self.auth.login_path.starts_with('/') {
            return Err(ConfigError::Message(format!(
                "auth.login_path must be an absolute path, got {:?}",
                self.auth.login_path
            )));
        }
        Ok(())
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl WebSocketSettings {
    /// Keepalive interval, `None` when pings are disabled.
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }
}
