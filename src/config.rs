//! Process configuration.
//!
//! All settings come from the environment; every field has a default so the
//! server starts with nothing set.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `HOST` | `127.0.0.1` |
//! | `PORT` | `3000` |
//! | `OPENAI_API_KEY` | unset |
//! | `OPENAI_BASE_URL` | `https://api.openai.com/v1` |
//! | `OPENAI_MODEL` | `gpt-3.5-turbo` |
//! | `TOKENFLOW_SERVER_URL` | `http://<HOST>:<PORT>` |
//! | `TOKENFLOW_DEMO` | unset (set to `1` for the offline demo producer) |
//! | `TOKENFLOW_DEMO_DELAY_MS` | `80` |

use std::net::SocketAddr;
use std::time::Duration;

use crate::adapters::demo::DEFAULT_DEMO_DELAY;
use crate::adapters::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use crate::error::ServerError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration shared by the server and client commands.
///
/// # Example
///
/// ```ignore
/// use tokenflow::config::Config;
///
/// let config = Config::default()
///     .with_port(8080)
///     .with_demo(true);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Interface the server listens on
    pub host: String,
    /// Port the server listens on
    pub port: u16,
    /// Credential for the generation backend
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible backend
    pub api_base_url: String,
    /// Model requested from the backend
    pub model: String,
    /// Server URL used by the client commands (derived from host/port when unset)
    pub server_url: Option<String>,
    /// Use the offline demo producer
    pub demo: bool,
    /// Per-word delay of the demo producer
    pub demo_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            api_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            server_url: None,
            demo: false,
            demo_delay: DEFAULT_DEMO_DELAY,
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the listen host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the listen port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the backend credential.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the backend base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the backend model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the server URL used by client commands.
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Enable or disable the demo producer.
    pub fn with_demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    /// Create config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Values that fail to parse fall back to
    /// the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            match port.trim().parse() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
        config.api_key = get("OPENAI_API_KEY");
        if let Some(url) = get("OPENAI_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            config.model = model;
        }
        config.server_url = get("TOKENFLOW_SERVER_URL");
        config.demo = get("TOKENFLOW_DEMO").is_some_and(|v| v != "0" && v != "false");
        if let Some(delay) = get("TOKENFLOW_DEMO_DELAY_MS") {
            match delay.trim().parse() {
                Ok(ms) => config.demo_delay = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %delay, "Ignoring invalid TOKENFLOW_DEMO_DELAY_MS"),
            }
        }

        config
    }

    /// Socket address the server binds.
    pub fn listen_addr(&self) -> Result<SocketAddr, ServerError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse().map_err(|_| ServerError::InvalidAddress(raw))
    }

    /// Base URL client commands connect to.
    pub fn client_base_url(&self) -> String {
        match &self.server_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.host, self.port),
        }
    }
}
