//! Server configuration loaded from TOML.

use crate::session::{SessionManager, SessionSettings};
use axum::http::{HeaderValue, Method, header};
use crossword_core::{CrosswordGenerator, Dictionary, DictionaryError, GeneratorConfig};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, info, instrument, warn};

/// Configuration for the game server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind to.
    #[serde(default = "default_port")]
    port: u16,

    /// Seats per session.
    #[serde(default = "default_max_players")]
    max_players: usize,

    /// Largest word count a creator may request.
    #[serde(default = "default_max_word_count")]
    max_word_count: usize,

    /// Idle seconds before a session is evicted. Zero keeps sessions forever.
    #[serde(default)]
    session_ttl_secs: u64,

    /// JSON dictionary replacing the bundled word list.
    #[serde(default)]
    words_path: Option<PathBuf>,

    /// Fixed seed for ids and crosswords.
    #[serde(default)]
    rng_seed: Option<u64>,

    /// Crossword generator settings.
    #[serde(default)]
    generator: GeneratorConfig,

    /// Cross-origin policy for browser clients.
    #[serde(default)]
    cors: CorsConfig,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    3001
}

#[instrument]
fn default_max_players() -> usize {
    6
}

#[instrument]
fn default_max_word_count() -> usize {
    100
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_players: default_max_players(),
            max_word_count: default_max_word_count(),
            session_ttl_secs: 0,
            words_path: None,
            rng_seed: None,
            generator: GeneratorConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Overrides the bind host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Overrides the bind port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Overrides the dictionary path.
    pub fn with_words_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.words_path = Some(path.into());
        self
    }

    /// Accepts requests from any origin.
    pub fn with_any_origin(mut self) -> Self {
        self.cors.allow_any_origin = true;
        self
    }

    /// Overrides the RNG seed.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Idle timeout, if eviction is enabled.
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }

    /// Limits applied to each session.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings::new(self.max_players, self.max_word_count)
    }

    /// Loads the configured dictionary, or the bundled one.
    #[instrument(skip(self))]
    pub fn dictionary(&self) -> Result<Dictionary, ConfigError> {
        let dictionary = match &self.words_path {
            Some(path) => Dictionary::from_file(path)?,
            None => Dictionary::builtin()?,
        };
        Ok(dictionary)
    }

    /// Wires dictionary, generator and session manager in that order.
    #[instrument(skip(self))]
    pub fn session_manager(&self) -> Result<SessionManager, ConfigError> {
        let dictionary = Arc::new(self.dictionary()?);
        let generator = Arc::new(CrosswordGenerator::new(dictionary, self.generator.clone()));
        Ok(SessionManager::new(
            generator,
            self.session_settings(),
            self.rng_seed,
        ))
    }
}

/// Origins allowed to call the API from a browser.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Exact origins accepted when `allow_any_origin` is off.
    #[serde(default = "default_allowed_origins")]
    allowed_origins: Vec<String>,

    /// Reflects any request origin back. Meant for production deployments
    /// behind a known front end.
    #[serde(default)]
    allow_any_origin: bool,
}

#[instrument]
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allow_any_origin: false,
        }
    }
}

impl CorsConfig {
    /// Creates a policy for the given origins.
    pub fn new(allowed_origins: Vec<String>, allow_any_origin: bool) -> Self {
        Self {
            allowed_origins,
            allow_any_origin,
        }
    }

    /// Builds the CORS middleware. Origins that are not valid header values
    /// are skipped with a warning.
    #[instrument(skip(self), fields(any = self.allow_any_origin))]
    pub fn layer(&self) -> CorsLayer {
        let origin = if self.allow_any_origin {
            AllowOrigin::mirror_request()
        } else {
            let origins: Vec<HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        warn!(origin, error = %e, "Skipping invalid CORS origin");
                        None
                    }
                })
                .collect();
            debug!(count = origins.len(), "CORS origins configured");
            AllowOrigin::list(origins)
        };

        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<DictionaryError> for ConfigError {
    #[track_caller]
    fn from(err: DictionaryError) -> Self {
        Self::new(err.to_string())
    }
}
