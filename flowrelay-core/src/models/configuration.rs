//! Configuration data structures

use crate::error::ConfigurationError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Default Flowdock REST endpoint
pub const DEFAULT_API_BASE: &str = "https://api.flowdock.com";

/// Logging level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum LogLevel {
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "trace")]
    Trace,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Raw notifier options as written in `config.toml`.
///
/// Which identity field is present selects the transport: `token` posts to
/// the chat endpoint of a single flow, `username` posts to each of `flows`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifierOptions {
    /// Flow API token (chat transport)
    #[serde(default)]
    pub token: Option<String>,
    /// Account name (flow transport)
    #[serde(default)]
    pub username: Option<String>,
    /// Account password (flow transport)
    #[serde(default)]
    pub password: Option<String>,
    /// Display name attached to every message
    #[serde(default)]
    pub nick: Option<String>,
    /// Flow identifiers to post to (flow transport)
    #[serde(default, alias = "destinations")]
    pub flows: Vec<String>,
    /// Minimum milliseconds between sends. Unset or 0 disables throttling.
    #[serde(default)]
    pub interval: Option<u64>,
    /// Override of the service base URL
    #[serde(default)]
    pub api_base: Option<String>,
    /// Logging verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Credentials and display identity, per transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Chat {
        token: String,
        nick: String,
    },
    Flow {
        username: String,
        password: Option<String>,
        nick: Option<String>,
    },
}

impl Identity {
    /// Name shown as the message author, if any
    pub fn nick(&self) -> Option<&str> {
        match self {
            Identity::Chat { nick, .. } => Some(nick),
            Identity::Flow { nick, .. } => nick.as_deref(),
        }
    }
}

/// Validated, immutable notifier configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    pub identity: Identity,
    /// Non-empty, ordered destinations. For the chat transport this is the token.
    pub destinations: Vec<String>,
    pub min_interval: Option<Duration>,
    pub api_base: Url,
}

impl NotifierOptions {
    /// Load options from file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Load(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| ConfigurationError::Load(format!("{}: {}", path.display(), e)))
    }

    /// Get the XDG config directory path
    pub fn default_config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_dir = dirs::config_dir().ok_or("Could not determine config directory")?;
        Ok(config_dir.join("flowrelay").join("config.toml"))
    }

    /// Validate option values, reporting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match (&self.token, &self.username) {
            (Some(_), Some(_)) => {
                errors.push("token and username are mutually exclusive".to_string())
            }
            (None, None) => errors.push("either token or username is required".to_string()),
            (Some(token), None) => {
                if token.trim().is_empty() {
                    errors.push("token must not be empty".to_string());
                }
                if self.nick.as_deref().map_or(true, |n| n.trim().is_empty()) {
                    errors.push("nick is required with token".to_string());
                }
                if !self.flows.is_empty() {
                    errors.push("flows are not used with token delivery".to_string());
                }
            }
            (None, Some(username)) => {
                if username.trim().is_empty() {
                    errors.push("username must not be empty".to_string());
                }
                if self.flows.is_empty() {
                    errors.push("flows must list at least one destination".to_string());
                }
                if self.flows.iter().any(|f| f.trim().is_empty()) {
                    errors.push("flows must not contain empty entries".to_string());
                }
            }
        }

        if let Some(base) = &self.api_base {
            if let Err(e) = Url::parse(base) {
                errors.push(format!("api_base is not a valid url: {}", e));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Resolve into a validated [`NotifierConfig`], failing on the first
    /// missing or inconsistent field.
    pub fn resolve(&self) -> Result<NotifierConfig, ConfigurationError> {
        let identity = match (&self.token, &self.username) {
            (Some(_), Some(_)) => return Err(ConfigurationError::ConflictingIdentity),
            (Some(token), None) => {
                let nick = self.nick.as_deref().filter(|n| !n.trim().is_empty());
                match nick {
                    Some(nick) if !token.trim().is_empty() => Identity::Chat {
                        token: token.clone(),
                        nick: nick.to_string(),
                    },
                    _ => return Err(ConfigurationError::MissingToken),
                }
            }
            (None, Some(username)) if !username.trim().is_empty() => Identity::Flow {
                username: username.clone(),
                password: self.password.clone(),
                nick: self.nick.clone(),
            },
            (None, Some(_)) => return Err(ConfigurationError::MissingUsername),
            (None, None) => return Err(ConfigurationError::MissingToken),
        };

        let destinations = match &identity {
            Identity::Chat { token, .. } => vec![token.clone()],
            Identity::Flow { .. } => {
                if self.flows.is_empty() {
                    return Err(ConfigurationError::NoDestinations);
                }
                if self.flows.iter().any(|f| f.trim().is_empty()) {
                    return Err(ConfigurationError::EmptyDestination);
                }
                self.flows.clone()
            }
        };

        let base = self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        let api_base = Url::parse(base).map_err(|e| ConfigurationError::InvalidApiBase {
            url: base.to_string(),
            reason: e.to_string(),
        })?;

        Ok(NotifierConfig {
            identity,
            destinations,
            min_interval: self
                .interval
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            api_base,
        })
    }
}
