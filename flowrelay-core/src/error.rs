//! Error types for notifier construction and message delivery

use thiserror::Error;

/// Errors raised while building a notifier. Fatal: no notifier is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("options.token and options.nick are required")]
    MissingToken,

    #[error("options.username is required for flow delivery")]
    MissingUsername,

    #[error("options.token and options.username are mutually exclusive")]
    ConflictingIdentity,

    #[error("at least one destination is required")]
    NoDestinations,

    #[error("destination must not be empty")]
    EmptyDestination,

    #[error("invalid api base url '{url}': {reason}")]
    InvalidApiBase { url: String, reason: String },

    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Errors raised while delivering a single accepted event.
///
/// Never returned from `accept`; they reach the host as error outcome events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The service answered with a status other than the one counted as success.
    #[error("Status code {status}")]
    Status { status: u16 },

    /// The request never produced a response.
    #[error("network error: {message}")]
    Network { message: String },

    /// Every destination of a fan-out failed.
    #[error("delivery failed for all destinations: {}", format_failures(.failures))]
    AllDestinationsFailed {
        failures: Vec<(String, DeliveryError)>,
    },
}

impl DeliveryError {
    pub(crate) fn network(err: impl std::fmt::Display) -> Self {
        DeliveryError::Network {
            message: err.to_string(),
        }
    }
}

fn format_failures(failures: &[(String, DeliveryError)]) -> String {
    failures
        .iter()
        .map(|(destination, err)| format!("{}: {}", destination, err))
        .collect::<Vec<_>>()
        .join(", ")
}
