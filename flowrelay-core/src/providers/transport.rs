//! Transport: outbound delivery of one payload to one destination

use crate::error::DeliveryError;
use async_trait::async_trait;

/// Message handed to a transport, identical for every destination of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub content: String,
    /// Display name of the author (`external_user_name` on the wire)
    pub identity: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Delivery collaborator used by the notifier.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Provider name for logging (e.g. "flowdock-chat").
    fn name(&self) -> &str;

    /// Deliver `payload` to a single destination. Failures on one destination
    /// must not affect delivery to another.
    async fn deliver(&self, destination: &str, payload: &Payload) -> Result<(), DeliveryError>;
}
