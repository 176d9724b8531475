//! Delivery providers: the Flowdock transports and the trait they implement
//!
//! **Chat transport** (`token` configured): one POST per event to the flow's
//! chat endpoint. Only HTTP 200 counts as delivered.
//!
//! **Flow transport** (`username` configured): one authenticated POST per
//! configured flow. Any 2xx counts as delivered for that flow.

mod chat;
mod flow;
mod transport;

pub use chat::FlowdockChatTransport;
pub use flow::FlowdockFlowTransport;
pub use transport::{Payload, Transport};

use crate::models::{Identity, NotifierConfig};
use std::sync::Arc;

/// Build the transport matching the configured identity
pub fn create_transport(config: &NotifierConfig) -> Arc<dyn Transport> {
    match &config.identity {
        Identity::Chat { .. } => Arc::new(FlowdockChatTransport::new(config.api_base.clone())),
        Identity::Flow {
            username, password, ..
        } => Arc::new(FlowdockFlowTransport::new(
            config.api_base.clone(),
            username.clone(),
            password.clone(),
        )),
    }
}
