//! Outcome signaling back to the host pipeline

use crate::error::DeliveryError;
use crate::models::Event;
use tokio::sync::mpsc;

/// Result of one accepted event. Consumed as soon as it is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Delivered(Event),
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }
}

/// Receiver of outcome events, injected by the host.
pub trait OutcomeSink: Send + Sync {
    /// Called once for a delivered event, stamped with its send time.
    fn on_data(&self, event: Event);

    /// Called once for a failed delivery.
    fn on_error(&self, error: DeliveryError);
}

/// Forwards outcomes over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<DeliveryOutcome>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DeliveryOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn emit(&self, outcome: DeliveryOutcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!("outcome receiver dropped, discarding outcome");
        }
    }
}

impl OutcomeSink for ChannelSink {
    fn on_data(&self, event: Event) {
        self.emit(DeliveryOutcome::Delivered(event));
    }

    fn on_error(&self, error: DeliveryError) {
        self.emit(DeliveryOutcome::Failed(error));
    }
}

/// Reports outcomes through `tracing` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl OutcomeSink for LogSink {
    fn on_data(&self, event: Event) {
        tracing::info!(fields = event.len(), "event delivered");
    }

    fn on_error(&self, error: DeliveryError) {
        tracing::error!(error = %error, "event delivery failed");
    }
}
