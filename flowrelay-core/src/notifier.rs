//! Throttled notifier: the adapter between pipeline writes and a chat transport
//!
//! `accept` decides synchronously whether an event is throttled, then spawns
//! the delivery and returns. The throttle only advances once a delivery is
//! confirmed, so a failed attempt never delays the next event. Several
//! deliveries may be in flight at once and their outcomes can arrive out of
//! input order.

use crate::error::{ConfigurationError, DeliveryError};
use crate::formatter::{default_formatter, Formatter};
use crate::models::{Event, Identity, NotifierConfig, NotifierOptions};
use crate::outcome::OutcomeSink;
use crate::providers::{create_transport, Payload, Transport};
use crate::throttle::ThrottleState;
use crate::time::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Rate-limited, at-most-once delivery adapter. Cheap to clone; clones
/// share throttle state.
#[derive(Clone)]
pub struct ThrottledNotifier {
    config: Arc<NotifierConfig>,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn OutcomeSink>,
    formatter: Formatter,
    clock: Arc<dyn Clock>,
    throttle: Arc<Mutex<ThrottleState>>,
}

impl ThrottledNotifier {
    /// Create a notifier over an explicit transport.
    pub fn new(
        config: NotifierConfig,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn OutcomeSink>,
    ) -> Result<Self, ConfigurationError> {
        check_config(&config)?;
        let throttle = ThrottleState::new(config.min_interval);
        Ok(Self {
            config: Arc::new(config),
            transport,
            sink,
            formatter: default_formatter(),
            clock: Arc::new(SystemClock),
            throttle: Arc::new(Mutex::new(throttle)),
        })
    }

    /// Resolve `options` and build the Flowdock transport they select.
    pub fn from_options(
        options: &NotifierOptions,
        sink: Arc<dyn OutcomeSink>,
    ) -> Result<Self, ConfigurationError> {
        let config = options.resolve()?;
        let transport = create_transport(&config);
        Self::new(config, transport, sink)
    }

    /// Replace the default `key: value` formatter
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    /// Time of the last confirmed delivery
    pub fn last_sent_at(&self) -> Option<DateTime<Utc>> {
        self.lock_throttle().last_sent_at()
    }

    /// Accept one event from the pipeline.
    ///
    /// Returns `None` when the event is throttled: nothing is sent and no
    /// outcome is emitted. Otherwise the delivery runs on the tokio runtime
    /// and the returned handle completes after its outcome has been emitted.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime when the event is not
    /// throttled, since the delivery is spawned onto the current runtime.
    pub fn accept(&self, event: Event) -> Option<JoinHandle<()>> {
        let now = self.clock.now();
        if self.lock_throttle().should_suppress(now) {
            tracing::debug!(provider = self.transport.name(), "event throttled");
            return None;
        }

        let notifier = self.clone();
        Some(tokio::spawn(async move {
            notifier.dispatch(event, now).await;
        }))
    }

    async fn dispatch(&self, mut event: Event, accepted_at: DateTime<Utc>) {
        let delivery_id = Uuid::new_v4();
        let payload = Payload {
            content: (self.formatter)(&event),
            identity: self.config.identity.nick().map(str::to_string),
            tags: event.tags(),
        };

        tracing::debug!(
            provider = self.transport.name(),
            delivery_id = %delivery_id,
            destinations = self.config.destinations.len(),
            "dispatching event"
        );

        let attempts = self.config.destinations.iter().enumerate().map(|(i, dest)| {
            let payload = &payload;
            async move { (i, self.transport.deliver(dest, payload).await) }
        });
        let results = join_all(attempts).await;

        let total = results.len();
        let mut failures = Vec::new();
        for (index, result) in results {
            if let Err(e) = result {
                failures.push((self.destination_label(index), e));
            }
        }

        if failures.len() < total {
            for (destination, e) in &failures {
                tracing::warn!(
                    provider = self.transport.name(),
                    delivery_id = %delivery_id,
                    destination = %destination,
                    error = %e,
                    "destination delivery failed"
                );
            }
            self.lock_throttle().commit(accepted_at);
            event.stamp_time(accepted_at);
            tracing::info!(
                provider = self.transport.name(),
                delivery_id = %delivery_id,
                "event delivered"
            );
            self.sink.on_data(event);
        } else {
            let error = if failures.len() == 1 {
                failures.remove(0).1
            } else {
                DeliveryError::AllDestinationsFailed { failures }
            };
            tracing::error!(
                provider = self.transport.name(),
                delivery_id = %delivery_id,
                error = %error,
                "provider delivery failed"
            );
            self.sink.on_error(error);
        }
    }

    /// Name safe to log for a destination. Chat destinations are tokens.
    fn destination_label(&self, index: usize) -> String {
        match self.config.identity {
            Identity::Chat { .. } => "chat".to_string(),
            Identity::Flow { .. } => self.config.destinations[index].clone(),
        }
    }

    fn lock_throttle(&self) -> MutexGuard<'_, ThrottleState> {
        self.throttle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn check_config(config: &NotifierConfig) -> Result<(), ConfigurationError> {
    match &config.identity {
        Identity::Chat { token, nick } => {
            if token.trim().is_empty() || nick.trim().is_empty() {
                return Err(ConfigurationError::MissingToken);
            }
        }
        Identity::Flow { username, .. } => {
            if username.trim().is_empty() {
                return Err(ConfigurationError::MissingUsername);
            }
        }
    }
    if config.destinations.is_empty() {
        return Err(ConfigurationError::NoDestinations);
    }
    if config.destinations.iter().any(|d| d.trim().is_empty()) {
        return Err(ConfigurationError::EmptyDestination);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_API_BASE;
    use crate::outcome::LogSink;
    use url::Url;

    fn flow_config(destinations: Vec<String>) -> NotifierConfig {
        NotifierConfig {
            identity: Identity::Flow {
                username: "me".to_string(),
                password: None,
                nick: None,
            },
            destinations,
            min_interval: None,
            api_base: Url::parse(DEFAULT_API_BASE).unwrap(),
        }
    }

    #[test]
    fn test_new_rejects_empty_destinations() {
        let config = flow_config(vec![]);
        let transport = create_transport(&config);
        let result = ThrottledNotifier::new(config, transport, Arc::new(LogSink));
        assert!(matches!(result, Err(ConfigurationError::NoDestinations)));
    }

    #[test]
    fn test_new_rejects_blank_chat_identity() {
        let config = NotifierConfig {
            identity: Identity::Chat {
                token: "T".to_string(),
                nick: "".to_string(),
            },
            ..flow_config(vec!["T".to_string()])
        };
        let transport = create_transport(&config);
        let result = ThrottledNotifier::new(config, transport, Arc::new(LogSink));
        assert!(matches!(result, Err(ConfigurationError::MissingToken)));
    }

    #[test]
    fn test_destination_label_hides_token() {
        let config = NotifierConfig {
            identity: Identity::Chat {
                token: "secret".to_string(),
                nick: "bot".to_string(),
            },
            ..flow_config(vec!["secret".to_string()])
        };
        let transport = create_transport(&config);
        let notifier = ThrottledNotifier::new(config, transport, Arc::new(LogSink)).unwrap();
        assert_eq!(notifier.destination_label(0), "chat");

        let config = flow_config(vec!["ops".to_string()]);
        let transport = create_transport(&config);
        let notifier = ThrottledNotifier::new(config, transport, Arc::new(LogSink)).unwrap();
        assert_eq!(notifier.destination_label(0), "ops");
    }

    #[test]
    #[should_panic]
    fn test_accept_outside_runtime_panics() {
        let config = flow_config(vec!["ops".to_string()]);
        let transport = create_transport(&config);
        let notifier = ThrottledNotifier::new(config, transport, Arc::new(LogSink)).unwrap();
        let _ = notifier.accept(Event::new().with("msg", "hi"));
    }
}
