//! # Flowrelay Core Library
//!
//! Throttled notification adapter: accepts pipeline events, formats them and
//! relays them to Flowdock, reporting each outcome back to the host.
//!
//! ```rust,no_run
//! use flowrelay_core::models::{Event, NotifierOptions};
//! use flowrelay_core::notifier::ThrottledNotifier;
//! use flowrelay_core::outcome::ChannelSink;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = NotifierOptions {
//!     token: Some("flow-token".into()),
//!     nick: Some("bot".into()),
//!     interval: Some(1000),
//!     ..NotifierOptions::default()
//! };
//! let (sink, mut outcomes) = ChannelSink::new();
//! let notifier = ThrottledNotifier::from_options(&options, Arc::new(sink))?;
//!
//! if let Some(handle) = notifier.accept(Event::new().with("msg", "disk full")) {
//!     handle.await?;
//! }
//! let outcome = outcomes.recv().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod formatter;
pub mod models;
pub mod notifier;
pub mod outcome;
pub mod providers;
pub mod services;
pub mod throttle;
pub mod time;

pub use error::{ConfigurationError, DeliveryError};
pub use notifier::ThrottledNotifier;
