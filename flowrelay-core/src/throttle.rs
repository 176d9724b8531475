//! Minimum-interval throttle

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Tracks when the last delivery was committed.
#[derive(Debug, Clone, Default)]
pub struct ThrottleState {
    min_interval: Option<Duration>,
    last_sent_at: Option<DateTime<Utc>>,
}

impl ThrottleState {
    pub fn new(min_interval: Option<Duration>) -> Self {
        Self {
            min_interval,
            last_sent_at: None,
        }
    }

    pub fn last_sent_at(&self) -> Option<DateTime<Utc>> {
        self.last_sent_at
    }

    /// True when an event arriving at `now` must be dropped.
    ///
    /// The boundary is inclusive: exactly `min_interval` after the last send
    /// is still too soon.
    pub fn should_suppress(&self, now: DateTime<Utc>) -> bool {
        let (Some(interval), Some(last)) = (self.min_interval, self.last_sent_at) else {
            return false;
        };
        // negative elapsed (clock stepped back) counts as too soon
        match (now - last).to_std() {
            Ok(elapsed) => elapsed <= interval,
            Err(_) => true,
        }
    }

    /// Record a confirmed delivery. `last_sent_at` never moves backwards.
    pub fn commit(&mut self, sent_at: DateTime<Utc>) {
        match self.last_sent_at {
            Some(last) if last >= sent_at => {}
            _ => self.last_sent_at = Some(sent_at),
        }
    }
}
