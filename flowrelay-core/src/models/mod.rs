//! Data models for flowrelay

pub mod configuration;
pub mod event;

pub use configuration::*;
pub use event::*;
