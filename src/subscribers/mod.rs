//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! OneShotService ── publish(Event) ──► Bus ──► Host listener ──► SubscriberSet
//!                                                                   │
//!                                                         ┌─────────┴─────────┐
//!                                                         ▼                   ▼
//!                                                     LogWriter           Custom ...
//! ```

mod log;
mod subscriber;
mod subscriber_set;

pub use log::LogWriter;
pub use subscriber::Subscribe;
pub use subscriber_set::SubscriberSet;

pub(crate) use subscriber_set::panic_message;
