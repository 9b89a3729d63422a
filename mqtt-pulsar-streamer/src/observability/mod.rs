//! Structured logging vocabulary.
//!
//! The crate uses `tracing` for logs/events and never installs a global
//! subscriber. Binaries and tests initialize `tracing_subscriber` once at the
//! process boundary.

pub mod events;
pub mod fields;
