//! Control-plane layer.
//!
//! Owns the process lifecycle state and the ordered shutdown sequence that
//! drains producers and releases both transports.

pub(crate) mod lifecycle;
pub(crate) mod shutdown_coordinator;
