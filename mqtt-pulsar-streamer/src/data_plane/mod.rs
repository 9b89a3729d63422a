//! Data-plane layer.
//!
//! Owns the per-topic producer registry and the router that moves each
//! inbound message onto its outbound producer.

pub(crate) mod message_router;
pub(crate) mod producer_registry;
