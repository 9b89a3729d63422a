//! Routing policy layer.
//!
//! Owns the translation from inbound topic names to outbound topic names.
//! No I/O happens here.

pub(crate) mod topic_mapper;
