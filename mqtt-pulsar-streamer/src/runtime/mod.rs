//! Runtime integration layer.
//!
//! Isolates the task-spawning boundary so the router itself stays a plain
//! async function that tests can drive directly.

pub(crate) mod delivery;
