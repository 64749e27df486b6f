//! Action drivers behind the `voxprint` binary.
//!
//! The binary parses one action (devices, enroll, test), wires the
//! recorder and engine backends together, and hands off to the blocking
//! driver for that action. The drivers live here so integration tests can
//! run them against scripted recorders and mock engines.

pub mod cli;
pub mod enroll;
pub mod test_loop;
