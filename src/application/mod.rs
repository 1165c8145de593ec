//! Application layer - use case handlers over the ports.

pub mod handlers;
