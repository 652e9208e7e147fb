//! Adapter implementations of the task synchronisation ports.

pub mod fs;
pub mod http;
pub mod memory;
