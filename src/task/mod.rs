//! Task synchronisation and lifecycle management for dayflow.
//!
//! This module owns the task entity's identity, the local-wins merge of the
//! local and cloud snapshots, the time-boxed expiry of completed tasks, and
//! the fan-out of calendar and reminder side effects. The module follows
//! hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
