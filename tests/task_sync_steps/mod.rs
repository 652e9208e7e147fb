//! Step definitions for task synchronisation behaviour tests.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
