//! HTTP adapters for the cloud key-value mirror.

mod cloud;

pub use cloud::{DEFAULT_POLL_INTERVAL, HttpCloudStore};
