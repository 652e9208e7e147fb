//! Errors surfaced by the scheduling proxy client.

use thiserror::Error;

/// Errors returned while generating a schedule through the proxy.
///
/// These are the only network failures surfaced to the user directly, since
/// schedule generation is a user-initiated action; background sync failures
/// log and degrade instead.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Transport-level failure reaching the proxy.
    #[error("scheduling proxy unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// The proxy rejected the request; `message` is shown verbatim.
    #[error("{message}")]
    Proxy {
        /// HTTP status returned by the proxy.
        status: u16,
        /// Proxy-supplied error message.
        message: String,
        /// Optional diagnostic detail.
        details: Option<String>,
    },

    /// The success body did not decode as a schedule response.
    #[error("scheduling proxy returned an undecodable response: {0}")]
    Decode(#[source] reqwest::Error),
}
