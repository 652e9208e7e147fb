//! Wire types of the scheduling proxy contract.

use serde::{Deserialize, Serialize};

/// Request body sent to the scheduling proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    /// Natural-language description of the user's day.
    pub user_input: String,
    /// Caller-local date in `YYYY-MM-DD` form.
    pub current_date: String,
    /// Caller-local time in `HH:mm` form.
    pub current_time: String,
}

/// Priority hint attached to a planned task.
///
/// Accepted on the wire for contract fidelity; conversion into the domain
/// drops it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannedPriority {
    /// Must-do task.
    High,
    /// Ordinary task.
    Medium,
    /// Nice-to-have task.
    Low,
}

/// One task extracted by the proxy from the user's description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedTask {
    /// Display title.
    pub title: String,
    /// Scheduled date in `YYYY-MM-DD` form, if any.
    pub date: Option<String>,
    /// Scheduled time in `HH:mm` form, if any.
    pub time: Option<String>,
    /// Span in whole minutes.
    pub duration: u32,
    /// Optional priority hint.
    pub priority: Option<PlannedPriority>,
}

/// Successful proxy response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleResponse {
    /// Tasks extracted from the user input.
    pub tasks: Vec<PlannedTask>,
}

/// Error body of a non-success proxy response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProxyErrorBody {
    /// Human-readable message, surfaced to the user verbatim.
    pub error: String,
    /// Optional diagnostic detail.
    #[serde(default)]
    pub details: Option<String>,
}
