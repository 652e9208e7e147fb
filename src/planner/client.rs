//! HTTP client for the stateless scheduling proxy.

use super::error::PlannerError;
use super::wire::{PlannedTask, ProxyErrorBody, ScheduleRequest, ScheduleResponse};
use mockable::Clock;
use std::sync::Arc;
use url::Url;

/// Client of the HTTP-to-LLM scheduling proxy.
///
/// The proxy is a single stateless passthrough: one `POST /` carrying the
/// user's description plus the caller-local date and time, answered with
/// structured tasks. The date and time come from the injected clock so the
/// request payload is deterministic under test.
#[derive(Debug, Clone)]
pub struct SchedulingProxyClient<C> {
    http: reqwest::Client,
    endpoint: Url,
    clock: Arc<C>,
}

impl<C> SchedulingProxyClient<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a client against the proxy endpoint.
    #[must_use]
    pub fn new(endpoint: Url, clock: Arc<C>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            clock,
        }
    }

    /// Converts a natural-language description into planned tasks.
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Transport`] when the proxy is unreachable,
    /// [`PlannerError::Proxy`] with the proxy's own message for non-success
    /// responses, and [`PlannerError::Decode`] when a success body fails to
    /// decode.
    pub async fn generate_schedule(
        &self,
        user_input: &str,
    ) -> Result<Vec<PlannedTask>, PlannerError> {
        let now = self.clock.local();
        let request = ScheduleRequest {
            user_input: user_input.to_owned(),
            current_date: now.format("%Y-%m-%d").to_string(),
            current_time: now.format("%H:%M").to_string(),
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(match response.json::<ProxyErrorBody>().await {
                Ok(body) => PlannerError::Proxy {
                    status: status.as_u16(),
                    message: body.error,
                    details: body.details,
                },
                Err(_) => PlannerError::Proxy {
                    status: status.as_u16(),
                    message: format!("scheduling proxy returned {status}"),
                    details: None,
                },
            });
        }

        let decoded: ScheduleResponse = response.json().await.map_err(PlannerError::Decode)?;
        Ok(decoded.tasks)
    }
}

#[cfg(test)]
mod tests {
    #![expect(
        clippy::expect_used,
        reason = "Test code uses expect for assertion clarity"
    )]

    use super::*;
    use crate::planner::wire::PlannedPriority;
    use mockable::DefaultClock;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SchedulingProxyClient<DefaultClock> {
        let endpoint = Url::parse(&server.uri()).expect("mock server URI parses");
        SchedulingProxyClient::new(endpoint, Arc::new(DefaultClock))
    }

    #[tokio::test]
    async fn generate_schedule_decodes_planned_tasks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(json!({
                "userInput": "gym at six, then groceries",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tasks": [
                    {
                        "title": "Gym",
                        "date": "2025-06-01",
                        "time": "18:00",
                        "duration": 60,
                        "priority": "medium",
                    },
                    {
                        "title": "Groceries",
                        "date": null,
                        "time": null,
                        "duration": 30,
                        "priority": null,
                    },
                ],
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let tasks = client
            .generate_schedule("gym at six, then groceries")
            .await
            .expect("schedule generation succeeds");

        assert_eq!(tasks.len(), 2);
        let gym = tasks.first().expect("first task present");
        assert_eq!(gym.title, "Gym");
        assert_eq!(gym.date.as_deref(), Some("2025-06-01"));
        assert_eq!(gym.time.as_deref(), Some("18:00"));
        assert_eq!(gym.duration, 60);
        assert_eq!(gym.priority, Some(PlannedPriority::Medium));
    }

    #[tokio::test]
    async fn request_carries_current_date_and_time_fields() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tasks": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let tasks = client
            .generate_schedule("free day")
            .await
            .expect("schedule generation succeeds");

        assert!(tasks.is_empty());
        let requests = server
            .received_requests()
            .await
            .expect("request recording enabled");
        let body: serde_json::Value = requests
            .first()
            .expect("one request recorded")
            .body_json()
            .expect("request body is JSON");
        assert!(body.get("currentDate").is_some());
        assert!(body.get("currentTime").is_some());
    }

    #[tokio::test]
    async fn proxy_error_message_is_surfaced_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "OpenAI API error",
                "details": "rate limited",
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate_schedule("busy day").await;

        let Err(PlannerError::Proxy {
            status,
            message,
            details,
        }) = result
        else {
            panic!("expected proxy error");
        };
        assert_eq!(status, 500);
        assert_eq!(message, "OpenAI API error");
        assert_eq!(details.as_deref(), Some("rate limited"));
    }

    #[tokio::test]
    async fn undecodable_error_body_falls_back_to_status_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.generate_schedule("busy day").await;

        assert!(matches!(
            result,
            Err(PlannerError::Proxy { status: 502, .. })
        ));
    }
}
