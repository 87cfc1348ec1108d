// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON HTTP client for the notification collector service.
//!
//! The collector is a small external JSON API the harness itself directs
//! (not the server under test): create an endpoint, poll it for delivered
//! notification bodies, toggle it, tear it down.

use cactus_error::NotificationKind;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// The collector's response to a successful endpoint creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedEndpoint {
    /// Collector-assigned endpoint identifier.
    pub endpoint_id: String,
    /// The webhook URI the server under test should be told to POST to.
    pub fully_qualified_webhook_uri: String,
}

#[derive(Debug, Deserialize)]
struct CollectResponse {
    notifications: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SetEnabledRequest {
    enabled: bool,
}

/// Thin client over the collector's four JSON endpoints.
pub struct CollectorClient {
    http: Client,
    base_url: String,
}

impl CollectorClient {
    /// Build a client against the collector at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST `endpoint-list` to create a new endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationKind::CollectorFailure`] on any transport
    /// error, non-2xx status, or unparseable response body.
    pub async fn create_endpoint(&self) -> Result<CreatedEndpoint, NotificationKind> {
        let response = self
            .http
            .post(self.url("/endpoint-list"))
            .send()
            .await
            .map_err(|e| collector_failure(format!("create endpoint: {e}")))?;
        expect_success(&response, "create endpoint")?;
        response
            .json()
            .await
            .map_err(|e| collector_failure(format!("create endpoint: {e}")))
    }

    /// GET `endpoint/{id}`, returning every notification body currently queued.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationKind::CollectorFailure`] on any transport
    /// error, non-2xx status, or unparseable response body.
    pub async fn collect(&self, endpoint_id: &str) -> Result<Vec<String>, NotificationKind> {
        let response = self
            .http
            .get(self.url(&format!("/endpoint/{endpoint_id}")))
            .send()
            .await
            .map_err(|e| collector_failure(format!("collect {endpoint_id}: {e}")))?;
        expect_success(&response, "collect")?;
        let parsed: CollectResponse = response
            .json()
            .await
            .map_err(|e| collector_failure(format!("collect {endpoint_id}: {e}")))?;
        Ok(parsed.notifications)
    }

    /// PUT `endpoint/{id}` with `{"enabled": enabled}`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationKind::CollectorFailure`] on any transport error
    /// or non-2xx status.
    pub async fn set_enabled(&self, endpoint_id: &str, enabled: bool) -> Result<(), NotificationKind> {
        let response = self
            .http
            .put(self.url(&format!("/endpoint/{endpoint_id}")))
            .json(&SetEnabledRequest { enabled })
            .send()
            .await
            .map_err(|e| collector_failure(format!("set-enabled {endpoint_id}: {e}")))?;
        expect_success(&response, "set-enabled")?;
        Ok(())
    }

    /// DELETE `endpoint/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationKind::CollectorFailure`] on any transport error
    /// or non-2xx status. Callers tearing down a run should log and
    /// continue rather than propagate.
    pub async fn delete_endpoint(&self, endpoint_id: &str) -> Result<(), NotificationKind> {
        let response = self
            .http
            .delete(self.url(&format!("/endpoint/{endpoint_id}")))
            .send()
            .await
            .map_err(|e| collector_failure(format!("delete {endpoint_id}: {e}")))?;
        expect_success(&response, "delete")?;
        Ok(())
    }
}

fn collector_failure(reason: String) -> NotificationKind {
    NotificationKind::CollectorFailure { reason }
}

fn expect_success(response: &reqwest::Response, op: &str) -> Result<(), NotificationKind> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(collector_failure(format!("{op}: unexpected status {}", response.status())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn create_endpoint_parses_the_collector_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/endpoint-list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "endpoint_id": "ep-1",
                "fully_qualified_webhook_uri": "https://collector.example/hook/ep-1",
            })))
            .mount(&server)
            .await;

        let client = CollectorClient::new(server.uri());
        let created = client.create_endpoint().await.unwrap();
        assert_eq!(created.endpoint_id, "ep-1");
        assert_eq!(created.fully_qualified_webhook_uri, "https://collector.example/hook/ep-1");
    }

    #[tokio::test]
    async fn collect_returns_queued_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/endpoint/ep-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "notifications": ["<Notification/>", "<Notification/>"],
            })))
            .mount(&server)
            .await;

        let client = CollectorClient::new(server.uri());
        let bodies = client.collect("ep-1").await.unwrap();
        assert_eq!(bodies.len(), 2);
    }

    #[tokio::test]
    async fn set_enabled_sends_the_expected_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/endpoint/ep-1"))
            .and(body_json(serde_json::json!({"enabled": false})))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = CollectorClient::new(server.uri());
        client.set_enabled("ep-1", false).await.unwrap();
    }

    #[tokio::test]
    async fn delete_endpoint_propagates_a_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/endpoint/ep-1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = CollectorClient::new(server.uri());
        assert!(client.delete_endpoint("ep-1").await.is_err());
    }
}
