//! Web server notifier for real-time updates.
//!
//! Lets the CLI notify a running web server of changes so connected
//! dashboards refresh without polling. Best effort: a server that is not
//! running is a debug log, never an error.

use std::time::Duration;
use tracing::{debug, warn};

/// Default web server URL.
const DEFAULT_WEB_URL: &str = "http://127.0.0.1:3030";

/// Notifies the web server of changes via HTTP.
#[derive(Clone)]
pub struct WebNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl WebNotifier {
    /// Create a new notifier with default settings.
    ///
    /// Uses the `LABDESK_WEB_URL` environment variable if set, otherwise
    /// defaults to `http://127.0.0.1:3030`.
    pub fn new() -> Self {
        let base_url =
            std::env::var("LABDESK_WEB_URL").unwrap_or_else(|_| DEFAULT_WEB_URL.to_string());
        debug!(base_url = %base_url, "WebNotifier initialized");
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()
                .unwrap_or_default(),
            base_url,
        }
    }

    /// Notify the web server that a request changed.
    pub async fn notify_request_updated(&self, request_id: &str, step: u8) {
        let payload = serde_json::json!({
            "type": "RequestUpdated",
            "data": { "request_id": request_id, "step": step }
        });
        self.post(payload, "request update").await;
    }

    /// Notify the web server that an admin decision was recorded.
    pub async fn notify_decision_recorded(&self, request_id: &str, status: &str) {
        let payload = serde_json::json!({
            "type": "DecisionRecorded",
            "data": { "request_id": request_id, "status": status }
        });
        self.post(payload, "decision").await;
    }

    /// Ask the web server to refresh the whole dashboard.
    pub async fn notify_dashboard_refresh(&self) {
        let payload = serde_json::json!({ "type": "DashboardRefresh" });
        self.post(payload, "dashboard refresh").await;
    }

    async fn post(&self, payload: serde_json::Value, what: &str) {
        let url = format!("{}/internal/notify", self.base_url);
        match self.client.post(&url).json(&payload).send().await {
            Ok(response) => {
                if response.status().is_success() {
                    debug!(what, "Notification sent");
                } else {
                    warn!(what, status_code = %response.status(), "Notification failed with status");
                }
            }
            Err(e) => {
                // Expected when no server is running.
                debug!(what, error = %e, url = %url, "Failed to send notification (labdesk serve may not be running)");
            }
        }
    }
}

impl Default for WebNotifier {
    fn default() -> Self {
        Self::new()
    }
}
