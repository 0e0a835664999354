//! Invocation entry point
//!
//! Turns one trigger event into one reconciliation pass and a
//! `{statusCode, body}` response. The event itself is opaque: it is logged
//! and otherwise ignored, since every pass recomputes the full desired state.

use crate::config::FailurePolicy;
use crate::reconciler::{ReconcileReport, Reconciler};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Body returned when every target group converged
pub const SUCCESS_MESSAGE: &str = "All target groups updated successfully.";

/// Response of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// 200 on full success, 500 otherwise
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded message string
    pub body: String,
}

impl InvocationResponse {
    /// Successful response carrying `message`
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: json_string(message.into()),
        }
    }

    /// Failed response carrying `message`
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status_code: 500,
            body: json_string(message.into()),
        }
    }

    /// Build the response for a finished pass
    ///
    /// Fail-fast reports the first failure's message. Best-effort reports
    /// how many results failed followed by each failure message.
    pub fn from_report(report: &ReconcileReport, policy: FailurePolicy) -> Self {
        let Some(first) = report.first_failure() else {
            return Self::ok(SUCCESS_MESSAGE);
        };

        match policy {
            FailurePolicy::FailFast => Self::error(first.message.clone()),
            FailurePolicy::BestEffort => {
                let messages: Vec<&str> = report.failures().map(|r| r.message.as_str()).collect();
                Self::error(format!(
                    "{} of {} reconciliations failed: {}",
                    messages.len(),
                    report.len(),
                    messages.join("; ")
                ))
            }
        }
    }

    /// Whether the status code is 200
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Run one invocation
///
/// # Parameters
///
/// - `event`: Opaque trigger event (scheduler payload, CLI argument, ...)
/// - `reconciler`: Reconciler wired with its collaborators
pub async fn handle(event: &serde_json::Value, reconciler: &Reconciler) -> InvocationResponse {
    info!("Handler invoked");
    debug!("Trigger event: {}", event);

    match reconciler.run().await {
        Ok(report) => InvocationResponse::from_report(&report, reconciler.failure_policy()),
        Err(e) => {
            error!("Reconciliation aborted: {}", e);
            InvocationResponse::error(e.to_string())
        }
    }
}

fn json_string(message: String) -> String {
    serde_json::Value::String(message).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serialization() {
        let response = InvocationResponse::ok(SUCCESS_MESSAGE);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(
            json["body"],
            "\"All target groups updated successfully.\""
        );
    }

    #[test]
    fn test_body_is_json_encoded_string() {
        let response = InvocationResponse::error("No IPs found for endpoint: \"db\"");
        let decoded: String = serde_json::from_str(&response.body).unwrap();

        assert!(!response.is_success());
        assert_eq!(decoded, "No IPs found for endpoint: \"db\"");
    }

    #[test]
    fn test_empty_report_is_success() {
        let response =
            InvocationResponse::from_report(&ReconcileReport::default(), FailurePolicy::FailFast);
        assert!(response.is_success());
    }
}
