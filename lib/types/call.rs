use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DurationSecondsWithFrac};

use super::{BatchId, RecipientId};
use crate::timeutil::iso8601_dateformat_serde;

/// Raw outcome of one call-initiation request.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CallAttemptDetails {
    pub response_code: Option<i32>,
    #[serde_as(as = "DurationSecondsWithFrac")]
    pub response_latency_s: Duration,
    pub response_payload: Option<serde_json::Value>,
    pub error_msg: Option<String>,
}

impl CallAttemptDetails {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.response_code.unwrap_or(500))
    }

    pub fn with_error(err: String) -> Self {
        Self {
            response_code: None,
            response_latency_s: Duration::default(),
            response_payload: None,
            error_msg: Some(err),
        }
    }
}

/// Per-recipient outcome. Call success and persistence success are tracked
/// independently; neither overrides the other.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CallResult {
    pub recipient_id: RecipientId,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub success: bool,
    pub error: Option<String>,
    pub response: Option<serde_json::Value>,
    pub db_inserted: bool,
    pub db_error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Processing,
    Completed,
    Failed,
}

/// Aggregate report returned after a batch finishes dispatching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub batch_name: String,
    pub total_recipients: usize,
    pub successful_calls: usize,
    pub failed_calls: usize,
    pub status: BatchStatus,
    #[serde(with = "iso8601_dateformat_serde")]
    pub created_at: DateTime<Tz>,
    pub total_groups: usize,
    #[serde(with = "iso8601_dateformat_serde")]
    pub estimated_completion_time: DateTime<Tz>,
}

/// Summary plus the per-recipient results it was aggregated from.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    pub results: Vec<CallResult>,
}

#[cfg(test)]
mod tests {
    use super::CallAttemptDetails;

    #[test]
    fn test_success_is_2xx() {
        for code in [200, 201, 204, 299] {
            let details = CallAttemptDetails {
                response_code: Some(code),
                response_latency_s: Default::default(),
                response_payload: None,
                error_msg: None,
            };
            assert!(details.is_success(), "code {code}");
        }
        for code in [199, 301, 404, 500] {
            let details = CallAttemptDetails {
                response_code: Some(code),
                response_latency_s: Default::default(),
                response_payload: None,
                error_msg: None,
            };
            assert!(!details.is_success(), "code {code}");
        }
    }

    #[test]
    fn test_missing_code_is_failure() {
        let details =
            CallAttemptDetails::with_error("Connection Failed".to_string());
        assert!(!details.is_success());
        assert_eq!(details.error_msg.as_deref(), Some("Connection Failed"));
    }
}
