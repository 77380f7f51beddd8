use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{BatchId, Recipient};
use crate::validation::validation_error;

pub const DEFAULT_GROUP_SIZE: u32 = 20;
pub const DEFAULT_INTERVAL_MINUTES: u64 = 5;

/// Pacing configuration for one batch. Out-of-range values are rejected
/// before dispatch begins, never clamped.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Recipients per group.
    #[validate(custom = "validate_group_size")]
    pub batch_size: u32,
    /// Pause between consecutive groups. Zero means back-to-back.
    #[validate(custom = "validate_interval")]
    pub interval_minutes: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_GROUP_SIZE,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

fn validate_group_size(batch_size: u32) -> Result<(), ValidationError> {
    if !(1..=50).contains(&batch_size) {
        return Err(validation_error(
            "invalid_batch_size",
            format!("Batch size must be between 1 and 50, got {batch_size}"),
        ));
    }
    Ok(())
}

fn validate_interval(interval_minutes: u64) -> Result<(), ValidationError> {
    if interval_minutes > 60 {
        return Err(validation_error(
            "invalid_interval",
            format!(
                "Interval must be between 0 and 60 minutes, got \
                 {interval_minutes}"
            ),
        ));
    }
    Ok(())
}

/// What callers hand to the dispatcher: a named recipient list plus the
/// pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct DispatchRequest {
    #[validate(length(min = 1, message = "Batch name must not be empty"))]
    pub batch_name: String,
    /// Reuse an existing batch id, or None to generate a fresh one.
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    pub recipients: Vec<Recipient>,
    #[serde(flatten)]
    #[validate]
    pub config: BatchConfig,
}
