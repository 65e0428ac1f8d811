//! Centralized error types for LabDesk.

use thiserror::Error;

/// Main error type for LabDesk operations.
#[derive(Error, Debug)]
pub enum LabdeskError {
    #[error("Request not found: {0}")]
    RequestNotFound(String),

    #[error("Unknown step ordinal: {0}")]
    UnknownStep(u8),

    #[error("Step {step} is incomplete: missing {missing}")]
    StepIncomplete { step: u8, missing: String },

    #[error("Role '{role}' may not edit step {step}")]
    EditNotPermitted { role: String, step: u8 },

    #[error("Field '{field}' does not belong to step {step}")]
    FieldNotEditable { field: String, step: u8 },

    #[error("Approval decision already recorded as '{status}'")]
    DecisionAlreadyRecorded { status: String },

    #[error("Request is at step {current_step}, not yet at the approval stage")]
    DecisionNotReady { current_step: u8 },

    #[error("Request is already at the final step")]
    AlreadyAtFinalStep,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    Database(#[from] labdesk_db::DbError),
}

/// Result type for LabDesk operations.
pub type LabdeskResult<T> = Result<T, LabdeskError>;

impl LabdeskError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}
