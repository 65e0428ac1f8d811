//! Route handlers.

pub mod dashboard;
pub mod export;
pub mod internal;
pub mod requests;

use axum::http::StatusCode;
use labdesk_core::LabdeskError;

/// Map a core error to the HTTP status it should surface as.
pub(crate) fn error_response(err: LabdeskError) -> (StatusCode, String) {
    let status = match &err {
        LabdeskError::RequestNotFound(_) => StatusCode::NOT_FOUND,
        LabdeskError::UnknownStep(_) => StatusCode::BAD_REQUEST,
        LabdeskError::ValidationError(_) => StatusCode::BAD_REQUEST,
        LabdeskError::EditNotPermitted { .. } | LabdeskError::FieldNotEditable { .. } => {
            StatusCode::FORBIDDEN
        }
        LabdeskError::StepIncomplete { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LabdeskError::DecisionAlreadyRecorded { .. }
        | LabdeskError::DecisionNotReady { .. }
        | LabdeskError::AlreadyAtFinalStep => StatusCode::CONFLICT,
        LabdeskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}
