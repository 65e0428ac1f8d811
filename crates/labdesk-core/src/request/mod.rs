//! Maintenance request lifecycle operations.
//!
//! Every mutation re-checks role and step authority here, at the data
//! boundary — a client having hidden or disabled an input is never the
//! enforcement point.

pub mod model;

use crate::error::{LabdeskError, LabdeskResult};
use crate::identity::Role;
use crate::workflow::{self, APPROVAL_STEP, LAST_STEP};
use labdesk_db::requests as queries;
use labdesk_db::DbPool;
use model::{Decision, MaintenanceRequest, ProblemType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fields accepted when opening a new request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRequest {
    pub type_of_problem: String,
    pub date: String,
    pub department: String,
    pub location: String,
    pub complaint_details: String,
    #[serde(default)]
    pub recurring_complaint: bool,
    #[serde(default)]
    pub recurring_times: Option<u32>,
}

/// Open a new request at step 1.
///
/// Only the role owning the problem-report step may create tickets.
pub async fn create_request(
    pool: &DbPool,
    role: Role,
    input: &NewRequest,
) -> LabdeskResult<MaintenanceRequest> {
    let opening_role = workflow::step(1)?.owning_role;
    if role != opening_role {
        return Err(LabdeskError::EditNotPermitted {
            role: role.as_str().to_string(),
            step: 1,
        });
    }

    let problem = ProblemType::parse(&input.type_of_problem).ok_or_else(|| {
        LabdeskError::validation(format!(
            "Unknown problem type '{}'",
            input.type_of_problem
        ))
    })?;

    let id = Uuid::new_v4().to_string();
    let mut row = queries::RequestRow::new(
        &id,
        problem.as_str(),
        &input.date,
        &input.department,
        &input.location,
        &input.complaint_details,
    );
    row.recurring_complaint = input.recurring_complaint;
    row.recurring_times = if input.recurring_complaint {
        input.recurring_times
    } else {
        None
    };

    queries::create_request(pool, &row).await?;
    tracing::info!(request_id = %id, problem = %problem.as_str(), "Opened maintenance request");

    let row = queries::get_request(pool, &id).await?;
    Ok(MaintenanceRequest::from_row(row))
}

/// Get a request by ID.
pub async fn get_request(pool: &DbPool, id: &str) -> LabdeskResult<MaintenanceRequest> {
    let row = queries::get_request(pool, id).await.map_err(|e| match e {
        labdesk_db::DbError::NotFound(_) => LabdeskError::RequestNotFound(id.to_string()),
        other => LabdeskError::Database(other),
    })?;
    Ok(MaintenanceRequest::from_row(row))
}

/// List requests, optionally narrowed to a step or a problem type.
pub async fn list_requests(
    pool: &DbPool,
    step: Option<u8>,
    problem_type: Option<ProblemType>,
) -> LabdeskResult<Vec<MaintenanceRequest>> {
    let rows = match step {
        Some(s) => {
            workflow::step(s)?;
            queries::list_requests_by_step(pool, s).await?
        }
        None => queries::list_requests(pool).await?,
    };

    let mut requests: Vec<MaintenanceRequest> =
        rows.into_iter().map(MaintenanceRequest::from_row).collect();

    if let Some(ty) = problem_type {
        requests.retain(|r| r.type_of_problem == ty);
    }

    Ok(requests)
}

/// Apply a set of named field edits for one step. Pure; callers persist.
///
/// Rejects edits by the wrong role, edits to a step the record is not
/// parked at, fields outside the step, and any write to the approval stage
/// (which only moves through [`apply_decision`]).
pub fn apply_step_fields(
    record: &mut MaintenanceRequest,
    role: Role,
    ordinal: u8,
    fields: &[(String, String)],
) -> LabdeskResult<()> {
    let def = workflow::step(ordinal)?;

    if ordinal == APPROVAL_STEP {
        return Err(LabdeskError::validation(
            "The approval stage is recorded through the decision operation",
        ));
    }

    if !workflow::can_edit(role, record, ordinal)? {
        return Err(LabdeskError::EditNotPermitted {
            role: role.as_str().to_string(),
            step: ordinal,
        });
    }

    for (field, value) in fields {
        if !def.editable_fields.contains(&field.as_str()) {
            return Err(LabdeskError::FieldNotEditable {
                field: field.clone(),
                step: ordinal,
            });
        }
        record.apply_field(field, value)?;
    }

    record.normalize_conditionals();
    Ok(())
}

/// Save field edits for one step of a request.
pub async fn save_step(
    pool: &DbPool,
    id: &str,
    role: Role,
    ordinal: u8,
    fields: &[(String, String)],
) -> LabdeskResult<MaintenanceRequest> {
    let mut record = get_request(pool, id).await?;
    apply_step_fields(&mut record, role, ordinal, fields)?;
    queries::update_request(pool, &record.to_row()).await?;

    tracing::debug!(request_id = %id, step = ordinal, "Saved step fields");
    get_request(pool, id).await
}

/// Advance the step pointer past the current step. Pure; callers persist.
///
/// The gate recomputes the current step's completeness from the record at
/// the moment of the attempt. Only the role owning the step being left may
/// advance past it.
pub fn apply_advance(record: &mut MaintenanceRequest, role: Role) -> LabdeskResult<()> {
    let def = workflow::step(record.current_step)?;
    if role != def.owning_role {
        return Err(LabdeskError::EditNotPermitted {
            role: role.as_str().to_string(),
            step: record.current_step,
        });
    }
    workflow::ensure_can_advance(record)?;
    record.current_step += 1;
    Ok(())
}

/// Move a request to its next step.
pub async fn advance_request(
    pool: &DbPool,
    id: &str,
    role: Role,
) -> LabdeskResult<MaintenanceRequest> {
    let mut record = get_request(pool, id).await?;
    apply_advance(&mut record, role)?;
    queries::update_request(pool, &record.to_row()).await?;

    tracing::info!(request_id = %id, step = record.current_step, "Advanced request");
    get_request(pool, id).await
}

/// Record the admin decision. Pure; callers persist.
///
/// Both outcomes move the ticket to closure — a rejected request still
/// proceeds to step 6 rather than looping back to corrective action. The
/// decision is terminal: a second attempt is a conflict, never an
/// overwrite.
pub fn apply_decision(
    record: &mut MaintenanceRequest,
    role: Role,
    decision: Decision,
    remarks: Option<&str>,
) -> LabdeskResult<()> {
    if role != Role::Admin {
        return Err(LabdeskError::EditNotPermitted {
            role: role.as_str().to_string(),
            step: APPROVAL_STEP,
        });
    }
    if record.admin_approval_status.is_decided() {
        return Err(LabdeskError::DecisionAlreadyRecorded {
            status: record.admin_approval_status.as_str().to_string(),
        });
    }
    if record.current_step != APPROVAL_STEP {
        return Err(LabdeskError::DecisionNotReady {
            current_step: record.current_step,
        });
    }

    record.admin_approval_status = decision.status();
    record.admin_approval_date = chrono::Utc::now().format("%Y-%m-%d").to_string();
    if let Some(notes) = remarks {
        record.admin_remarks = notes.to_string();
    }
    record.current_step = LAST_STEP;
    Ok(())
}

/// Record the admin approve/reject decision on a request.
pub async fn record_decision(
    pool: &DbPool,
    id: &str,
    role: Role,
    decision: Decision,
    remarks: Option<&str>,
) -> LabdeskResult<MaintenanceRequest> {
    let mut record = get_request(pool, id).await?;
    apply_decision(&mut record, role, decision, remarks)?;
    queries::update_request(pool, &record.to_row()).await?;

    tracing::info!(
        request_id = %id,
        status = %record.admin_approval_status.as_str(),
        "Recorded admin decision"
    );
    get_request(pool, id).await
}

/// Request count for one step of the dashboard summary.
#[derive(Debug, Clone, Serialize)]
pub struct StepCount {
    pub step: u8,
    pub title: String,
    pub count: i64,
}

/// Request count for one problem type.
#[derive(Debug, Clone, Serialize)]
pub struct TypeCount {
    pub problem_type: String,
    pub count: i64,
}

/// Dashboard summary: how many requests sit at each step and category.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: i64,
    pub by_step: Vec<StepCount>,
    pub by_type: Vec<TypeCount>,
}

/// Compute the dashboard summary.
pub async fn get_summary(pool: &DbPool) -> LabdeskResult<Summary> {
    let mut by_step = Vec::new();
    let mut total = 0;
    for (step, count) in queries::counts_by_step(pool).await? {
        let def = workflow::step(step)?;
        total += count;
        by_step.push(StepCount {
            step,
            title: def.title.to_string(),
            count,
        });
    }

    let requests = list_requests(pool, None, None).await?;
    let mut by_type: Vec<TypeCount> = Vec::new();
    for req in &requests {
        let name = req.type_of_problem.as_str();
        match by_type.iter_mut().find(|t| t.problem_type == name) {
            Some(entry) => entry.count += 1,
            None => by_type.push(TypeCount {
                problem_type: name.to_string(),
                count: 1,
            }),
        }
    }

    Ok(Summary {
        total,
        by_step,
        by_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::model::ApprovalStatus;
    use labdesk_db::requests::RequestRow;

    fn request_at(step: u8) -> MaintenanceRequest {
        let mut req = MaintenanceRequest::from_row(RequestRow::new(
            "req-1",
            "electrical",
            "2025-01-10",
            "Physics",
            "Lab 3",
            "Socket sparks when a scope is plugged in",
        ));
        req.current_step = step;
        req
    }

    #[test]
    fn test_save_rejects_wrong_role() {
        let mut req = request_at(1);
        let fields = vec![("department".to_string(), "Chemistry".to_string())];
        let err = apply_step_fields(&mut req, Role::Admin, 1, &fields).unwrap_err();
        assert!(matches!(err, LabdeskError::EditNotPermitted { step: 1, .. }));
        // The rejected edit must not have partially applied.
        assert_eq!(req.department, "Physics");
    }

    #[test]
    fn test_save_rejects_step_record_is_not_at() {
        let mut req = request_at(3);
        let fields = vec![("department".to_string(), "Chemistry".to_string())];
        assert!(apply_step_fields(&mut req, Role::LabIncharge, 1, &fields).is_err());
    }

    #[test]
    fn test_save_rejects_field_outside_step() {
        let mut req = request_at(2);
        let fields = vec![("materials_used".to_string(), "Fuse".to_string())];
        let err = apply_step_fields(&mut req, Role::LabIncharge, 2, &fields).unwrap_err();
        assert!(matches!(err, LabdeskError::FieldNotEditable { step: 2, .. }));
    }

    #[test]
    fn test_save_rejects_approval_step() {
        let mut req = request_at(5);
        let fields = vec![("admin_remarks".to_string(), "ok".to_string())];
        assert!(apply_step_fields(&mut req, Role::Admin, 5, &fields).is_err());
    }

    #[test]
    fn test_save_clears_dependents_when_flag_drops() {
        let mut req = request_at(4);
        req.consumables_needed = true;
        req.consumable_details = "Fuse wire".to_string();

        let fields = vec![("consumables_needed".to_string(), "false".to_string())];
        apply_step_fields(&mut req, Role::LabAssistant, 4, &fields).unwrap();
        assert!(req.consumable_details.is_empty());
    }

    #[test]
    fn test_advance_refused_until_step_complete() {
        let mut req = request_at(2);
        let err = apply_advance(&mut req, Role::LabIncharge).unwrap_err();
        assert!(matches!(err, LabdeskError::StepIncomplete { step: 2, .. }));
        assert_eq!(req.current_step, 2);

        req.lab_assistant = "S. Rao".into();
        req.lab_assistant_date = "2025-01-11".into();
        req.hod = "Dr. Mehta".into();
        req.hod_date = "2025-01-11".into();
        apply_advance(&mut req, Role::LabIncharge).unwrap();
        assert_eq!(req.current_step, 3);
    }

    #[test]
    fn test_advance_requires_owning_role() {
        let mut req = request_at(1);
        assert!(apply_advance(&mut req, Role::LabAssistant).is_err());
        assert_eq!(req.current_step, 1);
    }

    #[test]
    fn test_reject_advances_to_closure() {
        let mut req = request_at(5);
        apply_decision(&mut req, Role::Admin, Decision::Reject, Some("No budget")).unwrap();
        assert_eq!(req.admin_approval_status, ApprovalStatus::Rejected);
        assert_eq!(req.current_step, 6);
        assert_eq!(req.admin_remarks, "No budget");
        assert!(!req.admin_approval_date.is_empty());
    }

    #[test]
    fn test_second_decision_is_a_conflict() {
        let mut req = request_at(5);
        apply_decision(&mut req, Role::Admin, Decision::Reject, None).unwrap();

        let err = apply_decision(&mut req, Role::Admin, Decision::Approve, None).unwrap_err();
        assert!(matches!(err, LabdeskError::DecisionAlreadyRecorded { .. }));
        // The first decision is never overwritten.
        assert_eq!(req.admin_approval_status, ApprovalStatus::Rejected);
    }

    #[test]
    fn test_decision_before_approval_stage_refused() {
        let mut req = request_at(3);
        let err = apply_decision(&mut req, Role::Admin, Decision::Approve, None).unwrap_err();
        assert!(matches!(err, LabdeskError::DecisionNotReady { current_step: 3 }));
    }

    #[test]
    fn test_decision_requires_admin() {
        let mut req = request_at(5);
        assert!(apply_decision(&mut req, Role::LabIncharge, Decision::Approve, None).is_err());
    }
}
