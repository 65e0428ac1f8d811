//! Step definition table, completion evaluation and the stage gate.
//!
//! The step table is the contract the rest of the system hangs off: the
//! ordered stages of a maintenance request, which role owns each stage and
//! which fields that stage must fill in. Completion is always derived from
//! the record itself; there is no separately stored watermark to fall out
//! of sync.

use crate::error::{LabdeskError, LabdeskResult};
use crate::identity::Role;
use crate::request::model::MaintenanceRequest;

/// Ordinal of the admin approval stage.
pub const APPROVAL_STEP: u8 = 5;

/// Ordinal of the closure stage; the lifecycle has no "next" past it.
pub const LAST_STEP: u8 = 6;

/// One stage of the request lifecycle.
#[derive(Debug)]
pub struct StepDef {
    pub ordinal: u8,
    pub title: &'static str,
    pub owning_role: Role,
    /// Fields that must be populated for the step to count as complete.
    pub required_fields: &'static [&'static str],
    /// Everything the owning role may write at this step, conditional
    /// fields included.
    pub editable_fields: &'static [&'static str],
}

/// The fixed lifecycle. Order is the contract; every step has at least one
/// required field so no step is vacuously complete.
pub const STEPS: &[StepDef] = &[
    StepDef {
        ordinal: 1,
        title: "Problem report",
        owning_role: Role::LabIncharge,
        required_fields: &[
            "type_of_problem",
            "date",
            "department",
            "location",
            "complaint_details",
        ],
        editable_fields: &[
            "type_of_problem",
            "date",
            "department",
            "location",
            "complaint_details",
            "recurring_complaint",
            "recurring_times",
        ],
    },
    StepDef {
        ordinal: 2,
        title: "Originator sign-off",
        owning_role: Role::LabIncharge,
        required_fields: &["lab_assistant", "lab_assistant_date", "hod", "hod_date"],
        editable_fields: &["lab_assistant", "lab_assistant_date", "hod", "hod_date"],
    },
    StepDef {
        ordinal: 3,
        title: "Verification",
        owning_role: Role::LabAssistant,
        required_fields: &["assigned_person", "in_charge_date", "verification_remarks"],
        editable_fields: &["assigned_person", "in_charge_date", "verification_remarks"],
    },
    StepDef {
        ordinal: 4,
        title: "Corrective action",
        owning_role: Role::LabAssistant,
        required_fields: &["materials_used", "resolved_inhouse", "resolved_remark"],
        editable_fields: &[
            "materials_used",
            "resolved_inhouse",
            "resolved_remark",
            "consumables_needed",
            "consumable_details",
            "external_agency_needed",
            "agency_name",
            "approx_expenditure",
        ],
    },
    StepDef {
        ordinal: 5,
        title: "Admin approval",
        owning_role: Role::Admin,
        required_fields: &["admin_approval_status", "admin_approval_date"],
        editable_fields: &["admin_approval_status", "admin_approval_date", "admin_remarks"],
    },
    StepDef {
        ordinal: 6,
        title: "Closure",
        owning_role: Role::LabAssistant,
        required_fields: &[
            "completion_remark_lab",
            "lab_completion_name",
            "lab_completion_date",
            "completion_remark_maintenance",
            "maintenance_closed_date",
            "maintenance_closed_signature",
        ],
        editable_fields: &[
            "completion_remark_lab",
            "lab_completion_name",
            "lab_completion_date",
            "completion_remark_maintenance",
            "maintenance_closed_date",
            "maintenance_closed_signature",
        ],
    },
];

/// Look up a step by ordinal. Unknown ordinals are an input-contract
/// violation and are rejected, never silently defaulted.
pub fn step(ordinal: u8) -> LabdeskResult<&'static StepDef> {
    STEPS
        .iter()
        .find(|s| s.ordinal == ordinal)
        .ok_or(LabdeskError::UnknownStep(ordinal))
}

/// Required fields of a step that are still empty on the record.
///
/// The approval step uses the two-outcome rule: it is missing its decision
/// until the status reads approved or rejected.
pub fn missing_fields(
    record: &MaintenanceRequest,
    ordinal: u8,
) -> LabdeskResult<Vec<&'static str>> {
    let def = step(ordinal)?;

    if ordinal == APPROVAL_STEP {
        return Ok(if record.admin_approval_status.is_decided() {
            Vec::new()
        } else {
            vec!["admin_approval_status"]
        });
    }

    Ok(def
        .required_fields
        .iter()
        .filter(|f| {
            record
                .field_value(f)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        })
        .copied()
        .collect())
}

/// Whether every required field of the step is populated.
pub fn is_step_complete(record: &MaintenanceRequest, ordinal: u8) -> LabdeskResult<bool> {
    Ok(missing_fields(record, ordinal)?.is_empty())
}

/// The derived watermark: highest `k` such that steps `1..=k` are all
/// complete. Recomputed from the record on every call, never stored.
pub fn completed_steps(record: &MaintenanceRequest) -> u8 {
    let mut watermark = 0;
    for def in STEPS {
        match is_step_complete(record, def.ordinal) {
            Ok(true) => watermark = def.ordinal,
            _ => break,
        }
    }
    watermark
}

/// Whether "next" is currently permitted: not at the final step, and the
/// step being left is complete at this moment.
pub fn can_advance(record: &MaintenanceRequest) -> bool {
    record.current_step < LAST_STEP
        && is_step_complete(record, record.current_step).unwrap_or(false)
}

/// Gate check for "next", with the reason when refused.
pub fn ensure_can_advance(record: &MaintenanceRequest) -> LabdeskResult<()> {
    if record.current_step >= LAST_STEP {
        return Err(LabdeskError::AlreadyAtFinalStep);
    }
    let missing = missing_fields(record, record.current_step)?;
    if !missing.is_empty() {
        return Err(LabdeskError::StepIncomplete {
            step: record.current_step,
            missing: missing.join(", "),
        });
    }
    Ok(())
}

/// Whether viewing earlier steps is possible. Viewing is free and
/// read-only; it never un-completes anything.
pub fn can_go_back(record: &MaintenanceRequest) -> bool {
    record.current_step > 1
}

/// Edit capability: a field of step `S` is editable by `role` only while
/// the record is parked at `S` and `role` owns `S`. Once the approval
/// decision is recorded that stage is terminal and closes to everyone.
pub fn can_edit(role: Role, record: &MaintenanceRequest, ordinal: u8) -> LabdeskResult<bool> {
    let def = step(ordinal)?;
    if ordinal == APPROVAL_STEP && record.admin_approval_status.is_decided() {
        return Ok(false);
    }
    Ok(role == def.owning_role && record.current_step == ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::model::ApprovalStatus;
    use labdesk_db::requests::RequestRow;

    fn reported_request() -> MaintenanceRequest {
        MaintenanceRequest::from_row(RequestRow::new(
            "req-1",
            "electrical",
            "2025-01-10",
            "Physics",
            "Lab 3",
            "Socket sparks when a scope is plugged in",
        ))
    }

    fn fill_step2(req: &mut MaintenanceRequest) {
        req.lab_assistant = "S. Rao".into();
        req.lab_assistant_date = "2025-01-11".into();
        req.hod = "Dr. Mehta".into();
        req.hod_date = "2025-01-11".into();
    }

    #[test]
    fn test_unknown_ordinal_rejected() {
        let req = reported_request();
        assert!(matches!(step(0), Err(LabdeskError::UnknownStep(0))));
        assert!(matches!(step(7), Err(LabdeskError::UnknownStep(7))));
        assert!(is_step_complete(&req, 0).is_err());
    }

    #[test]
    fn test_every_step_has_required_fields() {
        for def in STEPS {
            assert!(
                !def.required_fields.is_empty(),
                "step {} would be vacuously complete",
                def.ordinal
            );
        }
    }

    #[test]
    fn test_step1_complete_step2_not() {
        let req = reported_request();
        assert!(is_step_complete(&req, 1).unwrap());
        assert!(!is_step_complete(&req, 2).unwrap());
        assert_eq!(completed_steps(&req), 1);
    }

    #[test]
    fn test_whitespace_only_field_is_incomplete() {
        let mut req = reported_request();
        req.department = "   ".into();
        assert!(!is_step_complete(&req, 1).unwrap());
        assert_eq!(
            missing_fields(&req, 1).unwrap(),
            vec!["department"]
        );
    }

    #[test]
    fn test_boolean_required_field_always_populated() {
        // resolved_inhouse stringifies to "false", which is non-empty.
        let mut req = reported_request();
        req.materials_used = "Fuse, tape".into();
        req.resolved_remark = "Replaced fuse".into();
        assert!(is_step_complete(&req, 4).unwrap());
    }

    #[test]
    fn test_approval_step_uses_two_outcome_rule() {
        let mut req = reported_request();
        req.admin_approval_date = "2025-01-20".into();
        assert!(!is_step_complete(&req, 5).unwrap());

        req.admin_approval_status = ApprovalStatus::Approved;
        assert!(is_step_complete(&req, 5).unwrap());

        req.admin_approval_status = ApprovalStatus::Rejected;
        assert!(is_step_complete(&req, 5).unwrap());
    }

    #[test]
    fn test_advance_refused_on_incomplete_step() {
        let mut req = reported_request();
        req.current_step = 2;
        assert!(!can_advance(&req));
        let err = ensure_can_advance(&req).unwrap_err();
        assert!(matches!(err, LabdeskError::StepIncomplete { step: 2, .. }));

        fill_step2(&mut req);
        assert!(can_advance(&req));
        assert!(ensure_can_advance(&req).is_ok());
    }

    #[test]
    fn test_no_next_past_closure() {
        let mut req = reported_request();
        req.current_step = 6;
        assert!(!can_advance(&req));
        assert!(matches!(
            ensure_can_advance(&req),
            Err(LabdeskError::AlreadyAtFinalStep)
        ));
    }

    #[test]
    fn test_previous_always_viewable() {
        let mut req = reported_request();
        assert!(!can_go_back(&req));
        req.current_step = 4;
        assert!(can_go_back(&req));
    }

    #[test]
    fn test_edit_capability_matrix() {
        let mut req = reported_request();
        req.current_step = 3;

        // Owning role at the current step.
        assert!(can_edit(Role::LabAssistant, &req, 3).unwrap());
        // Wrong role at the current step.
        assert!(!can_edit(Role::Admin, &req, 3).unwrap());
        assert!(!can_edit(Role::LabIncharge, &req, 3).unwrap());
        // Owning role, but the record has moved on.
        assert!(!can_edit(Role::LabIncharge, &req, 1).unwrap());
        // Owning role of a future step.
        assert!(!can_edit(Role::Admin, &req, 5).unwrap());
    }

    #[test]
    fn test_decided_approval_closes_to_everyone() {
        let mut req = reported_request();
        req.current_step = 5;
        assert!(can_edit(Role::Admin, &req, 5).unwrap());

        req.admin_approval_status = ApprovalStatus::Rejected;
        assert!(!can_edit(Role::Admin, &req, 5).unwrap());
    }

    #[test]
    fn test_watermark_is_derived_not_stored() {
        let mut req = reported_request();
        fill_step2(&mut req);
        assert_eq!(completed_steps(&req), 2);

        // Blanking an early field pulls the watermark back without any
        // counter to reconcile.
        req.date.clear();
        assert_eq!(completed_steps(&req), 0);
    }
}
