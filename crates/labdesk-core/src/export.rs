//! Render and export adapters.
//!
//! A record flattens to a deterministic ordered list of (label, value)
//! pairs following the step table's field order. Missing values render as
//! a dash; fields whose governing flag is off are omitted entirely, even
//! if stale data is still sitting in storage. The printable/PDF side of
//! the house consumes this flattened form.

use crate::error::LabdeskResult;
use crate::identity::Role;
use crate::request::model::MaintenanceRequest;
use crate::workflow::{self, STEPS};
use serde::Serialize;

/// Placeholder for values not filled in yet.
pub const EMPTY_PLACEHOLDER: &str = "—";

/// Checkbox-backed fields, displayed as Yes/No on exports.
const FLAG_FIELDS: &[&str] = &[
    "recurring_complaint",
    "resolved_inhouse",
    "consumables_needed",
    "external_agency_needed",
];

/// One exported field.
#[derive(Debug, Clone, Serialize)]
pub struct ExportField {
    pub field: &'static str,
    pub label: &'static str,
    pub value: String,
}

/// One step's worth of exported fields.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSection {
    pub ordinal: u8,
    pub title: &'static str,
    pub fields: Vec<ExportField>,
}

/// One field of a rendered step view, with its edit capability for the
/// calling role. Evaluated per field render; viewing is always allowed.
#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub field: &'static str,
    pub label: &'static str,
    pub value: String,
    pub editable: bool,
}

/// Human label for a field name.
pub fn label(field: &str) -> &'static str {
    match field {
        "type_of_problem" => "Type of problem",
        "date" => "Date",
        "department" => "Department",
        "location" => "Location",
        "complaint_details" => "Complaint details",
        "recurring_complaint" => "Recurring complaint",
        "recurring_times" => "Times recurred",
        "lab_assistant" => "Lab assistant",
        "lab_assistant_date" => "Lab assistant date",
        "hod" => "HOD",
        "hod_date" => "HOD date",
        "assigned_person" => "Assigned person",
        "in_charge_date" => "In-charge date",
        "verification_remarks" => "Verification remarks",
        "materials_used" => "Materials used",
        "resolved_inhouse" => "Resolved in-house",
        "resolved_remark" => "Resolution remark",
        "consumables_needed" => "Consumables needed",
        "consumable_details" => "Consumable details",
        "external_agency_needed" => "External agency needed",
        "agency_name" => "Agency name",
        "approx_expenditure" => "Approx. expenditure",
        "admin_approval_status" => "Approval status",
        "admin_approval_date" => "Approval date",
        "admin_remarks" => "Admin remarks",
        "completion_remark_lab" => "Completion remark (lab)",
        "lab_completion_name" => "Completed by (lab)",
        "lab_completion_date" => "Completion date (lab)",
        "completion_remark_maintenance" => "Completion remark (maintenance)",
        "maintenance_closed_date" => "Closed date",
        "maintenance_closed_signature" => "Closed by",
        _ => "Unknown field",
    }
}

/// Whether a field is currently suppressed by its governing flag.
fn suppressed(record: &MaintenanceRequest, field: &str) -> bool {
    match field {
        "recurring_times" => !record.recurring_complaint,
        "consumable_details" => !record.consumables_needed,
        "agency_name" | "approx_expenditure" => !record.external_agency_needed,
        _ => false,
    }
}

/// Display form of a field value: flags as Yes/No, blanks as-is.
fn display_value(record: &MaintenanceRequest, field: &str) -> String {
    let raw = record.field_value(field).unwrap_or_default();
    if FLAG_FIELDS.contains(&field) {
        return if raw == "true" { "Yes" } else { "No" }.to_string();
    }
    raw
}

/// Flatten a record snapshot, grouped by step, in step-table order.
pub fn snapshot(record: &MaintenanceRequest) -> Vec<ExportSection> {
    STEPS
        .iter()
        .map(|def| {
            let fields = def
                .editable_fields
                .iter()
                .copied()
                .filter(|f| !suppressed(record, f))
                .map(|f| {
                    let value = display_value(record, f);
                    ExportField {
                        field: f,
                        label: label(f),
                        value: if value.trim().is_empty() {
                            EMPTY_PLACEHOLDER.to_string()
                        } else {
                            value
                        },
                    }
                })
                .collect();
            ExportSection {
                ordinal: def.ordinal,
                title: def.title,
                fields,
            }
        })
        .collect()
}

/// CSV rendering of the snapshot: one `step,field,value` line per field.
pub fn to_csv(record: &MaintenanceRequest) -> String {
    let mut out = String::from("Step,Field,Value\n");
    for section in snapshot(record) {
        for field in section.fields {
            out.push_str(&format!(
                "{},{},{}\n",
                csv_escape(section.title),
                csv_escape(field.label),
                csv_escape(&field.value)
            ));
        }
    }
    out
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render one step of the record for a role's screen: raw values plus the
/// per-field edit capability.
pub fn render_step(
    record: &MaintenanceRequest,
    role: Role,
    ordinal: u8,
) -> LabdeskResult<Vec<FieldView>> {
    let def = workflow::step(ordinal)?;
    let editable = workflow::can_edit(role, record, ordinal)?;

    Ok(def
        .editable_fields
        .iter()
        .copied()
        .map(|f| FieldView {
            field: f,
            label: label(f),
            value: record.field_value(f).unwrap_or_default(),
            editable,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use labdesk_db::requests::RequestRow;

    fn reported_request() -> MaintenanceRequest {
        MaintenanceRequest::from_row(RequestRow::new(
            "req-1",
            "electrical",
            "2025-01-10",
            "Physics",
            "Lab 3",
            "Socket sparks, scope trips the breaker",
        ))
    }

    #[test]
    fn test_snapshot_follows_step_order() {
        let snap = snapshot(&reported_request());
        let ordinals: Vec<u8> = snap.iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(snap[0].fields[0].label, "Type of problem");
        assert_eq!(snap[0].fields[0].value, "electrical");
    }

    #[test]
    fn test_missing_values_render_as_dash() {
        let snap = snapshot(&reported_request());
        let signoff = &snap[1];
        assert!(signoff.fields.iter().all(|f| f.value == EMPTY_PLACEHOLDER));
    }

    #[test]
    fn test_stale_conditional_field_omitted() {
        let mut req = reported_request();
        // Stale value in storage with the governing flag off.
        req.consumables_needed = false;
        req.consumable_details = "Left over from an earlier edit".to_string();

        let snap = snapshot(&req);
        let corrective = &snap[3];
        assert!(corrective
            .fields
            .iter()
            .all(|f| f.field != "consumable_details"));
    }

    #[test]
    fn test_conditional_field_present_when_flag_set() {
        let mut req = reported_request();
        req.recurring_complaint = true;
        req.recurring_times = Some(3);

        let snap = snapshot(&req);
        let report = &snap[0];
        let times = report
            .fields
            .iter()
            .find(|f| f.field == "recurring_times")
            .unwrap();
        assert_eq!(times.value, "3");
    }

    #[test]
    fn test_flags_display_as_yes_no() {
        let mut req = reported_request();
        req.resolved_inhouse = true;
        let snap = snapshot(&req);
        let resolved = snap[3]
            .fields
            .iter()
            .find(|f| f.field == "resolved_inhouse")
            .unwrap();
        assert_eq!(resolved.value, "Yes");
    }

    #[test]
    fn test_csv_escapes_embedded_commas() {
        let req = reported_request();
        let csv = to_csv(&req);
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "Step,Field,Value");
        assert!(csv.contains("\"Socket sparks, scope trips the breaker\""));
    }

    #[test]
    fn test_render_step_editability() {
        let req = reported_request();
        let fields = render_step(&req, Role::LabIncharge, 1).unwrap();
        assert!(fields.iter().all(|f| f.editable));

        // Same step, wrong role: values visible, nothing editable.
        let fields = render_step(&req, Role::Admin, 1).unwrap();
        assert!(fields.iter().all(|f| !f.editable));
        assert_eq!(fields[0].value, "electrical");

        // Future step: viewable, not editable even for its owner.
        let fields = render_step(&req, Role::LabAssistant, 3).unwrap();
        assert!(fields.iter().all(|f| !f.editable));

        // Unknown ordinal is rejected.
        assert!(render_step(&req, Role::Admin, 9).is_err());
    }
}
