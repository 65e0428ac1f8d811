//! Maintenance request domain models.

use crate::error::{LabdeskError, LabdeskResult};
use labdesk_db::requests::RequestRow;
use serde::{Deserialize, Serialize};

/// A maintenance request ticket.
///
/// One flat record per ticket; every stage of the lifecycle writes into its
/// own slice of fields. String fields left empty mean "not filled in yet".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub id: String,
    pub type_of_problem: ProblemType,
    pub date: String,
    pub department: String,
    pub location: String,
    pub complaint_details: String,
    pub recurring_complaint: bool,
    pub recurring_times: Option<u32>,
    pub lab_assistant: String,
    pub lab_assistant_date: String,
    pub hod: String,
    pub hod_date: String,
    pub assigned_person: String,
    pub in_charge_date: String,
    pub verification_remarks: String,
    pub materials_used: String,
    pub resolved_inhouse: bool,
    pub resolved_remark: String,
    pub consumables_needed: bool,
    pub consumable_details: String,
    pub external_agency_needed: bool,
    pub agency_name: String,
    pub approx_expenditure: String,
    pub admin_approval_status: ApprovalStatus,
    pub admin_approval_date: String,
    pub admin_remarks: String,
    pub completion_remark_lab: String,
    pub lab_completion_name: String,
    pub lab_completion_date: String,
    pub completion_remark_maintenance: String,
    pub maintenance_closed_date: String,
    pub maintenance_closed_signature: String,
    pub current_step: u8,
    pub created_at: String,
    pub updated_at: String,
}

impl MaintenanceRequest {
    /// Create a MaintenanceRequest from a database row.
    ///
    /// Rows are decoded leniently; a step pointer outside 1..=6 from older
    /// data is clamped instead of rejected.
    pub fn from_row(row: RequestRow) -> Self {
        Self {
            id: row.id,
            type_of_problem: ProblemType::from_str(&row.type_of_problem),
            date: row.date,
            department: row.department,
            location: row.location,
            complaint_details: row.complaint_details,
            recurring_complaint: row.recurring_complaint,
            recurring_times: row.recurring_times,
            lab_assistant: row.lab_assistant,
            lab_assistant_date: row.lab_assistant_date,
            hod: row.hod,
            hod_date: row.hod_date,
            assigned_person: row.assigned_person,
            in_charge_date: row.in_charge_date,
            verification_remarks: row.verification_remarks,
            materials_used: row.materials_used,
            resolved_inhouse: row.resolved_inhouse,
            resolved_remark: row.resolved_remark,
            consumables_needed: row.consumables_needed,
            consumable_details: row.consumable_details,
            external_agency_needed: row.external_agency_needed,
            agency_name: row.agency_name,
            approx_expenditure: row.approx_expenditure,
            admin_approval_status: ApprovalStatus::from_str(&row.admin_approval_status),
            admin_approval_date: row.admin_approval_date,
            admin_remarks: row.admin_remarks,
            completion_remark_lab: row.completion_remark_lab,
            lab_completion_name: row.lab_completion_name,
            lab_completion_date: row.lab_completion_date,
            completion_remark_maintenance: row.completion_remark_maintenance,
            maintenance_closed_date: row.maintenance_closed_date,
            maintenance_closed_signature: row.maintenance_closed_signature,
            current_step: row.current_step.clamp(1, 6),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }

    /// Convert back to a database row.
    pub fn to_row(&self) -> RequestRow {
        RequestRow {
            id: self.id.clone(),
            type_of_problem: self.type_of_problem.as_str().to_string(),
            date: self.date.clone(),
            department: self.department.clone(),
            location: self.location.clone(),
            complaint_details: self.complaint_details.clone(),
            recurring_complaint: self.recurring_complaint,
            recurring_times: self.recurring_times,
            lab_assistant: self.lab_assistant.clone(),
            lab_assistant_date: self.lab_assistant_date.clone(),
            hod: self.hod.clone(),
            hod_date: self.hod_date.clone(),
            assigned_person: self.assigned_person.clone(),
            in_charge_date: self.in_charge_date.clone(),
            verification_remarks: self.verification_remarks.clone(),
            materials_used: self.materials_used.clone(),
            resolved_inhouse: self.resolved_inhouse,
            resolved_remark: self.resolved_remark.clone(),
            consumables_needed: self.consumables_needed,
            consumable_details: self.consumable_details.clone(),
            external_agency_needed: self.external_agency_needed,
            agency_name: self.agency_name.clone(),
            approx_expenditure: self.approx_expenditure.clone(),
            admin_approval_status: self.admin_approval_status.as_str().to_string(),
            admin_approval_date: self.admin_approval_date.clone(),
            admin_remarks: self.admin_remarks.clone(),
            completion_remark_lab: self.completion_remark_lab.clone(),
            lab_completion_name: self.lab_completion_name.clone(),
            lab_completion_date: self.lab_completion_date.clone(),
            completion_remark_maintenance: self.completion_remark_maintenance.clone(),
            maintenance_closed_date: self.maintenance_closed_date.clone(),
            maintenance_closed_signature: self.maintenance_closed_signature.clone(),
            current_step: self.current_step,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    /// Resolve a field by name to its stringified value.
    ///
    /// Booleans and numbers are stringified, so a flag field always reads as
    /// populated. Returns None for unknown field names.
    pub fn field_value(&self, field: &str) -> Option<String> {
        let value = match field {
            "type_of_problem" => self.type_of_problem.as_str().to_string(),
            "date" => self.date.clone(),
            "department" => self.department.clone(),
            "location" => self.location.clone(),
            "complaint_details" => self.complaint_details.clone(),
            "recurring_complaint" => self.recurring_complaint.to_string(),
            "recurring_times" => self
                .recurring_times
                .map(|n| n.to_string())
                .unwrap_or_default(),
            "lab_assistant" => self.lab_assistant.clone(),
            "lab_assistant_date" => self.lab_assistant_date.clone(),
            "hod" => self.hod.clone(),
            "hod_date" => self.hod_date.clone(),
            "assigned_person" => self.assigned_person.clone(),
            "in_charge_date" => self.in_charge_date.clone(),
            "verification_remarks" => self.verification_remarks.clone(),
            "materials_used" => self.materials_used.clone(),
            "resolved_inhouse" => self.resolved_inhouse.to_string(),
            "resolved_remark" => self.resolved_remark.clone(),
            "consumables_needed" => self.consumables_needed.to_string(),
            "consumable_details" => self.consumable_details.clone(),
            "external_agency_needed" => self.external_agency_needed.to_string(),
            "agency_name" => self.agency_name.clone(),
            "approx_expenditure" => self.approx_expenditure.clone(),
            "admin_approval_status" => self.admin_approval_status.as_str().to_string(),
            "admin_approval_date" => self.admin_approval_date.clone(),
            "admin_remarks" => self.admin_remarks.clone(),
            "completion_remark_lab" => self.completion_remark_lab.clone(),
            "lab_completion_name" => self.lab_completion_name.clone(),
            "lab_completion_date" => self.lab_completion_date.clone(),
            "completion_remark_maintenance" => self.completion_remark_maintenance.clone(),
            "maintenance_closed_date" => self.maintenance_closed_date.clone(),
            "maintenance_closed_signature" => self.maintenance_closed_signature.clone(),
            _ => return None,
        };
        Some(value)
    }

    /// Apply a single named field from its string form.
    ///
    /// Values arrive stringified from the API layer; flags and counters are
    /// parsed back here. Unknown fields and unparsable values are rejected.
    pub fn apply_field(&mut self, field: &str, value: &str) -> LabdeskResult<()> {
        match field {
            "type_of_problem" => {
                self.type_of_problem = ProblemType::parse(value).ok_or_else(|| {
                    LabdeskError::validation(format!("Unknown problem type '{}'", value))
                })?;
            }
            "date" => self.date = value.to_string(),
            "department" => self.department = value.to_string(),
            "location" => self.location = value.to_string(),
            "complaint_details" => self.complaint_details = value.to_string(),
            "recurring_complaint" => self.recurring_complaint = parse_flag(value),
            "recurring_times" => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    self.recurring_times = None;
                } else {
                    let n: u32 = trimmed.parse().map_err(|_| {
                        LabdeskError::validation(format!(
                            "recurring_times must be a positive integer, got '{}'",
                            value
                        ))
                    })?;
                    if n == 0 {
                        return Err(LabdeskError::validation(
                            "recurring_times must be a positive integer",
                        ));
                    }
                    self.recurring_times = Some(n);
                }
            }
            "lab_assistant" => self.lab_assistant = value.to_string(),
            "lab_assistant_date" => self.lab_assistant_date = value.to_string(),
            "hod" => self.hod = value.to_string(),
            "hod_date" => self.hod_date = value.to_string(),
            "assigned_person" => self.assigned_person = value.to_string(),
            "in_charge_date" => self.in_charge_date = value.to_string(),
            "verification_remarks" => self.verification_remarks = value.to_string(),
            "materials_used" => self.materials_used = value.to_string(),
            "resolved_inhouse" => self.resolved_inhouse = parse_flag(value),
            "resolved_remark" => self.resolved_remark = value.to_string(),
            "consumables_needed" => self.consumables_needed = parse_flag(value),
            "consumable_details" => self.consumable_details = value.to_string(),
            "external_agency_needed" => self.external_agency_needed = parse_flag(value),
            "agency_name" => self.agency_name = value.to_string(),
            "approx_expenditure" => self.approx_expenditure = value.to_string(),
            "completion_remark_lab" => self.completion_remark_lab = value.to_string(),
            "lab_completion_name" => self.lab_completion_name = value.to_string(),
            "lab_completion_date" => self.lab_completion_date = value.to_string(),
            "completion_remark_maintenance" => {
                self.completion_remark_maintenance = value.to_string()
            }
            "maintenance_closed_date" => self.maintenance_closed_date = value.to_string(),
            "maintenance_closed_signature" => {
                self.maintenance_closed_signature = value.to_string()
            }
            _ => {
                return Err(LabdeskError::validation(format!(
                    "Unknown field '{}'",
                    field
                )))
            }
        }
        Ok(())
    }

    /// Clear dependent fields whose governing flag is off.
    ///
    /// Invariant: `recurring_times`, `consumable_details` and the external
    /// agency fields are meaningful only while their flag is set. Called on
    /// every save so a flag flipped back to false cannot leave stale data.
    pub fn normalize_conditionals(&mut self) {
        if !self.recurring_complaint {
            self.recurring_times = None;
        }
        if !self.consumables_needed {
            self.consumable_details.clear();
        }
        if !self.external_agency_needed {
            self.agency_name.clear();
            self.approx_expenditure.clear();
        }
    }
}

/// Parse a stringified checkbox value.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Category of the reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    System,
    Furniture,
    Civil,
    Electrical,
    Workshop,
}

impl ProblemType {
    /// Parse from string, rejecting unknown categories.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "system" => Some(Self::System),
            "furniture" => Some(Self::Furniture),
            "civil" => Some(Self::Civil),
            "electrical" => Some(Self::Electrical),
            "workshop" => Some(Self::Workshop),
            _ => None,
        }
    }

    /// Parse from a stored row value, defaulting unknowns.
    pub fn from_str(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::System)
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Furniture => "furniture",
            Self::Civil => "civil",
            Self::Electrical => "electrical",
            Self::Workshop => "workshop",
        }
    }
}

/// Outcome of the admin approval stage.
///
/// Stored as an empty string while pending, so a fresh record reads as
/// incomplete at the approval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Unset,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Parse from a stored row value.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            _ => Self::Unset,
        }
    }

    /// Convert to the stored string form. Pending is the empty string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether a terminal decision has been recorded.
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Unset)
    }
}

/// An admin decision on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "approve" | "approved" => Some(Self::Approve),
            "reject" | "rejected" => Some(Self::Reject),
            _ => None,
        }
    }

    /// The approval status this decision records.
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_request() -> MaintenanceRequest {
        MaintenanceRequest::from_row(RequestRow::new(
            "req-1",
            "electrical",
            "2025-01-10",
            "Physics",
            "Lab 3",
            "Socket sparks when a scope is plugged in",
        ))
    }

    #[test]
    fn test_problem_type_round_trip() {
        for s in ["system", "furniture", "civil", "electrical", "workshop"] {
            assert_eq!(ProblemType::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(ProblemType::parse("plumbing"), None);
    }

    #[test]
    fn test_approval_status_pending_is_empty_string() {
        assert_eq!(ApprovalStatus::Unset.as_str(), "");
        assert_eq!(ApprovalStatus::from_str(""), ApprovalStatus::Unset);
        assert!(!ApprovalStatus::Unset.is_decided());
        assert!(ApprovalStatus::Rejected.is_decided());
    }

    #[test]
    fn test_field_value_stringifies_flags() {
        let req = blank_request();
        assert_eq!(req.field_value("recurring_complaint").unwrap(), "false");
        assert_eq!(req.field_value("recurring_times").unwrap(), "");
        assert_eq!(req.field_value("type_of_problem").unwrap(), "electrical");
        assert_eq!(req.field_value("no_such_field"), None);
    }

    #[test]
    fn test_apply_field_parses_counter() {
        let mut req = blank_request();
        req.apply_field("recurring_complaint", "true").unwrap();
        req.apply_field("recurring_times", "3").unwrap();
        assert_eq!(req.recurring_times, Some(3));

        assert!(req.apply_field("recurring_times", "zero").is_err());
        assert!(req.apply_field("recurring_times", "0").is_err());
    }

    #[test]
    fn test_apply_field_rejects_unknown() {
        let mut req = blank_request();
        assert!(req.apply_field("favorite_color", "blue").is_err());
        assert!(req.apply_field("type_of_problem", "plumbing").is_err());
    }

    #[test]
    fn test_normalize_clears_stale_dependents() {
        let mut req = blank_request();
        req.recurring_complaint = true;
        req.recurring_times = Some(4);
        req.consumables_needed = true;
        req.consumable_details = "Fuse wire".to_string();
        req.external_agency_needed = true;
        req.agency_name = "Siemens".to_string();
        req.approx_expenditure = "1500".to_string();

        req.recurring_complaint = false;
        req.consumables_needed = false;
        req.external_agency_needed = false;
        req.normalize_conditionals();

        assert_eq!(req.recurring_times, None);
        assert!(req.consumable_details.is_empty());
        assert!(req.agency_name.is_empty());
        assert!(req.approx_expenditure.is_empty());
    }

    #[test]
    fn test_from_row_clamps_step_pointer() {
        let mut row = RequestRow::new("req-2", "civil", "2025-02-01", "Chem", "Lab 1", "Crack");
        row.current_step = 9;
        assert_eq!(MaintenanceRequest::from_row(row).current_step, 6);
    }
}
