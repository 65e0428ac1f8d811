//! Maintenance request queries — Redis implementation.
//!
//! Each request is a hash at `labdesk:request:{id}` holding the JSON row
//! under `data` and the current step under `step`. Listing goes through the
//! `labdesk:requests:all` sorted set (scored by creation time) and a
//! per-step set index that is moved whenever the step pointer changes.

use crate::client::{DbError, DbPool, DbResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

/// Highest step ordinal, used to enumerate the step indexes.
const LAST_STEP: u8 = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRow {
    pub id: String,
    pub type_of_problem: String,
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
    pub admin_approval_status: String,
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

impl RequestRow {
    /// Build a fresh row at step 1 with every later-stage field empty.
    pub fn new(
        id: &str,
        type_of_problem: &str,
        date: &str,
        department: &str,
        location: &str,
        complaint_details: &str,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.to_string(),
            type_of_problem: type_of_problem.to_string(),
            date: date.to_string(),
            department: department.to_string(),
            location: location.to_string(),
            complaint_details: complaint_details.to_string(),
            recurring_complaint: false,
            recurring_times: None,
            lab_assistant: String::new(),
            lab_assistant_date: String::new(),
            hod: String::new(),
            hod_date: String::new(),
            assigned_person: String::new(),
            in_charge_date: String::new(),
            verification_remarks: String::new(),
            materials_used: String::new(),
            resolved_inhouse: false,
            resolved_remark: String::new(),
            consumables_needed: false,
            consumable_details: String::new(),
            external_agency_needed: false,
            agency_name: String::new(),
            approx_expenditure: String::new(),
            admin_approval_status: String::new(),
            admin_approval_date: String::new(),
            admin_remarks: String::new(),
            completion_remark_lab: String::new(),
            lab_completion_name: String::new(),
            lab_completion_date: String::new(),
            completion_remark_maintenance: String::new(),
            maintenance_closed_date: String::new(),
            maintenance_closed_signature: String::new(),
            current_step: 1,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

fn request_key(id: &str) -> String {
    format!("labdesk:request:{}", id)
}

fn all_key() -> String {
    "labdesk:requests:all".to_string()
}

fn step_key(step: u8) -> String {
    format!("labdesk:requests:step:{}", step)
}

/// Persist a newly created request.
pub async fn create_request(pool: &DbPool, row: &RequestRow) -> DbResult<()> {
    let mut conn = pool.clone();
    let key = request_key(&row.id);
    let json = serde_json::to_string(row)?;
    conn.hset::<_, _, _, ()>(&key, "data", &json).await?;
    conn.hset::<_, _, _, ()>(&key, "step", row.current_step).await?;

    let score = chrono::DateTime::parse_from_rfc3339(&row.created_at)
        .map(|t| t.timestamp())
        .unwrap_or_default();
    conn.zadd::<_, _, _, ()>(all_key(), &row.id, score).await?;
    conn.sadd::<_, _, ()>(step_key(row.current_step), &row.id).await?;

    Ok(())
}

/// Fetch one request by id.
pub async fn get_request(pool: &DbPool, id: &str) -> DbResult<RequestRow> {
    let mut conn = pool.clone();
    let json: Option<String> = conn.hget(request_key(id), "data").await?;
    match json {
        Some(j) => Ok(serde_json::from_str(&j)?),
        None => Err(DbError::NotFound(format!("Request not found: {}", id))),
    }
}

/// List all requests in creation order.
pub async fn list_requests(pool: &DbPool) -> DbResult<Vec<RequestRow>> {
    let mut conn = pool.clone();
    let ids: Vec<String> = conn.zrange(all_key(), 0, -1).await?;
    let mut rows = Vec::new();
    for id in ids {
        let mut c = pool.clone();
        let json: Option<String> = c.hget(request_key(&id), "data").await?;
        if let Some(j) = json {
            if let Ok(row) = serde_json::from_str::<RequestRow>(&j) {
                rows.push(row);
            }
        }
    }
    Ok(rows)
}

/// List requests currently parked at a given step.
pub async fn list_requests_by_step(pool: &DbPool, step: u8) -> DbResult<Vec<RequestRow>> {
    let mut conn = pool.clone();
    let ids: Vec<String> = conn.smembers(step_key(step)).await?;
    let mut rows = Vec::new();
    for id in ids {
        if let Ok(row) = get_request(pool, &id).await {
            rows.push(row);
        }
    }
    Ok(rows)
}

/// Count requests currently parked at a given step.
pub async fn count_requests_by_step(pool: &DbPool, step: u8) -> DbResult<i64> {
    let mut conn = pool.clone();
    let count: i64 = conn.scard(step_key(step)).await?;
    Ok(count)
}

/// Overwrite a request row, moving the step index if the pointer changed.
pub async fn update_request(pool: &DbPool, row: &RequestRow) -> DbResult<()> {
    let mut conn = pool.clone();
    let key = request_key(&row.id);

    let old_step: Option<u8> = conn.hget(&key, "step").await?;
    if old_step.is_none() {
        return Err(DbError::NotFound(format!("Request not found: {}", row.id)));
    }

    let mut updated = row.clone();
    updated.updated_at = chrono::Utc::now().to_rfc3339();
    conn.hset::<_, _, _, ()>(&key, "data", serde_json::to_string(&updated)?).await?;
    conn.hset::<_, _, _, ()>(&key, "step", updated.current_step).await?;

    if let Some(old) = old_step {
        if old != updated.current_step {
            tracing::debug!(request_id = %row.id, from = old, to = updated.current_step, "Moving step index");
            conn.srem::<_, _, ()>(step_key(old), &row.id).await?;
            conn.sadd::<_, _, ()>(step_key(updated.current_step), &row.id).await?;
        }
    }

    Ok(())
}

/// Per-step request counts for the dashboard summary.
pub async fn counts_by_step(pool: &DbPool) -> DbResult<Vec<(u8, i64)>> {
    let mut counts = Vec::new();
    for step in 1..=LAST_STEP {
        counts.push((step, count_requests_by_step(pool, step).await?));
    }
    Ok(counts)
}
