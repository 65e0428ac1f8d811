//! Maintenance request route handlers.
//!
//! Mutating routes decode the caller's session and hand role, step and
//! fields to the core operations — the authorization check happens there,
//! on every write, regardless of what the client rendered as disabled.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::session_from_headers;
use crate::routes::error_response;
use crate::state::AppState;
use labdesk_core::export::{self, FieldView};
use labdesk_core::request::{self, model, NewRequest, Summary};
use labdesk_core::workflow;
use labdesk_db::WebSocketMessage;

#[derive(Deserialize)]
pub struct ListParams {
    pub step: Option<u8>,
    #[serde(rename = "type")]
    pub problem_type: Option<String>,
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub decision: String,
    pub remarks: Option<String>,
}

/// Rendered view of one step for the calling role.
#[derive(Serialize)]
pub struct StepViewResponse {
    pub request_id: String,
    pub step: u8,
    pub title: String,
    pub owning_role: String,
    pub current_step: u8,
    pub completed_steps: u8,
    pub can_advance: bool,
    pub can_go_back: bool,
    pub editable: bool,
    pub fields: Vec<FieldView>,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<model::MaintenanceRequest>>, (StatusCode, String)> {
    let problem_type = match params.problem_type.as_deref() {
        Some(raw) => Some(model::ProblemType::parse(raw).ok_or((
            StatusCode::BAD_REQUEST,
            format!("Unknown problem type '{}'", raw),
        ))?),
        None => None,
    };

    let requests = request::list_requests(&state.db, params.step, problem_type)
        .await
        .map_err(error_response)?;

    Ok(Json(requests))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<model::MaintenanceRequest>, (StatusCode, String)> {
    let req = request::get_request(&state.db, &id)
        .await
        .map_err(error_response)?;
    Ok(Json(req))
}

pub async fn create_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewRequest>,
) -> Result<(StatusCode, Json<model::MaintenanceRequest>), (StatusCode, String)> {
    let session = session_from_headers(&headers)?;

    let req = request::create_request(&state.db, session.role, &body)
        .await
        .map_err(error_response)?;

    state.broadcast(WebSocketMessage::DashboardRefresh);

    Ok((StatusCode::CREATED, Json(req)))
}

/// Viewing is free for any role; editability comes back per field.
pub async fn view_step(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, step)): Path<(String, u8)>,
) -> Result<Json<StepViewResponse>, (StatusCode, String)> {
    let session = session_from_headers(&headers)?;
    let req = request::get_request(&state.db, &id)
        .await
        .map_err(error_response)?;

    let def = workflow::step(step).map_err(error_response)?;
    let fields = export::render_step(&req, session.role, step).map_err(error_response)?;
    let editable = workflow::can_edit(session.role, &req, step).map_err(error_response)?;

    Ok(Json(StepViewResponse {
        request_id: req.id.clone(),
        step,
        title: def.title.to_string(),
        owning_role: def.owning_role.as_str().to_string(),
        current_step: req.current_step,
        completed_steps: workflow::completed_steps(&req),
        can_advance: workflow::can_advance(&req),
        can_go_back: workflow::can_go_back(&req),
        editable,
        fields,
    }))
}

pub async fn save_step(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, step)): Path<(String, u8)>,
    Json(body): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<model::MaintenanceRequest>, (StatusCode, String)> {
    let session = session_from_headers(&headers)?;

    let fields: Vec<(String, String)> = body
        .iter()
        .map(|(k, v)| (k.clone(), stringify(v)))
        .collect();

    let req = request::save_step(&state.db, &id, session.role, step, &fields)
        .await
        .map_err(error_response)?;

    state.broadcast(WebSocketMessage::RequestUpdated {
        request_id: req.id.clone(),
        step: req.current_step,
    });

    Ok(Json(req))
}

pub async fn advance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<model::MaintenanceRequest>, (StatusCode, String)> {
    let session = session_from_headers(&headers)?;

    let req = request::advance_request(&state.db, &id, session.role)
        .await
        .map_err(error_response)?;

    state.broadcast(WebSocketMessage::RequestUpdated {
        request_id: req.id.clone(),
        step: req.current_step,
    });

    Ok(Json(req))
}

pub async fn decision(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<model::MaintenanceRequest>, (StatusCode, String)> {
    let session = session_from_headers(&headers)?;

    let decision = model::Decision::parse(&body.decision).ok_or((
        StatusCode::BAD_REQUEST,
        format!("Unknown decision '{}'", body.decision),
    ))?;

    let req = request::record_decision(
        &state.db,
        &id,
        session.role,
        decision,
        body.remarks.as_deref(),
    )
    .await
    .map_err(error_response)?;

    state.broadcast(WebSocketMessage::DecisionRecorded {
        request_id: req.id.clone(),
        status: req.admin_approval_status.as_str().to_string(),
    });

    Ok(Json(req))
}

pub async fn summary(
    State(state): State<AppState>,
) -> Result<Json<Summary>, (StatusCode, String)> {
    let summary = request::get_summary(&state.db)
        .await
        .map_err(error_response)?;
    Ok(Json(summary))
}

/// Stringify a JSON value the way the completion evaluator expects:
/// numbers and booleans become their text form, null becomes empty.
fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
