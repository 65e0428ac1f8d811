//! Export route handlers: CSV download and printable HTML form.
//!
//! Failures surface to the caller once; nothing here retries. The
//! printable form is what the document/PDF collaborator consumes.

use askama::Template;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::routes::error_response;
use crate::state::AppState;
use labdesk_core::export;
use labdesk_core::request;

#[derive(Template)]
#[template(path = "request_form.html")]
struct RequestFormTemplate {
    request_id: String,
    current_step: u8,
    sections: Vec<SectionView>,
}

/// View model for one step section of the printable form.
struct SectionView {
    ordinal: u8,
    title: String,
    fields: Vec<FieldRowView>,
}

struct FieldRowView {
    label: String,
    value: String,
}

pub async fn export_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let req = request::get_request(&state.db, &id)
        .await
        .map_err(error_response)?;

    let csv = export::to_csv(&req);
    let disposition = format!("attachment; filename=\"request-{}.csv\"", req.id);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

pub async fn export_html(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    let req = request::get_request(&state.db, &id)
        .await
        .map_err(error_response)?;

    let sections = export::snapshot(&req)
        .into_iter()
        .map(|s| SectionView {
            ordinal: s.ordinal,
            title: s.title.to_string(),
            fields: s
                .fields
                .into_iter()
                .map(|f| FieldRowView {
                    label: f.label.to_string(),
                    value: f.value,
                })
                .collect(),
        })
        .collect();

    let template = RequestFormTemplate {
        request_id: req.id.clone(),
        current_step: req.current_step,
        sections,
    };

    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!(request_id = %id, error = %e, "Export rendering failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Export failed: {}", e),
            ))
        }
    }
}
