//! Caller identity extraction.
//!
//! Authentication happens upstream (reverse proxy / SSO); the session
//! collaborator forwards the caller's role and display name as headers.
//! This module only decodes them — authorization decisions live in the
//! core operations, keyed by (role, step, field).

use axum::http::{HeaderMap, StatusCode};
use labdesk_core::identity::{Role, Session};

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-labdesk-role";

/// Header carrying the caller's display name.
pub const USER_HEADER: &str = "x-labdesk-user";

/// Decode the calling session from request headers.
///
/// Missing or unknown roles are a 401: the route needs an identity and the
/// session layer did not provide a usable one.
pub fn session_from_headers(headers: &HeaderMap) -> Result<Session, (StatusCode, String)> {
    let role_value = headers
        .get(ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                format!("Missing {} header", ROLE_HEADER),
            )
        })?;

    let role = Role::parse(role_value).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            format!("Unknown role '{}'", role_value),
        )
    })?;

    let name = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(role.display_name())
        .to_string();

    Ok(Session::new(role, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, "lab_incharge".parse().unwrap());
        headers.insert(USER_HEADER, "S. Rao".parse().unwrap());
        let session = session_from_headers(&headers).unwrap();
        assert_eq!(session.role, Role::LabIncharge);
        assert_eq!(session.name, "S. Rao");
    }

    #[test]
    fn test_missing_role_is_unauthorized() {
        let headers = HeaderMap::new();
        let (status, _) = session_from_headers(&headers).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unknown_role_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(ROLE_HEADER, "superuser".parse().unwrap());
        let (status, _) = session_from_headers(&headers).unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
