//! Backend error bodies → [`PortalError`].
//!
//! Bodies are read in order: `detail`, then `message`, then per-field arrays
//! (`{"email": ["..."]}`).

use portal_core::{FieldErrors, PortalError};

use crate::transport::ApiResponse;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "An account with this email already exists.";
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials. Please try again.";
pub const INVALID_ADMIN_CREDENTIALS_MESSAGE: &str = "Invalid admin credentials. Please try again.";

/// Which call produced the response; a few statuses read differently per
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Resource,
    CustomerLogin,
    AdminLogin,
    Register,
}

/// Map a non-success response to an error.
pub fn from_response(response: &ApiResponse, context: ErrorContext) -> PortalError {
    let body = ErrorBody::parse(&response.body);
    let status = response.status;

    if context == ErrorContext::Register && body.fields.contains("email") {
        return PortalError::conflict(DUPLICATE_EMAIL_MESSAGE);
    }

    match (status, context) {
        (400 | 401 | 403, ErrorContext::CustomerLogin) => {
            PortalError::auth(body.message().unwrap_or(INVALID_CREDENTIALS_MESSAGE))
        }
        (400 | 401 | 403, ErrorContext::AdminLogin) => {
            PortalError::auth(body.message().unwrap_or(INVALID_ADMIN_CREDENTIALS_MESSAGE))
        }
        (401 | 403, _) => PortalError::auth(
            body.message()
                .unwrap_or("Authentication credentials were not provided or are invalid."),
        ),
        (409, ErrorContext::Register) => PortalError::conflict(DUPLICATE_EMAIL_MESSAGE),
        (409, _) => PortalError::conflict(body.message().unwrap_or("Conflict")),
        (400, _) if !body.fields.is_empty() => PortalError::Validation(body.fields),
        _ => PortalError::Http {
            status,
            message: body
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| default_reason(status)),
        },
    }
}

#[derive(Debug, Default)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
    fields: FieldErrors,
}

impl ErrorBody {
    fn parse(raw: &str) -> Self {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(raw)
        else {
            return Self::default();
        };

        let mut body = Self::default();
        for (key, value) in map {
            match (key.as_str(), value) {
                ("detail", serde_json::Value::String(s)) => body.detail = Some(s),
                ("message", serde_json::Value::String(s)) => body.message = Some(s),
                (_, serde_json::Value::Array(items)) => {
                    if let Some(first) = items.iter().find_map(|v| v.as_str()) {
                        body.fields.add(key, first);
                    }
                }
                (_, serde_json::Value::String(s)) => body.fields.add(key, s),
                _ => {}
            }
        }
        body
    }

    fn message(&self) -> Option<&str> {
        self.detail.as_deref().or(self.message.as_deref())
    }
}

fn default_reason(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Request failed")
        .to_string()
}
