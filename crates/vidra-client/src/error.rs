//! Structured errors for API calls.
//!
//! Every failure that crosses the transport seam is an [`ApiError`]; the
//! CLI converts it to user-facing text via [`ApiError::user_message`].

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Categories of API errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection, DNS or timeout failure before an HTTP status existed.
    Transport,
    /// HTTP status error (4xx, 5xx) with whatever body the server sent.
    Status,
    /// The response arrived but its body could not be decoded.
    Decode,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Status => write!(f, "status"),
            ApiErrorKind::Decode => write!(f, "decode"),
        }
    }
}

/// Structured failure from an API call.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category.
    pub kind: ApiErrorKind,
    /// HTTP status code, when one was received.
    pub status: Option<u16>,
    /// One-line summary suitable for display.
    pub message: String,
    /// Parsed JSON body of the failure response, if any.
    pub body: Option<Value>,
    /// Field-level validation errors from a 400 body (`{"errors": {...}}`).
    pub field_errors: BTreeMap<String, String>,
}

impl ApiError {
    /// Creates a transport-level error (no HTTP status available).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: None,
            message: message.into(),
            body: None,
            field_errors: BTreeMap::new(),
        }
    }

    /// Creates a decode error for a body that failed to parse.
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            status: None,
            message: message.into(),
            body: None,
            field_errors: BTreeMap::new(),
        }
    }

    /// Creates an HTTP status error from the status code and raw body.
    ///
    /// Pulls a cleaner message out of `{"message": ...}` when the body is
    /// JSON, and collects `{"errors": {field: msg}}` into `field_errors`.
    pub fn http_status(status: u16, body_text: &str) -> Self {
        let body: Option<Value> = serde_json::from_str(body_text).ok();

        let mut field_errors = BTreeMap::new();
        if let Some(errors) = body.as_ref().and_then(|b| b.get("errors")).and_then(Value::as_object)
        {
            for (field, msg) in errors {
                if let Some(msg) = msg.as_str() {
                    field_errors.insert(field.clone(), msg.to_string());
                }
            }
        }

        let message = match body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
        {
            Some(msg) => format!("HTTP {status}: {msg}"),
            None => format!("HTTP {status}"),
        };

        Self {
            kind: ApiErrorKind::Status,
            status: Some(status),
            message,
            body,
            field_errors,
        }
    }

    /// HTTP status code of the failure, when one was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    pub fn is_access_denied(&self) -> bool {
        self.status == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status == Some(409)
    }

    /// User-facing rendering of the failure.
    ///
    /// 401 never reaches this path during normal operation; the
    /// reauthentication interceptor absorbs it unless the retry also fails.
    pub fn user_message(&self) -> String {
        match self.status {
            Some(401) => "Not authenticated. Run `vidra login` first.".to_string(),
            Some(403) => "Access denied.".to_string(),
            Some(404) => "Not found.".to_string(),
            Some(409) => "Conflict: the resource already exists.".to_string(),
            Some(400) if !self.field_errors.is_empty() => {
                let fields: Vec<String> = self
                    .field_errors
                    .iter()
                    .map(|(field, msg)| format!("{field}: {msg}"))
                    .collect();
                fields.join("; ")
            }
            _ => self.message.clone(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::transport(err.to_string())
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: a JSON body with `message` is folded into the summary line.
    #[test]
    fn test_http_status_extracts_message() {
        let err = ApiError::http_status(500, r#"{"message":"database is down"}"#);
        assert_eq!(err.kind, ApiErrorKind::Status);
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.message, "HTTP 500: database is down");
    }

    /// Test: 400 bodies with structured field errors map field -> message.
    #[test]
    fn test_http_status_collects_field_errors() {
        let err = ApiError::http_status(
            400,
            r#"{"errors":{"Email":"already taken","Password":"too short"}}"#,
        );
        assert_eq!(err.field_errors.len(), 2);
        assert_eq!(err.field_errors["Email"], "already taken");
        assert!(err.user_message().contains("Password: too short"));
    }

    /// Test: non-JSON bodies degrade to a bare status summary.
    #[test]
    fn test_http_status_non_json_body() {
        let err = ApiError::http_status(502, "<html>bad gateway</html>");
        assert_eq!(err.message, "HTTP 502");
        assert!(err.body.is_none());
    }

    /// Test: taxonomy helpers match the intended statuses.
    #[test]
    fn test_status_predicates() {
        assert!(ApiError::http_status(401, "").is_unauthorized());
        assert!(ApiError::http_status(403, "").is_access_denied());
        assert!(ApiError::http_status(404, "").is_not_found());
        assert!(ApiError::http_status(409, "").is_conflict());
        assert!(!ApiError::transport("boom").is_unauthorized());
    }

    /// Test: 403 and 404 render their dedicated user-facing states.
    #[test]
    fn test_user_message_taxonomy() {
        assert_eq!(ApiError::http_status(403, "").user_message(), "Access denied.");
        assert_eq!(ApiError::http_status(404, "").user_message(), "Not found.");
    }
}
