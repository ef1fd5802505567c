// Client-side error types
use serde_json::{json, Value};
use thiserror::Error;

/// Generic message shown when the server gives no usable detail
pub const GENERIC_FAILURE: &str = "Request failed. Please try again.";

/// Failure of a single outbound API call.
///
/// Every variant is terminal for that call: the gateway never retries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("server returned {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// HTTP status associated with the failure, when there is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Timeout => "TIMEOUT",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Server { status, .. } => match status {
                400 => "BAD_REQUEST",
                401 => "UNAUTHORIZED",
                403 => "FORBIDDEN",
                404 => "NOT_FOUND",
                409 => "CONFLICT",
                422 => "UNPROCESSABLE_ENTITY",
                429 => "TOO_MANY_REQUESTS",
                500..=599 => "SERVER_ERROR",
                _ => "HTTP_ERROR",
            },
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// Message a view shows in its error branch.
    ///
    /// Server detail is surfaced verbatim; transport problems collapse to a
    /// generic string.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { detail, .. } if !detail.is_empty() => detail.clone(),
            ClientError::Timeout => "The server did not respond in time.".to_string(),
            ClientError::InvalidRequest(msg) => msg.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    /// Is this the server refusing our credentials?
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Server { status: 401, .. })
    }

    /// Build a server error from a non-2xx status and its raw body.
    ///
    /// FastAPI puts the reason in `detail`; other services use `message`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| extract_detail(&value))
            .unwrap_or_else(|| format!("request failed with status {}", status));

        ClientError::Server { status, detail }
    }

    /// Body printed for `--json` failures
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "success": false,
            "error": self.user_message(),
            "error_code": self.error_code(),
        });

        if let Some(status) = self.status_code() {
            response["status"] = json!(status);
        }

        response
    }
}

fn extract_detail(value: &Value) -> Option<String> {
    match value.get("detail").or_else(|| value.get("message"))? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        // Validation errors come back as a list of {loc, msg, type}
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Server {
                status: status.as_u16(),
                detail: String::new(),
            }
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
