//! Error types shared by the remote clients.

use serde::{Deserialize, Serialize};

/// One sub-task entry of a rejected calculation.
///
/// Sub-task names carry the image slot (`front_…` / `side_…`); the
/// message, when present, is the raw rejection text for that slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parsed body of a non-2xx response.
///
/// The service reports failures in a handful of shapes; all the fields
/// the error taxonomy cares about are pulled out eagerly so callers can
/// classify without re-parsing. The raw text is always retained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    /// The raw response body, for logging and opaque display.
    pub raw: String,
    pub sub_tasks: Option<Vec<SubTask>>,
    pub detail: Option<String>,
    pub brand: Option<String>,
    pub body_part: Option<String>,
}

/// The recognized JSON fields of an error body.
#[derive(Debug, Deserialize)]
struct ErrorFields {
    #[serde(default)]
    sub_tasks: Option<Vec<SubTask>>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    body_part: Option<String>,
}

impl ErrorBody {
    /// Parse a raw body. Non-JSON and unrecognized shapes degrade to an
    /// `ErrorBody` carrying only the raw text.
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str::<ErrorFields>(&raw) {
            Ok(fields) => Self {
                raw,
                sub_tasks: fields.sub_tasks,
                detail: fields.detail,
                brand: fields.brand,
                body_part: fields.body_part,
            },
            Err(_) => Self {
                raw,
                ..Self::default()
            },
        }
    }

    /// The first human-readable message the body carries, in the order
    /// the reference surfaces them: `detail`, then `brand`, then
    /// `body_part`.
    pub fn message(&self) -> Option<&str> {
        self.detail
            .as_deref()
            .or(self.brand.as_deref())
            .or(self.body_part.as_deref())
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Errors produced by the remote client layer.
///
/// No retry happens here; transport errors propagate unchanged to the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: ErrorBody },

    /// A calculation task-set resolved as failed.
    #[error("Calculation rejected one or both photos")]
    Calculation { sub_tasks: Vec<SubTask> },

    /// A 2xx response did not carry the expected payload.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The API key cannot be carried in an HTTP header.
    #[error("API key contains invalid header characters")]
    InvalidApiKey,

    /// No flow id has been set on the client yet.
    #[error("No flow id set; call set_flow_id or create a flow first")]
    MissingFlowId,

    /// The owning session was torn down while the call was in flight.
    #[error("Operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// The HTTP status code, for status-shaped errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The rejected sub-tasks, regardless of whether they arrived via
    /// an error status body or a failed task-set resolution.
    pub fn sub_tasks(&self) -> Option<&[SubTask]> {
        match self {
            ApiError::Calculation { sub_tasks } => Some(sub_tasks),
            ApiError::Status { body, .. } => body.sub_tasks.as_deref(),
            _ => None,
        }
    }
}
