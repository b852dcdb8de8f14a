//! Error types and constructors.
//!
//! Pipeline stages fail with [`GatewayError`], one variant per rejection kind.
//! The binary and configuration layer work in terms of [`AppError`]; every
//! [`GatewayError`] converts into it without losing the sanitized message.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

pub use masterror::{AppError, AppResult};

/// Credentials and connection targets that must never reach a caller
static SECRET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([a-z][a-z0-9+.-]*://\S+|(password|passwd|pwd|user|host)\s*=\s*\S+)")
        .expect("valid regex")
});

/// Upper bound for execution messages surfaced to callers
const MAX_EXECUTION_MESSAGE: usize = 200;

/// Failure of a single gateway call.
///
/// All variants are terminal: no later stage runs and no partial rows are
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// SQL text could not be parsed under the active dialect
    #[error("{message}")]
    Parse { message: String },

    /// Text contained more than one top-level statement
    #[error("expected exactly one statement, found {count}")]
    MultipleStatements { count: usize },

    /// The single statement is not a read-only SELECT
    #[error("only SELECT statements are allowed, found {kind}")]
    NotSelect { kind: String },

    /// A referenced relation is outside the configured whitelist
    #[error("relation '{name}' is not whitelisted (allowed: {})", .allowed.join(", "))]
    ForbiddenRelation { name: String, allowed: Vec<String> },

    /// Backend type is neither embedded nor networked
    #[error("unsupported backend '{value}' (expected 'embedded' or 'networked')")]
    UnsupportedBackend { value: String },

    /// Execution adapter reported a failure
    #[error("query execution failed: {message}")]
    Execution { message: String }
}

impl GatewayError {
    /// Parse failure with sqlparser position info lifted into the message
    pub fn parse(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self::Parse {
            message: format_sql_error("Query parse error", &msg)
        }
    }

    /// Execution failure with credentials and backend traces stripped
    pub fn execution(message: impl AsRef<str>) -> Self {
        Self::Execution {
            message: sanitize_execution_message(message.as_ref())
        }
    }

    /// Stable identifier of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse {
                ..
            } => "ParseError",
            Self::MultipleStatements {
                ..
            } => "MultipleStatementsError",
            Self::NotSelect {
                ..
            } => "NotSelectError",
            Self::ForbiddenRelation {
                ..
            } => "ForbiddenRelationError",
            Self::UnsupportedBackend {
                ..
            } => "UnsupportedBackendError",
            Self::Execution {
                ..
            } => "ExecutionError"
        }
    }

    /// Serializable envelope presented to callers
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                kind:    self.kind(),
                message: self.to_string()
            }
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        let message = format!("{}: {}", err.kind(), err);
        match err {
            GatewayError::Execution {
                ..
            } => AppError::service(message),
            _ => AppError::bad_request(message)
        }
    }
}

/// `{ "error": { "kind": ..., "message": ... } }`
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub kind:    &'static str,
    pub message: String
}

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create error for malformed row or plan snapshots
pub fn snapshot_error(path: &str, message: impl std::fmt::Display) -> AppError {
    AppError::bad_request(format!("Invalid snapshot '{}': {}", path, message))
}

fn sanitize_execution_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default().trim();
    let scrubbed = SECRET_PATTERN.replace_all(first_line, "[redacted]");
    let mut out: String = scrubbed.chars().take(MAX_EXECUTION_MESSAGE).collect();
    if out.is_empty() {
        out.push_str("backend reported an error");
    }
    out
}

/// Format SQL error with position highlighting
fn format_sql_error(prefix: &str, message: &str) -> String {
    // sqlparser format: "... at Line: X, Column: Y"
    if let Some(pos) = extract_position(message) {
        format!(
            "{} at line {}, column {}: {}",
            prefix, pos.line, pos.column, message
        )
    } else {
        format!("{}: {}", prefix, message)
    }
}

struct SqlPosition {
    line:   usize,
    column: usize
}

fn extract_position(message: &str) -> Option<SqlPosition> {
    let line_marker = "Line: ";
    let col_marker = ", Column";

    let line_start = message.find(line_marker)?;
    let line_num_start = line_start + line_marker.len();
    let col_start = message[line_num_start..].find(col_marker)?;
    let line_str = &message[line_num_start..line_num_start + col_start];

    // Both "Column 7" and "Column: 7" occur
    let rest = message[line_num_start + col_start + col_marker.len()..]
        .trim_start_matches(|c: char| c == ':' || c == ' ');
    let col_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let col_str = &rest[..col_end];

    match (line_str.parse(), col_str.parse()) {
        (Ok(line), Ok(column)) => Some(SqlPosition {
            line,
            column
        }),
        _ => None
    }
}
