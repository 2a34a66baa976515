//! Error type shared by the style registry and both renderers.

use thiserror::Error;

/// Failure raised while validating or rendering a report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    /// Required field missing, malformed or out of range.
    #[error("Invalid input at {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Color rule is empty, non-monotonic or does not cover `[0, 100]`.
    #[error("Invalid color rule: {0}")]
    InvalidColorRule(String),

    /// Content does not fit the space left on the page.
    #[error("Section {section:?} overflows the page: needs {needed:.1}pt, {available:.1}pt available")]
    Overflow {
        section: String,
        needed: f32,
        available: f32,
    },

    /// Serialization backend failure (PDF or XLSX writer).
    #[error("Backend error: {0}")]
    Backend(String),
}

impl ReportError {
    /// Shorthand for [`ReportError::InvalidInput`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
