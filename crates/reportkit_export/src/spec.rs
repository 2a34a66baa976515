//! Export formats, lifecycle state, options and errors.

use reportkit_core::{ReportError, SpecTheme};
use reportkit_pdf::SpecDocumentOptions;
use reportkit_xlsx::SpecWorkbookOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region ExportFormat

/// Output container of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumExportFormat {
    /// Paginated document.
    Pdf,
    /// Spreadsheet workbook.
    Xlsx,
}

impl EnumExportFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Lifecycle state of one report key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumExportState {
    Idle,
    Exporting,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Theme and renderer options used by every export of one exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecExportOptions {
    pub theme: SpecTheme,
    #[serde(default)]
    pub document: SpecDocumentOptions,
    #[serde(default)]
    pub workbook: SpecWorkbookOptions,
}

impl Default for SpecExportOptions {
    fn default() -> Self {
        crate::conf::derive_default_export_options()
    }
}

/// Result of a persisted export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportOutcome {
    pub format: EnumExportFormat,
    /// Filename including extension, as handed to the sink.
    pub file_name: String,
    pub n_bytes: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportError

/// Failure of one export call.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Validation or rendering failed; nothing was persisted.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Another export for the same report key is in flight.
    #[error("Export already in progress for {0:?}")]
    AlreadyExporting(String),

    /// The sink could not store the finished bytes.
    #[error("Failed to persist {file_name}: {message}")]
    Persist { file_name: String, message: String },
}

impl ExportError {
    /// Short notice suitable for an end user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Report(ReportError::InvalidInput { .. } | ReportError::InvalidColorRule(_)) => {
                "Export failed: the report data is incomplete or malformed.".to_string()
            }
            Self::Report(ReportError::Overflow { section, .. }) => {
                format!("Export failed: section \"{section}\" is too large for one page.")
            }
            Self::Report(ReportError::Backend(_)) => {
                "Export failed: the file could not be generated.".to_string()
            }
            Self::AlreadyExporting(_) => {
                "An export for this report is already running.".to_string()
            }
            Self::Persist { .. } => "Export failed: the file could not be saved.".to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_match_formats() {
        assert_eq!(EnumExportFormat::Pdf.extension(), "pdf");
        assert_eq!(EnumExportFormat::Xlsx.extension(), "xlsx");
    }

    #[test]
    fn user_messages_hide_internal_detail() {
        let err = ExportError::from(ReportError::invalid("sections[2].table.rows[4]", "row width"));
        assert!(!err.user_message().contains("rows[4]"));
        assert!(err.to_string().contains("rows[4]"));

        let err_overflow = ExportError::from(ReportError::Overflow {
            section: "Tiers".to_string(),
            needed: 900.0,
            available: 700.0,
        });
        assert!(err_overflow.user_message().contains("Tiers"));
    }

    #[test]
    fn options_load_from_json_with_renderer_defaults() {
        let c_json = serde_json::to_string(&SpecExportOptions::default()).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&c_json).unwrap();
        let dict_options = value.as_object_mut().unwrap();
        dict_options.remove("document");
        dict_options.remove("workbook");

        let options: SpecExportOptions = serde_json::from_value(value).unwrap();
        assert_eq!(options, SpecExportOptions::default());
    }
}
