//! Filename constants and default export options.

use reportkit_core::derive_default_theme;
use reportkit_pdf::derive_default_document_options;
use reportkit_xlsx::derive_default_workbook_options;

use crate::spec::SpecExportOptions;

/// Timestamp layout of generated filenames: compact ISO-8601 with milliseconds.
pub const C_FILE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";
/// Separator between filename parts.
pub const C_FILE_PART_SEPARATOR: &str = "_";
/// Characters replaced in filename parts.
pub const TUP_FILE_NAME_ILLEGAL: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
/// Replacement for illegal and whitespace characters.
pub const C_FILE_NAME_REPLACEMENT: char = '_';

/// Default theme plus default renderer options.
pub fn derive_default_export_options() -> SpecExportOptions {
    SpecExportOptions {
        theme: derive_default_theme(),
        document: derive_default_document_options(),
        workbook: derive_default_workbook_options(),
    }
}
