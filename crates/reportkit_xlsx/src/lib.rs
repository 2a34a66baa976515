//! `reportkit_xlsx` v1:
//! Spreadsheet renderer for reports. One sheet per section, styled from the
//! shared theme.
//!
//! Layout:
//! - `conf`   : Excel limits, row anchors and format presets
//! - `spec`   : cell format, cell, sheet and workbook models
//! - `util`   : sheet-name normalization and column width planning
//! - `writer` : section-to-sheet writers and XLSX serialization
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{EnumFmtKey, derive_default_workbook_options, derive_default_xlsx_formats};
pub use spec::{
    EnumCellValue, SpecAutofitCellsPolicy, SpecBodyStyle, SpecCell, SpecCellFormat, SpecSheet,
    SpecSheetHorizontalMerge, SpecWorkbook, SpecWorkbookOptions,
};
pub use writer::{WorkbookStyler, build_workbook, render_workbook, serialize_workbook};
