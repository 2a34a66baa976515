//! `reportkit_export` v1:
//! Export lifecycle around the document and workbook renderers.
//!
//! Layout:
//! - `conf`     : filename constants and default export options
//! - `spec`     : formats, lifecycle state, options, outcome and errors
//! - `util`     : clocks and filename generation
//! - `sink`     : persistence of finished byte buffers
//! - `exporter` : in-flight guard, format dispatch, persist step
pub mod conf;
pub mod exporter;
pub mod sink;
pub mod spec;
pub mod util;

pub use conf::derive_default_export_options;
pub use exporter::ReportExporter;
pub use sink::{DirectorySink, ReportSink};
pub use spec::{
    EnumExportFormat, EnumExportState, ExportError, SpecExportOptions, SpecExportOutcome,
};
pub use util::{Clock, FixedClock, SystemClock, derive_export_key, derive_file_stem};
