//! Export lifecycle: in-flight guard, format dispatch and persist step.

use std::collections::BTreeSet;

use parking_lot::Mutex;
use reportkit_core::SpecReport;
use reportkit_pdf::render_document;
use reportkit_xlsx::render_workbook;
use tracing::{error, info, warn};

use crate::sink::ReportSink;
use crate::spec::{
    EnumExportFormat, EnumExportState, ExportError, SpecExportOptions, SpecExportOutcome,
};
use crate::util::{Clock, SystemClock, derive_export_key, derive_file_stem};

/// Marks one report key as exporting until dropped.
struct ExportingGuard<'a> {
    set_keys_exporting: &'a Mutex<BTreeSet<String>>,
    key: String,
}

impl Drop for ExportingGuard<'_> {
    fn drop(&mut self) {
        self.set_keys_exporting.lock().remove(&self.key);
    }
}

/// Renders reports and hands the bytes to a sink.
///
/// At most one export per report key runs at a time; the key is released on
/// success and on failure alike.
pub struct ReportExporter<C: Clock = SystemClock> {
    options: SpecExportOptions,
    clock: C,
    set_keys_exporting: Mutex<BTreeSet<String>>,
}

impl ReportExporter<SystemClock> {
    pub fn new(options: SpecExportOptions) -> Self {
        Self::with_clock(options, SystemClock)
    }
}

impl<C: Clock> ReportExporter<C> {
    pub fn with_clock(options: SpecExportOptions, clock: C) -> Self {
        Self {
            options,
            clock,
            set_keys_exporting: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn options(&self) -> &SpecExportOptions {
        &self.options
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Lifecycle state of `key` (see [`derive_export_key`]).
    pub fn state(&self, key: &str) -> EnumExportState {
        if self.set_keys_exporting.lock().contains(key) {
            EnumExportState::Exporting
        } else {
            EnumExportState::Idle
        }
    }

    /// `<reportType>[_<dateRange>]_<timestamp>` at the clock's current instant.
    pub fn generate_file_name(&self, report_type: &str, date_range: Option<&str>) -> String {
        derive_file_stem(report_type, date_range, self.clock.now())
    }

    fn try_begin(&self, key: &str) -> Result<ExportingGuard<'_>, ExportError> {
        let mut set_keys = self.set_keys_exporting.lock();
        if !set_keys.insert(key.to_string()) {
            warn!(key, "export rejected: already in progress");
            return Err(ExportError::AlreadyExporting(key.to_string()));
        }
        Ok(ExportingGuard {
            set_keys_exporting: &self.set_keys_exporting,
            key: key.to_string(),
        })
    }

    fn render(
        &self,
        format: EnumExportFormat,
        report: &SpecReport,
    ) -> Result<Vec<u8>, ExportError> {
        let options = &self.options;
        let l_bytes = match format {
            EnumExportFormat::Pdf => render_document(report, &options.theme, &options.document)?,
            EnumExportFormat::Xlsx => render_workbook(report, &options.theme, &options.workbook)?,
        };
        Ok(l_bytes)
    }

    /// Validate and render `report`; nothing is persisted.
    pub fn export(
        &self,
        format: EnumExportFormat,
        report: &SpecReport,
    ) -> Result<Vec<u8>, ExportError> {
        let key = derive_export_key(&report.report_type, report.date_range.as_deref());
        let _guard = self.try_begin(&key)?;
        info!(key = %key, format = format.extension(), "export started");

        match self.render(format, report) {
            Ok(l_bytes) => {
                info!(key = %key, bytes = l_bytes.len(), "export rendered");
                Ok(l_bytes)
            }
            Err(err) => {
                error!(key = %key, error = %err, "export failed");
                Err(err)
            }
        }
    }

    /// Render `report` and persist it through `sink` under a generated name.
    ///
    /// On any failure the key returns to idle and `sink` is never called with
    /// a partial buffer.
    pub fn export_to_sink(
        &self,
        format: EnumExportFormat,
        report: &SpecReport,
        sink: &dyn ReportSink,
    ) -> Result<SpecExportOutcome, ExportError> {
        let key = derive_export_key(&report.report_type, report.date_range.as_deref());
        let _guard = self.try_begin(&key)?;
        info!(key = %key, format = format.extension(), "export started");

        let l_bytes = self.render(format, report).inspect_err(|err| {
            error!(key = %key, error = %err, "export failed");
        })?;

        let file_name = format!(
            "{}.{}",
            self.generate_file_name(&report.report_type, report.date_range.as_deref()),
            format.extension()
        );
        sink.persist(&file_name, &l_bytes).map_err(|e| {
            error!(key = %key, file = %file_name, error = %e, "export persist failed");
            ExportError::Persist {
                file_name: file_name.clone(),
                message: e.to_string(),
            }
        })?;

        info!(key = %key, file = %file_name, bytes = l_bytes.len(), "export finished");
        Ok(SpecExportOutcome {
            format,
            file_name,
            n_bytes: l_bytes.len(),
        })
    }
}
