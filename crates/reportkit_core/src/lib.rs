//! `reportkit_core` v1:
//! Shared report model and style registry for the export renderers.
//!
//! Layout:
//! - `conf`  : palette constants and default theme/rule presets
//! - `spec`  : report payload, color rules, theme and table style models
//! - `style` : pure threshold-color and table-variant lookups
//! - `util`  : value formatting, totals aggregation, input validation
//! - `error` : error type shared by every renderer
pub mod conf;
pub mod error;
pub mod spec;
pub mod style;
pub mod util;

pub use conf::{
    N_COHORT_MONTH_SLOTS, derive_default_palette, derive_default_retention_rule,
    derive_default_theme, derive_default_trend_rule,
};
pub use error::{ReportError, ReportResult};
pub use spec::{
    EnumAlign, EnumCellKind, EnumColumnAggregate, EnumLegendSource, EnumSectionKind,
    EnumTableCell, EnumTableVariant, SpecBarPoint, SpecCohortMatrix, SpecCohortRow, SpecColor,
    SpecColorBucket, SpecColorPair, SpecColorRule, SpecColumnHint, SpecPalette, SpecReport,
    SpecReportSection, SpecStatCard, SpecTable, SpecTableStyle, SpecTheme,
};
pub use style::{
    bucket_index_for_threshold, color_for_cell, color_for_threshold, color_for_trend,
    derive_legend_entries, table_style_variant, validate_color_rule,
};
pub use util::{
    derive_cohort_month_slots, derive_matrix_table, derive_totals_row, format_cell_text,
    format_count, format_currency, format_percentage, format_trend, validate_report,
};
