//! Shared report specification models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

////////////////////////////////////////////////////////////////////////////////
// #region ColorSpecification

/// 24-bit RGB color stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecColor(pub u32);

impl SpecColor {
    /// White.
    pub const WHITE: SpecColor = SpecColor(0xFFFFFF);

    /// Return 8-bit channels.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }

    /// Return channels normalized to `[0, 1]`.
    pub fn to_rgb_unit(self) -> (f32, f32, f32) {
        let (r, g, b) = self.to_rgb();
        (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

/// Foreground/background pair applied to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecColorPair {
    /// Text color.
    pub foreground: SpecColor,
    /// Fill color.
    pub background: SpecColor,
}

/// One threshold tier of a [`SpecColorRule`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecColorBucket {
    /// Inclusive lower bound of the tier.
    pub bound_lower: f64,
    /// Legend label.
    pub label: String,
    /// Colors for values in this tier.
    pub colors: SpecColorPair,
}

/// Ordered threshold buckets plus the pair used for absent values.
///
/// Buckets are sorted by strictly decreasing `bound_lower`; the last bound is
/// `<= 0` so every value in `[0, 100]` lands in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecColorRule {
    /// Buckets, highest bound first.
    pub buckets: Vec<SpecColorBucket>,
    /// Colors for absent input.
    pub undefined: SpecColorPair,
    /// Legend label for absent input.
    pub label_undefined: String,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ThemeSpecification

/// Named brand and neutral colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecPalette {
    /// Brand color (header fills, title text, dividers).
    pub primary: SpecColor,
    /// Body text.
    pub text: SpecColor,
    /// Secondary text (subtitles, axis labels, footer).
    pub text_muted: SpecColor,
    /// Panel and table borders.
    pub border: SpecColor,
    /// Alternating row fill.
    pub band: SpecColor,
    /// Totals-row fill.
    pub total_fill: SpecColor,
    /// Card/panel background.
    pub surface: SpecColor,
    /// Positive trend.
    pub success: SpecColor,
    /// Negative trend.
    pub danger: SpecColor,
}

/// Immutable theme injected into every renderer call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecTheme {
    /// Named colors.
    pub palette: SpecPalette,
    /// Rule for retention-like percentages (matrix cells, coded cells, bars).
    pub rule_retention: SpecColorRule,
    /// Rule for signed growth values.
    pub rule_trend: SpecColorRule,
    /// Brand string printed in the document footer.
    pub brand: String,
    /// Short text drawn inside the header logo block.
    pub logo_text: String,
}

impl Default for SpecTheme {
    fn default() -> Self {
        crate::conf::derive_default_theme()
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnumAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Named table style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnumTableVariant {
    /// Regular density, banded rows.
    #[default]
    Default,
    /// Smaller font and paddings for wide tables.
    Compact,
    /// Centered cells with threshold fills on coded values.
    ColorCoded,
}

/// Resolved table style consumed by both renderers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecTableStyle {
    /// Header font size (pt).
    pub font_size_header: f32,
    /// Body font size (pt).
    pub font_size_body: f32,
    /// Horizontal cell padding (pt).
    pub padding_cell: f32,
    /// Header row height (pt).
    pub height_header: f32,
    /// Body row height (pt).
    pub height_row: f32,
    /// Default alignment of body cells.
    pub align_body: EnumAlign,
    /// Fill alternating rows with the band color.
    pub if_banded: bool,
    /// Fill coded/trend cells with their threshold background.
    pub if_fill_coded: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableSpecification

/// One typed table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnumTableCell {
    /// Plain text.
    Text(String),
    /// Count-like number (users, trades).
    Count(f64),
    /// Money amount.
    Currency(f64),
    /// Percentage in `[0, 100]`, neutral color.
    Percentage(f64),
    /// Percentage colored by the retention rule; `None` is absent.
    Coded(Option<f64>),
    /// Signed growth percentage colored by the trend rule.
    Trend(f64),
}

/// Variant tag of [`EnumTableCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCellKind {
    Text,
    Count,
    Currency,
    Percentage,
    Coded,
    Trend,
}

impl EnumTableCell {
    /// Variant tag.
    pub fn kind(&self) -> EnumCellKind {
        match self {
            Self::Text(_) => EnumCellKind::Text,
            Self::Count(_) => EnumCellKind::Count,
            Self::Currency(_) => EnumCellKind::Currency,
            Self::Percentage(_) => EnumCellKind::Percentage,
            Self::Coded(_) => EnumCellKind::Coded,
            Self::Trend(_) => EnumCellKind::Trend,
        }
    }

    /// Empty text placeholder; allowed in any column.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// Numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Text(_) => None,
            Self::Count(n) | Self::Currency(n) | Self::Percentage(n) | Self::Trend(n) => Some(*n),
            Self::Coded(n) => *n,
        }
    }
}

impl EnumCellKind {
    /// Aggregate used for totals rows when no hint is given.
    pub fn default_aggregate(self) -> EnumColumnAggregate {
        match self {
            Self::Text => EnumColumnAggregate::None,
            Self::Count => EnumColumnAggregate::Sum,
            Self::Currency | Self::Percentage | Self::Coded | Self::Trend => {
                EnumColumnAggregate::Mean
            }
        }
    }

    /// Alignment used when no hint is given.
    pub fn default_align(self) -> EnumAlign {
        match self {
            Self::Text => EnumAlign::Left,
            Self::Coded | Self::Trend | Self::Percentage => EnumAlign::Center,
            Self::Count | Self::Currency => EnumAlign::Right,
        }
    }
}

/// Totals-row aggregation for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnumColumnAggregate {
    /// Leave blank (or label, for the first text column).
    #[default]
    None,
    /// Arithmetic sum.
    Sum,
    /// Arithmetic mean of present values.
    Mean,
}

/// Per-column rendering hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecColumnHint {
    /// Alignment override.
    pub align: Option<EnumAlign>,
    /// Totals aggregation override.
    pub aggregate: Option<EnumColumnAggregate>,
}

/// Header row plus typed body rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Body rows; each row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<EnumTableCell>>,
    /// Optional per-column hints (same length as `headers`).
    #[serde(default)]
    pub column_hints: Option<Vec<SpecColumnHint>>,
    /// Style preset.
    #[serde(default)]
    pub variant: EnumTableVariant,
    /// Append a totals/averages row.
    #[serde(default)]
    pub if_totals: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SectionSpecification

/// One KPI card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecStatCard {
    pub label: String,
    /// Pre-formatted value text.
    pub value: String,
    /// Signed percentage change.
    #[serde(default)]
    pub trend: Option<f64>,
}

/// One cohort of the retention matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecCohortRow {
    /// Join period label, e.g. `2026-03`.
    pub period: String,
    /// Cohort size.
    pub users: u64,
    /// Up to six monthly retention values; `None` means not yet elapsed.
    pub months: Vec<Option<f64>>,
    /// Revenue attributed to the cohort.
    pub revenue: f64,
}

/// Cohort retention matrix.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecCohortMatrix {
    pub rows: Vec<SpecCohortRow>,
}

/// One bar of a bar series; `value` is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecBarPoint {
    pub label: String,
    pub value: f64,
}

/// Which color rule a legend describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnumLegendSource {
    /// Theme retention rule.
    Retention,
    /// Theme trend rule.
    Trend,
    /// Caller-supplied rule.
    Custom(SpecColorRule),
}

impl EnumLegendSource {
    /// Resolve against a theme.
    pub fn resolve<'a>(&'a self, theme: &'a SpecTheme) -> &'a SpecColorRule {
        match self {
            Self::Retention => &theme.rule_retention,
            Self::Trend => &theme.rule_trend,
            Self::Custom(rule) => rule,
        }
    }
}

/// Body of a report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EnumSectionKind {
    StatCards(Vec<SpecStatCard>),
    Table(SpecTable),
    Matrix(SpecCohortMatrix),
    BarSeries(Vec<SpecBarPoint>),
    Legend(EnumLegendSource),
}

impl EnumSectionKind {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StatCards(_) => "stat_cards",
            Self::Table(_) => "table",
            Self::Matrix(_) => "matrix",
            Self::BarSeries(_) => "bar_series",
            Self::Legend(_) => "legend",
        }
    }
}

/// One renderable unit; order within a report is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecReportSection {
    pub title: String,
    pub kind: EnumSectionKind,
}

/// Complete export payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecReport {
    /// Machine name used in filenames, e.g. `CohortAnalysis`.
    pub report_type: String,
    /// Human title.
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Free-form range tag, e.g. `30d`.
    #[serde(default)]
    pub date_range: Option<String>,
    /// Generation instant printed in the document header.
    pub generated_at: DateTime<Utc>,
    pub sections: Vec<SpecReportSection>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_channels_split_and_normalize() {
        let color = SpecColor(0x4F46E5);
        assert_eq!(color.to_rgb(), (0x4F, 0x46, 0xE5));
        assert_eq!(SpecColor::WHITE.to_rgb_unit(), (1.0, 1.0, 1.0));
        assert_eq!(SpecColor(0).to_rgb_unit(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn report_payload_deserializes_from_json() {
        let c_json = r#"{
            "report_type": "CohortAnalysis",
            "title": "Cohort Analysis",
            "date_range": "30d",
            "generated_at": "2026-10-17T09:30:00Z",
            "sections": [
                {"title": "Retention", "kind": {"Matrix": {"rows": [
                    {"period": "2026-07", "users": 120, "months": [100.0, 64.5, null], "revenue": 5400.0}
                ]}}},
                {"title": "Legend", "kind": {"Legend": "Retention"}}
            ]
        }"#;
        let report: SpecReport = serde_json::from_str(c_json).unwrap();
        assert_eq!(report.sections.len(), 2);
        let EnumSectionKind::Matrix(matrix) = &report.sections[0].kind else {
            panic!("expected matrix section");
        };
        assert_eq!(matrix.rows[0].months, vec![Some(100.0), Some(64.5), None]);
        assert_eq!(report.subtitle, None);
    }

    #[test]
    fn coded_absent_cell_has_no_number() {
        assert_eq!(EnumTableCell::Coded(None).as_number(), None);
        assert_eq!(EnumTableCell::Coded(Some(0.0)).as_number(), Some(0.0));
        assert_eq!(EnumCellKind::Count.default_aggregate(), EnumColumnAggregate::Sum);
        assert_eq!(EnumCellKind::Currency.default_aggregate(), EnumColumnAggregate::Mean);
    }
}
