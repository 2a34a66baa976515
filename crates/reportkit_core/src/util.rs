//! Stateless helpers: value formatting, matrix/totals derivation, validation.

use crate::conf::{C_ABSENT_PLACEHOLDER, C_CURRENCY_SYMBOL, C_TOTALS_LABEL, N_COHORT_MONTH_SLOTS};
use crate::error::{ReportError, ReportResult};
use crate::spec::{
    EnumAlign, EnumCellKind, EnumColumnAggregate, EnumLegendSource, EnumSectionKind,
    EnumTableCell, EnumTableVariant, SpecBarPoint, SpecCohortMatrix, SpecCohortRow,
    SpecColumnHint, SpecReport, SpecStatCard, SpecTable, SpecTheme,
};
use crate::style::validate_color_rule;

////////////////////////////////////////////////////////////////////////////////
// #region ValueFormatting

fn group_thousands(c_digits: &str) -> String {
    let n_len = c_digits.len();
    let mut c_out = String::with_capacity(n_len + n_len / 3);
    for (n_idx, chr) in c_digits.chars().enumerate() {
        if n_idx > 0 && (n_len - n_idx) % 3 == 0 {
            c_out.push(',');
        }
        c_out.push(chr);
    }
    c_out
}

/// `1234.4` -> `1,234`.
pub fn format_count(value: f64) -> String {
    let n_rounded = value.round();
    let c_sign = if n_rounded < 0.0 { "-" } else { "" };
    format!("{c_sign}{}", group_thousands(&format!("{:.0}", n_rounded.abs())))
}

/// `1234.5` -> `$1,234.50`.
pub fn format_currency(value: f64) -> String {
    let c_sign = if value < 0.0 { "-" } else { "" };
    let c_fixed = format!("{:.2}", value.abs());
    let (c_int, c_frac) = c_fixed.split_once('.').unwrap_or((c_fixed.as_str(), "00"));
    format!("{c_sign}{C_CURRENCY_SYMBOL}{}.{c_frac}", group_thousands(c_int))
}

/// `72.46` -> `72.5%`.
pub fn format_percentage(value: f64) -> String {
    format!("{value:.1}%")
}

/// `-15.2` -> `-15.2%`, `3.0` -> `+3.0%`.
pub fn format_trend(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.1}%")
    } else {
        format!("{value:.1}%")
    }
}

/// Display text of one typed cell; absent coded values become `-`.
pub fn format_cell_text(cell: &EnumTableCell) -> String {
    match cell {
        EnumTableCell::Text(s) => s.clone(),
        EnumTableCell::Count(n) => format_count(*n),
        EnumTableCell::Currency(n) => format_currency(*n),
        EnumTableCell::Percentage(n) => format_percentage(*n),
        EnumTableCell::Coded(Some(n)) => format_percentage(*n),
        EnumTableCell::Coded(None) => C_ABSENT_PLACEHOLDER.to_string(),
        EnumTableCell::Trend(n) => format_trend(*n),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MatrixAndTotals

/// Pad/copy cohort months into the fixed slot array.
pub fn derive_cohort_month_slots(row: &SpecCohortRow) -> [Option<f64>; N_COHORT_MONTH_SLOTS] {
    let mut l_slots = [None; N_COHORT_MONTH_SLOTS];
    for (slot, value) in l_slots.iter_mut().zip(row.months.iter()) {
        *slot = *value;
    }
    l_slots
}

/// Headers of the matrix table: cohort, users, six months, revenue.
pub fn derive_matrix_headers() -> Vec<String> {
    let mut l_headers = vec!["Cohort".to_string(), "Users".to_string()];
    l_headers.extend((1..=N_COHORT_MONTH_SLOTS).map(|n_month| format!("Month {n_month}")));
    l_headers.push("Revenue".to_string());
    l_headers
}

/// Express a cohort matrix as a color-coded table.
///
/// Both renderers draw the matrix through this table so cell text and colors
/// cannot drift between formats.
pub fn derive_matrix_table(matrix: &SpecCohortMatrix) -> SpecTable {
    let l_rows = matrix
        .rows
        .iter()
        .map(|row| {
            let mut l_cells = Vec::with_capacity(N_COHORT_MONTH_SLOTS + 3);
            l_cells.push(EnumTableCell::Text(row.period.clone()));
            l_cells.push(EnumTableCell::Count(row.users as f64));
            l_cells.extend(
                derive_cohort_month_slots(row)
                    .into_iter()
                    .map(EnumTableCell::Coded),
            );
            l_cells.push(EnumTableCell::Currency(row.revenue));
            l_cells
        })
        .collect();

    SpecTable {
        headers: derive_matrix_headers(),
        rows: l_rows,
        column_hints: None,
        variant: EnumTableVariant::ColorCoded,
        if_totals: false,
    }
}

/// Kind of column `n_idx_col`: the kind of its first non-blank cell.
pub fn derive_column_kind(table: &SpecTable, n_idx_col: usize) -> EnumCellKind {
    table
        .rows
        .iter()
        .filter_map(|row| row.get(n_idx_col))
        .find(|cell| !cell.is_blank())
        .map_or(EnumCellKind::Text, EnumTableCell::kind)
}

fn derive_column_hint(table: &SpecTable, n_idx_col: usize) -> SpecColumnHint {
    table
        .column_hints
        .as_ref()
        .and_then(|l_hints| l_hints.get(n_idx_col).copied())
        .unwrap_or_default()
}

/// Alignment of column `n_idx_col` (hint first, then the cell kind).
pub fn derive_column_align(table: &SpecTable, n_idx_col: usize, fallback: EnumAlign) -> EnumAlign {
    let hint = derive_column_hint(table, n_idx_col);
    if let Some(align) = hint.align {
        return align;
    }
    match derive_column_kind(table, n_idx_col) {
        EnumCellKind::Text => fallback,
        kind => kind.default_align(),
    }
}

/// Aggregate of column `n_idx_col` (hint first, then the cell kind).
pub fn derive_column_aggregate(table: &SpecTable, n_idx_col: usize) -> EnumColumnAggregate {
    derive_column_hint(table, n_idx_col)
        .aggregate
        .unwrap_or_else(|| derive_column_kind(table, n_idx_col).default_aggregate())
}

fn wrap_number(kind: EnumCellKind, value: Option<f64>) -> EnumTableCell {
    match (kind, value) {
        (EnumCellKind::Coded, v) => EnumTableCell::Coded(v),
        (_, None) => EnumTableCell::Text(String::new()),
        (EnumCellKind::Count, Some(v)) => EnumTableCell::Count(v),
        (EnumCellKind::Currency, Some(v)) => EnumTableCell::Currency(v),
        (EnumCellKind::Percentage, Some(v)) => EnumTableCell::Percentage(v),
        (EnumCellKind::Trend, Some(v)) => EnumTableCell::Trend(v),
        (EnumCellKind::Text, Some(v)) => EnumTableCell::Text(format!("{v}")),
    }
}

/// Totals/averages row for a table.
///
/// `Sum` columns add every body value, `Mean` columns average the present
/// values (absent coded cells are skipped). The first text column carries the
/// totals label; other non-aggregated columns stay blank.
pub fn derive_totals_row(table: &SpecTable) -> Vec<EnumTableCell> {
    let mut if_label_placed = false;
    (0..table.headers.len())
        .map(|n_idx_col| {
            let kind = derive_column_kind(table, n_idx_col);
            let l_values: Vec<f64> = table
                .rows
                .iter()
                .filter_map(|row| row.get(n_idx_col).and_then(EnumTableCell::as_number))
                .collect();
            match derive_column_aggregate(table, n_idx_col) {
                EnumColumnAggregate::Sum => wrap_number(kind, Some(l_values.iter().sum())),
                EnumColumnAggregate::Mean => {
                    let n_mean = if l_values.is_empty() {
                        None
                    } else {
                        Some(l_values.iter().sum::<f64>() / l_values.len() as f64)
                    };
                    wrap_number(kind, n_mean)
                }
                EnumColumnAggregate::None => {
                    if kind == EnumCellKind::Text && !if_label_placed {
                        if_label_placed = true;
                        EnumTableCell::Text(C_TOTALS_LABEL.to_string())
                    } else {
                        EnumTableCell::Text(String::new())
                    }
                }
            }
        })
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region InputValidation

fn validate_non_empty(field: &str, value: &str) -> ReportResult<()> {
    if value.trim().is_empty() {
        return Err(ReportError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn validate_finite(field: &str, value: f64) -> ReportResult<()> {
    if !value.is_finite() {
        return Err(ReportError::invalid(field, format!("{value} is not finite")));
    }
    Ok(())
}

fn validate_percentage(field: &str, value: f64) -> ReportResult<()> {
    validate_finite(field, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(ReportError::invalid(
            field,
            format!("{value} is outside [0, 100]"),
        ));
    }
    Ok(())
}

fn validate_cell(field: &str, cell: &EnumTableCell) -> ReportResult<()> {
    match cell {
        EnumTableCell::Text(_) | EnumTableCell::Coded(None) => Ok(()),
        EnumTableCell::Count(n) => {
            validate_finite(field, *n)?;
            if *n < 0.0 {
                return Err(ReportError::invalid(field, format!("count {n} is negative")));
            }
            Ok(())
        }
        EnumTableCell::Currency(n) | EnumTableCell::Trend(n) => validate_finite(field, *n),
        EnumTableCell::Percentage(n) | EnumTableCell::Coded(Some(n)) => {
            validate_percentage(field, *n)
        }
    }
}

/// Validate table shape, per-column kind consistency and cell ranges.
pub fn validate_table(field: &str, table: &SpecTable) -> ReportResult<()> {
    if table.headers.is_empty() {
        return Err(ReportError::invalid(
            format!("{field}.headers"),
            "table needs at least one column",
        ));
    }
    if let Some(l_hints) = &table.column_hints
        && l_hints.len() != table.headers.len()
    {
        return Err(ReportError::invalid(
            format!("{field}.column_hints"),
            format!(
                "{} hints for {} columns",
                l_hints.len(),
                table.headers.len()
            ),
        ));
    }

    let l_kinds: Vec<EnumCellKind> = (0..table.headers.len())
        .map(|n_idx_col| derive_column_kind(table, n_idx_col))
        .collect();

    for (n_idx_row, row) in table.rows.iter().enumerate() {
        if row.len() != table.headers.len() {
            return Err(ReportError::invalid(
                format!("{field}.rows[{n_idx_row}]"),
                format!("{} cells for {} headers", row.len(), table.headers.len()),
            ));
        }
        for (n_idx_col, cell) in row.iter().enumerate() {
            let c_field = format!("{field}.rows[{n_idx_row}][{n_idx_col}]");
            if !cell.is_blank() && cell.kind() != l_kinds[n_idx_col] {
                return Err(ReportError::invalid(
                    c_field,
                    format!(
                        "cell kind {:?} differs from column kind {:?}",
                        cell.kind(),
                        l_kinds[n_idx_col]
                    ),
                ));
            }
            validate_cell(&c_field, cell)?;
        }
    }
    Ok(())
}

fn validate_stat_cards(field: &str, cards: &[SpecStatCard]) -> ReportResult<()> {
    if cards.is_empty() {
        return Err(ReportError::invalid(field, "at least one stat card is required"));
    }
    for (n_idx, card) in cards.iter().enumerate() {
        validate_non_empty(&format!("{field}[{n_idx}].label"), &card.label)?;
        if let Some(n_trend) = card.trend {
            validate_finite(&format!("{field}[{n_idx}].trend"), n_trend)?;
        }
    }
    Ok(())
}

fn validate_cohort_matrix(field: &str, matrix: &SpecCohortMatrix) -> ReportResult<()> {
    if matrix.rows.is_empty() {
        return Err(ReportError::invalid(field, "matrix has no cohorts"));
    }
    for (n_idx, row) in matrix.rows.iter().enumerate() {
        let c_field = format!("{field}.rows[{n_idx}]");
        validate_non_empty(&format!("{c_field}.period"), &row.period)?;
        if row.months.len() > N_COHORT_MONTH_SLOTS {
            return Err(ReportError::invalid(
                format!("{c_field}.months"),
                format!(
                    "{} months exceed the {N_COHORT_MONTH_SLOTS} available slots",
                    row.months.len()
                ),
            ));
        }
        for (n_month, value) in row.months.iter().enumerate() {
            if let Some(n_value) = value {
                validate_percentage(&format!("{c_field}.months[{n_month}]"), *n_value)?;
            }
        }
        validate_finite(&format!("{c_field}.revenue"), row.revenue)?;
    }
    Ok(())
}

fn validate_bar_series(field: &str, points: &[SpecBarPoint]) -> ReportResult<()> {
    if points.is_empty() {
        return Err(ReportError::invalid(field, "bar series has no points"));
    }
    for (n_idx, point) in points.iter().enumerate() {
        validate_percentage(&format!("{field}[{n_idx}].value"), point.value)?;
    }
    Ok(())
}

/// Validate theme rules and every section of a report.
///
/// Runs before any drawing so a malformed payload never yields partial bytes.
pub fn validate_report(report: &SpecReport, theme: &SpecTheme) -> ReportResult<()> {
    validate_color_rule(&theme.rule_retention)?;
    validate_color_rule(&theme.rule_trend)?;
    validate_non_empty("report_type", &report.report_type)?;
    validate_non_empty("title", &report.title)?;
    if report.sections.is_empty() {
        return Err(ReportError::invalid("sections", "report has no sections"));
    }

    for (n_idx, section) in report.sections.iter().enumerate() {
        let c_field = format!("sections[{n_idx}]");
        validate_non_empty(&format!("{c_field}.title"), &section.title)?;
        let c_field_kind = format!("{c_field}.{}", section.kind.name());
        match &section.kind {
            EnumSectionKind::StatCards(cards) => validate_stat_cards(&c_field_kind, cards)?,
            EnumSectionKind::Table(table) => validate_table(&c_field_kind, table)?,
            EnumSectionKind::Matrix(matrix) => validate_cohort_matrix(&c_field_kind, matrix)?,
            EnumSectionKind::BarSeries(points) => validate_bar_series(&c_field_kind, points)?,
            EnumSectionKind::Legend(EnumLegendSource::Custom(rule)) => validate_color_rule(rule)?,
            EnumSectionKind::Legend(_) => {}
        }
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
