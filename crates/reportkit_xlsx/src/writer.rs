//! Workbook writer kernel: report sections to styled sheets, then XLSX bytes.

use std::collections::{BTreeMap, HashMap};

use reportkit_core::style::{color_for_cell, derive_legend_entries, table_style_variant};
use reportkit_core::util::{
    derive_column_align, derive_matrix_table, derive_totals_row, format_cell_text,
    validate_report,
};
use reportkit_core::{
    EnumAlign, EnumSectionKind, EnumTableCell, EnumTableVariant, ReportError, ReportResult,
    SpecBarPoint, SpecCohortMatrix, SpecColor, SpecColorRule, SpecReport, SpecStatCard,
    SpecTable, SpecTheme,
};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::debug;

use crate::conf::{
    EnumFmtKey, N_BORDER_MEDIUM, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, N_ROW_BODY, N_ROW_HEADER,
    N_ROW_TITLE, derive_default_xlsx_formats,
};
use crate::spec::{
    EnumCellValue, SpecBodyStyle, SpecCell, SpecCellFormat, SpecSheet, SpecSheetHorizontalMerge,
    SpecWorkbook, SpecWorkbookOptions,
};
use crate::util::{estimate_unicode_string_width, plan_column_widths, validate_policy_autofit};

////////////////////////////////////////////////////////////////////////////////
// #region Styling

fn derive_align_text(align: EnumAlign) -> &'static str {
    match align {
        EnumAlign::Left => "left",
        EnumAlign::Center => "center",
        EnumAlign::Right => "right",
    }
}

/// Theme-bound format presets shared by every sheet of a workbook.
pub struct WorkbookStyler<'a> {
    theme: &'a SpecTheme,
    options: &'a SpecWorkbookOptions,
    dict_fmt: BTreeMap<EnumFmtKey, SpecCellFormat>,
}

impl<'a> WorkbookStyler<'a> {
    pub fn new(theme: &'a SpecTheme, options: &'a SpecWorkbookOptions) -> Self {
        Self {
            theme,
            options,
            dict_fmt: derive_default_xlsx_formats(theme, options),
        }
    }

    /// Preset for `key`.
    pub fn format(&self, key: EnumFmtKey) -> SpecCellFormat {
        self.dict_fmt.get(&key).cloned().unwrap_or_default()
    }

    /// Give row `n_row` the header look on columns `0..n_cols`.
    ///
    /// Missing cells are created blank so the fill spans the full width.
    pub fn apply_header_style(&self, sheet: &mut SpecSheet, n_row: usize, n_cols: usize) {
        let fmt_header = self.format(EnumFmtKey::Header);
        for n_col in 0..n_cols {
            match sheet.cells.get_mut(&(n_row, n_col)) {
                Some(cell) => cell.format = fmt_header.clone(),
                None => sheet.set_cell(
                    n_row,
                    n_col,
                    SpecCell {
                        value: EnumCellValue::None,
                        text: String::new(),
                        format: fmt_header.clone(),
                    },
                ),
            }
        }
        sheet
            .heights_row
            .insert(n_row, self.options.height_row_header);
    }

    fn derive_body_patch(body: SpecBodyStyle) -> SpecCellFormat {
        SpecCellFormat {
            bold: body.bold.then_some(true),
            align: body.align.map(|align| derive_align_text(align).to_string()),
            bg_color: body.bg_color,
            font_color: body.text_color,
            ..Default::default()
        }
    }

    /// Text body format with `body` overlaid.
    pub fn apply_body_style(&self, body: SpecBodyStyle) -> SpecCellFormat {
        self.format(EnumFmtKey::Text)
            .merge(&Self::derive_body_patch(body))
    }

    /// Styled cell for one typed table value.
    ///
    /// Threshold colors win over `body` colors; fills are applied only when
    /// `if_fill_coded` is set, matching the document renderer.
    pub fn derive_cell(
        &self,
        cell: &EnumTableCell,
        mut body: SpecBodyStyle,
        if_fill_coded: bool,
    ) -> SpecCell {
        let key = match cell {
            EnumTableCell::Text(_) => EnumFmtKey::Text,
            EnumTableCell::Count(_) => EnumFmtKey::Count,
            EnumTableCell::Currency(_) => EnumFmtKey::Currency,
            EnumTableCell::Percentage(_) | EnumTableCell::Coded(_) => EnumFmtKey::Percentage,
            EnumTableCell::Trend(_) => EnumFmtKey::Trend,
        };
        if let Some(pair) = color_for_cell(cell, self.theme) {
            body.text_color = Some(pair.foreground);
            if if_fill_coded {
                body.bg_color = Some(pair.background);
            }
        }
        let c_text = format_cell_text(cell);
        let value = match cell {
            EnumTableCell::Text(s) if s.is_empty() => EnumCellValue::None,
            EnumTableCell::Text(s) => EnumCellValue::String(s.clone()),
            EnumTableCell::Coded(None) => EnumCellValue::String(c_text.clone()),
            EnumTableCell::Count(n)
            | EnumTableCell::Currency(n)
            | EnumTableCell::Percentage(n)
            | EnumTableCell::Coded(Some(n))
            | EnumTableCell::Trend(n) => EnumCellValue::Number(*n),
        };
        SpecCell {
            value,
            text: c_text,
            format: self.format(key).merge(&Self::derive_body_patch(body)),
        }
    }

    /// Tab color of the sheet holding `kind`.
    pub fn derive_tab_color(&self, kind: &EnumSectionKind) -> SpecColor {
        let palette = &self.theme.palette;
        match kind {
            EnumSectionKind::StatCards(_) | EnumSectionKind::Table(_) => palette.primary,
            EnumSectionKind::Matrix(_) => self
                .theme
                .rule_retention
                .buckets
                .first()
                .map_or(palette.primary, |bucket| bucket.colors.foreground),
            EnumSectionKind::BarSeries(_) => palette.success,
            EnumSectionKind::Legend(_) => palette.text_muted,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetWriters

fn write_text(
    sheet: &mut SpecSheet,
    n_row: usize,
    n_col: usize,
    text: &str,
    format: SpecCellFormat,
) {
    sheet.set_cell(
        n_row,
        n_col,
        SpecCell {
            value: EnumCellValue::String(text.to_string()),
            text: text.to_string(),
            format,
        },
    );
}

/// Merged title across the used columns of row [`N_ROW_TITLE`].
fn write_sheet_title(styler: &WorkbookStyler<'_>, sheet: &mut SpecSheet, title: &str) {
    let n_cols = usize::max(1, sheet.n_cols());
    let fmt_title = styler.format(EnumFmtKey::Title);
    if n_cols == 1 {
        write_text(sheet, N_ROW_TITLE, 0, title, fmt_title);
    } else {
        sheet.merges.push(SpecSheetHorizontalMerge {
            row_idx_start: N_ROW_TITLE,
            col_idx_start: 0,
            col_idx_end: n_cols - 1,
            text: title.to_string(),
            format: fmt_title,
        });
    }
    sheet
        .heights_row
        .insert(N_ROW_TITLE, styler.options.height_row_title);
}

/// Header, body and optional totals row; returns the next free row.
fn write_table(styler: &WorkbookStyler<'_>, sheet: &mut SpecSheet, table: &SpecTable) -> usize {
    let style = table_style_variant(table.variant);
    let n_cols = table.headers.len();

    for (n_col, header) in table.headers.iter().enumerate() {
        write_text(sheet, N_ROW_HEADER, n_col, header, SpecCellFormat::default());
    }
    styler.apply_header_style(sheet, N_ROW_HEADER, n_cols);

    let l_aligns: Vec<EnumAlign> = (0..n_cols)
        .map(|n_col| derive_column_align(table, n_col, style.align_body))
        .collect();

    let mut n_row = N_ROW_BODY;
    for (n_idx_row, row) in table.rows.iter().enumerate() {
        let bg_band = (style.if_banded && n_idx_row % 2 == 1).then_some(styler.theme.palette.band);
        for (n_col, cell) in row.iter().enumerate() {
            let body = SpecBodyStyle {
                bold: false,
                align: l_aligns.get(n_col).copied(),
                bg_color: bg_band,
                text_color: None,
            };
            sheet.set_cell(n_row, n_col, styler.derive_cell(cell, body, style.if_fill_coded));
        }
        n_row += 1;
    }

    if table.if_totals {
        let fmt_totals_patch = SpecCellFormat {
            top: Some(N_BORDER_MEDIUM),
            bottom: Some(N_BORDER_MEDIUM),
            ..Default::default()
        };
        for (n_col, cell) in derive_totals_row(table).iter().enumerate() {
            let body = SpecBodyStyle {
                bold: true,
                align: l_aligns.get(n_col).copied(),
                bg_color: Some(styler.theme.palette.total_fill),
                text_color: None,
            };
            let mut cell_totals = styler.derive_cell(cell, body, false);
            cell_totals.format = cell_totals.format.merge(&fmt_totals_patch);
            sheet.set_cell(n_row, n_col, cell_totals);
        }
        n_row += 1;
    }
    n_row
}

/// Swatch/label rows in legend order starting at `n_row_start`.
fn write_legend_rows(
    styler: &WorkbookStyler<'_>,
    sheet: &mut SpecSheet,
    rule: &SpecColorRule,
    n_row_start: usize,
) -> usize {
    let mut n_row = n_row_start;
    for (label, colors) in derive_legend_entries(rule) {
        sheet.set_cell(
            n_row,
            0,
            SpecCell {
                value: EnumCellValue::None,
                text: String::new(),
                format: styler.apply_body_style(SpecBodyStyle {
                    bg_color: Some(colors.background),
                    ..Default::default()
                }),
            },
        );
        let fmt_label = styler.apply_body_style(SpecBodyStyle {
            text_color: Some(colors.foreground),
            ..Default::default()
        });
        write_text(sheet, n_row, 1, &label, fmt_label);
        n_row += 1;
    }
    n_row
}

fn write_legend_sheet(styler: &WorkbookStyler<'_>, sheet: &mut SpecSheet, rule: &SpecColorRule) {
    write_text(sheet, N_ROW_HEADER, 0, "Color", SpecCellFormat::default());
    write_text(sheet, N_ROW_HEADER, 1, "Meaning", SpecCellFormat::default());
    styler.apply_header_style(sheet, N_ROW_HEADER, 2);
    write_legend_rows(styler, sheet, rule, N_ROW_BODY);
}

fn write_matrix_sheet(
    styler: &WorkbookStyler<'_>,
    sheet: &mut SpecSheet,
    matrix: &SpecCohortMatrix,
) {
    let n_row_next = write_table(styler, sheet, &derive_matrix_table(matrix));
    let n_row_legend = n_row_next + 1;
    let fmt_caption = styler.format(EnumFmtKey::Text).with_(SpecCellFormat {
        bold: Some(true),
        border: Some(0),
        ..Default::default()
    });
    write_text(sheet, n_row_legend, 0, "Legend", fmt_caption);
    write_legend_rows(styler, sheet, &styler.theme.rule_retention, n_row_legend + 1);
}

fn derive_stat_cards_table(cards: &[SpecStatCard]) -> SpecTable {
    SpecTable {
        headers: vec!["Metric".to_string(), "Value".to_string(), "Trend".to_string()],
        rows: cards
            .iter()
            .map(|card| {
                vec![
                    EnumTableCell::Text(card.label.clone()),
                    EnumTableCell::Text(card.value.clone()),
                    card.trend
                        .map_or(EnumTableCell::Text(String::new()), EnumTableCell::Trend),
                ]
            })
            .collect(),
        ..Default::default()
    }
}

fn derive_bar_series_table(points: &[SpecBarPoint]) -> SpecTable {
    SpecTable {
        headers: vec!["Label".to_string(), "Value".to_string()],
        rows: points
            .iter()
            .map(|point| {
                vec![
                    EnumTableCell::Text(point.label.clone()),
                    EnumTableCell::Coded(Some(point.value)),
                ]
            })
            .collect(),
        variant: EnumTableVariant::ColorCoded,
        ..Default::default()
    }
}

/// Autofit from cell texts, then clamp and scale to the sheet maximum.
fn apply_column_widths(sheet: &mut SpecSheet, options: &SpecWorkbookOptions) {
    let n_cols = sheet.n_cols();
    let n_rows_inferred_max = options
        .policy_autofit
        .height_body_inferred_max
        .map_or(usize::MAX, |n_max| N_ROW_BODY.saturating_add(n_max));

    let mut l_width_by_col = vec![0usize; n_cols];
    for ((n_row, n_col), cell) in &sheet.cells {
        if *n_row >= n_rows_inferred_max {
            continue;
        }
        l_width_by_col[*n_col] = usize::max(
            l_width_by_col[*n_col],
            estimate_unicode_string_width(&cell.text),
        );
    }

    sheet.widths_col = plan_column_widths(
        &l_width_by_col,
        &options.policy_autofit,
        options.width_sheet_max,
    );
    debug!(
        sheet = %sheet.name,
        columns = n_cols,
        width_total = sheet.width_total(),
        width_max = options.width_sheet_max,
        "sheet column widths planned"
    );
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Workbook

/// Validate a report and lay every section out on its own sheet.
pub fn build_workbook(
    report: &SpecReport,
    theme: &SpecTheme,
    options: &SpecWorkbookOptions,
) -> ReportResult<SpecWorkbook> {
    validate_report(report, theme)?;
    validate_policy_autofit(&options.policy_autofit)?;

    let styler = WorkbookStyler::new(theme, options);
    let mut workbook = SpecWorkbook::new();

    for section in &report.sections {
        let sheet = workbook.create_sheet(&section.title, styler.derive_tab_color(&section.kind));
        match &section.kind {
            EnumSectionKind::StatCards(cards) => {
                write_table(&styler, sheet, &derive_stat_cards_table(cards));
            }
            EnumSectionKind::Table(table) => {
                write_table(&styler, sheet, table);
            }
            EnumSectionKind::Matrix(matrix) => write_matrix_sheet(&styler, sheet, matrix),
            EnumSectionKind::BarSeries(points) => {
                write_table(&styler, sheet, &derive_bar_series_table(points));
            }
            EnumSectionKind::Legend(source) => {
                write_legend_sheet(&styler, sheet, source.resolve(theme));
            }
        }

        if sheet.n_rows() > N_NROWS_EXCEL_MAX || sheet.n_cols() > N_NCOLS_EXCEL_MAX {
            return Err(ReportError::Overflow {
                section: section.title.clone(),
                needed: sheet.n_rows() as f32,
                available: N_NROWS_EXCEL_MAX as f32,
            });
        }

        apply_column_widths(sheet, options);
        write_sheet_title(&styler, sheet, &format!("{}: {}", report.title, section.title));
        sheet.row_freeze = Some(N_ROW_BODY);
        debug!(
            sheet = %sheet.name,
            kind = section.kind.name(),
            rows = sheet.n_rows(),
            "sheet created"
        );
    }

    Ok(workbook)
}

/// Serialize a workbook model into XLSX bytes.
pub fn serialize_workbook(spec: &SpecWorkbook) -> ReportResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let mut dict_fmt_cache: HashMap<&SpecCellFormat, Format> = HashMap::new();

    for sheet in &spec.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(derive_xlsx_error_text)?;
        worksheet.set_tab_color(derive_rust_xlsx_color(sheet.tab_color));

        for ((n_row, n_col), cell) in &sheet.cells {
            let format = dict_fmt_cache
                .entry(&cell.format)
                .or_insert_with(|| derive_rust_xlsx_format(&cell.format));
            write_cell_with_format(worksheet, *n_row, *n_col, &cell.value, format)?;
        }
        for merge in &sheet.merges {
            let format = dict_fmt_cache
                .entry(&merge.format)
                .or_insert_with(|| derive_rust_xlsx_format(&merge.format));
            worksheet
                .merge_range(
                    cast_row_num(merge.row_idx_start)?,
                    cast_col_num(merge.col_idx_start)?,
                    cast_row_num(merge.row_idx_start)?,
                    cast_col_num(merge.col_idx_end)?,
                    &merge.text,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }

        for (n_idx_col, n_width) in sheet.widths_col.iter().enumerate() {
            worksheet
                .set_column_width(cast_col_num(n_idx_col)?, *n_width)
                .map_err(derive_xlsx_error_text)?;
        }
        for (n_row, n_height) in &sheet.heights_row {
            worksheet
                .set_row_height(cast_row_num(*n_row)?, *n_height)
                .map_err(derive_xlsx_error_text)?;
        }
        if let Some(n_row_freeze) = sheet.row_freeze {
            worksheet
                .set_freeze_panes(cast_row_num(n_row_freeze)?, 0)
                .map_err(derive_xlsx_error_text)?;
        }
    }

    let l_bytes = workbook.save_to_buffer().map_err(derive_xlsx_error_text)?;
    debug!(
        sheets = spec.sheets.len(),
        bytes = l_bytes.len(),
        "workbook serialized"
    );
    Ok(l_bytes)
}

/// Validate, lay out and serialize a report to XLSX bytes.
pub fn render_workbook(
    report: &SpecReport,
    theme: &SpecTheme,
    options: &SpecWorkbookOptions,
) -> ReportResult<Vec<u8>> {
    let workbook = build_workbook(report, theme, options)?;
    serialize_workbook(&workbook)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Backend

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> ReportResult<()> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_color(color: SpecColor) -> Color {
    Color::RGB(color.0)
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = spec.bg_color {
        format = format.set_background_color(derive_rust_xlsx_color(val));
    }
    if let Some(val) = spec.font_color {
        format = format.set_font_color(derive_rust_xlsx_color(val));
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.border_color {
        format = format.set_border_color(derive_rust_xlsx_color(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> ReportResult<u32> {
    u32::try_from(value).map_err(|_| ReportError::Backend(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> ReportResult<u16> {
    u16::try_from(value)
        .map_err(|_| ReportError::Backend(format!("column index overflow: {value}")))
}

fn derive_xlsx_error_text(err: XlsxError) -> ReportError {
    ReportError::Backend(format!("xlsx write error: {err}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
