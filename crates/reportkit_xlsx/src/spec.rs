//! Workbook specification models: formats, cells, sheets, options.

use std::collections::{BTreeMap, BTreeSet};

use reportkit_core::{EnumAlign, SpecColor};
use serde::{Deserialize, Serialize};

use crate::util::{derive_unique_sheet_name, sanitize_sheet_name};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification; `None` fields inherit on [`SpecCellFormat::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Border color for all sides.
    pub border_color: Option<SpecColor>,
    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<SpecColor>,
    /// Font color.
    pub font_color: Option<SpecColor>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            border_color: other.border_color.or(self.border_color),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.or(self.bg_color),
            font_color: other.font_color.or(self.font_color),
        }
    }
}

/// Body cell style request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecBodyStyle {
    pub bold: bool,
    pub align: Option<EnumAlign>,
    pub bg_color: Option<SpecColor>,
    pub text_color: Option<SpecColor>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellSpecification

/// Normalized cell value handed to the serializer.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Blank cell (format only).
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

/// One styled cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCell {
    pub value: EnumCellValue,
    /// Text as displayed; drives width estimation.
    pub text: String,
    pub format: SpecCellFormat,
}

/// Horizontal merge on one row.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheetHorizontalMerge {
    /// Row index where merge is applied.
    pub row_idx_start: usize,
    /// Start column index (inclusive).
    pub col_idx_start: usize,
    /// End column index (inclusive).
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
    pub format: SpecCellFormat,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// One worksheet: a sparse cell grid plus layout settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheet {
    /// Sanitized, workbook-unique name.
    pub name: String,
    pub tab_color: SpecColor,
    /// Cells keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecCell>,
    pub merges: Vec<SpecSheetHorizontalMerge>,
    /// Column widths in character units, set once the grid is complete.
    pub widths_col: Vec<f64>,
    pub heights_row: BTreeMap<usize, f64>,
    /// Rows above this index stay visible while scrolling.
    pub row_freeze: Option<usize>,
}

impl SpecSheet {
    fn new(name: String, tab_color: SpecColor) -> Self {
        Self {
            name,
            tab_color,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            widths_col: Vec::new(),
            heights_row: BTreeMap::new(),
            row_freeze: None,
        }
    }

    /// Store a cell, replacing any previous one.
    pub fn set_cell(&mut self, n_row: usize, n_col: usize, cell: SpecCell) {
        self.cells.insert((n_row, n_col), cell);
    }

    pub fn cell(&self, n_row: usize, n_col: usize) -> Option<&SpecCell> {
        self.cells.get(&(n_row, n_col))
    }

    /// Number of rows spanned by cells and merges.
    pub fn n_rows(&self) -> usize {
        let n_rows_cells = self.cells.keys().map(|(n_row, _)| n_row + 1).max();
        let n_rows_merges = self.merges.iter().map(|merge| merge.row_idx_start + 1).max();
        n_rows_cells.max(n_rows_merges).unwrap_or(0)
    }

    /// Number of columns spanned by cells and merges.
    pub fn n_cols(&self) -> usize {
        let n_cols_cells = self.cells.keys().map(|(_, n_col)| n_col + 1).max();
        let n_cols_merges = self.merges.iter().map(|merge| merge.col_idx_end + 1).max();
        n_cols_cells.max(n_cols_merges).unwrap_or(0)
    }

    /// Sum of declared column widths.
    pub fn width_total(&self) -> f64 {
        self.widths_col.iter().sum()
    }
}

/// Ordered sheets of one workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecWorkbook {
    pub sheets: Vec<SpecSheet>,
    set_sheet_names_existing: BTreeSet<String>,
}

impl SpecWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet with a sanitized, de-duplicated name.
    pub fn create_sheet(&mut self, name: &str, tab_color: SpecColor) -> &mut SpecSheet {
        let c_name = derive_unique_sheet_name(
            &sanitize_sheet_name(name, "_"),
            &mut self.set_sheet_names_existing,
        );
        self.sheets.push(SpecSheet::new(c_name, tab_color));
        let n_idx_last = self.sheets.len() - 1;
        &mut self.sheets[n_idx_last]
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit policy for column width inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecAutofitCellsPolicy {
    /// Max body rows inspected per sheet.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Workbook-wide layout options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecWorkbookOptions {
    pub font_name: String,
    pub font_size_title: i64,
    pub font_size_header: i64,
    pub font_size_body: i64,
    pub height_row_title: f64,
    pub height_row_header: f64,
    /// Upper bound of the summed column widths of any sheet.
    pub width_sheet_max: f64,
    pub policy_autofit: SpecAutofitCellsPolicy,
}

impl Default for SpecWorkbookOptions {
    fn default() -> Self {
        crate::conf::derive_default_workbook_options()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
