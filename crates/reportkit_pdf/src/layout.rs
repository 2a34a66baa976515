//! Text metrics and section measurement.
//!
//! Every section is measured before it is painted so the layout pass can
//! decide page breaks up front instead of discovering overflow mid-draw.

use reportkit_core::style::{derive_legend_entries, table_style_variant};
use reportkit_core::util::{derive_matrix_table, format_cell_text};
use reportkit_core::{
    EnumSectionKind, SpecColorPair, SpecColorRule, SpecTable, SpecTableStyle, SpecTheme,
};

use crate::spec::SpecDocumentOptions;

////////////////////////////////////////////////////////////////////////////////
// #region TextMetrics

/// Helvetica advance width of `chr` in 1/1000 em.
fn derive_char_advance(chr: char) -> f32 {
    match chr {
        'i' | 'j' | 'l' | '\'' | '|' => 222.0,
        ' ' | '.' | ',' | ':' | ';' | '!' | 'f' | 't' | 'I' | '/' | '(' | ')' | '[' | ']' => {
            278.0
        }
        'r' | '-' => 333.0,
        'm' | 'M' => 833.0,
        'w' | 'W' => 800.0,
        '%' => 889.0,
        '@' => 1015.0,
        '0'..='9' | '$' | '#' | '_' | '+' | '=' | '<' | '>' => 556.0,
        'a'..='z' => 540.0,
        'A'..='Z' => 680.0,
        chr if chr.is_ascii() => 556.0,
        _ => 900.0,
    }
}

/// Estimated rendered width of `text` in points.
pub fn estimate_text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let n_units: f32 = text.chars().map(derive_char_advance).sum();
    let n_factor_bold = if bold { 1.06 } else { 1.0 };
    n_units / 1000.0 * font_size * n_factor_bold
}

/// Cut `text` so it fits `width_max`, appending `...` when shortened.
pub fn truncate_text_to_width(text: &str, font_size: f32, bold: bool, width_max: f32) -> String {
    if estimate_text_width(text, font_size, bold) <= width_max {
        return text.to_string();
    }
    let n_width_ellipsis = estimate_text_width("...", font_size, bold);
    let mut c_out = String::new();
    let mut n_width = 0.0;
    for chr in text.chars() {
        let n_advance = derive_char_advance(chr) / 1000.0 * font_size;
        if n_width + n_advance + n_width_ellipsis > width_max {
            break;
        }
        n_width += n_advance;
        c_out.push(chr);
    }
    c_out.push_str("...");
    c_out
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TablePlanning

/// Column widths summing to `width_total`, proportional to content width.
///
/// Every column gets at least `width_total / (2 * n_cols)` so narrow numeric
/// columns stay readable.
pub fn plan_column_widths(table: &SpecTable, style: &SpecTableStyle, width_total: f32) -> Vec<f32> {
    let n_cols = table.headers.len();
    if n_cols == 0 {
        return vec![];
    }

    let mut l_widths_natural: Vec<f32> = table
        .headers
        .iter()
        .map(|header| estimate_text_width(header, style.font_size_header, true))
        .collect();
    for row in &table.rows {
        for (n_idx_col, cell) in row.iter().enumerate().take(n_cols) {
            let n_width = estimate_text_width(&format_cell_text(cell), style.font_size_body, false);
            l_widths_natural[n_idx_col] = l_widths_natural[n_idx_col].max(n_width);
        }
    }

    let n_width_min = width_total / (2.0 * n_cols as f32);
    let l_widths_padded: Vec<f32> = l_widths_natural
        .iter()
        .map(|n_width| (n_width + 2.0 * style.padding_cell).max(n_width_min))
        .collect();
    let n_sum: f32 = l_widths_padded.iter().sum();

    l_widths_padded
        .iter()
        .map(|n_width| n_width / n_sum * width_total)
        .collect()
}

/// Height needed to start a table: header plus its first body row.
pub fn measure_table_head(style: &SpecTableStyle) -> f32 {
    style.height_header + style.height_row
}

/// Height of a table drawn without page breaks, trailing gap included.
pub fn measure_table(table: &SpecTable, options: &SpecDocumentOptions) -> f32 {
    let style = table_style_variant(table.variant);
    let n_rows = table.rows.len() + usize::from(table.if_totals);
    style.height_header + n_rows as f32 * style.height_row + options.gap_block
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LegendPlanning

/// Placed legend entry: swatch at `(x_offset, row)` followed by its label.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecLegendItem {
    pub x_offset: f32,
    pub row: usize,
    pub label: String,
    pub colors: SpecColorPair,
}

/// Font size of legend labels.
pub const N_FONT_SIZE_LEGEND: f32 = 8.0;

/// Lay out legend entries left to right, wrapping at `width_total`.
///
/// Order is the rule's bucket order followed by the undefined entry.
pub fn plan_legend_items(
    rule: &SpecColorRule,
    options: &SpecDocumentOptions,
    width_total: f32,
) -> Vec<SpecLegendItem> {
    let mut l_items = Vec::new();
    let mut n_x = 0.0f32;
    let mut n_row = 0usize;
    for (label, colors) in derive_legend_entries(rule) {
        let n_width_item = options.size_swatch
            + 4.0
            + estimate_text_width(&label, N_FONT_SIZE_LEGEND, false)
            + 14.0;
        if n_x > 0.0 && n_x + n_width_item > width_total {
            n_row += 1;
            n_x = 0.0;
        }
        l_items.push(SpecLegendItem {
            x_offset: n_x,
            row: n_row,
            label,
            colors,
        });
        n_x += n_width_item;
    }
    l_items
}

/// Height of a legend block, trailing gap included.
pub fn measure_legend(
    rule: &SpecColorRule,
    options: &SpecDocumentOptions,
    width_total: f32,
) -> f32 {
    let n_rows = plan_legend_items(rule, options, width_total)
        .last()
        .map_or(0, |item| item.row + 1);
    n_rows as f32 * options.height_legend_row + options.gap_block
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SectionMeasure

/// Vertical space requirements of one section body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecSectionMeasure {
    /// Space that must be free before the body can start.
    pub height_min: f32,
    /// Space the whole body takes without page breaks.
    pub height_full: f32,
    /// Whether the body may continue on following pages.
    pub if_splittable: bool,
}

/// Measure a section body (the title is measured separately).
pub fn measure_section(
    kind: &EnumSectionKind,
    theme: &SpecTheme,
    options: &SpecDocumentOptions,
) -> SpecSectionMeasure {
    let n_width = options.geometry.content_width();
    let fixed = |n_height: f32| SpecSectionMeasure {
        height_min: n_height,
        height_full: n_height,
        if_splittable: false,
    };
    match kind {
        EnumSectionKind::StatCards(_) => fixed(options.height_card + options.gap_block),
        EnumSectionKind::BarSeries(_) => fixed(options.height_chart + options.gap_block),
        EnumSectionKind::Legend(source) => {
            fixed(measure_legend(source.resolve(theme), options, n_width))
        }
        EnumSectionKind::Table(table) => SpecSectionMeasure {
            height_min: measure_table_head(&table_style_variant(table.variant)),
            height_full: measure_table(table, options),
            if_splittable: true,
        },
        EnumSectionKind::Matrix(matrix) => {
            let table = derive_matrix_table(matrix);
            SpecSectionMeasure {
                height_min: measure_table_head(&table_style_variant(table.variant)),
                height_full: measure_table(&table, options),
                if_splittable: true,
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
