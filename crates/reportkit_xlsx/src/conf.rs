//! Workbook constants and default preset factories.

use std::collections::BTreeMap;

use reportkit_core::{SpecColor, SpecTheme};

use crate::spec::{SpecAutofitCellsPolicy, SpecCellFormat, SpecWorkbookOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Row holding the merged sheet title.
pub const N_ROW_TITLE: usize = 0;
/// Row holding the column headers; rows above and including it are frozen.
pub const N_ROW_HEADER: usize = 1;
/// First body row.
pub const N_ROW_BODY: usize = 2;

/// Border style codes understood by the serializer.
pub const N_BORDER_THIN: i64 = 1;
pub const N_BORDER_MEDIUM: i64 = 2;

/// Canonical format preset keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumFmtKey {
    /// Merged sheet title.
    Title,
    /// Column header cell.
    Header,
    /// Plain text body cell.
    Text,
    /// Thousands-separated integer.
    Count,
    /// Money amount.
    Currency,
    /// Percentage stored as `0..=100`.
    Percentage,
    /// Signed growth percentage.
    Trend,
}

/// Build default workbook options.
pub fn derive_default_workbook_options() -> SpecWorkbookOptions {
    SpecWorkbookOptions {
        font_name: "Calibri".to_string(),
        font_size_title: 14,
        font_size_header: 11,
        font_size_body: 10,
        height_row_title: 26.0,
        height_row_header: 20.0,
        width_sheet_max: 160.0,
        policy_autofit: SpecAutofitCellsPolicy::default(),
    }
}

/// Build named format presets for a theme.
///
/// Body presets carry a thin border and no fill; callers overlay colors with
/// [`SpecCellFormat::merge`].
pub fn derive_default_xlsx_formats(
    theme: &SpecTheme,
    options: &SpecWorkbookOptions,
) -> BTreeMap<EnumFmtKey, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some(options.font_name.clone()),
        font_size: Some(options.font_size_body),
        border: Some(N_BORDER_THIN),
        border_color: Some(theme.palette.border),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        font_color: Some(theme.palette.text),
        ..Default::default()
    };
    let cfg_number_fmt_spec = cfg_base_fmt_spec.with_(SpecCellFormat {
        align: Some("right".to_string()),
        ..Default::default()
    });

    let mut dict_fmt = BTreeMap::new();
    dict_fmt.insert(
        EnumFmtKey::Title,
        SpecCellFormat {
            font_name: Some(options.font_name.clone()),
            font_size: Some(options.font_size_title),
            bold: Some(true),
            font_color: Some(theme.palette.primary),
            align: Some("left".to_string()),
            valign: Some("vcenter".to_string()),
            ..Default::default()
        },
    );
    dict_fmt.insert(
        EnumFmtKey::Header,
        cfg_base_fmt_spec.with_(SpecCellFormat {
            font_size: Some(options.font_size_header),
            bold: Some(true),
            align: Some("center".to_string()),
            font_color: Some(SpecColor::WHITE),
            bg_color: Some(theme.palette.primary),
            border_color: Some(theme.palette.primary),
            ..Default::default()
        }),
    );
    dict_fmt.insert(EnumFmtKey::Text, cfg_base_fmt_spec.clone());
    dict_fmt.insert(
        EnumFmtKey::Count,
        cfg_number_fmt_spec.with_(SpecCellFormat {
            num_format: Some("#,##0".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Currency,
        cfg_number_fmt_spec.with_(SpecCellFormat {
            num_format: Some("$#,##0.00".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Percentage,
        cfg_number_fmt_spec.with_(SpecCellFormat {
            num_format: Some("0.0\"%\"".to_string()),
            ..Default::default()
        }),
    );
    dict_fmt.insert(
        EnumFmtKey::Trend,
        cfg_number_fmt_spec.with_(SpecCellFormat {
            num_format: Some("+0.0\"%\";-0.0\"%\"".to_string()),
            ..Default::default()
        }),
    );

    dict_fmt
}
