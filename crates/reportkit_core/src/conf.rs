//! Palette constants and default preset factories.

use crate::spec::{
    EnumAlign, SpecColor, SpecColorBucket, SpecColorPair, SpecColorRule, SpecPalette,
    SpecTableStyle, SpecTheme,
};

/// Number of monthly slots rendered for every cohort row.
pub const N_COHORT_MONTH_SLOTS: usize = 6;
/// Placeholder text for absent values.
pub const C_ABSENT_PLACEHOLDER: &str = "-";
/// Currency prefix used by [`crate::util::format_currency`].
pub const C_CURRENCY_SYMBOL: &str = "$";
/// Label written in the first column of a totals row.
pub const C_TOTALS_LABEL: &str = "Total / Avg";

/// Brand indigo.
pub const COLOR_PRIMARY: SpecColor = SpecColor(0x4F46E5);
/// Retention >= 60.
pub const COLOR_GREEN_FG: SpecColor = SpecColor(0x166534);
pub const COLOR_GREEN_BG: SpecColor = SpecColor(0xDCFCE7);
/// Retention 40-59.
pub const COLOR_BLUE_FG: SpecColor = SpecColor(0x1E40AF);
pub const COLOR_BLUE_BG: SpecColor = SpecColor(0xDBEAFE);
/// Retention 25-39.
pub const COLOR_AMBER_FG: SpecColor = SpecColor(0x92400E);
pub const COLOR_AMBER_BG: SpecColor = SpecColor(0xFEF3C7);
/// Retention < 25.
pub const COLOR_RED_FG: SpecColor = SpecColor(0x991B1B);
pub const COLOR_RED_BG: SpecColor = SpecColor(0xFEE2E2);
/// Absent values.
pub const COLOR_GRAY_FG: SpecColor = SpecColor(0x6B7280);
pub const COLOR_GRAY_BG: SpecColor = SpecColor(0xF3F4F6);

/// Default palette.
pub fn derive_default_palette() -> SpecPalette {
    SpecPalette {
        primary: COLOR_PRIMARY,
        text: SpecColor(0x111827),
        text_muted: COLOR_GRAY_FG,
        border: SpecColor(0xE5E7EB),
        band: SpecColor(0xF9FAFB),
        total_fill: SpecColor(0xE5E7EB),
        surface: SpecColor(0xF8FAFC),
        success: SpecColor(0x16A34A),
        danger: SpecColor(0xDC2626),
    }
}

fn derive_undefined_pair() -> SpecColorPair {
    SpecColorPair {
        foreground: COLOR_GRAY_FG,
        background: COLOR_GRAY_BG,
    }
}

/// Retention rule: `[60, 40, 25, 0]` -> green, blue, amber, red.
pub fn derive_default_retention_rule() -> SpecColorRule {
    let l_tiers = [
        (60.0, ">= 60%", COLOR_GREEN_FG, COLOR_GREEN_BG),
        (40.0, "40-59%", COLOR_BLUE_FG, COLOR_BLUE_BG),
        (25.0, "25-39%", COLOR_AMBER_FG, COLOR_AMBER_BG),
        (0.0, "< 25%", COLOR_RED_FG, COLOR_RED_BG),
    ];
    SpecColorRule {
        buckets: l_tiers
            .into_iter()
            .map(|(bound_lower, label, foreground, background)| SpecColorBucket {
                bound_lower,
                label: label.to_string(),
                colors: SpecColorPair {
                    foreground,
                    background,
                },
            })
            .collect(),
        undefined: derive_undefined_pair(),
        label_undefined: "Not yet available".to_string(),
    }
}

/// Trend rule: non-negative -> success, negative -> danger.
pub fn derive_default_trend_rule() -> SpecColorRule {
    let palette = derive_default_palette();
    SpecColorRule {
        buckets: vec![
            SpecColorBucket {
                bound_lower: 0.0,
                label: "Growth".to_string(),
                colors: SpecColorPair {
                    foreground: palette.success,
                    background: COLOR_GREEN_BG,
                },
            },
            SpecColorBucket {
                bound_lower: f64::MIN,
                label: "Decline".to_string(),
                colors: SpecColorPair {
                    foreground: palette.danger,
                    background: COLOR_RED_BG,
                },
            },
        ],
        undefined: derive_undefined_pair(),
        label_undefined: "No data".to_string(),
    }
}

/// Default platform theme.
pub fn derive_default_theme() -> SpecTheme {
    SpecTheme {
        palette: derive_default_palette(),
        rule_retention: derive_default_retention_rule(),
        rule_trend: derive_default_trend_rule(),
        brand: "Trading Challenge Platform".to_string(),
        logo_text: "TC".to_string(),
    }
}

pub(crate) const TABLE_STYLE_DEFAULT: SpecTableStyle = SpecTableStyle {
    font_size_header: 9.0,
    font_size_body: 9.0,
    padding_cell: 6.0,
    height_header: 22.0,
    height_row: 20.0,
    align_body: EnumAlign::Left,
    if_banded: true,
    if_fill_coded: false,
};

pub(crate) const TABLE_STYLE_COMPACT: SpecTableStyle = SpecTableStyle {
    font_size_header: 8.0,
    font_size_body: 7.5,
    padding_cell: 4.0,
    height_header: 18.0,
    height_row: 15.0,
    align_body: EnumAlign::Left,
    if_banded: true,
    if_fill_coded: false,
};

pub(crate) const TABLE_STYLE_COLOR_CODED: SpecTableStyle = SpecTableStyle {
    font_size_header: 8.5,
    font_size_body: 8.5,
    padding_cell: 5.0,
    height_header: 22.0,
    height_row: 20.0,
    align_body: EnumAlign::Center,
    if_banded: false,
    if_fill_coded: true,
};
