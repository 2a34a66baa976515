//! Pure style lookups shared by the document and workbook renderers.
//!
//! Both backends call into this module for every colored value, which keeps a
//! given number on the same color family in every output format.

use crate::conf::{TABLE_STYLE_COLOR_CODED, TABLE_STYLE_COMPACT, TABLE_STYLE_DEFAULT};
use crate::error::{ReportError, ReportResult};
use crate::spec::{
    EnumTableCell, EnumTableVariant, SpecColorPair, SpecColorRule, SpecTableStyle, SpecTheme,
};

////////////////////////////////////////////////////////////////////////////////
// #region ThresholdColors

/// Index of the bucket `value` falls into; `None` for absent/NaN input.
///
/// Buckets are checked high-to-low and the first one whose lower bound is
/// `<= value` wins. Values below every bound fall into the last bucket.
pub fn bucket_index_for_threshold(value: Option<f64>, rule: &SpecColorRule) -> Option<usize> {
    let n_value = value.filter(|v| !v.is_nan())?;
    if rule.buckets.is_empty() {
        return None;
    }
    let n_idx = rule
        .buckets
        .iter()
        .position(|bucket| bucket.bound_lower <= n_value)
        .unwrap_or(rule.buckets.len() - 1);
    Some(n_idx)
}

/// Color pair for `value` under `rule`.
pub fn color_for_threshold(value: Option<f64>, rule: &SpecColorRule) -> SpecColorPair {
    match bucket_index_for_threshold(value, rule) {
        Some(n_idx) => rule.buckets[n_idx].colors,
        None => rule.undefined,
    }
}

/// Color pair for a signed growth value under the theme trend rule.
pub fn color_for_trend(value: f64, theme: &SpecTheme) -> SpecColorPair {
    color_for_threshold(Some(value), &theme.rule_trend)
}

/// Threshold color of a typed cell, or `None` for cells that stay neutral.
pub fn color_for_cell(cell: &EnumTableCell, theme: &SpecTheme) -> Option<SpecColorPair> {
    match cell {
        EnumTableCell::Coded(value) => Some(color_for_threshold(*value, &theme.rule_retention)),
        EnumTableCell::Trend(value) => Some(color_for_trend(*value, theme)),
        _ => None,
    }
}

/// Legend entries of a rule: every bucket in rule order, then the undefined entry.
pub fn derive_legend_entries(rule: &SpecColorRule) -> Vec<(String, SpecColorPair)> {
    rule.buckets
        .iter()
        .map(|bucket| (bucket.label.clone(), bucket.colors))
        .chain(std::iter::once((
            rule.label_undefined.clone(),
            rule.undefined,
        )))
        .collect()
}

/// Check that a rule is non-empty, strictly decreasing and covers `[0, 100]`.
pub fn validate_color_rule(rule: &SpecColorRule) -> ReportResult<()> {
    let Some(bucket_last) = rule.buckets.last() else {
        return Err(ReportError::InvalidColorRule(
            "rule must have at least one bucket".to_string(),
        ));
    };

    for (n_idx, bucket) in rule.buckets.iter().enumerate() {
        if !bucket.bound_lower.is_finite() {
            return Err(ReportError::InvalidColorRule(format!(
                "bucket {n_idx} ({:?}) has non-finite bound",
                bucket.label
            )));
        }
        if n_idx > 0 && bucket.bound_lower >= rule.buckets[n_idx - 1].bound_lower {
            return Err(ReportError::InvalidColorRule(format!(
                "bounds must strictly decrease; bucket {n_idx} ({}) >= bucket {} ({})",
                bucket.bound_lower,
                n_idx - 1,
                rule.buckets[n_idx - 1].bound_lower
            )));
        }
    }

    if bucket_last.bound_lower > 0.0 {
        return Err(ReportError::InvalidColorRule(format!(
            "lowest bound {} leaves [0, {}) unmapped",
            bucket_last.bound_lower, bucket_last.bound_lower
        )));
    }

    let if_undefined_shared = rule
        .buckets
        .iter()
        .any(|bucket| bucket.colors == rule.undefined);
    if if_undefined_shared {
        return Err(ReportError::InvalidColorRule(
            "undefined colors must differ from every bucket".to_string(),
        ));
    }

    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableVariants

/// Style descriptor for a named table variant.
pub fn table_style_variant(variant: EnumTableVariant) -> SpecTableStyle {
    match variant {
        EnumTableVariant::Default => TABLE_STYLE_DEFAULT,
        EnumTableVariant::Compact => TABLE_STYLE_COMPACT,
        EnumTableVariant::ColorCoded => TABLE_STYLE_COLOR_CODED,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::conf::{
        COLOR_AMBER_BG, COLOR_BLUE_BG, COLOR_GRAY_BG, COLOR_GREEN_BG, COLOR_GREEN_FG,
        COLOR_RED_BG, derive_default_retention_rule, derive_default_theme,
    };
    use crate::spec::{SpecColor, SpecColorBucket};

    #[test]
    fn retention_65_is_green() {
        let rule = derive_default_retention_rule();
        let pair = color_for_threshold(Some(65.0), &rule);
        assert_eq!(pair.foreground, COLOR_GREEN_FG);
        assert_eq!(pair.background, COLOR_GREEN_BG);
    }

    #[test]
    fn retention_39_is_amber_not_blue() {
        let rule = derive_default_retention_rule();
        assert_eq!(bucket_index_for_threshold(Some(39.0), &rule), Some(2));
        assert_eq!(color_for_threshold(Some(39.0), &rule).background, COLOR_AMBER_BG);
        assert_eq!(color_for_threshold(Some(40.0), &rule).background, COLOR_BLUE_BG);
    }

    #[test]
    fn absent_value_is_undefined_even_next_to_zero() {
        let rule = derive_default_retention_rule();
        assert_eq!(color_for_threshold(None, &rule).background, COLOR_GRAY_BG);
        assert_eq!(color_for_threshold(Some(f64::NAN), &rule), rule.undefined);
        assert_eq!(color_for_threshold(Some(0.0), &rule).background, COLOR_RED_BG);
        assert_ne!(color_for_threshold(Some(0.0), &rule), rule.undefined);
    }

    #[test]
    fn negative_growth_is_danger() {
        let theme = derive_default_theme();
        assert_eq!(
            color_for_trend(-15.2, &theme).foreground,
            theme.palette.danger
        );
        assert_eq!(color_for_trend(0.0, &theme).foreground, theme.palette.success);
    }

    #[test]
    fn legend_entries_end_with_undefined() {
        let rule = derive_default_retention_rule();
        let l_entries = derive_legend_entries(&rule);
        assert_eq!(l_entries.len(), 5);
        assert_eq!(l_entries[0].1.background, COLOR_GREEN_BG);
        assert_eq!(l_entries[4], (rule.label_undefined.clone(), rule.undefined));
    }

    #[test]
    fn default_rules_are_valid() {
        let theme = derive_default_theme();
        validate_color_rule(&theme.rule_retention).unwrap();
        validate_color_rule(&theme.rule_trend).unwrap();
    }

    #[test]
    fn rule_not_reaching_zero_is_rejected() {
        let mut rule = derive_default_retention_rule();
        rule.buckets.pop();
        let err = validate_color_rule(&rule).unwrap_err();
        assert!(matches!(err, ReportError::InvalidColorRule(_)));
    }

    #[test]
    fn rule_with_increasing_bounds_is_rejected() {
        let mut rule = derive_default_retention_rule();
        rule.buckets.swap(0, 1);
        assert!(validate_color_rule(&rule).is_err());

        let mut rule_empty = derive_default_retention_rule();
        rule_empty.buckets.clear();
        assert!(validate_color_rule(&rule_empty).is_err());
    }

    #[test]
    fn rule_reusing_undefined_colors_is_rejected() {
        let mut rule = derive_default_retention_rule();
        rule.buckets.push(SpecColorBucket {
            bound_lower: -10.0,
            label: "below".to_string(),
            colors: rule.undefined,
        });
        assert!(validate_color_rule(&rule).is_err());
        rule.buckets.last_mut().unwrap().colors.background = SpecColor(0x000000);
        assert!(validate_color_rule(&rule).is_ok());
    }

    #[test]
    fn table_variants_differ_where_expected() {
        let style_default = table_style_variant(EnumTableVariant::Default);
        let style_compact = table_style_variant(EnumTableVariant::Compact);
        let style_coded = table_style_variant(EnumTableVariant::ColorCoded);
        assert!(style_compact.font_size_body < style_default.font_size_body);
        assert!(style_compact.height_row < style_default.height_row);
        assert!(style_coded.if_fill_coded);
        assert!(!style_default.if_fill_coded);
    }

    proptest! {
        #[test]
        fn prop_every_percentage_maps_to_exactly_one_bucket(v in 0.0f64..=100.0) {
            let rule = derive_default_retention_rule();
            let l_matches = rule
                .buckets
                .iter()
                .enumerate()
                .filter(|(n_idx, bucket)| {
                    let n_upper = if *n_idx == 0 {
                        f64::INFINITY
                    } else {
                        rule.buckets[n_idx - 1].bound_lower
                    };
                    bucket.bound_lower <= v && v < n_upper
                })
                .count();
            prop_assert_eq!(l_matches, 1);
            prop_assert!(bucket_index_for_threshold(Some(v), &rule).is_some());
        }

        #[test]
        fn prop_bucket_assignment_is_monotonic(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
            let rule = derive_default_retention_rule();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let n_idx_lo = bucket_index_for_threshold(Some(lo), &rule).unwrap();
            let n_idx_hi = bucket_index_for_threshold(Some(hi), &rule).unwrap();
            // Lower index means a better tier.
            prop_assert!(n_idx_hi <= n_idx_lo);
        }

        #[test]
        fn prop_lookup_is_deterministic(v in -50.0f64..=150.0) {
            let rule = derive_default_retention_rule();
            prop_assert_eq!(color_for_threshold(Some(v), &rule), color_for_threshold(Some(v), &rule));
        }
    }
}
