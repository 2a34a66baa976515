//! Stateless helper utilities used by the workbook writer.

use std::collections::BTreeSet;

use reportkit_core::{ReportError, ReportResult};

use crate::conf::{N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL};
use crate::spec::SpecAutofitCellsPolicy;

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Return `name` or the first free `name__N` (N >= 2), registering the result.
///
/// Comparison is case-insensitive, matching Excel.
pub fn derive_unique_sheet_name(name: &str, set_names_existing: &mut BTreeSet<String>) -> String {
    if set_names_existing.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 4))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if set_names_existing.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnWidths

/// Estimate displayed width units: ascii counts 1, other chars 1.6.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Reject autofit policies with an empty width range.
pub fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> ReportResult<()> {
    if policy_autofit.width_cell_min == 0 {
        return Err(ReportError::invalid(
            "policy_autofit.width_cell_min",
            "must be >= 1",
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(ReportError::invalid(
            "policy_autofit.width_cell_max",
            "must be >= policy_autofit.width_cell_min",
        ));
    }
    Ok(())
}

/// Final column widths from recorded content widths.
///
/// Each width gets the padding and is clamped to `[width_cell_min,
/// width_cell_max]`; if the sum then exceeds `width_sheet_max` every column
/// is scaled down by the same factor.
pub fn plan_column_widths(
    l_widths_recorded: &[usize],
    policy_autofit: &SpecAutofitCellsPolicy,
    width_sheet_max: f64,
) -> Vec<f64> {
    let n_min = usize::max(1, policy_autofit.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy_autofit.width_cell_max));
    let n_pad = policy_autofit.width_cell_padding;

    let l_widths: Vec<f64> = l_widths_recorded
        .iter()
        .map(|n_width| usize::min(n_max, usize::max(n_min, n_width + n_pad)) as f64)
        .collect();

    let n_sum: f64 = l_widths.iter().sum();
    if n_sum <= width_sheet_max || n_sum <= 0.0 {
        return l_widths;
    }
    let n_scale = width_sheet_max / n_sum;
    l_widths.iter().map(|n_width| n_width * n_scale).collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_are_sanitized_and_capped() {
        assert_eq!(sanitize_sheet_name("Revenue [Q1/Q2]", "_"), "Revenue _Q1_Q2_");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        let c_long = "Cohort retention by acquisition channel and month";
        assert_eq!(sanitize_sheet_name(c_long, "_").chars().count(), 31);
    }

    #[test]
    fn duplicate_sheet_names_get_suffixes() {
        let mut set_names = BTreeSet::new();
        assert_eq!(derive_unique_sheet_name("Segments", &mut set_names), "Segments");
        assert_eq!(derive_unique_sheet_name("Segments", &mut set_names), "Segments__2");
        assert_eq!(derive_unique_sheet_name("segments", &mut set_names), "segments__3");

        let c_long = "A".repeat(31);
        derive_unique_sheet_name(&c_long, &mut set_names);
        let c_second = derive_unique_sheet_name(&c_long, &mut set_names);
        assert!(c_second.chars().count() <= 31);
        assert!(c_second.ends_with("__2"));
    }

    #[test]
    fn unicode_width_weighs_non_ascii() {
        assert_eq!(estimate_unicode_string_width("abc"), 3);
        assert_eq!(estimate_unicode_string_width("留存"), 3);
    }

    #[test]
    fn widths_are_clamped_then_scaled_to_sheet_max() {
        let policy = SpecAutofitCellsPolicy::default();
        let l_widths = plan_column_widths(&[1, 20, 200], &policy, 500.0);
        assert_eq!(l_widths, vec![8.0, 22.0, 60.0]);

        let l_widths_wide = plan_column_widths(&[50; 9], &policy, 160.0);
        let n_sum: f64 = l_widths_wide.iter().sum();
        assert!(n_sum <= 160.0 + 1e-9);
        assert!(l_widths_wide.windows(2).all(|w| (w[0] - w[1]).abs() < 1e-9));
    }

    #[test]
    fn empty_width_range_is_rejected() {
        let policy = SpecAutofitCellsPolicy {
            width_cell_min: 10,
            width_cell_max: 5,
            ..Default::default()
        };
        assert!(validate_policy_autofit(&policy).is_err());
        assert!(validate_policy_autofit(&SpecAutofitCellsPolicy::default()).is_ok());
    }
}
