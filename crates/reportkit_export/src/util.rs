//! Clocks and filename generation.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

use crate::conf::{
    C_FILE_NAME_REPLACEMENT, C_FILE_PART_SEPARATOR, C_FILE_TIMESTAMP_FORMAT,
    TUP_FILE_NAME_ILLEGAL,
};

////////////////////////////////////////////////////////////////////////////////
// #region Clock

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    instant: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut instant = self.instant.lock();
        *instant += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.lock()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileNames

fn sanitize_file_part(part: &str) -> String {
    part.trim()
        .chars()
        .map(|chr| {
            if chr.is_whitespace() || chr.is_control() || TUP_FILE_NAME_ILLEGAL.contains(&chr) {
                C_FILE_NAME_REPLACEMENT
            } else {
                chr
            }
        })
        .collect()
}

/// `<reportType>[_<dateRange>]_<timestamp>`, without extension.
///
/// Empty date ranges are omitted. Timestamps have millisecond resolution, so
/// two stems differ whenever the instants differ by at least 1 ms.
pub fn derive_file_stem(
    report_type: &str,
    date_range: Option<&str>,
    instant: DateTime<Utc>,
) -> String {
    let mut l_parts = vec![sanitize_file_part(report_type)];
    if let Some(c_range) = date_range
        && !c_range.trim().is_empty()
    {
        l_parts.push(sanitize_file_part(c_range));
    }
    l_parts.push(instant.format(C_FILE_TIMESTAMP_FORMAT).to_string());
    l_parts.join(C_FILE_PART_SEPARATOR)
}

/// Key under which in-flight exports of one report are tracked.
pub fn derive_export_key(report_type: &str, date_range: Option<&str>) -> String {
    match date_range {
        Some(c_range) if !c_range.trim().is_empty() => format!("{report_type}/{c_range}"),
        _ => report_type.to_string(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn build_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap()
    }

    #[test]
    fn stem_has_compact_millisecond_timestamp() {
        let instant = build_instant() + TimeDelta::milliseconds(7);
        assert_eq!(
            derive_file_stem("CohortAnalysis", Some("30d"), instant),
            "CohortAnalysis_30d_20261017T093000007Z"
        );
        assert_eq!(
            derive_file_stem("UsersList", None, instant),
            "UsersList_20261017T093000007Z"
        );
        assert_eq!(
            derive_file_stem("UsersList", Some("  "), instant),
            "UsersList_20261017T093000007Z"
        );
    }

    #[test]
    fn hostile_characters_are_replaced() {
        let c_stem = derive_file_stem("../Users List", Some("2026/01:2026/03"), build_instant());
        assert_eq!(c_stem, ".._Users_List_2026_01_2026_03_20261017T093000000Z");
        assert!(!c_stem.contains('/'));
    }

    #[test]
    fn fixed_clock_moves_only_on_request() {
        let clock = FixedClock::new(build_instant());
        assert_eq!(clock.now(), clock.now());
        clock.advance(TimeDelta::milliseconds(1));
        assert_eq!(clock.now(), build_instant() + TimeDelta::milliseconds(1));
    }

    #[test]
    fn export_key_includes_date_range() {
        assert_eq!(derive_export_key("CohortAnalysis", Some("30d")), "CohortAnalysis/30d");
        assert_eq!(derive_export_key("CohortAnalysis", None), "CohortAnalysis");
    }
}
