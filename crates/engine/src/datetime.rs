//! Date/time normalization and ru-RU style formatting.
//!
//! Backend timestamps arrive in a handful of ISO-like shapes
//! (`2025-04-04T18:46:00`, `2025-04-04 18:46:00`, `2025-01-01T12:30`, with or
//! without fractional seconds or an offset). Offsets are dropped and the wall
//! clock time is kept, which is what the backend itself does when it stores a
//! receipt time.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Canonical shape stored on [`Transaction::date_time`](crate::Transaction).
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DAY_NAMES: [&str; 7] = ["ВС", "ПН", "ВТ", "СР", "ЧТ", "ПТ", "СБ"];

/// Parses any accepted timestamp shape. Returns `None` for empty or invalid
/// input.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Some(with_offset.naive_local());
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Normalizes a backend timestamp to [`ISO_FORMAT`], or `None` when it does
/// not parse.
pub fn normalize_timestamp(value: Option<&str>) -> Option<String> {
    value
        .and_then(parse_timestamp)
        .map(|dt| dt.format(ISO_FORMAT).to_string())
}

/// `dd.mm.yyyy`, empty when unparseable.
pub fn format_date_only(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%d.%m.%Y").to_string())
        .unwrap_or_default()
}

/// `HH:MM` (24h), empty when unparseable.
pub fn format_time_only(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| format!("{:02}:{:02}", dt.hour(), dt.minute()))
        .unwrap_or_default()
}

/// `dd.mm.yyyy HH:MM`, empty when unparseable.
pub fn format_date_time(value: &str) -> String {
    parse_timestamp(value)
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_default()
}

/// Day of week with Sunday = 0.
pub fn day_index(value: &str) -> Option<u32> {
    parse_timestamp(value).map(|dt| dt.weekday().num_days_from_sunday())
}

/// Two-letter Russian day abbreviation, empty when unparseable.
pub fn day_name(value: &str) -> &'static str {
    day_index(value)
        .and_then(|idx| DAY_NAMES.get(idx as usize).copied())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_backend_shapes() {
        for raw in [
            "2025-04-04T18:46:00",
            "2025-04-04 18:46:00",
            "2025-04-04T18:46",
            "2025-04-04T18:46:00.123456",
            "2025-04-04T18:46:00+05:00",
            "2025-04-04T18:46:00Z",
        ] {
            let parsed = parse_timestamp(raw).unwrap_or_else(|| panic!("{raw} did not parse"));
            assert_eq!(parsed.format("%Y-%m-%d %H:%M").to_string(), "2025-04-04 18:46");
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2025-13-40T10:00"), None);
        assert_eq!(normalize_timestamp(Some("yesterday")), None);
        assert_eq!(normalize_timestamp(None), None);
    }

    #[test]
    fn normalizes_to_iso() {
        assert_eq!(
            normalize_timestamp(Some("2025-01-01 12:30")).as_deref(),
            Some("2025-01-01T12:30:00")
        );
    }

    #[test]
    fn formats_parts() {
        let raw = "2025-04-04T08:05:00";
        assert_eq!(format_date_only(raw), "04.04.2025");
        assert_eq!(format_time_only(raw), "08:05");
        assert_eq!(format_date_time(raw), "04.04.2025 08:05");
        assert_eq!(format_date_time("bogus"), "");
    }

    #[test]
    fn day_names_start_on_sunday() {
        // 2025-04-06 is a Sunday, 2025-04-04 a Friday.
        assert_eq!(day_index("2025-04-06T23:00:00"), Some(0));
        assert_eq!(day_name("2025-04-06T23:00:00"), "ВС");
        assert_eq!(day_name("2025-04-04T18:46:00"), "ПТ");
        assert_eq!(day_name(""), "");
    }
}
