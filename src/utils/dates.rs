use chrono::{DateTime, NaiveDate};

/// Parse a client-supplied date into a calendar date, discarding any
/// time-of-day component. Accepts the canonical ISO 8601 date form
/// (`2024-06-10`) as well as a full RFC 3339 timestamp, so comparisons
/// downstream are always calendar-day-based.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    None
}

/// Number of rental days in `[start, end)`. Zero or negative when
/// `end <= start`; callers must reject non-positive results before use.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// overlap iff `a_start < b_end && a_end > b_start`. The end date is the
/// checkout day, so back-to-back bookings do not collide.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_iso_date() {
        assert_eq!(parse_calendar_date("2024-06-10"), Some(d(2024, 6, 10)));
        assert_eq!(parse_calendar_date("  2024-06-10  "), Some(d(2024, 6, 10)));
    }

    #[test]
    fn parses_full_timestamp_and_strips_time() {
        assert_eq!(
            parse_calendar_date("2024-06-10T14:30:00+00:00"),
            Some(d(2024, 6, 10))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_calendar_date("not-a-date"), None);
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("2024-13-40"), None);
    }

    #[test]
    fn day_count_boundaries() {
        assert_eq!(day_count(d(2024, 3, 1), d(2024, 3, 3)), 2);
        assert_eq!(day_count(d(2024, 3, 1), d(2024, 3, 2)), 1);
        // Same day and inverted ranges are non-positive, callers reject them.
        assert_eq!(day_count(d(2024, 3, 1), d(2024, 3, 1)), 0);
        assert!(day_count(d(2024, 3, 3), d(2024, 3, 1)) < 0);
    }

    #[test]
    fn overlapping_ranges_detected() {
        assert!(ranges_overlap(
            d(2024, 6, 12),
            d(2024, 6, 15),
            d(2024, 6, 10),
            d(2024, 6, 13)
        ));
        // Containment.
        assert!(ranges_overlap(
            d(2024, 6, 11),
            d(2024, 6, 12),
            d(2024, 6, 10),
            d(2024, 6, 15)
        ));
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        assert!(!ranges_overlap(
            d(2024, 6, 20),
            d(2024, 6, 25),
            d(2024, 6, 10),
            d(2024, 6, 13)
        ));
    }

    #[test]
    fn back_to_back_is_allowed() {
        // One booking ends on the day the next starts: checkout day is free.
        assert!(!ranges_overlap(
            d(2024, 6, 13),
            d(2024, 6, 16),
            d(2024, 6, 10),
            d(2024, 6, 13)
        ));
        assert!(!ranges_overlap(
            d(2024, 6, 10),
            d(2024, 6, 13),
            d(2024, 6, 13),
            d(2024, 6, 16)
        ));
    }
}
