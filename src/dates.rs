use chrono::{DateTime, NaiveDate};

use crate::models::CourseRecord;

/// Time-period selector state, resolved to a concrete date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Month,
    Quarter,
    Year,
    AllTime,
}

/// Inclusive day-granularity window. Membership tests compare at day
/// granularity, so an end date of Jan 31 includes the whole of Jan 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Maps the selector state to a window. `None` means "no filtering":
/// `AllTime` always, and `Month`/`Quarter` when their required field is
/// missing or out of range. `year` is always present (the selector defaults
/// it), so the `Year` arm has no null case.
pub fn resolve(
    period: Period,
    month: Option<u32>,
    quarter: Option<u32>,
    year: i32,
) -> Option<DateRange> {
    match period {
        Period::AllTime => None,
        Period::Month => {
            // Zero-based month, as the selector sends it.
            let month = month.filter(|m| *m <= 11)?;
            month_span(year, month, 1)
        }
        Period::Quarter => {
            let quarter = quarter.filter(|q| (1..=4).contains(q))?;
            month_span(year, (quarter - 1) * 3, 3)
        }
        Period::Year => month_span(year, 0, 12),
    }
}

/// Window covering `months` calendar months starting at zero-based
/// `start_month` of `year`.
fn month_span(year: i32, start_month: u32, months: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, start_month + 1, 1)?;
    let after = start_month + months;
    let next = if after >= 12 {
        NaiveDate::from_ymd_opt(year + 1, after - 11, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, after + 1, 1)?
    };
    let end = next.pred_opt()?;
    Some(DateRange { start, end })
}

/// Start date of a course regardless of which wire representation it uses.
/// The Unix-seconds field wins when both are present, since it marks the
/// LMS-synced origin.
pub fn course_start_date(course: &CourseRecord) -> Option<NaiveDate> {
    if let Some(seconds) = course.startdate {
        return from_unix_seconds(seconds);
    }
    course.start_date.as_deref().and_then(parse_iso_date)
}

pub fn course_end_date(course: &CourseRecord) -> Option<NaiveDate> {
    if let Some(seconds) = course.enddate {
        return from_unix_seconds(seconds);
    }
    course.end_date.as_deref().and_then(parse_iso_date)
}

fn from_unix_seconds(seconds: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(seconds, 0).map(|at| at.date_naive())
}

/// Accepts a bare `YYYY-MM-DD` or a full ISO datetime; anything else is
/// treated as no date.
fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.date_naive());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// A course is in range when its (day-normalized) start date falls inside
/// the window. Courses with no start date never match a concrete window.
pub fn in_range(course: &CourseRecord, range: &DateRange) -> bool {
    match course_start_date(course) {
        Some(start) => range.contains(start),
        None => false,
    }
}

/// Caller-side rule for the unfiltered case: a `None` window matches every
/// course, including ones with no date fields at all.
pub fn course_in_window(course: &CourseRecord, range: Option<&DateRange>) -> bool {
    match range {
        Some(range) => in_range(course, range),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn course(start_date: Option<&str>, startdate: Option<i64>) -> CourseRecord {
        CourseRecord {
            id: Uuid::nil(),
            name: "Workplace Safety".to_string(),
            batch_code: None,
            status: None,
            course_type: None,
            start_date: start_date.map(str::to_string),
            end_date: None,
            startdate,
            enddate: None,
            seat_limit: None,
            current_enrolled: None,
        }
    }

    #[test]
    fn resolves_january_window() {
        let range = resolve(Period::Month, Some(0), None, 2024).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert!(in_range(&course(Some("2024-01-15"), None), &range));
        assert!(!in_range(&course(Some("2024-02-01"), None), &range));
    }

    #[test]
    fn month_window_is_inclusive_of_its_last_day() {
        let range = resolve(Period::Month, Some(1), None, 2024).unwrap();
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(in_range(&course(Some("2024-02-29"), None), &range));
    }

    #[test]
    fn resolves_quarter_window() {
        let range = resolve(Period::Quarter, None, Some(4), 2023).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn resolves_year_window() {
        let range = resolve(Period::Year, None, None, 2024).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn missing_selector_fields_mean_no_filtering() {
        assert_eq!(resolve(Period::AllTime, None, None, 2024), None);
        assert_eq!(resolve(Period::Month, None, None, 2024), None);
        assert_eq!(resolve(Period::Month, Some(12), None, 2024), None);
        assert_eq!(resolve(Period::Quarter, None, Some(5), 2024), None);
    }

    #[test]
    fn unix_and_iso_starts_agree_at_day_granularity() {
        // 1704067200 is 2024-01-01T00:00:00Z.
        let from_unix = course_start_date(&course(None, Some(1704067200)));
        let from_iso = course_start_date(&course(Some("2024-01-01"), None));
        assert_eq!(from_unix, from_iso);
        assert_eq!(from_unix, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn iso_datetime_strings_normalize_to_their_day() {
        let record = course(Some("2024-03-05T09:30:00+00:00"), None);
        assert_eq!(
            course_start_date(&record),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn unix_field_wins_when_both_representations_appear() {
        let record = course(Some("2024-06-01"), Some(1704067200));
        assert_eq!(
            course_start_date(&record),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn garbage_dates_are_treated_as_absent() {
        assert_eq!(course_start_date(&course(Some("soon"), None)), None);
        assert_eq!(course_start_date(&course(Some(""), None)), None);
    }

    #[test]
    fn null_window_matches_dateless_courses() {
        let dateless = course(None, None);
        assert!(course_in_window(&dateless, None));
        let range = resolve(Period::Year, None, None, 2024).unwrap();
        assert!(!course_in_window(&dateless, Some(&range)));
    }
}
