use chrono::NaiveDate;

use crate::dates::{course_end_date, course_start_date};
use crate::models::{unwrap_status, CourseRecord};

/// Lifecycle phase of a course.
///
/// A stored status wins outright: `draft` maps to `planning`, anything else
/// passes through lower-cased. Legacy records without a stored status fall
/// back to the dates. A dateless legacy record counts as already started,
/// never as planning.
pub fn derive_status(course: &CourseRecord, today: NaiveDate) -> String {
    if let Some(stored) = unwrap_status(&course.status) {
        let stored = stored.to_lowercase();
        if stored == "draft" {
            return "planning".to_string();
        }
        return stored;
    }

    match course_start_date(course) {
        Some(start) if start > today => "planning".to_string(),
        _ => match course_end_date(course) {
            Some(end) if end < today => "completed".to_string(),
            _ => "ongoing".to_string(),
        },
    }
}

/// Three-way temporal split used by the course list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayBucket {
    Upcoming,
    Ongoing,
    Completed,
}

impl DisplayBucket {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayBucket::Upcoming => "upcoming",
            DisplayBucket::Ongoing => "ongoing",
            DisplayBucket::Completed => "completed",
        }
    }
}

/// Refines the derived status with the course dates. Planning courses are
/// upcoming whatever their dates say (they are not running until approved);
/// completed ones stay completed; everything else splits on start and end:
/// not yet started means upcoming, already ended means completed.
pub fn display_bucket(course: &CourseRecord, today: NaiveDate) -> DisplayBucket {
    match derive_status(course, today).as_str() {
        "planning" => DisplayBucket::Upcoming,
        "completed" => DisplayBucket::Completed,
        _ => {
            if matches!(course_start_date(course), Some(start) if start > today) {
                DisplayBucket::Upcoming
            } else if matches!(course_end_date(course), Some(end) if end < today) {
                DisplayBucket::Completed
            } else {
                DisplayBucket::Ongoing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusValue;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn course(
        status: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> CourseRecord {
        CourseRecord {
            id: Uuid::nil(),
            name: "Forklift Certification".to_string(),
            batch_code: Some("FLT-24".to_string()),
            status: status.map(|raw| StatusValue::Plain(raw.to_string())),
            course_type: None,
            start_date: start_date.map(str::to_string),
            end_date: end_date.map(str::to_string),
            startdate: None,
            enddate: None,
            seat_limit: None,
            current_enrolled: None,
        }
    }

    #[test]
    fn stored_status_ignores_dates() {
        let record = course(Some("draft"), Some("2020-01-01"), Some("2020-02-01"));
        assert_eq!(derive_status(&record, today()), "planning");
        let record = course(Some("Ongoing"), Some("2030-01-01"), None);
        assert_eq!(derive_status(&record, today()), "ongoing");
    }

    #[test]
    fn unknown_stored_status_passes_through_lowercased() {
        let record = course(Some("Cancelled"), None, None);
        assert_eq!(derive_status(&record, today()), "cancelled");
    }

    #[test]
    fn wrapped_status_values_are_unwrapped() {
        let mut record = course(None, None, None);
        record.status = Some(StatusValue::Wrapped {
            value: "Draft".to_string(),
        });
        assert_eq!(derive_status(&record, today()), "planning");
    }

    #[test]
    fn empty_stored_status_falls_back_to_dates() {
        let record = course(Some(""), Some("2024-06-16"), None);
        assert_eq!(derive_status(&record, today()), "planning");
    }

    #[test]
    fn future_start_means_planning() {
        let record = course(None, Some("2024-06-16"), None);
        assert_eq!(derive_status(&record, today()), "planning");
    }

    #[test]
    fn past_end_means_completed() {
        let record = course(None, Some("2024-06-14"), Some("2024-06-14"));
        assert_eq!(derive_status(&record, today()), "completed");
    }

    #[test]
    fn open_ended_past_start_means_ongoing() {
        let record = course(None, Some("2024-06-14"), None);
        assert_eq!(derive_status(&record, today()), "ongoing");
        // End date today is not yet past.
        let record = course(None, Some("2024-06-01"), Some("2024-06-15"));
        assert_eq!(derive_status(&record, today()), "ongoing");
    }

    #[test]
    fn dateless_legacy_course_counts_as_started() {
        let record = course(None, None, None);
        assert_eq!(derive_status(&record, today()), "ongoing");
        let record = course(None, None, Some("2024-01-01"));
        assert_eq!(derive_status(&record, today()), "completed");
    }

    #[test]
    fn buckets_split_ongoing_by_dates() {
        let upcoming = course(Some("ongoing"), Some("2024-07-01"), None);
        assert_eq!(display_bucket(&upcoming, today()), DisplayBucket::Upcoming);
        let running = course(Some("ongoing"), Some("2024-06-01"), Some("2024-06-30"));
        assert_eq!(display_bucket(&running, today()), DisplayBucket::Ongoing);
        let finished = course(Some("ongoing"), Some("2024-05-01"), Some("2024-05-31"));
        assert_eq!(display_bucket(&finished, today()), DisplayBucket::Completed);
    }

    #[test]
    fn draft_courses_are_upcoming_regardless_of_dates() {
        let record = course(Some("draft"), Some("2024-01-01"), None);
        assert_eq!(display_bucket(&record, today()), DisplayBucket::Upcoming);
    }

    #[test]
    fn unix_dated_courses_bucket_like_iso_dated_ones() {
        let mut record = course(None, None, None);
        // 1704067200 is 2024-01-01T00:00:00Z, 1706659200 is 2024-01-31.
        record.startdate = Some(1704067200);
        record.enddate = Some(1706659200);
        assert_eq!(derive_status(&record, today()), "completed");
        assert_eq!(display_bucket(&record, today()), DisplayBucket::Completed);
    }
}
