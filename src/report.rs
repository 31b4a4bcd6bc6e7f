use std::collections::HashSet;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::classify;
use crate::dates::course_start_date;
use crate::models::{CourseRecord, CourseType, EnrollmentRecord};
use crate::stats;
use crate::status::{display_bucket, DisplayBucket};

pub fn build_report(
    window_label: &str,
    today: NaiveDate,
    courses: &[CourseRecord],
    enrollments: &[EnrollmentRecord],
) -> String {
    let course_ids: HashSet<uuid::Uuid> = courses.iter().map(|course| course.id).collect();
    let window_records: Vec<EnrollmentRecord> = enrollments
        .iter()
        .filter(|record| course_ids.contains(&record.course_id))
        .cloned()
        .collect();

    let mut output = String::new();
    let _ = writeln!(output, "# Training Enrollment Report");
    let _ = writeln!(
        output,
        "Generated for {} (as of {})",
        window_label, today
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Pipeline");

    if courses.is_empty() {
        let _ = writeln!(output, "No courses in this window.");
    } else {
        let mut upcoming = 0usize;
        let mut ongoing = 0usize;
        let mut completed = 0usize;
        for course in courses {
            match display_bucket(course, today) {
                DisplayBucket::Upcoming => upcoming += 1,
                DisplayBucket::Ongoing => ongoing += 1,
                DisplayBucket::Completed => completed += 1,
            }
        }
        let _ = writeln!(
            output,
            "{} upcoming, {} ongoing, {} completed",
            upcoming, ongoing, completed
        );

        let mut by_start: Vec<&CourseRecord> = courses.iter().collect();
        by_start.sort_by_key(|course| course_start_date(course));
        for course in by_start.iter().take(10) {
            let start = course_start_date(course)
                .map(|date| date.to_string())
                .unwrap_or_else(|| "no start date".to_string());
            let _ = writeln!(
                output,
                "- {} ({}, {}) starting {}",
                course.name,
                course.batch_code.as_deref().unwrap_or("no batch"),
                display_bucket(course, today).label(),
                start
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Onsite Enrollment Breakdown");

    let onsite = classify::classify_onsite(&window_records);
    let onsite_count = onsite.approved.len()
        + onsite.eligible_pending.len()
        + onsite.not_eligible.len()
        + onsite.rejected.len()
        + onsite.withdrawn.len()
        + onsite.unclassified.len();
    if onsite_count == 0 {
        let _ = writeln!(output, "No onsite enrollments in this window.");
    } else {
        let _ = writeln!(output, "- approved: {}", onsite.approved.len());
        let _ = writeln!(output, "- pending (eligible): {}", onsite.eligible_pending.len());
        let _ = writeln!(output, "- not eligible: {}", onsite.not_eligible.len());
        let _ = writeln!(output, "- rejected: {}", onsite.rejected.len());
        let _ = writeln!(output, "- withdrawn: {}", onsite.withdrawn.len());
        if !onsite.unclassified.is_empty() {
            let _ = writeln!(output, "- unclassified: {}", onsite.unclassified.len());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Online Progress");

    let online = classify::classify_online(&window_records);
    let online_count = online.completed.len()
        + online.in_progress.len()
        + online.not_started.len()
        + online.unclassified.len();
    if online_count == 0 {
        let _ = writeln!(output, "No LMS enrollments in this window.");
    } else {
        let _ = writeln!(output, "- completed: {}", online.completed.len());
        let _ = writeln!(output, "- in progress: {}", online.in_progress.len());
        let _ = writeln!(output, "- not started: {}", online.not_started.len());
        if !online.unclassified.is_empty() {
            let _ = writeln!(output, "- unclassified: {}", online.unclassified.len());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Completion");

    let onsite_stats = stats::aggregate(&window_records, CourseType::Onsite);
    let online_stats = stats::aggregate(&window_records, CourseType::Online);
    let _ = writeln!(
        output,
        "- onsite: {:.1}% ({} of {} settled)",
        onsite_stats.rate, onsite_stats.completed, onsite_stats.total
    );
    let _ = writeln!(
        output,
        "- online: {:.1}% ({} of {} synced)",
        online_stats.rate, online_stats.completed, online_stats.total
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Seat Utilization");

    let mut seated: Vec<(&CourseRecord, f64)> = courses
        .iter()
        .filter_map(|course| {
            let limit = course.seat_limit.filter(|limit| *limit > 0)?;
            let enrolled = course.current_enrolled.unwrap_or(0);
            Some((course, enrolled as f64 / limit as f64 * 100.0))
        })
        .collect();
    seated.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    if seated.is_empty() {
        let _ = writeln!(output, "No courses with seat limits in this window.");
    } else {
        for (course, fill) in seated.iter().take(5) {
            let _ = writeln!(
                output,
                "- {}: {}/{} seats ({:.0}% full)",
                course.name,
                course.current_enrolled.unwrap_or(0),
                course.seat_limit.unwrap_or(0),
                fill
            );
        }
    }

    output
}
