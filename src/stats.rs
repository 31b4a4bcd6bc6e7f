use crate::models::{Approval, Completion, CompletionStats, CourseType, EnrollmentRecord};

/// Completion statistics for one course-type bucket of enrollments.
///
/// Onsite (and external) enrollments count toward the denominator once
/// their outcome is settled: withdrawn records consumed a seat without
/// finishing, so they stay in; rejected ones never began, so they are out;
/// approved ones count only once completed or failed. Online enrollments
/// all count, completed or not, since the LMS tracks them from enrollment.
pub fn aggregate(enrollments: &[EnrollmentRecord], course_type: CourseType) -> CompletionStats {
    let relevant: Vec<&EnrollmentRecord> = match course_type {
        CourseType::Online => enrollments
            .iter()
            .filter(|record| record.is_lms_enrollment)
            .collect(),
        CourseType::Onsite | CourseType::External => enrollments
            .iter()
            .filter(|record| !record.is_lms_enrollment)
            .filter(|record| match record.approval() {
                Some(Approval::Withdrawn) => true,
                Some(Approval::Approved) => matches!(
                    record.completion(),
                    Some(Completion::Completed | Completion::Failed)
                ),
                _ => false,
            })
            .collect(),
    };

    let total = relevant.len();
    let completed = relevant
        .iter()
        .filter(|record| record.completion() == Some(Completion::Completed))
        .count();
    let rate = if total > 0 {
        completed as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    CompletionStats {
        rate,
        completed,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusValue;
    use uuid::Uuid;

    fn onsite(approval: &str, completion: Option<&str>) -> EnrollmentRecord {
        EnrollmentRecord {
            id: Uuid::new_v4(),
            student_id: Uuid::nil(),
            course_id: Uuid::nil(),
            approval_status: Some(StatusValue::Plain(approval.to_string())),
            eligibility_status: Some(StatusValue::Plain("Eligible".to_string())),
            completion_status: completion.map(|raw| StatusValue::Plain(raw.to_string())),
            score: None,
            attendance_percentage: None,
            present: None,
            total_attendance: None,
            is_lms_enrollment: false,
            progress: None,
        }
    }

    fn online(completion: Option<&str>) -> EnrollmentRecord {
        let mut record = onsite("Approved", completion);
        record.is_lms_enrollment = true;
        record
    }

    #[test]
    fn settled_outcomes_form_the_onsite_denominator() {
        let input = vec![
            onsite("Approved", Some("Completed")),
            onsite("Approved", Some("Failed")),
            onsite("Approved", Some("In Progress")),
            onsite("Withdrawn", None),
        ];

        let stats = aggregate(&input, CourseType::Onsite);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.completed, 1);
        assert!((stats.rate - 100.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn rejected_enrollments_never_count() {
        let input = vec![
            onsite("Rejected", Some("Completed")),
            onsite("Approved", Some("Completed")),
        ];
        let stats = aggregate(&input, CourseType::Onsite);
        assert_eq!(stats.total, 1);
        assert_eq!(stats.completed, 1);
        assert!((stats.rate - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pending_enrollments_are_not_yet_relevant() {
        let stats = aggregate(&[onsite("Pending", None)], CourseType::Onsite);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.rate, 0.0);
    }

    #[test]
    fn every_lms_enrollment_counts_online() {
        let input = vec![
            online(Some("Completed")),
            online(Some("In Progress")),
            online(Some("Not Started")),
            online(None),
        ];
        let stats = aggregate(&input, CourseType::Online);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert!((stats.rate - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn buckets_ignore_records_of_the_other_kind() {
        let input = vec![onsite("Approved", Some("Completed")), online(Some("Completed"))];
        let onsite_stats = aggregate(&input, CourseType::Onsite);
        let online_stats = aggregate(&input, CourseType::Online);
        assert_eq!(onsite_stats.total, 1);
        assert_eq!(online_stats.total, 1);
    }

    #[test]
    fn external_courses_use_the_onsite_rule() {
        let input = vec![
            onsite("Approved", Some("Completed")),
            onsite("Withdrawn", None),
        ];
        let stats = aggregate(&input, CourseType::External);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = aggregate(&[], CourseType::Onsite);
        assert_eq!(
            stats,
            CompletionStats {
                rate: 0.0,
                completed: 0,
                total: 0
            }
        );
    }
}
