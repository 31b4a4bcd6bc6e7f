use crate::models::{Approval, Completion, EnrollmentRecord};

/// Disjoint display buckets for an onsite course roster. Records that fail
/// every predicate land in `unclassified` instead of vanishing.
#[derive(Debug, Default)]
pub struct OnsiteBuckets {
    pub approved: Vec<EnrollmentRecord>,
    pub eligible_pending: Vec<EnrollmentRecord>,
    pub not_eligible: Vec<EnrollmentRecord>,
    pub rejected: Vec<EnrollmentRecord>,
    pub withdrawn: Vec<EnrollmentRecord>,
    pub unclassified: Vec<EnrollmentRecord>,
}

/// Partitions onsite enrollments. LMS-synced records are skipped entirely;
/// they belong to the online partition. The not-eligible bucket catches any
/// record that is neither approved, rejected, nor withdrawn and whose
/// eligibility starts with "Ineligible", including records with no approval
/// status at all.
pub fn classify_onsite(enrollments: &[EnrollmentRecord]) -> OnsiteBuckets {
    let mut buckets = OnsiteBuckets::default();

    for record in enrollments.iter().filter(|r| !r.is_lms_enrollment) {
        match record.approval() {
            Some(Approval::Approved) => buckets.approved.push(record.clone()),
            Some(Approval::Rejected) => buckets.rejected.push(record.clone()),
            Some(Approval::Withdrawn) => buckets.withdrawn.push(record.clone()),
            Some(Approval::Pending) if record.is_eligible() => {
                buckets.eligible_pending.push(record.clone());
            }
            _ if record.is_ineligible() => buckets.not_eligible.push(record.clone()),
            _ => buckets.unclassified.push(record.clone()),
        }
    }

    buckets
}

/// Disjoint progress buckets for an online (LMS) course roster.
#[derive(Debug, Default)]
pub struct OnlineBuckets {
    pub completed: Vec<EnrollmentRecord>,
    pub in_progress: Vec<EnrollmentRecord>,
    pub not_started: Vec<EnrollmentRecord>,
    pub unclassified: Vec<EnrollmentRecord>,
}

/// Partitions online enrollments by progress, consulting only LMS-synced
/// records. Progress and completion status are checked together because the
/// LMS sync can lag behind either field.
pub fn classify_online(enrollments: &[EnrollmentRecord]) -> OnlineBuckets {
    let mut buckets = OnlineBuckets::default();

    for record in enrollments.iter().filter(|r| r.is_lms_enrollment) {
        let progress = record.progress;
        let completion = record.completion();

        let completed = progress.map_or(false, |p| p >= 100.0)
            || completion == Some(Completion::Completed);
        let in_progress = progress.map_or(false, |p| p > 0.0 && p < 100.0)
            && completion == Some(Completion::InProgress);
        let not_started = (progress == Some(0.0) || completion == Some(Completion::NotStarted))
            && !completed
            && !in_progress;

        if completed {
            buckets.completed.push(record.clone());
        } else if in_progress {
            buckets.in_progress.push(record.clone());
        } else if not_started {
            buckets.not_started.push(record.clone());
        } else {
            buckets.unclassified.push(record.clone());
        }
    }

    buckets
}
