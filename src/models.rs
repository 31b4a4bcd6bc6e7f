use serde::Deserialize;
use uuid::Uuid;

/// Status value as the backend serializes it: either a bare string or an
/// enum-wrapper object carrying the string in `value`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    Plain(String),
    Wrapped { value: String },
}

impl StatusValue {
    pub fn as_str(&self) -> &str {
        match self {
            StatusValue::Plain(raw) => raw,
            StatusValue::Wrapped { value } => value,
        }
    }
}

/// Unwraps a status field to the underlying string. Empty strings count as
/// absent, matching how the backend omits unset fields.
pub fn unwrap_status(value: &Option<StatusValue>) -> Option<&str> {
    value
        .as_ref()
        .map(StatusValue::as_str)
        .filter(|raw| !raw.is_empty())
}

/// Course record in its wire shape. Onsite courses carry ISO date strings
/// (`start_date`/`end_date`), LMS-synced ones carry Unix seconds
/// (`startdate`/`enddate`); exactly one pair is populated per record.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub batch_code: Option<String>,
    #[serde(default)]
    pub status: Option<StatusValue>,
    #[serde(default)]
    pub course_type: Option<StatusValue>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub startdate: Option<i64>,
    #[serde(default)]
    pub enddate: Option<i64>,
    #[serde(default)]
    pub seat_limit: Option<i32>,
    #[serde(default)]
    pub current_enrolled: Option<i32>,
}

impl CourseRecord {
    pub fn kind(&self) -> CourseType {
        CourseType::parse(unwrap_status(&self.course_type))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseType {
    Onsite,
    Online,
    External,
}

impl CourseType {
    /// Absent or unrecognized values default to onsite.
    pub fn parse(raw: Option<&str>) -> CourseType {
        match raw.map(|value| value.to_lowercase()).as_deref() {
            Some("online") => CourseType::Online,
            Some("external") => CourseType::External,
            _ => CourseType::Onsite,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CourseType::Onsite => "onsite",
            CourseType::Online => "online",
            CourseType::External => "external",
        }
    }
}

/// Enrollment record in its wire shape. `is_lms_enrollment` distinguishes
/// LMS-synced records from onsite ones; some payloads spell it
/// `is_lms_course`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollmentRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[serde(default)]
    pub approval_status: Option<StatusValue>,
    #[serde(default)]
    pub eligibility_status: Option<StatusValue>,
    #[serde(default)]
    pub completion_status: Option<StatusValue>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub attendance_percentage: Option<f64>,
    #[serde(default)]
    pub present: Option<i32>,
    #[serde(default)]
    pub total_attendance: Option<i32>,
    #[serde(default, alias = "is_lms_course")]
    pub is_lms_enrollment: bool,
    #[serde(default)]
    pub progress: Option<f64>,
}

impl EnrollmentRecord {
    pub fn approval(&self) -> Option<Approval> {
        Approval::parse(unwrap_status(&self.approval_status)?)
    }

    pub fn completion(&self) -> Option<Completion> {
        Completion::parse(unwrap_status(&self.completion_status)?)
    }

    pub fn is_eligible(&self) -> bool {
        unwrap_status(&self.eligibility_status) == Some("Eligible")
    }

    pub fn is_ineligible(&self) -> bool {
        unwrap_status(&self.eligibility_status)
            .map(|raw| raw.starts_with("Ineligible"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Approved,
    Pending,
    Rejected,
    Withdrawn,
}

impl Approval {
    pub fn parse(raw: &str) -> Option<Approval> {
        match raw {
            "Approved" => Some(Approval::Approved),
            "Pending" => Some(Approval::Pending),
            "Rejected" => Some(Approval::Rejected),
            "Withdrawn" => Some(Approval::Withdrawn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl Completion {
    pub fn parse(raw: &str) -> Option<Completion> {
        match raw {
            "Not Started" => Some(Completion::NotStarted),
            "In Progress" => Some(Completion::InProgress),
            "Completed" => Some(Completion::Completed),
            "Failed" => Some(Completion::Failed),
            _ => None,
        }
    }
}

/// Completion summary for one course-type bucket of a student's
/// enrollments.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionStats {
    pub rate: f64,
    pub completed: usize,
    pub total: usize,
}
