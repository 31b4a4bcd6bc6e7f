use anyhow::Context;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{unwrap_status, CourseRecord, EnrollmentRecord, StatusValue};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let courses = vec![
        (
            Uuid::parse_str("8f1f6f2a-9a0d-4f3e-9a96-5b2f1c9e0d11")?,
            "Leadership Essentials",
            Some("LDR-01"),
            Some("draft"),
            Some("onsite"),
            Some("2026-09-01"),
            Some("2026-09-05"),
            None,
            None,
            Some(20),
            Some(12),
        ),
        (
            Uuid::parse_str("2b6a7c54-11de-4a0f-8d26-7a1f0b3c9e22")?,
            "Workplace Safety",
            Some("WS-114"),
            None,
            None,
            Some("2026-07-01"),
            Some("2026-08-29"),
            None,
            None,
            Some(30),
            Some(28),
        ),
        (
            Uuid::parse_str("c3d9e8b1-64f2-4b7a-b1c5-2e8d0a6f5c33")?,
            "Data Privacy Basics",
            Some("DP-09"),
            None,
            Some("online"),
            None,
            None,
            Some(1767225600_i64),
            Some(1782864000_i64),
            None,
            None,
        ),
        (
            Uuid::parse_str("5e2c1d98-3ab7-4c46-92e0-8f4b6d7a1e44")?,
            "Advanced Spreadsheets",
            Some("EXT-22"),
            Some("completed"),
            Some("external"),
            Some("2026-03-10"),
            Some("2026-03-12"),
            None,
            None,
            Some(15),
            Some(15),
        ),
    ];

    for (
        id,
        name,
        batch_code,
        status,
        course_type,
        start_date,
        end_date,
        startdate,
        enddate,
        seat_limit,
        current_enrolled,
    ) in courses
    {
        sqlx::query(
            r#"
            INSERT INTO training_insights.courses
            (id, name, batch_code, status, course_type, start_date, end_date,
             startdate, enddate, seat_limit, current_enrolled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, batch_code = EXCLUDED.batch_code,
                status = EXCLUDED.status, course_type = EXCLUDED.course_type,
                start_date = EXCLUDED.start_date, end_date = EXCLUDED.end_date,
                startdate = EXCLUDED.startdate, enddate = EXCLUDED.enddate,
                seat_limit = EXCLUDED.seat_limit,
                current_enrolled = EXCLUDED.current_enrolled
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(batch_code)
        .bind(status)
        .bind(course_type)
        .bind(start_date)
        .bind(end_date)
        .bind(startdate)
        .bind(enddate)
        .bind(seat_limit)
        .bind(current_enrolled)
        .execute(pool)
        .await?;
    }

    let students = (
        Uuid::parse_str("a1f2e3d4-5c6b-4a79-8897-06a5b4c3d2e1")?,
        Uuid::parse_str("b2e3d4c5-6a7b-4c89-9a08-17b6c5d4e3f2")?,
        Uuid::parse_str("c3d4e5f6-7b8a-4d99-ab19-28c7d6e5f4a3")?,
    );
    let safety = Uuid::parse_str("2b6a7c54-11de-4a0f-8d26-7a1f0b3c9e22")?;
    let privacy = Uuid::parse_str("c3d9e8b1-64f2-4b7a-b1c5-2e8d0a6f5c33")?;
    let spreadsheets = Uuid::parse_str("5e2c1d98-3ab7-4c46-92e0-8f4b6d7a1e44")?;
    let leadership = Uuid::parse_str("8f1f6f2a-9a0d-4f3e-9a96-5b2f1c9e0d11")?;

    let enrollments = vec![
        (
            students.0,
            safety,
            Some("Approved"),
            Some("Eligible"),
            Some("Completed"),
            Some(88.0),
            Some(10),
            Some(12),
            false,
            None,
        ),
        (
            students.1,
            safety,
            Some("Pending"),
            Some("Eligible"),
            None,
            None,
            None,
            None,
            false,
            None,
        ),
        (
            students.2,
            safety,
            Some("Pending"),
            Some("Ineligible (Missing Prerequisite)"),
            None,
            None,
            None,
            None,
            false,
            None,
        ),
        (
            students.0,
            privacy,
            None,
            None,
            Some("Completed"),
            None,
            None,
            None,
            true,
            Some(100.0),
        ),
        (
            students.1,
            privacy,
            None,
            None,
            Some("In Progress"),
            None,
            None,
            None,
            true,
            Some(35.5),
        ),
        (
            students.2,
            privacy,
            None,
            None,
            Some("Not Started"),
            None,
            None,
            None,
            true,
            Some(0.0),
        ),
        (
            students.1,
            spreadsheets,
            Some("Withdrawn"),
            Some("Eligible"),
            None,
            None,
            None,
            None,
            false,
            None,
        ),
        (
            students.2,
            leadership,
            Some("Rejected"),
            Some("Ineligible (Annual Limit)"),
            None,
            None,
            None,
            None,
            false,
            None,
        ),
    ];

    for (
        student_id,
        course_id,
        approval,
        eligibility,
        completion,
        score,
        present,
        total_attendance,
        is_lms,
        progress,
    ) in enrollments
    {
        sqlx::query(
            r#"
            INSERT INTO training_insights.enrollments
            (id, student_id, course_id, approval_status, eligibility_status,
             completion_status, score, present, total_attendance,
             is_lms_enrollment, progress)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (student_id, course_id) DO UPDATE
            SET approval_status = EXCLUDED.approval_status,
                eligibility_status = EXCLUDED.eligibility_status,
                completion_status = EXCLUDED.completion_status,
                score = EXCLUDED.score, present = EXCLUDED.present,
                total_attendance = EXCLUDED.total_attendance,
                is_lms_enrollment = EXCLUDED.is_lms_enrollment,
                progress = EXCLUDED.progress
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(course_id)
        .bind(approval)
        .bind(eligibility)
        .bind(completion)
        .bind(score)
        .bind(present)
        .bind(total_attendance)
        .bind(is_lms)
        .bind(progress)
        .execute(pool)
        .await?;
    }

    Ok(())
}

fn course_from_row(row: &PgRow) -> CourseRecord {
    CourseRecord {
        id: row.get("id"),
        name: row.get("name"),
        batch_code: row.get("batch_code"),
        status: row
            .get::<Option<String>, _>("status")
            .map(StatusValue::Plain),
        course_type: row
            .get::<Option<String>, _>("course_type")
            .map(StatusValue::Plain),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        startdate: row.get("startdate"),
        enddate: row.get("enddate"),
        seat_limit: row.get("seat_limit"),
        current_enrolled: row.get("current_enrolled"),
    }
}

fn enrollment_from_row(row: &PgRow) -> EnrollmentRecord {
    EnrollmentRecord {
        id: row.get("id"),
        student_id: row.get("student_id"),
        course_id: row.get("course_id"),
        approval_status: row
            .get::<Option<String>, _>("approval_status")
            .map(StatusValue::Plain),
        eligibility_status: row
            .get::<Option<String>, _>("eligibility_status")
            .map(StatusValue::Plain),
        completion_status: row
            .get::<Option<String>, _>("completion_status")
            .map(StatusValue::Plain),
        score: row.get("score"),
        attendance_percentage: row.get("attendance_percentage"),
        present: row.get("present"),
        total_attendance: row.get("total_attendance"),
        is_lms_enrollment: row.get("is_lms_enrollment"),
        progress: row.get("progress"),
    }
}

pub async fn fetch_courses(pool: &PgPool) -> anyhow::Result<Vec<CourseRecord>> {
    let rows = sqlx::query(
        "SELECT id, name, batch_code, status, course_type, start_date, end_date, \
         startdate, enddate, seat_limit, current_enrolled \
         FROM training_insights.courses ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(course_from_row).collect())
}

pub async fn fetch_course(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<CourseRecord>> {
    let row = sqlx::query(
        "SELECT id, name, batch_code, status, course_type, start_date, end_date, \
         startdate, enddate, seat_limit, current_enrolled \
         FROM training_insights.courses WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(course_from_row))
}

pub async fn fetch_enrollments(
    pool: &PgPool,
    course: Option<Uuid>,
    student: Option<Uuid>,
) -> anyhow::Result<Vec<EnrollmentRecord>> {
    let mut query = String::from(
        "SELECT id, student_id, course_id, approval_status, eligibility_status, \
         completion_status, score, attendance_percentage, present, \
         total_attendance, is_lms_enrollment, progress \
         FROM training_insights.enrollments",
    );

    if course.is_some() {
        query.push_str(" WHERE course_id = $1");
    } else if student.is_some() {
        query.push_str(" WHERE student_id = $1");
    }

    let mut rows = sqlx::query(&query);

    if let Some(value) = course {
        rows = rows.bind(value);
    } else if let Some(value) = student {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    Ok(records.iter().map(enrollment_from_row).collect())
}

/// Upserts a JSON snapshot of course records exported by the backend, in
/// their wire shape. Raw field values are stored as-is; normalization
/// happens on the way out.
pub async fn import_courses(pool: &PgPool, path: &std::path::Path) -> anyhow::Result<usize> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let courses: Vec<CourseRecord> =
        serde_json::from_str(&payload).context("course snapshot is not a JSON array")?;
    let count = courses.len();

    for course in courses {
        sqlx::query(
            r#"
            INSERT INTO training_insights.courses
            (id, name, batch_code, status, course_type, start_date, end_date,
             startdate, enddate, seat_limit, current_enrolled)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, batch_code = EXCLUDED.batch_code,
                status = EXCLUDED.status, course_type = EXCLUDED.course_type,
                start_date = EXCLUDED.start_date, end_date = EXCLUDED.end_date,
                startdate = EXCLUDED.startdate, enddate = EXCLUDED.enddate,
                seat_limit = EXCLUDED.seat_limit,
                current_enrolled = EXCLUDED.current_enrolled
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.batch_code)
        .bind(unwrap_status(&course.status))
        .bind(unwrap_status(&course.course_type))
        .bind(&course.start_date)
        .bind(&course.end_date)
        .bind(course.startdate)
        .bind(course.enddate)
        .bind(course.seat_limit)
        .bind(course.current_enrolled)
        .execute(pool)
        .await?;
    }

    Ok(count)
}

pub async fn import_enrollments(pool: &PgPool, path: &std::path::Path) -> anyhow::Result<usize> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let enrollments: Vec<EnrollmentRecord> =
        serde_json::from_str(&payload).context("enrollment snapshot is not a JSON array")?;
    let count = enrollments.len();

    for record in enrollments {
        sqlx::query(
            r#"
            INSERT INTO training_insights.enrollments
            (id, student_id, course_id, approval_status, eligibility_status,
             completion_status, score, attendance_percentage, present,
             total_attendance, is_lms_enrollment, progress)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (student_id, course_id) DO UPDATE
            SET approval_status = EXCLUDED.approval_status,
                eligibility_status = EXCLUDED.eligibility_status,
                completion_status = EXCLUDED.completion_status,
                score = EXCLUDED.score,
                attendance_percentage = EXCLUDED.attendance_percentage,
                present = EXCLUDED.present,
                total_attendance = EXCLUDED.total_attendance,
                is_lms_enrollment = EXCLUDED.is_lms_enrollment,
                progress = EXCLUDED.progress
            "#,
        )
        .bind(record.id)
        .bind(record.student_id)
        .bind(record.course_id)
        .bind(unwrap_status(&record.approval_status))
        .bind(unwrap_status(&record.eligibility_status))
        .bind(unwrap_status(&record.completion_status))
        .bind(record.score)
        .bind(record.attendance_percentage)
        .bind(record.present)
        .bind(record.total_attendance)
        .bind(record.is_lms_enrollment)
        .bind(record.progress)
        .execute(pool)
        .await?;
    }

    Ok(count)
}

/// Applies an attendance sheet to existing enrollments. Rows that do not
/// match a known (student, course) pair are skipped and reported, not
/// created.
pub async fn import_attendance_csv(
    pool: &PgPool,
    csv_path: &std::path::Path,
) -> anyhow::Result<(usize, usize)> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        student_id: Uuid,
        course_id: Uuid,
        present: i32,
        total_attendance: i32,
        attendance_percentage: Option<f64>,
        completion_status: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut updated = 0usize;
    let mut skipped = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let percentage = row.attendance_percentage.or_else(|| {
            if row.total_attendance > 0 {
                Some(f64::from(row.present) / f64::from(row.total_attendance) * 100.0)
            } else {
                None
            }
        });

        let outcome = sqlx::query(
            r#"
            UPDATE training_insights.enrollments
            SET present = $3, total_attendance = $4,
                attendance_percentage = $5,
                completion_status = COALESCE($6, completion_status)
            WHERE student_id = $1 AND course_id = $2
            "#,
        )
        .bind(row.student_id)
        .bind(row.course_id)
        .bind(row.present)
        .bind(row.total_attendance)
        .bind(percentage)
        .bind(row.completion_status)
        .execute(pool)
        .await?;

        if outcome.rows_affected() > 0 {
            updated += 1;
        } else {
            skipped += 1;
        }
    }

    Ok((updated, skipped))
}
