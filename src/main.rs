use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

mod classify;
mod dates;
mod db;
mod models;
mod report;
mod stats;
mod status;

use models::{CourseRecord, CourseType, EnrollmentRecord};

#[derive(Parser)]
#[command(name = "enrollment-insights")]
#[command(about = "Training enrollment classification and reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import JSON snapshots exported by the enrollment backend
    #[command(group(
        ArgGroup::new("snapshot")
            .args(["courses", "enrollments"])
            .required(true)
            .multiple(true)
    ))]
    Import {
        #[arg(long)]
        courses: Option<PathBuf>,
        #[arg(long)]
        enrollments: Option<PathBuf>,
    },
    /// Apply an attendance sheet to existing enrollments
    ImportAttendance {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List courses with their derived status for a date window
    #[command(group(
        ArgGroup::new("window")
            .args(["month", "quarter"])
            .multiple(false)
    ))]
    Courses {
        #[arg(long, value_enum, default_value_t = PeriodArg::All)]
        period: PeriodArg,
        /// Zero-based calendar month (0 = January)
        #[arg(long)]
        month: Option<u32>,
        /// Calendar quarter (1-4)
        #[arg(long)]
        quarter: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_enum)]
        bucket: Option<BucketArg>,
    },
    /// Show the enrollment breakdown for one course
    Roster {
        #[arg(long)]
        course: Uuid,
    },
    /// Show per-course-type completion stats for one student
    Stats {
        #[arg(long)]
        student: Uuid,
    },
    /// Generate a markdown report for a date window
    #[command(group(
        ArgGroup::new("window")
            .args(["month", "quarter"])
            .multiple(false)
    ))]
    Report {
        #[arg(long, value_enum, default_value_t = PeriodArg::All)]
        period: PeriodArg,
        /// Zero-based calendar month (0 = January)
        #[arg(long)]
        month: Option<u32>,
        /// Calendar quarter (1-4)
        #[arg(long)]
        quarter: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PeriodArg {
    Month,
    Quarter,
    Year,
    All,
}

impl From<PeriodArg> for dates::Period {
    fn from(arg: PeriodArg) -> dates::Period {
        match arg {
            PeriodArg::Month => dates::Period::Month,
            PeriodArg::Quarter => dates::Period::Quarter,
            PeriodArg::Year => dates::Period::Year,
            PeriodArg::All => dates::Period::AllTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BucketArg {
    Upcoming,
    Ongoing,
    Completed,
}

impl From<BucketArg> for status::DisplayBucket {
    fn from(arg: BucketArg) -> status::DisplayBucket {
        match arg {
            BucketArg::Upcoming => status::DisplayBucket::Upcoming,
            BucketArg::Ongoing => status::DisplayBucket::Ongoing,
            BucketArg::Completed => status::DisplayBucket::Completed,
        }
    }
}

fn window_label(range: Option<&dates::DateRange>) -> String {
    match range {
        Some(range) => format!("{} to {}", range.start, range.end),
        None => "all time".to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import {
            courses,
            enrollments,
        } => {
            if let Some(path) = courses {
                let count = db::import_courses(&pool, &path).await?;
                println!("Upserted {count} courses from {}.", path.display());
            }
            if let Some(path) = enrollments {
                let count = db::import_enrollments(&pool, &path).await?;
                println!("Upserted {count} enrollments from {}.", path.display());
            }
        }
        Commands::ImportAttendance { csv } => {
            let (updated, skipped) = db::import_attendance_csv(&pool, &csv).await?;
            println!(
                "Updated {updated} enrollments from {} ({skipped} rows without a matching enrollment).",
                csv.display()
            );
        }
        Commands::Courses {
            period,
            month,
            quarter,
            year,
            bucket,
        } => {
            let today = Local::now().date_naive();
            let range = dates::resolve(
                period.into(),
                month,
                quarter,
                year.unwrap_or_else(|| today.year()),
            );
            let courses = db::fetch_courses(&pool).await?;
            list_courses(&courses, range.as_ref(), bucket, today);
        }
        Commands::Roster { course } => {
            let record = db::fetch_course(&pool, course)
                .await?
                .context("no course with that id")?;
            let enrollments = db::fetch_enrollments(&pool, Some(course), None).await?;
            print_roster(&record, &enrollments);
        }
        Commands::Stats { student } => {
            let enrollments = db::fetch_enrollments(&pool, None, Some(student)).await?;
            if enrollments.is_empty() {
                println!("No enrollments for this student.");
                return Ok(());
            }
            let courses = db::fetch_courses(&pool).await?;
            print_student_stats(&courses, &enrollments);
        }
        Commands::Report {
            period,
            month,
            quarter,
            year,
            out,
        } => {
            let today = Local::now().date_naive();
            let range = dates::resolve(
                period.into(),
                month,
                quarter,
                year.unwrap_or_else(|| today.year()),
            );
            let courses = db::fetch_courses(&pool).await?;
            let in_window: Vec<CourseRecord> = courses
                .into_iter()
                .filter(|course| dates::course_in_window(course, range.as_ref()))
                .collect();
            let enrollments = db::fetch_enrollments(&pool, None, None).await?;
            let report = report::build_report(
                &window_label(range.as_ref()),
                today,
                &in_window,
                &enrollments,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn list_courses(
    courses: &[CourseRecord],
    range: Option<&dates::DateRange>,
    bucket: Option<BucketArg>,
    today: NaiveDate,
) {
    let mut visible: Vec<&CourseRecord> = courses
        .iter()
        .filter(|course| dates::course_in_window(course, range))
        .filter(|course| match bucket {
            Some(wanted) => status::display_bucket(course, today) == wanted.into(),
            None => true,
        })
        .collect();
    visible.sort_by_key(|course| dates::course_start_date(course));

    if visible.is_empty() {
        println!("No courses match this window.");
        return;
    }

    println!("Courses for {}:", window_label(range));
    for course in visible {
        let start = dates::course_start_date(course)
            .map(|date| date.to_string())
            .unwrap_or_else(|| "no start date".to_string());
        println!(
            "- {} ({}, {}) {}, status {}, starting {}",
            course.name,
            course.batch_code.as_deref().unwrap_or("no batch"),
            course.kind().label(),
            status::display_bucket(course, today).label(),
            status::derive_status(course, today),
            start
        );
    }
}

fn print_roster(course: &CourseRecord, enrollments: &[EnrollmentRecord]) {
    println!(
        "Roster for {} ({}):",
        course.name,
        course.kind().label()
    );

    match course.kind() {
        CourseType::Online => {
            let buckets = classify::classify_online(enrollments);
            println!("- completed: {}", buckets.completed.len());
            println!("- in progress: {}", buckets.in_progress.len());
            println!("- not started: {}", buckets.not_started.len());
            if !buckets.unclassified.is_empty() {
                println!("- unclassified: {}", buckets.unclassified.len());
            }
        }
        CourseType::Onsite | CourseType::External => {
            let buckets = classify::classify_onsite(enrollments);
            println!("- approved: {}", buckets.approved.len());
            println!("- pending (eligible): {}", buckets.eligible_pending.len());
            println!("- not eligible: {}", buckets.not_eligible.len());
            println!("- rejected: {}", buckets.rejected.len());
            println!("- withdrawn: {}", buckets.withdrawn.len());
            if !buckets.unclassified.is_empty() {
                println!("- unclassified: {}", buckets.unclassified.len());
            }
        }
    }
}

fn print_student_stats(courses: &[CourseRecord], enrollments: &[EnrollmentRecord]) {
    let kinds: HashMap<Uuid, CourseType> = courses
        .iter()
        .map(|course| (course.id, course.kind()))
        .collect();

    println!("Completion by course type:");
    for kind in [CourseType::Onsite, CourseType::Online, CourseType::External] {
        let subset: Vec<EnrollmentRecord> = enrollments
            .iter()
            .filter(|record| {
                kinds
                    .get(&record.course_id)
                    .copied()
                    .unwrap_or(CourseType::Onsite)
                    == kind
            })
            .cloned()
            .collect();
        let summary = stats::aggregate(&subset, kind);
        println!(
            "- {}: {:.1}% complete ({} of {})",
            kind.label(),
            summary.rate,
            summary.completed,
            summary.total
        );
    }
}
