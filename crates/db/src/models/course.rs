//! Course entity model and response shapes.

use serde::Serialize;
use sqlx::FromRow;

use gradebook_core::types::{DbId, Timestamp};

use crate::models::grade::GradeEntry;
use crate::models::user::UserSummary;

/// Full course row from the `courses` table.
///
/// `teacher_id` is nullable: deleting the owning user keeps the course
/// around with the reference cleared (ON DELETE SET NULL).
#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub teacher_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for creating a new course.
#[derive(Debug, Clone)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub teacher_id: DbId,
}

/// Course projection with the owning teacher embedded as a sanitized
/// summary. Used by the find-by-teacher and find-by-student listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseWithTeacher {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub teacher: Option<UserSummary>,
    /// The requesting student's own non-deleted grades, when the listing
    /// is student-scoped. Absent in teacher-scoped listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grades: Option<Vec<GradeEntry>>,
}

/// One enrolled student inside a course page, with their visible grades.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStudent {
    #[serde(flatten)]
    pub student: UserSummary,
    pub grades: Vec<GradeEntry>,
}

/// The course page returned by `getCourse`.
///
/// Exactly one of `students` / `grades` is present: the owning teacher
/// sees every enrolled student with their grade lists, an enrolled
/// student sees only their own grades. A student must never receive
/// another student's rows here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePageInfo {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub teacher: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<CourseStudent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grades: Option<Vec<GradeEntry>>,
}
