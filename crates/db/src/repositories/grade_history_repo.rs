//! Repository for the `grade_history` table.
//!
//! The audit trail is append-only: this repository exposes insert and
//! select operations only. There is no update or delete verb, and none
//! should be added -- history rows die only with their parent grade's
//! cascade.

use sqlx::PgPool;

use gradebook_core::types::DbId;

use crate::models::grade_history::{CreateGradeHistory, GradeHistoryEntry};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, grade_id, action, old_value, new_value, date";

/// Provides append and query operations for the grade audit trail.
pub struct GradeHistoryRepo;

impl GradeHistoryRepo {
    /// Append a history entry. Takes any executor so callers can run it
    /// inside the same transaction as the grade write it records.
    pub async fn insert<'e, E>(
        executor: E,
        input: &CreateGradeHistory,
    ) -> Result<GradeHistoryEntry, sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO grade_history (grade_id, action, old_value, new_value)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GradeHistoryEntry>(&query)
            .bind(input.grade_id)
            .bind(input.action)
            .bind(input.old_value)
            .bind(input.new_value)
            .fetch_one(executor)
            .await
    }

    /// All history entries whose grade belongs to an enrollment of the
    /// given student, across all courses, oldest first.
    ///
    /// Deliberately does NOT filter on the grade's `is_deleted` flag:
    /// history for soft-deleted grades stays fully visible.
    pub async fn list_by_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<GradeHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, GradeHistoryEntry>(
            "SELECT gh.id, gh.grade_id, gh.action, gh.old_value, gh.new_value, gh.date
             FROM grade_history gh
             JOIN grades g ON g.id = gh.grade_id
             JOIN enrollments e ON e.id = g.enrollment_id
             WHERE e.student_id = $1
             ORDER BY gh.date, gh.id",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    /// All history entries whose grade belongs to any course taught by
    /// the given teacher, oldest first. No `is_deleted` filter either.
    pub async fn list_by_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<GradeHistoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, GradeHistoryEntry>(
            "SELECT gh.id, gh.grade_id, gh.action, gh.old_value, gh.new_value, gh.date
             FROM grade_history gh
             JOIN grades g ON g.id = gh.grade_id
             JOIN enrollments e ON e.id = g.enrollment_id
             JOIN courses c ON c.id = e.course_id
             WHERE c.teacher_id = $1
             ORDER BY gh.date, gh.id",
        )
        .bind(teacher_id)
        .fetch_all(pool)
        .await
    }

    /// All history entries for one grade, oldest first.
    pub async fn list_by_grade(
        pool: &PgPool,
        grade_id: DbId,
    ) -> Result<Vec<GradeHistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM grade_history WHERE grade_id = $1 ORDER BY date, id"
        );
        sqlx::query_as::<_, GradeHistoryEntry>(&query)
            .bind(grade_id)
            .fetch_all(pool)
            .await
    }
}
