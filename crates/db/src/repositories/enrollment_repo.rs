//! Repository for the `enrollments` table.

use sqlx::PgPool;

use gradebook_core::types::DbId;

use crate::models::enrollment::{CreateEnrollment, EnrolledStudentRow, Enrollment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, student_id, course_id, created_at";

/// Provides operations for the student <-> course link table.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    /// Insert a new enrollment, returning the created row.
    ///
    /// `uq_enrollments_student_course` rejects a concurrent duplicate that
    /// slipped past the caller's pre-check.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEnrollment,
    ) -> Result<Enrollment, sqlx::Error> {
        let query = format!(
            "INSERT INTO enrollments (student_id, course_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(input.student_id)
            .bind(input.course_id)
            .fetch_one(pool)
            .await
    }

    /// Find the enrollment for a (student, course) pair, if any.
    pub async fn find_by_pair(
        pool: &PgPool,
        student_id: DbId,
        course_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enrollments WHERE student_id = $1 AND course_id = $2"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(student_id)
            .bind(course_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the enrollment of the student with the given email inside a
    /// course, if that student is enrolled there.
    pub async fn find_in_course_by_email(
        pool: &PgPool,
        course_id: DbId,
        student_email: &str,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "SELECT e.id, e.student_id, e.course_id, e.created_at
             FROM enrollments e
             JOIN users u ON u.id = e.student_id
             WHERE e.course_id = $1 AND u.email = $2"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(course_id)
            .bind(student_email)
            .fetch_optional(pool)
            .await
    }

    /// List every student enrolled in a course, joined with their public
    /// user fields, ordered by enrollment time.
    pub async fn list_students_for_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<EnrolledStudentRow>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledStudentRow>(
            "SELECT e.id AS enrollment_id, u.first_name, u.last_name,
                    u.email, u.role, u.image
             FROM enrollments e
             JOIN users u ON u.id = e.student_id
             WHERE e.course_id = $1
             ORDER BY e.created_at",
        )
        .bind(course_id)
        .fetch_all(pool)
        .await
    }
}
