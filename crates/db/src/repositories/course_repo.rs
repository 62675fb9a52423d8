//! Repository for the `courses` table.

use sqlx::PgPool;

use gradebook_core::types::DbId;

use crate::models::course::{Course, CreateCourse};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, teacher_id, created_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Insert a new course, returning the created row.
    ///
    /// `uq_courses_title` backstops the global title uniqueness rule.
    pub async fn create(pool: &PgPool, input: &CreateCourse) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (title, description, teacher_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.teacher_id)
            .fetch_one(pool)
            .await
    }

    /// Find a course by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a course by its (globally unique) title.
    pub async fn find_by_title(pool: &PgPool, title: &str) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE title = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(title)
            .fetch_optional(pool)
            .await
    }

    /// List all courses owned by the given teacher, newest first.
    pub async fn list_by_teacher(
        pool: &PgPool,
        teacher_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses WHERE teacher_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(teacher_id)
            .fetch_all(pool)
            .await
    }

    /// List all courses the given student is enrolled in, newest first.
    pub async fn list_by_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT c.id, c.title, c.description, c.teacher_id, c.created_at
             FROM courses c
             JOIN enrollments e ON e.course_id = c.id
             WHERE e.student_id = $1
             ORDER BY c.created_at DESC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// Hard-delete a course. Enrollments, grades, and history go with it
    /// via the cascade chain. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
