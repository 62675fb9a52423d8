//! Repository for the `grades` table.
//!
//! Every mutation writes its matching `grade_history` row inside the same
//! transaction, so a grade can never exist without its Create entry and a
//! value change can never land without its Update entry.

use sqlx::PgPool;

use gradebook_core::grading::GradeAction;
use gradebook_core::types::DbId;

use crate::models::grade::{Grade, GradeWithCourse};
use crate::models::grade_history::CreateGradeHistory;
use crate::repositories::GradeHistoryRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, enrollment_id, grade, date, is_deleted";

/// Provides grade operations, each paired with its audit write.
pub struct GradeRepo;

impl GradeRepo {
    /// Insert a new grade and its Create history entry in one transaction.
    pub async fn create_with_history(
        pool: &PgPool,
        enrollment_id: DbId,
        value: i16,
    ) -> Result<Grade, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO grades (enrollment_id, grade)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let grade = sqlx::query_as::<_, Grade>(&query)
            .bind(enrollment_id)
            .bind(value)
            .fetch_one(&mut *tx)
            .await?;

        GradeHistoryRepo::insert(
            &mut *tx,
            &CreateGradeHistory {
                grade_id: grade.id,
                action: GradeAction::Create,
                old_value: None,
                new_value: Some(value),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(grade)
    }

    /// Insert a batch of grades, each with its Create history entry, in
    /// one transaction. Either every entry commits or none do.
    pub async fn batch_create_with_history(
        pool: &PgPool,
        entries: &[(DbId, i16)],
    ) -> Result<Vec<Grade>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO grades (enrollment_id, grade)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );

        let mut created = Vec::with_capacity(entries.len());
        for &(enrollment_id, value) in entries {
            let grade = sqlx::query_as::<_, Grade>(&query)
                .bind(enrollment_id)
                .bind(value)
                .fetch_one(&mut *tx)
                .await?;

            GradeHistoryRepo::insert(
                &mut *tx,
                &CreateGradeHistory {
                    grade_id: grade.id,
                    action: GradeAction::Create,
                    old_value: None,
                    new_value: Some(value),
                },
            )
            .await?;

            created.push(grade);
        }

        tx.commit().await?;
        Ok(created)
    }

    /// Change a grade's value, appending an Update history entry that
    /// captures old and new values. The history row is written before the
    /// value mutation. Returns the updated row, or `None` if no live
    /// (non-deleted) grade has the given id.
    pub async fn update_with_history(
        pool: &PgPool,
        id: DbId,
        new_value: i16,
    ) -> Result<Option<Grade>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM grades WHERE id = $1 AND is_deleted = FALSE FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Grade>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        GradeHistoryRepo::insert(
            &mut *tx,
            &CreateGradeHistory {
                grade_id: id,
                action: GradeAction::Update,
                old_value: Some(current.grade),
                new_value: Some(new_value),
            },
        )
        .await?;

        let update = format!("UPDATE grades SET grade = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let updated = sqlx::query_as::<_, Grade>(&update)
            .bind(id)
            .bind(new_value)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Soft-delete a grade (`is_deleted = TRUE`, row kept), appending a
    /// Delete history entry with the value at deletion time. Returns
    /// `false` if no live grade has the given id.
    pub async fn soft_delete_with_history(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM grades WHERE id = $1 AND is_deleted = FALSE FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Grade>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(false);
        };

        GradeHistoryRepo::insert(
            &mut *tx,
            &CreateGradeHistory {
                grade_id: id,
                action: GradeAction::Delete,
                old_value: Some(current.grade),
                new_value: None,
            },
        )
        .await?;

        sqlx::query("UPDATE grades SET is_deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Find a live grade by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Grade>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM grades WHERE id = $1");
        sqlx::query_as::<_, Grade>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live grade joined with its owning course, for ownership
    /// checks. Soft-deleted grades do not resolve here.
    pub async fn find_with_course(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GradeWithCourse>, sqlx::Error> {
        sqlx::query_as::<_, GradeWithCourse>(
            "SELECT g.id, g.enrollment_id, g.grade, g.is_deleted,
                    c.id AS course_id, c.teacher_id
             FROM grades g
             JOIN enrollments e ON e.id = g.enrollment_id
             JOIN courses c ON c.id = e.course_id
             WHERE g.id = $1 AND g.is_deleted = FALSE",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List the visible (non-deleted) grades of one enrollment, oldest
    /// first. Soft-deleted rows are excluded from every student-facing
    /// and average-computing view.
    pub async fn list_visible_for_enrollment(
        pool: &PgPool,
        enrollment_id: DbId,
    ) -> Result<Vec<Grade>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM grades
             WHERE enrollment_id = $1 AND is_deleted = FALSE
             ORDER BY date"
        );
        sqlx::query_as::<_, Grade>(&query)
            .bind(enrollment_id)
            .fetch_all(pool)
            .await
    }
}
