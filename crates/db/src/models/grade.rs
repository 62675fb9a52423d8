//! Grade entity model and response shapes.

use serde::Serialize;
use sqlx::FromRow;

use gradebook_core::types::{DbId, Timestamp};

/// Full grade row from the `grades` table.
///
/// `date` is assigned at creation and never changes; value edits touch
/// only `grade`. Deletion is a soft delete (`is_deleted`) so history for
/// the row stays meaningful.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: DbId,
    pub enrollment_id: DbId,
    pub grade: i16,
    pub date: Timestamp,
    pub is_deleted: bool,
}

/// Trimmed grade shape embedded in course pages and listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeEntry {
    pub id: DbId,
    pub grade: i16,
    pub date: Timestamp,
}

impl From<&Grade> for GradeEntry {
    fn from(g: &Grade) -> Self {
        GradeEntry {
            id: g.id,
            grade: g.grade,
            date: g.date,
        }
    }
}

/// Flat join row: a grade with its owning course resolved through the
/// enrollment. Carries enough context for ownership checks without a
/// second query.
#[derive(Debug, Clone, FromRow)]
pub struct GradeWithCourse {
    pub id: DbId,
    pub enrollment_id: DbId,
    pub grade: i16,
    pub is_deleted: bool,
    pub course_id: DbId,
    pub teacher_id: Option<DbId>,
}
