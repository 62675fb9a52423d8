//! Grade history entity model (append-only audit trail).
//!
//! History rows are immutable once written -- there is deliberately no
//! update DTO, and the repository exposes no update or delete verbs.

use serde::Serialize;
use sqlx::FromRow;

use gradebook_core::grading::GradeAction;
use gradebook_core::types::{DbId, Timestamp};

/// A single audit entry for a grade mutation.
///
/// Exactly one of the value fields may be null depending on the action:
/// Create carries only `new_value`, Delete only `old_value`, Update both.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeHistoryEntry {
    pub id: DbId,
    pub grade_id: DbId,
    pub action: GradeAction,
    pub old_value: Option<i16>,
    pub new_value: Option<i16>,
    pub date: Timestamp,
}

/// DTO for appending a history entry.
#[derive(Debug, Clone)]
pub struct CreateGradeHistory {
    pub grade_id: DbId,
    pub action: GradeAction,
    pub old_value: Option<i16>,
    pub new_value: Option<i16>,
}
