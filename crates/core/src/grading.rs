//! Grading rules: the valid grade scale and the audit action vocabulary.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lowest grade on the scale.
pub const GRADE_MIN: i16 = 1;
/// Highest grade on the scale.
pub const GRADE_MAX: i16 = 10;

/// Check that a grade value is on the 1-10 scale.
pub fn validate_grade(grade: i16) -> Result<(), CoreError> {
    if (GRADE_MIN..=GRADE_MAX).contains(&grade) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Grade must be between {GRADE_MIN} and {GRADE_MAX}, got {grade}"
        )))
    }
}

/// What happened to a grade. One history row is written per action;
/// stored as lowercase text in `grade_history.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GradeAction {
    Create,
    Update,
    Delete,
}
