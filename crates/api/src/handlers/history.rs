//! Handlers for the `/history` resource (grade audit trail).
//!
//! History listings are never filtered by the underlying grade's
//! `is_deleted` flag: the audit trail outlives soft deletion.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use gradebook_core::error::CoreError;
use gradebook_core::roles::UserRole;
use gradebook_db::models::grade_history::GradeHistoryEntry;
use gradebook_db::repositories::{GradeHistoryRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireStudent, RequireTeacher};
use crate::state::AppState;

/// Query parameters for `GET /history/getGradeHistoryByStudent`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ByStudentQuery {
    #[validate(email)]
    pub email_student: String,
}

/// Query parameters for `GET /history/getGradeHistoryByTeacher`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ByTeacherQuery {
    #[validate(email)]
    pub email_teacher: String,
}

/// GET /history/getGradeHistoryByStudent?emailStudent=
///
/// Every history entry whose grade belongs to one of the student's
/// enrollments, across all courses.
pub async fn get_grade_history_by_student(
    State(state): State<AppState>,
    RequireStudent(_caller): RequireStudent,
    Query(params): Query<ByStudentQuery>,
) -> AppResult<Json<Vec<GradeHistoryEntry>>> {
    params
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let student =
        UserRepo::find_by_email_and_role(&state.pool, &params.email_student, UserRole::Student)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound(format!(
                    "No student found with email: {}",
                    params.email_student
                )))
            })?;

    let history = GradeHistoryRepo::list_by_student(&state.pool, student.id).await?;
    Ok(Json(history))
}

/// GET /history/getGradeHistoryByTeacher?emailTeacher=
///
/// Every history entry whose grade belongs to any course taught by the
/// teacher.
pub async fn get_grade_history_by_teacher(
    State(state): State<AppState>,
    RequireTeacher(_caller): RequireTeacher,
    Query(params): Query<ByTeacherQuery>,
) -> AppResult<Json<Vec<GradeHistoryEntry>>> {
    params
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let teacher =
        UserRepo::find_by_email_and_role(&state.pool, &params.email_teacher, UserRole::Teacher)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound(format!(
                    "No teacher found with email: {}",
                    params.email_teacher
                )))
            })?;

    let history = GradeHistoryRepo::list_by_teacher(&state.pool, teacher.id).await?;
    Ok(Json(history))
}
