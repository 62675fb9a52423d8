//! Route definitions for the `/history` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at `/history`.
///
/// ```text
/// GET /getGradeHistoryByStudent  -> get_grade_history_by_student (student)
/// GET /getGradeHistoryByTeacher  -> get_grade_history_by_teacher (teacher)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/getGradeHistoryByStudent",
            get(history::get_grade_history_by_student),
        )
        .route(
            "/getGradeHistoryByTeacher",
            get(history::get_grade_history_by_teacher),
        )
}
