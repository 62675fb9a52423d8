pub mod auth;
pub mod course;
pub mod health;
pub mod history;
pub mod image;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy (paths preserved verbatim for client compatibility):
///
/// ```text
/// /auth/register                      register (public)
/// /auth/login                         login (public)
/// /auth/me                            profile (requires auth)
/// /auth/forgot-password               reset link (public, rate-limited)
/// /auth/reset-password                consume reset token (public)
/// /auth/change-email                  change email (requires auth)
///
/// /course/create                      create course (teacher)
/// /course/delete                      delete course (teacher, owner)
/// /course/enroll                      enroll student (teacher, owner)
/// /course/findByTeacher               courses of a teacher (auth)
/// /course/findByStudent               courses of a student (auth)
/// /course/getStudentsForCourse        enrolled students (auth)
/// /course/getCourse                   course page, differential view (auth)
/// /course/addStudentGrade             add grade (teacher, owner)
/// /course/editStudentGrade            edit grade (teacher, owner)
/// /course/deleteStudentGrade          soft-delete grade (teacher, owner)
/// /course/submitGrades                batch grades (teacher, owner)
///
/// /history/getGradeHistoryByStudent   audit trail per student (student)
/// /history/getGradeHistoryByTeacher   audit trail per teacher (teacher)
///
/// /image/change-image                 change avatar (public by contract)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/course", course::router())
        .nest("/history", history::router())
        .nest("/image", image::router())
}
