//! Route definitions for the `/course` resource.

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::course;
use crate::state::AppState;

/// Routes mounted at `/course`.
///
/// Role requirements are enforced by handler extractors; ownership
/// checks live inside the handlers.
///
/// ```text
/// POST   /create                -> create_course (teacher)
/// DELETE /delete                -> destroy_course (teacher)
/// POST   /enroll                -> enroll_student (teacher)
/// POST   /findByTeacher         -> find_courses_by_teacher
/// POST   /findByStudent         -> find_courses_by_student
/// POST   /getStudentsForCourse  -> get_students_for_course
/// POST   /getCourse             -> get_course
/// POST   /addStudentGrade       -> add_student_grade (teacher)
/// POST   /editStudentGrade      -> edit_student_grade (teacher)
/// POST   /deleteStudentGrade    -> delete_student_grade (teacher)
/// POST   /submitGrades          -> submit_grades (teacher)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(course::create_course))
        .route("/delete", delete(course::destroy_course))
        .route("/enroll", post(course::enroll_student))
        .route("/findByTeacher", post(course::find_courses_by_teacher))
        .route("/findByStudent", post(course::find_courses_by_student))
        .route(
            "/getStudentsForCourse",
            post(course::get_students_for_course),
        )
        .route("/getCourse", post(course::get_course))
        .route("/addStudentGrade", post(course::add_student_grade))
        .route("/editStudentGrade", post(course::edit_student_grade))
        .route("/deleteStudentGrade", post(course::delete_student_grade))
        .route("/submitGrades", post(course::submit_grades))
}
