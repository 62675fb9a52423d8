//! Handlers for the `/course` resource: course CRUD, enrollment, and
//! grade management.
//!
//! Two kinds of authorization failure are kept deliberately distinct:
//! a role-check failure is 401 (see `middleware::rbac`), while an
//! ownership failure -- the caller holds the Teacher role but does not
//! own the course/grade -- is a 400 with a "You are not authorized"
//! message. Clients branch on that split.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use gradebook_core::error::CoreError;
use gradebook_core::grading::validate_grade;
use gradebook_core::roles::UserRole;
use gradebook_core::types::DbId;
use gradebook_db::models::course::{Course, CoursePageInfo, CourseStudent, CourseWithTeacher};
use gradebook_db::models::enrollment::CreateEnrollment;
use gradebook_db::models::grade::{Grade, GradeEntry};
use gradebook_db::models::user::UserSummary;
use gradebook_db::repositories::{CourseRepo, EnrollmentRepo, GradeRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireTeacher;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /course/create`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(email)]
    pub teacher_email: String,
}

/// Request body for `DELETE /course/delete`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DestroyCourseRequest {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(email)]
    pub teacher_email: String,
}

/// Request body for `POST /course/enroll`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EnrollStudentRequest {
    #[validate(length(min = 1))]
    pub course_title: String,
    #[validate(email)]
    pub student_email: String,
    #[validate(email)]
    pub teacher_email: String,
}

/// Request body for `POST /course/findByTeacher`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindByTeacherRequest {
    #[validate(email)]
    pub teacher_email: String,
}

/// Request body for `POST /course/findByStudent`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindByStudentRequest {
    #[validate(email)]
    pub student_email: String,
}

/// Request body for `POST /course/getStudentsForCourse`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GetStudentsForCourseRequest {
    #[validate(length(min = 1))]
    pub course_title: String,
}

/// Request body for `POST /course/getCourse`.
#[derive(Debug, Deserialize)]
pub struct GetCourseRequest {
    pub id: DbId,
}

/// Request body for `POST /course/addStudentGrade`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentGradeRequest {
    pub course_id: DbId,
    #[validate(email)]
    pub student_email: String,
    #[validate(range(min = 1, max = 10))]
    pub grade: i16,
}

/// Request body for `POST /course/editStudentGrade`.
#[derive(Debug, Deserialize, Validate)]
pub struct EditStudentGradeRequest {
    pub id: DbId,
    #[validate(range(min = 1, max = 10))]
    pub grade: i16,
}

/// Request body for `POST /course/deleteStudentGrade`.
#[derive(Debug, Deserialize)]
pub struct DeleteStudentGradeRequest {
    pub id: DbId,
}

/// One entry in a `POST /course/submitGrades` batch.
#[derive(Debug, Deserialize, Validate)]
pub struct GradeSubmission {
    #[validate(email)]
    pub email: String,
    pub grade: i16,
}

/// Request body for `POST /course/submitGrades`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitGradesRequest {
    pub course_id: DbId,
    #[validate(nested)]
    pub grades: Vec<GradeSubmission>,
}

// ---------------------------------------------------------------------------
// Handlers: course CRUD
// ---------------------------------------------------------------------------

/// POST /course/create
///
/// Create a course owned by the named teacher. Titles are unique across
/// ALL courses, not per teacher.
pub async fn create_course(
    State(state): State<AppState>,
    RequireTeacher(_caller): RequireTeacher,
    Json(input): Json<CreateCourseRequest>,
) -> AppResult<Json<CourseWithTeacher>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let teacher = UserRepo::find_by_email_and_role(&state.pool, &input.teacher_email, UserRole::Teacher)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No teacher found with email: {}",
                input.teacher_email
            )))
        })?;

    if CourseRepo::find_by_title(&state.pool, &input.title)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "A course with the title \"{}\" already exists.",
            input.title
        )));
    }

    let course = CourseRepo::create(
        &state.pool,
        &gradebook_db::models::course::CreateCourse {
            title: input.title,
            description: input.description,
            teacher_id: teacher.id,
        },
    )
    .await?;

    tracing::info!(course_id = course.id, teacher_id = teacher.id, "Course created");
    Ok(Json(CourseWithTeacher {
        id: course.id,
        title: course.title,
        description: course.description,
        teacher: Some(teacher.summary(&state.config.default_user_image)),
        grades: None,
    }))
}

/// DELETE /course/delete
///
/// Delete a course by title. Only the owning teacher may do this; the
/// delete cascades through enrollments, grades, and their history.
pub async fn destroy_course(
    State(state): State<AppState>,
    RequireTeacher(_caller): RequireTeacher,
    Json(input): Json<DestroyCourseRequest>,
) -> AppResult<Json<MessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let course = CourseRepo::find_by_title(&state.pool, &input.title)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No course found with title: \"{}\"",
                input.title
            )))
        })?;

    if !owner_email_matches(&state, &course, &input.teacher_email).await? {
        return Err(AppError::BadRequest(
            "You are not authorized to delete this course".into(),
        ));
    }

    CourseRepo::delete(&state.pool, course.id).await?;

    tracing::info!(course_id = course.id, "Course deleted");
    Ok(Json(MessageResponse::new("Course successfully deleted")))
}

// ---------------------------------------------------------------------------
// Handlers: enrollment
// ---------------------------------------------------------------------------

/// POST /course/enroll
///
/// Enroll a student into a course. Only the owning teacher may enroll;
/// a (student, course) pair enrolls at most once.
pub async fn enroll_student(
    State(state): State<AppState>,
    RequireTeacher(_caller): RequireTeacher,
    Json(input): Json<EnrollStudentRequest>,
) -> AppResult<Json<MessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let course = CourseRepo::find_by_title(&state.pool, &input.course_title)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No course found with title: \"{}\"",
                input.course_title
            )))
        })?;

    if !owner_email_matches(&state, &course, &input.teacher_email).await? {
        return Err(AppError::BadRequest(
            "You are not authorized to enroll students in this course".into(),
        ));
    }

    let student = UserRepo::find_by_email_and_role(&state.pool, &input.student_email, UserRole::Student)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No student found with email: {}",
                input.student_email
            )))
        })?;

    // Friendly duplicate check by primary-key pair. The unique index
    // uq_enrollments_student_course closes the race between two
    // concurrent identical requests; a loser maps to 409.
    if EnrollmentRepo::find_by_pair(&state.pool, student.id, course.id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "Student is already enrolled in \"{}\"",
            course.title
        )));
    }

    EnrollmentRepo::create(
        &state.pool,
        &CreateEnrollment {
            student_id: student.id,
            course_id: course.id,
        },
    )
    .await?;

    tracing::info!(course_id = course.id, student_id = student.id, "Student enrolled");
    Ok(Json(MessageResponse::new("Student successfully enrolled")))
}

// ---------------------------------------------------------------------------
// Handlers: course listings
// ---------------------------------------------------------------------------

/// POST /course/findByTeacher
///
/// All courses owned by the named teacher, each with a sanitized teacher
/// summary embedded.
pub async fn find_courses_by_teacher(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(input): Json<FindByTeacherRequest>,
) -> AppResult<Json<Vec<CourseWithTeacher>>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let teacher = UserRepo::find_by_email_and_role(&state.pool, &input.teacher_email, UserRole::Teacher)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No teacher found with email: {}",
                input.teacher_email
            )))
        })?;

    let summary = teacher.summary(&state.config.default_user_image);
    let courses = CourseRepo::list_by_teacher(&state.pool, teacher.id).await?;

    let result = courses
        .into_iter()
        .map(|c| CourseWithTeacher {
            id: c.id,
            title: c.title,
            description: c.description,
            teacher: Some(summary.clone()),
            grades: None,
        })
        .collect();

    Ok(Json(result))
}

/// POST /course/findByStudent
///
/// All courses the named student is enrolled in, each carrying the
/// student's own non-deleted grades and a sanitized teacher summary.
pub async fn find_courses_by_student(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(input): Json<FindByStudentRequest>,
) -> AppResult<Json<Vec<CourseWithTeacher>>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let student = UserRepo::find_by_email_and_role(&state.pool, &input.student_email, UserRole::Student)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No student found with email: {}",
                input.student_email
            )))
        })?;

    let courses = CourseRepo::list_by_student(&state.pool, student.id).await?;

    let mut result = Vec::with_capacity(courses.len());
    for course in courses {
        let teacher = load_teacher_summary(&state, course.teacher_id).await?;
        let grades = student_grades_in_course(&state, student.id, course.id).await?;
        result.push(CourseWithTeacher {
            id: course.id,
            title: course.title,
            description: course.description,
            teacher,
            grades: Some(grades),
        });
    }

    Ok(Json(result))
}

/// POST /course/getStudentsForCourse
///
/// Sanitized listing of every student enrolled in a course.
pub async fn get_students_for_course(
    State(state): State<AppState>,
    AuthUser(_caller): AuthUser,
    Json(input): Json<GetStudentsForCourseRequest>,
) -> AppResult<Json<Vec<UserSummary>>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let course = CourseRepo::find_by_title(&state.pool, &input.course_title)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No course found with title: \"{}\"",
                input.course_title
            )))
        })?;

    let rows = EnrollmentRepo::list_students_for_course(&state.pool, course.id).await?;
    let students = rows
        .into_iter()
        .map(|row| UserSummary {
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row.role,
            image: row
                .image
                .unwrap_or_else(|| state.config.default_user_image.clone()),
        })
        .collect();

    Ok(Json(students))
}

/// POST /course/getCourse
///
/// The course page, with differential visibility:
/// - the owning teacher sees every enrolled student and their grades,
/// - an enrolled student sees only their own grades,
/// - anyone else is rejected.
///
/// A student's response must never contain another student's grades.
pub async fn get_course(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(input): Json<GetCourseRequest>,
) -> AppResult<Json<CoursePageInfo>> {
    let course = CourseRepo::find_by_id(&state.pool, input.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No course found with id: {}",
                input.id
            )))
        })?;

    let teacher = load_teacher_summary(&state, course.teacher_id).await?;

    // Owning teacher: full view of all students and their grades.
    if caller.role == UserRole::Teacher && course.teacher_id == Some(caller.id) {
        let rows = EnrollmentRepo::list_students_for_course(&state.pool, course.id).await?;
        let mut students = Vec::with_capacity(rows.len());
        for row in rows {
            let grades = GradeRepo::list_visible_for_enrollment(&state.pool, row.enrollment_id)
                .await?
                .iter()
                .map(GradeEntry::from)
                .collect();
            students.push(CourseStudent {
                student: UserSummary {
                    first_name: row.first_name,
                    last_name: row.last_name,
                    email: row.email,
                    role: row.role,
                    image: row
                        .image
                        .unwrap_or_else(|| state.config.default_user_image.clone()),
                },
                grades,
            });
        }

        return Ok(Json(CoursePageInfo {
            id: course.id,
            title: course.title,
            description: course.description,
            teacher,
            students: Some(students),
            grades: None,
        }));
    }

    // Enrolled student: own grades only.
    if let Some(enrollment) =
        EnrollmentRepo::find_by_pair(&state.pool, caller.id, course.id).await?
    {
        let grades = GradeRepo::list_visible_for_enrollment(&state.pool, enrollment.id)
            .await?
            .iter()
            .map(GradeEntry::from)
            .collect();

        return Ok(Json(CoursePageInfo {
            id: course.id,
            title: course.title,
            description: course.description,
            teacher,
            students: None,
            grades: Some(grades),
        }));
    }

    Err(AppError::BadRequest(
        "You are not authorized to view this course".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers: grades
// ---------------------------------------------------------------------------

/// POST /course/addStudentGrade
///
/// Record a grade for an enrolled student. Writes the grade row and its
/// Create history entry in one transaction.
pub async fn add_student_grade(
    State(state): State<AppState>,
    RequireTeacher(caller): RequireTeacher,
    Json(input): Json<AddStudentGradeRequest>,
) -> AppResult<Json<Grade>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No course found with id: {}",
                input.course_id
            )))
        })?;

    if course.teacher_id != Some(caller.id) {
        return Err(AppError::BadRequest(
            "You are not authorized to grade this course".into(),
        ));
    }

    let enrollment =
        EnrollmentRepo::find_in_course_by_email(&state.pool, course.id, &input.student_email)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::NotFound(format!(
                    "No student found with email: {} in this course",
                    input.student_email
                )))
            })?;

    let grade = GradeRepo::create_with_history(&state.pool, enrollment.id, input.grade).await?;

    tracing::info!(grade_id = grade.id, course_id = course.id, "Grade added");
    Ok(Json(grade))
}

/// POST /course/editStudentGrade
///
/// Change a grade's value. The Update history entry (old and new value)
/// is written before the stored value mutates, in the same transaction.
pub async fn edit_student_grade(
    State(state): State<AppState>,
    RequireTeacher(caller): RequireTeacher,
    Json(input): Json<EditStudentGradeRequest>,
) -> AppResult<Json<bool>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let grade = GradeRepo::find_with_course(&state.pool, input.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No grade found with id: {}",
                input.id
            )))
        })?;

    if grade.teacher_id != Some(caller.id) {
        return Err(AppError::BadRequest(
            "You are not authorized to edit this grade".into(),
        ));
    }

    let updated = GradeRepo::update_with_history(&state.pool, input.id, input.grade).await?;
    if updated.is_none() {
        return Err(AppError::Core(CoreError::NotFound(format!(
            "No grade found with id: {}",
            input.id
        ))));
    }

    tracing::info!(grade_id = input.id, "Grade edited");
    Ok(Json(true))
}

/// POST /course/deleteStudentGrade
///
/// Soft-delete a grade. The row stays in storage (audit continuity); it
/// just disappears from student-facing and average-computing views.
pub async fn delete_student_grade(
    State(state): State<AppState>,
    RequireTeacher(caller): RequireTeacher,
    Json(input): Json<DeleteStudentGradeRequest>,
) -> AppResult<Json<bool>> {
    let grade = GradeRepo::find_with_course(&state.pool, input.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No grade found with id: {}",
                input.id
            )))
        })?;

    if grade.teacher_id != Some(caller.id) {
        return Err(AppError::BadRequest(
            "You are not authorized to delete this grade".into(),
        ));
    }

    let deleted = GradeRepo::soft_delete_with_history(&state.pool, input.id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound(format!(
            "No grade found with id: {}",
            input.id
        ))));
    }

    tracing::info!(grade_id = input.id, "Grade soft-deleted");
    Ok(Json(true))
}

/// POST /course/submitGrades
///
/// Batch form of addStudentGrade. All-or-nothing: every entry is
/// resolved before anything is written, and the whole batch commits in
/// one transaction -- an unknown email aborts with nothing persisted.
pub async fn submit_grades(
    State(state): State<AppState>,
    RequireTeacher(caller): RequireTeacher,
    Json(input): Json<SubmitGradesRequest>,
) -> AppResult<Json<MessageResponse>> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::Validation(e.to_string())))?;

    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(format!(
                "No course found with id: {}",
                input.course_id
            )))
        })?;

    if course.teacher_id != Some(caller.id) {
        return Err(AppError::BadRequest(
            "You are not authorized to grade this course".into(),
        ));
    }

    // Resolve every entry up front so a bad one fails before any write.
    let mut resolved = Vec::with_capacity(input.grades.len());
    for entry in &input.grades {
        validate_grade(entry.grade)?;
        let enrollment =
            EnrollmentRepo::find_in_course_by_email(&state.pool, course.id, &entry.email)
                .await?
                .ok_or_else(|| {
                    AppError::Core(CoreError::NotFound(format!(
                        "No student found with email: {} in this course",
                        entry.email
                    )))
                })?;
        resolved.push((enrollment.id, entry.grade));
    }

    GradeRepo::batch_create_with_history(&state.pool, &resolved).await?;

    tracing::info!(
        course_id = course.id,
        count = resolved.len(),
        "Grade batch submitted"
    );
    Ok(Json(MessageResponse::new("Grades successfully submitted")))
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Does the course's owning teacher have the given email?
///
/// A course whose teacher reference was nulled (owner account deleted)
/// matches nobody.
async fn owner_email_matches(
    state: &AppState,
    course: &Course,
    teacher_email: &str,
) -> AppResult<bool> {
    let Some(teacher_id) = course.teacher_id else {
        return Ok(false);
    };
    let owner = UserRepo::find_by_id(&state.pool, teacher_id).await?;
    Ok(owner.is_some_and(|u| u.email == teacher_email))
}

/// Load the sanitized summary of a course's teacher, if the course still
/// has one.
async fn load_teacher_summary(
    state: &AppState,
    teacher_id: Option<DbId>,
) -> AppResult<Option<UserSummary>> {
    let Some(id) = teacher_id else {
        return Ok(None);
    };
    let teacher = UserRepo::find_by_id(&state.pool, id).await?;
    Ok(teacher.map(|t| t.summary(&state.config.default_user_image)))
}

/// The student's own visible grades in one course.
async fn student_grades_in_course(
    state: &AppState,
    student_id: DbId,
    course_id: DbId,
) -> AppResult<Vec<GradeEntry>> {
    let Some(enrollment) = EnrollmentRepo::find_by_pair(&state.pool, student_id, course_id).await?
    else {
        return Ok(Vec::new());
    };
    let grades = GradeRepo::list_visible_for_enrollment(&state.pool, enrollment.id).await?;
    Ok(grades.iter().map(GradeEntry::from).collect())
}
