//! Integration tests for grade mutations and their audit trail.
//!
//! Exercises the repository layer against a real database to verify that:
//! - Creating a grade writes exactly one grade row and one Create history row
//! - Editing writes an Update row with old and new values, leaving the
//!   Create row untouched
//! - Soft delete keeps the row, flags it, and writes a Delete row
//! - Visible-grade listings exclude soft-deleted rows
//! - History listings never filter on the grade's deletion flag

use sqlx::PgPool;

use gradebook_core::grading::GradeAction;
use gradebook_core::roles::UserRole;
use gradebook_core::types::DbId;
use gradebook_db::models::course::CreateCourse;
use gradebook_db::models::enrollment::CreateEnrollment;
use gradebook_db::models::user::CreateUser;
use gradebook_db::repositories::{
    CourseRepo, EnrollmentRepo, GradeHistoryRepo, GradeRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(email: &str, role: UserRole) -> CreateUser {
    CreateUser {
        email: email.to_string(),
        password_hash: "$argon2id$test-hash".to_string(),
        first_name: "Grade".to_string(),
        last_name: "Test".to_string(),
        role,
        image: None,
    }
}

/// Create teacher + student + course + enrollment, returning the ids
/// needed by the grade tests.
async fn bootstrap(pool: &PgPool) -> (DbId, DbId) {
    let teacher = UserRepo::create(pool, &new_user("teacher@audit.test", UserRole::Teacher))
        .await
        .unwrap();
    let student = UserRepo::create(pool, &new_user("student@audit.test", UserRole::Student))
        .await
        .unwrap();

    let course = CourseRepo::create(
        pool,
        &CreateCourse {
            title: "Audit Course".to_string(),
            description: "audit test".to_string(),
            teacher_id: teacher.id,
        },
    )
    .await
    .unwrap();

    let enrollment = EnrollmentRepo::create(
        pool,
        &CreateEnrollment {
            student_id: student.id,
            course_id: course.id,
        },
    )
    .await
    .unwrap();

    (student.id, enrollment.id)
}

// ---------------------------------------------------------------------------
// Test: create writes one grade row and one Create history row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_writes_grade_and_create_history(pool: PgPool) {
    let (_, enrollment_id) = bootstrap(&pool).await;

    let grade = GradeRepo::create_with_history(&pool, enrollment_id, 7)
        .await
        .unwrap();
    assert_eq!(grade.grade, 7);
    assert!(!grade.is_deleted);

    let history = GradeHistoryRepo::list_by_grade(&pool, grade.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, GradeAction::Create);
    assert_eq!(history[0].old_value, None);
    assert_eq!(history[0].new_value, Some(7));
}

// ---------------------------------------------------------------------------
// Test: edit updates the value and appends an Update row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_edit_appends_update_row_and_keeps_create_row(pool: PgPool) {
    let (_, enrollment_id) = bootstrap(&pool).await;

    let grade = GradeRepo::create_with_history(&pool, enrollment_id, 4)
        .await
        .unwrap();

    let updated = GradeRepo::update_with_history(&pool, grade.id, 9)
        .await
        .unwrap()
        .expect("grade must resolve");
    assert_eq!(updated.grade, 9);
    // The date is assigned at creation and never changes.
    assert_eq!(updated.date, grade.date);

    let history = GradeHistoryRepo::list_by_grade(&pool, grade.id).await.unwrap();
    assert_eq!(history.len(), 2);
    // The Create row from before is untouched.
    assert_eq!(history[0].action, GradeAction::Create);
    assert_eq!(history[0].new_value, Some(4));
    // The Update row captures both values.
    assert_eq!(history[1].action, GradeAction::Update);
    assert_eq!(history[1].old_value, Some(4));
    assert_eq!(history[1].new_value, Some(9));
}

// ---------------------------------------------------------------------------
// Test: soft delete keeps the row and appends a Delete row
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_keeps_row_and_appends_delete_row(pool: PgPool) {
    let (_, enrollment_id) = bootstrap(&pool).await;

    let grade = GradeRepo::create_with_history(&pool, enrollment_id, 2)
        .await
        .unwrap();

    let deleted = GradeRepo::soft_delete_with_history(&pool, grade.id)
        .await
        .unwrap();
    assert!(deleted, "first soft delete must succeed");

    // The row is still in storage, flagged deleted.
    let row = GradeRepo::find_by_id(&pool, grade.id)
        .await
        .unwrap()
        .expect("row must survive soft delete");
    assert!(row.is_deleted);
    assert_eq!(row.grade, 2, "value preserved for audit purposes");

    let history = GradeHistoryRepo::list_by_grade(&pool, grade.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].action, GradeAction::Delete);
    assert_eq!(history[1].old_value, Some(2));
    assert_eq!(history[1].new_value, None);
}

// ---------------------------------------------------------------------------
// Test: soft delete is not repeatable, edits on deleted grades fail
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_grade_rejects_further_mutations(pool: PgPool) {
    let (_, enrollment_id) = bootstrap(&pool).await;

    let grade = GradeRepo::create_with_history(&pool, enrollment_id, 5)
        .await
        .unwrap();
    assert!(GradeRepo::soft_delete_with_history(&pool, grade.id)
        .await
        .unwrap());

    // Second delete: no-op, no extra history row.
    assert!(!GradeRepo::soft_delete_with_history(&pool, grade.id)
        .await
        .unwrap());

    // Edit: the grade no longer resolves as live.
    let updated = GradeRepo::update_with_history(&pool, grade.id, 8)
        .await
        .unwrap();
    assert!(updated.is_none());

    let history = GradeHistoryRepo::list_by_grade(&pool, grade.id).await.unwrap();
    assert_eq!(history.len(), 2, "only Create + Delete rows exist");
}

// ---------------------------------------------------------------------------
// Test: visible listing excludes deleted rows, history does not
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_visibility_split_between_grades_and_history(pool: PgPool) {
    let (student_id, enrollment_id) = bootstrap(&pool).await;

    let keep = GradeRepo::create_with_history(&pool, enrollment_id, 10)
        .await
        .unwrap();
    let drop = GradeRepo::create_with_history(&pool, enrollment_id, 1)
        .await
        .unwrap();
    GradeRepo::soft_delete_with_history(&pool, drop.id)
        .await
        .unwrap();

    // The student-facing listing shows only the live grade.
    let visible = GradeRepo::list_visible_for_enrollment(&pool, enrollment_id)
        .await
        .unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, keep.id);

    // The audit trail shows every row for both grades.
    let trail = GradeHistoryRepo::list_by_student(&pool, student_id)
        .await
        .unwrap();
    assert_eq!(trail.len(), 3, "Create, Create, Delete");
    assert!(trail.iter().any(|h| h.grade_id == drop.id
        && h.action == GradeAction::Delete
        && h.old_value == Some(1)));
}

// ---------------------------------------------------------------------------
// Test: ownership join resolves the grade's teacher
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_with_course_resolves_teacher(pool: PgPool) {
    let (_, enrollment_id) = bootstrap(&pool).await;

    let teacher = UserRepo::find_by_email(&pool, "teacher@audit.test")
        .await
        .unwrap()
        .unwrap();

    let grade = GradeRepo::create_with_history(&pool, enrollment_id, 6)
        .await
        .unwrap();

    let with_course = GradeRepo::find_with_course(&pool, grade.id)
        .await
        .unwrap()
        .expect("live grade must resolve");
    assert_eq!(with_course.teacher_id, Some(teacher.id));

    // A soft-deleted grade no longer resolves through this lookup.
    GradeRepo::soft_delete_with_history(&pool, grade.id)
        .await
        .unwrap();
    assert!(GradeRepo::find_with_course(&pool, grade.id)
        .await
        .unwrap()
        .is_none());
}
