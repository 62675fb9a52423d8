//! Integration tests for schema-level invariants: unique constraints
//! and the cascade/SET NULL delete chain.

use sqlx::PgPool;

use gradebook_core::roles::UserRole;
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
        first_name: "Schema".to_string(),
        last_name: "Test".to_string(),
        role,
        image: None,
    }
}

/// Is this a unique-violation error on the given constraint?
fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Test: duplicate user email hits uq_users_email
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_rejected_by_index(pool: PgPool) {
    UserRepo::create(&pool, &new_user("dup@schema.test", UserRole::Student))
        .await
        .unwrap();

    let err = UserRepo::create(&pool, &new_user("dup@schema.test", UserRole::Teacher))
        .await
        .expect_err("second insert must fail");
    assert!(is_unique_violation(&err, "uq_users_email"));
}

// ---------------------------------------------------------------------------
// Test: duplicate course title hits uq_courses_title
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_title_rejected_by_index(pool: PgPool) {
    let t1 = UserRepo::create(&pool, &new_user("t1@schema.test", UserRole::Teacher))
        .await
        .unwrap();
    let t2 = UserRepo::create(&pool, &new_user("t2@schema.test", UserRole::Teacher))
        .await
        .unwrap();

    CourseRepo::create(
        &pool,
        &CreateCourse {
            title: "Taken".to_string(),
            description: "first".to_string(),
            teacher_id: t1.id,
        },
    )
    .await
    .unwrap();

    // Uniqueness is global: a different teacher cannot reuse the title.
    let err = CourseRepo::create(
        &pool,
        &CreateCourse {
            title: "Taken".to_string(),
            description: "second".to_string(),
            teacher_id: t2.id,
        },
    )
    .await
    .expect_err("duplicate title must fail");
    assert!(is_unique_violation(&err, "uq_courses_title"));
}

// ---------------------------------------------------------------------------
// Test: duplicate enrollment pair hits uq_enrollments_student_course
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_enrollment_rejected_by_index(pool: PgPool) {
    let teacher = UserRepo::create(&pool, &new_user("t@schema.test", UserRole::Teacher))
        .await
        .unwrap();
    let student = UserRepo::create(&pool, &new_user("s@schema.test", UserRole::Student))
        .await
        .unwrap();
    let course = CourseRepo::create(
        &pool,
        &CreateCourse {
            title: "Once Only".to_string(),
            description: "x".to_string(),
            teacher_id: teacher.id,
        },
    )
    .await
    .unwrap();

    let pair = CreateEnrollment {
        student_id: student.id,
        course_id: course.id,
    };
    EnrollmentRepo::create(&pool, &pair).await.unwrap();

    // The index is the backstop for the check-then-insert race: even a
    // request that passed the duplicate pre-check cannot commit twice.
    let err = EnrollmentRepo::create(&pool, &pair)
        .await
        .expect_err("duplicate pair must fail");
    assert!(is_unique_violation(&err, "uq_enrollments_student_course"));
}

// ---------------------------------------------------------------------------
// Test: course delete cascades to enrollments, grades, and history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_course_delete_cascades_all_the_way_down(pool: PgPool) {
    let teacher = UserRepo::create(&pool, &new_user("t@cascade.test", UserRole::Teacher))
        .await
        .unwrap();
    let student = UserRepo::create(&pool, &new_user("s@cascade.test", UserRole::Student))
        .await
        .unwrap();
    let course = CourseRepo::create(
        &pool,
        &CreateCourse {
            title: "Doomed".to_string(),
            description: "x".to_string(),
            teacher_id: teacher.id,
        },
    )
    .await
    .unwrap();
    let enrollment = EnrollmentRepo::create(
        &pool,
        &CreateEnrollment {
            student_id: student.id,
            course_id: course.id,
        },
    )
    .await
    .unwrap();
    let grade = GradeRepo::create_with_history(&pool, enrollment.id, 8)
        .await
        .unwrap();

    let deleted = CourseRepo::delete(&pool, course.id).await.unwrap();
    assert!(deleted);

    assert!(EnrollmentRepo::find_by_pair(&pool, student.id, course.id)
        .await
        .unwrap()
        .is_none());
    assert!(GradeRepo::find_by_id(&pool, grade.id)
        .await
        .unwrap()
        .is_none());
    assert!(GradeHistoryRepo::list_by_grade(&pool, grade.id)
        .await
        .unwrap()
        .is_empty());

    // The referenced users survive the cascade untouched.
    assert!(UserRepo::find_by_id(&pool, student.id).await.unwrap().is_some());
    assert!(UserRepo::find_by_id(&pool, teacher.id).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Test: deleting the owning user nulls the course's teacher reference
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_teacher_sets_course_reference_null(pool: PgPool) {
    let teacher = UserRepo::create(&pool, &new_user("gone@schema.test", UserRole::Teacher))
        .await
        .unwrap();
    let course = CourseRepo::create(
        &pool,
        &CreateCourse {
            title: "Orphaned".to_string(),
            description: "x".to_string(),
            teacher_id: teacher.id,
        },
    )
    .await
    .unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(teacher.id)
        .execute(&pool)
        .await
        .unwrap();

    let orphaned = CourseRepo::find_by_id(&pool, course.id)
        .await
        .unwrap()
        .expect("course must survive its teacher");
    assert_eq!(orphaned.teacher_id, None);
}

// ---------------------------------------------------------------------------
// Test: deleting a student cascades their enrollments only
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleting_student_cascades_enrollment(pool: PgPool) {
    let teacher = UserRepo::create(&pool, &new_user("t@leaver.test", UserRole::Teacher))
        .await
        .unwrap();
    let student = UserRepo::create(&pool, &new_user("s@leaver.test", UserRole::Student))
        .await
        .unwrap();
    let course = CourseRepo::create(
        &pool,
        &CreateCourse {
            title: "Left Behind".to_string(),
            description: "x".to_string(),
            teacher_id: teacher.id,
        },
    )
    .await
    .unwrap();
    EnrollmentRepo::create(
        &pool,
        &CreateEnrollment {
            student_id: student.id,
            course_id: course.id,
        },
    )
    .await
    .unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(student.id)
        .execute(&pool)
        .await
        .unwrap();

    let remaining = EnrollmentRepo::list_students_for_course(&pool, course.id)
        .await
        .unwrap();
    assert!(remaining.is_empty(), "enrollment goes with the student");

    // The course itself is untouched.
    assert!(CourseRepo::find_by_id(&pool, course.id)
        .await
        .unwrap()
        .is_some());
}
