//! HTTP-level integration tests for the `/history` endpoints.
//!
//! Exercises the full audit lifecycle: create, update, and delete of a
//! grade each leave one history row, and soft-deleted grades stay fully
//! visible in the trail.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth};
use sqlx::PgPool;

use gradebook_api::auth::password::hash_password;
use gradebook_core::roles::UserRole;
use gradebook_db::models::user::CreateUser;
use gradebook_db::repositories::UserRepo;

const PASSWORD: &str = "test_password_123!";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_user(pool: &PgPool, email: &str, role: UserRole) {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(PASSWORD).expect("hashing should succeed"),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role,
        image: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
}

async fn login(pool: &PgPool, email: &str) -> String {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": email, "password": PASSWORD });
    let response = post_json(app, "/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .expect("token")
        .to_string()
}

/// Set up teacher + enrolled student + course, then add, edit, and
/// soft-delete one grade. Returns (teacher_token, student_token).
async fn seed_full_grade_lifecycle(pool: &PgPool) -> (String, String) {
    create_user(pool, "t@test.com", UserRole::Teacher).await;
    create_user(pool, "s@test.com", UserRole::Student).await;

    let teacher_token = login(pool, "t@test.com").await;
    let student_token = login(pool, "s@test.com").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "title": "Algebra", "description": "x", "teacherEmail": "t@test.com",
    });
    let response = post_json_auth(app, "/course/create", body, &teacher_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let course_id = body_json(response).await["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "courseTitle": "Algebra", "studentEmail": "s@test.com", "teacherEmail": "t@test.com",
    });
    let response = post_json_auth(app, "/course/enroll", body, &teacher_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "courseId": course_id, "studentEmail": "s@test.com", "grade": 6,
    });
    let response = post_json_auth(app, "/course/addStudentGrade", body, &teacher_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let grade_id = body_json(response).await["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "id": grade_id, "grade": 9 });
    let response = post_json_auth(app, "/course/editStudentGrade", body, &teacher_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "id": grade_id });
    let response = post_json_auth(app, "/course/deleteStudentGrade", body, &teacher_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    (teacher_token, student_token)
}

/// Assert the full create/update/delete trail in order.
fn assert_full_trail(entries: &[serde_json::Value]) {
    assert_eq!(entries.len(), 3, "one row per mutation");

    assert_eq!(entries[0]["action"], "create");
    assert_eq!(entries[0]["oldValue"], serde_json::Value::Null);
    assert_eq!(entries[0]["newValue"], 6);

    assert_eq!(entries[1]["action"], "update");
    assert_eq!(entries[1]["oldValue"], 6);
    assert_eq!(entries[1]["newValue"], 9);

    assert_eq!(entries[2]["action"], "delete");
    assert_eq!(entries[2]["oldValue"], 9);
    assert_eq!(entries[2]["newValue"], serde_json::Value::Null);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// The teacher-scoped trail lists every mutation, including the deleted
/// grade's rows -- the audit log ignores soft deletion.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_by_teacher_full_trail(pool: PgPool) {
    let (teacher_token, _) = seed_full_grade_lifecycle(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/history/getGradeHistoryByTeacher?emailTeacher=t@test.com",
        &teacher_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_full_trail(json.as_array().expect("history array"));
}

/// The student-scoped trail shows the same rows from the student's side.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_by_student_full_trail(pool: PgPool) {
    let (_, student_token) = seed_full_grade_lifecycle(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/history/getGradeHistoryByStudent?emailStudent=s@test.com",
        &student_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_full_trail(json.as_array().expect("history array"));
}

/// The student endpoint requires the Student role; a teacher token gets
/// the role-check 401.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_by_student_requires_student_role(pool: PgPool) {
    let (teacher_token, _) = seed_full_grade_lifecycle(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/history/getGradeHistoryByStudent?emailStudent=s@test.com",
        &teacher_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Insufficient permissions");
}

/// The teacher endpoint requires the Teacher role symmetrically.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_by_teacher_requires_teacher_role(pool: PgPool) {
    let (_, student_token) = seed_full_grade_lifecycle(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/history/getGradeHistoryByTeacher?emailTeacher=t@test.com",
        &student_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// An unknown subject is a 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_unknown_teacher_not_found(pool: PgPool) {
    let (teacher_token, _) = seed_full_grade_lifecycle(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/history/getGradeHistoryByTeacher?emailTeacher=ghost@test.com",
        &teacher_token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
