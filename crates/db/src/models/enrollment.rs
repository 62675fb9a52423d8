//! Enrollment (student <-> course link) entity model.

use sqlx::FromRow;

use gradebook_core::roles::UserRole;
use gradebook_core::types::{DbId, Timestamp};

/// Full enrollment row from the `enrollments` table.
#[derive(Debug, Clone, FromRow)]
pub struct Enrollment {
    pub id: DbId,
    pub student_id: DbId,
    pub course_id: DbId,
    pub created_at: Timestamp,
}

/// DTO for creating a new enrollment.
#[derive(Debug, Clone)]
pub struct CreateEnrollment {
    pub student_id: DbId,
    pub course_id: DbId,
}

/// Flat join row: an enrollment together with the enrolled student's
/// public fields. Used to build course pages and student listings.
#[derive(Debug, Clone, FromRow)]
pub struct EnrolledStudentRow {
    pub enrollment_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub image: Option<String>,
}
