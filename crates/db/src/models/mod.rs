//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Serializable response shapes for external-facing output (entities
//!   carrying a password hash are never serialized directly)

pub mod course;
pub mod enrollment;
pub mod grade;
pub mod grade_history;
pub mod user;
