//! Domain types shared by the database and API crates: ids, roles,
//! grading rules, and the core error taxonomy.

pub mod error;
pub mod grading;
pub mod roles;
pub mod types;
