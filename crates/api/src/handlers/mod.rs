//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod course;
pub mod history;
pub mod image;
