//! Entity model structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row plus the create/update DTOs its repository accepts.

pub mod book;
pub mod note;
pub mod review;
pub mod session;
pub mod user;
