//! Domain-level building blocks shared by the db and web crates:
//! form validation, password hashing, and common type aliases.

pub mod forms;
pub mod password;
pub mod types;
