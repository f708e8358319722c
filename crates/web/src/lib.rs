//! Shelfmark web server library.
//!
//! Exposes the building blocks (config, state, error handling, router,
//! sessions, templates) so integration tests and the binary entrypoint can
//! both access them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod htmx;
pub mod render;
pub mod router;
pub mod session;
pub mod state;
pub mod upload;
