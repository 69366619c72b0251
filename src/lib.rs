//! Core library surface for the School Manager TUI application.
//!
//! The library owns validation and persistence for students, instructors,
//! courses and registrations. The terminal front-end in [`ui`] only calls
//! through these modules and never issues SQL of its own.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod roster;
pub mod ui;
pub mod validate;

/// Errors and the crate-wide `Result` alias.
pub use error::{EntityKind, Error, Field, Result};

/// Opening the SQLite store.
pub use db::{ensure_schema, open_database, open_in_memory};

/// The domain types every other layer manipulates.
pub use models::{Course, Instructor, Registration, Student};

pub use config::AppConfig;
pub use validate::ValidationRules;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
