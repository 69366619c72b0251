//! Persistence module split across logical submodules. Every function takes a
//! borrowed `Connection` and runs to completion before returning, so callers
//! are free to keep one connection around or open a fresh one per action.

mod connection;
mod courses;
mod instructors;
mod registrations;
mod students;

use rusqlite::{Connection, Error as SqlError, ErrorCode, OptionalExtension, Params};

use crate::error::{EntityKind, Error, Field, Result};

pub use connection::{ensure_schema, open_database, open_in_memory};
pub use courses::{
    assign_instructor, create_course, delete_course, fetch_course, fetch_courses,
    save_course, unassign_instructor, update_course,
};
pub use instructors::{
    create_instructor, delete_instructor, fetch_instructor, fetch_instructors,
    find_instructor_by_email, save_instructor, update_instructor,
};
pub use registrations::{
    available_courses_for_instructor, available_courses_for_student, course_names_for_instructor,
    course_names_for_student, courses_for_instructor, courses_for_student, fetch_registrations,
    register_student, students_for_course, unregister_student,
};
pub use students::{
    create_student, delete_student, fetch_student, fetch_students, find_student_by_email,
    save_student, update_student,
};

/// A unique column and the value an insert/update tried to write into it.
pub(crate) struct UniqueKey {
    column: &'static str,
    field: Field,
    value: String,
}

impl UniqueKey {
    pub(crate) fn new(column: &'static str, field: Field, value: impl ToString) -> Self {
        Self {
            column,
            field,
            value: value.to_string(),
        }
    }
}

/// Translate a SQLite UNIQUE violation into `Error::DuplicateKey` for the
/// column named in the failure message. Anything else stays a storage error.
pub(crate) fn map_unique_constraint(err: SqlError, entity: EntityKind, keys: &[UniqueKey]) -> Error {
    if matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    ) {
        let message = err.to_string();
        if let Some(key) = keys
            .iter()
            .find(|key| message.contains(&format!(".{}", key.column)))
        {
            return Error::duplicate(entity, key.field, &key.value);
        }
    }
    Error::Storage(err)
}

/// Whether `sql` yields at least one row.
pub(crate) fn row_exists<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<bool> {
    let found = conn.query_row(sql, params, |_| Ok(())).optional()?;
    Ok(found.is_some())
}
