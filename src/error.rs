//! Error taxonomy shared by the validators and the persistence layer. The UI
//! converts these into status-line messages through `anyhow`, so every variant
//! renders as a sentence a user can act on.

use std::fmt;

use thiserror::Error;

/// Which input field a validation or uniqueness failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Age,
    Email,
    StudentId,
    InstructorId,
    CourseId,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Name => "name",
            Field::Age => "age",
            Field::Email => "email",
            Field::StudentId | Field::InstructorId | Field::CourseId => "ID",
        };
        f.write_str(label)
    }
}

/// The persisted entity kinds, used to label duplicate/not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Student,
    Instructor,
    Course,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Student => "Student",
            EntityKind::Instructor => "Instructor",
            EntityKind::Course => "Course",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// A field failed validation before any database work happened.
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: Field, reason: String },

    /// A create (or checked update) collided with an existing unique value.
    #[error("{entity} {field} {value} already taken")]
    DuplicateKey {
        entity: EntityKind,
        field: Field,
        value: String,
    },

    /// A checked update or assignment targeted a row that does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn invalid(field: Field, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn duplicate(entity: EntityKind, field: Field, value: impl ToString) -> Self {
        Error::DuplicateKey {
            entity,
            field,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field() {
        let err = Error::invalid(Field::Age, "must be a positive integer");
        assert_eq!(err.to_string(), "Invalid age: must be a positive integer");

        let err = Error::duplicate(EntityKind::Student, Field::Email, "a@mail.aub.edu");
        assert_eq!(
            err.to_string(),
            "Student email a@mail.aub.edu already taken"
        );

        let err = Error::duplicate(EntityKind::Course, Field::CourseId, 101);
        assert_eq!(err.to_string(), "Course ID 101 already taken");

        let err = Error::NotFound {
            entity: EntityKind::Course,
            id: 7,
        };
        assert_eq!(err.to_string(), "Course 7 not found");
    }
}
