//! Domain models that mirror the SQLite schema. Every public constructor runs
//! the field validators, so holding a `Student`, `Instructor` or `Course` means
//! its fields passed validation. Rows read back from the database skip the
//! checks because they were validated on the way in.

use std::fmt;

use crate::error::{Field, Result};
use crate::validate::{validate_id, ValidationRules};

/// Fields shared by students and instructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    name: String,
    age: i64,
    email: String,
}

impl Person {
    fn new(rules: &ValidationRules, name: String, age: i64, email: String) -> Result<Self> {
        rules.validate_name(&name)?;
        rules.validate_age(age)?;
        rules.validate_email(&email)?;
        Ok(Self {
            name: name.trim().to_string(),
            age,
            email: email.trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    person: Person,
    student_id: i64,
}

impl Student {
    /// Build a student under the default validation rules.
    pub fn new(
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
        student_id: i64,
    ) -> Result<Self> {
        Self::with_rules(&ValidationRules::default(), name, age, email, student_id)
    }

    pub fn with_rules(
        rules: &ValidationRules,
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
        student_id: i64,
    ) -> Result<Self> {
        let person = Person::new(rules, name.into(), age, email.into())?;
        validate_id(Field::StudentId, student_id)?;
        Ok(Self { person, student_id })
    }

    pub(crate) fn from_storage(name: String, age: i64, email: String, student_id: i64) -> Self {
        Self {
            person: Person { name, age, email },
            student_id,
        }
    }

    pub fn name(&self) -> &str {
        self.person.name()
    }

    pub fn age(&self) -> i64 {
        self.person.age()
    }

    pub fn email(&self) -> &str {
        self.person.email()
    }

    pub fn student_id(&self) -> i64 {
        self.student_id
    }

    pub fn person(&self) -> &Person {
        &self.person
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name(), self.email())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructor {
    person: Person,
    instructor_id: i64,
}

impl Instructor {
    /// Build an instructor under the default validation rules.
    pub fn new(
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
        instructor_id: i64,
    ) -> Result<Self> {
        Self::with_rules(&ValidationRules::default(), name, age, email, instructor_id)
    }

    pub fn with_rules(
        rules: &ValidationRules,
        name: impl Into<String>,
        age: i64,
        email: impl Into<String>,
        instructor_id: i64,
    ) -> Result<Self> {
        let person = Person::new(rules, name.into(), age, email.into())?;
        validate_id(Field::InstructorId, instructor_id)?;
        Ok(Self {
            person,
            instructor_id,
        })
    }

    pub(crate) fn from_storage(
        name: String,
        age: i64,
        email: String,
        instructor_id: i64,
    ) -> Self {
        Self {
            person: Person { name, age, email },
            instructor_id,
        }
    }

    pub fn name(&self) -> &str {
        self.person.name()
    }

    pub fn age(&self) -> i64 {
        self.person.age()
    }

    pub fn email(&self) -> &str {
        self.person.email()
    }

    pub fn instructor_id(&self) -> i64 {
        self.instructor_id
    }

    pub fn person(&self) -> &Person {
        &self.person
    }
}

impl fmt::Display for Instructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name(), self.email())
    }
}

/// A course and the email of its (optional) instructor. The instructor is a
/// plain text reference; nothing forces it to match an `instructors` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    course_id: i64,
    course_name: String,
    instructor: Option<String>,
}

impl Course {
    pub fn new(
        course_id: i64,
        course_name: impl Into<String>,
        instructor: Option<String>,
    ) -> Result<Self> {
        validate_id(Field::CourseId, course_id)?;
        Ok(Self::from_storage(course_id, course_name.into(), instructor))
    }

    /// Empty or whitespace-only instructor text collapses to `None`.
    pub(crate) fn from_storage(
        course_id: i64,
        course_name: String,
        instructor: Option<String>,
    ) -> Self {
        let instructor = instructor
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty());
        Self {
            course_id,
            course_name,
            instructor,
        }
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    pub fn course_name(&self) -> &str {
        &self.course_name
    }

    pub fn instructor(&self) -> Option<&str> {
        self.instructor.as_deref()
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.course_id, self.course_name)
    }
}

/// One row of the `registrations` join table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub student_email: String,
    pub course_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn student_construction_is_all_or_nothing() {
        let student = Student::new("Alice", 20, "alice@mail.aub.edu", 1).unwrap();
        assert_eq!(student.name(), "Alice");
        assert_eq!(student.age(), 20);
        assert_eq!(student.email(), "alice@mail.aub.edu");
        assert_eq!(student.student_id(), 1);

        let err = Student::new("Alice", 20, "alice@mail.aub.edu", 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: Field::StudentId,
                ..
            }
        ));
    }

    #[test]
    fn first_invalid_field_is_reported() {
        let err = Instructor::new("", 0, "nope", 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: Field::Name,
                ..
            }
        ));

        let err = Instructor::new("Bob", 40, "bob@gmail.com", 3).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField {
                field: Field::Email,
                ..
            }
        ));
    }

    #[test]
    fn course_instructor_blank_means_unassigned() {
        let course = Course::new(101, "Intro", Some("  ".to_string())).unwrap();
        assert_eq!(course.instructor(), None);

        let course = Course::new(101, "Intro", Some("i@mail.aub.edu".to_string())).unwrap();
        assert_eq!(course.instructor(), Some("i@mail.aub.edu"));

        assert!(Course::new(-1, "Intro", None).is_err());
    }

    #[test]
    fn instances_do_not_share_state() {
        let a = Student::new("A", 19, "a@mail.aub.edu", 1).unwrap();
        let mut b = a.clone();
        b.student_id = 2;
        assert_eq!(a.student_id(), 1);
        assert_eq!(b.student_id(), 2);
    }
}
