//! Rows for the "View All" listings: each entity paired with the names of what
//! it is linked to, plus the case-insensitive search used to narrow them.

use rusqlite::Connection;

use crate::db::{
    course_names_for_instructor, course_names_for_student, fetch_courses, fetch_instructors,
    fetch_students, students_for_course,
};
use crate::error::Result;
use crate::models::{Course, Instructor, Student};

/// Placeholder shown when an entity has no links.
pub const NO_LINKS: &str = "None";

/// Anything the roster search can match against.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;

    /// Case-insensitive substring match over every searchable column. An empty
    /// query matches everything; whitespace is matched literally.
    fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRow {
    pub student: Student,
    /// Comma-joined course names, or [`NO_LINKS`].
    pub courses: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructorRow {
    pub instructor: Instructor,
    pub courses: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRow {
    pub course: Course,
    /// Comma-joined emails of registered students, or [`NO_LINKS`].
    pub students: String,
}

impl CourseRow {
    pub fn instructor_label(&self) -> &str {
        self.course.instructor().unwrap_or(NO_LINKS)
    }
}

impl Searchable for StudentRow {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.student.name(), self.student.email(), &self.courses]
    }
}

impl Searchable for InstructorRow {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.instructor.name(), self.instructor.email(), &self.courses]
    }
}

impl Searchable for CourseRow {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.course.course_name(),
            self.course.instructor().unwrap_or_default(),
            &self.students,
        ]
    }
}

fn join_or_none(items: Vec<String>) -> String {
    if items.is_empty() {
        NO_LINKS.to_string()
    } else {
        items.join(", ")
    }
}

pub fn student_roster(conn: &Connection) -> Result<Vec<StudentRow>> {
    fetch_students(conn)?
        .into_iter()
        .map(|student| -> Result<StudentRow> {
            let courses = join_or_none(course_names_for_student(conn, student.email())?);
            Ok(StudentRow { student, courses })
        })
        .collect()
}

pub fn instructor_roster(conn: &Connection) -> Result<Vec<InstructorRow>> {
    fetch_instructors(conn)?
        .into_iter()
        .map(|instructor| -> Result<InstructorRow> {
            let courses = join_or_none(course_names_for_instructor(conn, instructor.email())?);
            Ok(InstructorRow {
                instructor,
                courses,
            })
        })
        .collect()
}

pub fn course_roster(conn: &Connection) -> Result<Vec<CourseRow>> {
    fetch_courses(conn)?
        .into_iter()
        .map(|course| -> Result<CourseRow> {
            let students = join_or_none(students_for_course(conn, course.course_id())?);
            Ok(CourseRow { course, students })
        })
        .collect()
}

/// Keep the rows matching `query`, preserving order.
pub fn filter_rows<'a, T: Searchable>(rows: &'a [T], query: &str) -> Vec<&'a T> {
    rows.iter().filter(|row| row.matches(query)).collect()
}
