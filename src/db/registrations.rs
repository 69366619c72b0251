//! Student registrations and the instructor/course linkage queries. Both sides
//! of a registration are stored by value (email and course ID), so every query
//! here reads whatever is currently in the tables, stale references included.

use rusqlite::types::FromSql;
use rusqlite::{params, Connection, Params, Row};
use tracing::info;

use super::row_exists;
use crate::error::{Field, Result};
use crate::models::{Course, Registration};
use crate::validate::{link_email, validate_id};

/// Run a single-column query and collect the values.
fn query_column<T: FromSql, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let values = stmt
        .query_map(params, |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<T>>>()?;
    Ok(values)
}

fn row_to_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course::from_storage(row.get(0)?, row.get(1)?, row.get(2)?))
}

/// Register a student for a course. Returns `false` without writing when the
/// pair is already registered.
pub fn register_student(conn: &Connection, email: &str, course_id: i64) -> Result<bool> {
    let email = link_email(email)?;
    validate_id(Field::CourseId, course_id)?;

    let tx = conn.unchecked_transaction()?;
    if row_exists(
        &tx,
        "SELECT 1 FROM registrations WHERE studentEmail = ?1 AND courseID = ?2",
        params![email, course_id],
    )? {
        return Ok(false);
    }

    tx.execute(
        "INSERT INTO registrations (studentEmail, courseID) VALUES (?1, ?2)",
        params![email, course_id],
    )?;
    tx.commit()?;

    info!(email, course_id, "student registered");
    Ok(true)
}

/// Drop every registration row for the pair. Returns whether any existed.
pub fn unregister_student(conn: &Connection, email: &str, course_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM registrations WHERE studentEmail = ?1 AND courseID = ?2",
        params![email.trim(), course_id],
    )?;

    info!(email, course_id, deleted, "student unregistered");
    Ok(deleted > 0)
}

pub fn fetch_registrations(conn: &Connection) -> Result<Vec<Registration>> {
    let mut stmt = conn.prepare("SELECT studentEmail, courseID FROM registrations ORDER BY id")?;

    let registrations = stmt
        .query_map([], |row| {
            Ok(Registration {
                student_email: row.get(0)?,
                course_id: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(registrations)
}

/// Emails of the students registered for `course_id`.
pub fn students_for_course(conn: &Connection, course_id: i64) -> Result<Vec<String>> {
    query_column(
        conn,
        "SELECT studentEmail FROM registrations WHERE courseID = ?1 ORDER BY id",
        params![course_id],
    )
}

/// Course IDs a student is registered for, whether or not the course still
/// exists.
pub fn courses_for_student(conn: &Connection, email: &str) -> Result<Vec<i64>> {
    query_column(
        conn,
        "SELECT courseID FROM registrations WHERE studentEmail = ?1 ORDER BY id",
        params![email],
    )
}

pub fn courses_for_instructor(conn: &Connection, email: &str) -> Result<Vec<i64>> {
    query_column(
        conn,
        "SELECT courseID FROM courses WHERE instructor = ?1 ORDER BY id",
        params![email],
    )
}

/// Names of the existing courses a student is registered for. Registrations
/// that point at deleted courses drop out of this list.
pub fn course_names_for_student(conn: &Connection, email: &str) -> Result<Vec<String>> {
    query_column(
        conn,
        "SELECT c.courseName
         FROM registrations r
         INNER JOIN courses c ON c.courseID = r.courseID
         WHERE r.studentEmail = ?1
         ORDER BY r.id",
        params![email],
    )
}

pub fn course_names_for_instructor(conn: &Connection, email: &str) -> Result<Vec<String>> {
    query_column(
        conn,
        "SELECT courseName FROM courses WHERE instructor = ?1 ORDER BY id",
        params![email],
    )
}

/// Courses the student is not registered for yet.
pub fn available_courses_for_student(conn: &Connection, email: &str) -> Result<Vec<Course>> {
    let mut stmt = conn.prepare(
        "SELECT c.courseID, c.courseName, c.instructor
         FROM courses c
         WHERE NOT EXISTS (
             SELECT 1 FROM registrations r
             WHERE r.courseID = c.courseID AND r.studentEmail = ?1
         )
         ORDER BY c.id",
    )?;

    let courses = stmt
        .query_map(params![email], row_to_course)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(courses)
}

/// Courses not currently assigned to this instructor, including ones taught by
/// someone else (assigning replaces the previous instructor).
pub fn available_courses_for_instructor(conn: &Connection, email: &str) -> Result<Vec<Course>> {
    let mut stmt = conn.prepare(
        "SELECT courseID, courseName, instructor
         FROM courses
         WHERE instructor IS NULL OR instructor != ?1
         ORDER BY id",
    )?;

    let courses = stmt
        .query_map(params![email], row_to_course)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(courses)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::{
        assign_instructor, create_course, create_instructor, delete_course, delete_instructor,
        delete_student, open_in_memory,
    };
    use crate::models::Instructor;

    const STUDENT: &str = "s@mail.aub.edu";
    const INSTRUCTOR: &str = "i@mail.aub.edu";

    fn with_courses() -> Connection {
        let conn = open_in_memory().unwrap();
        create_course(&conn, Course::new(101, "Intro", None).unwrap()).unwrap();
        create_course(&conn, Course::new(202, "Databases", None).unwrap()).unwrap();
        conn
    }

    #[test]
    fn register_then_unregister() {
        let conn = with_courses();

        assert!(register_student(&conn, STUDENT, 101).unwrap());
        assert_eq!(courses_for_student(&conn, STUDENT).unwrap(), vec![101]);
        assert_eq!(
            students_for_course(&conn, 101).unwrap(),
            vec![STUDENT.to_string()]
        );

        assert!(unregister_student(&conn, STUDENT, 101).unwrap());
        assert!(courses_for_student(&conn, STUDENT).unwrap().is_empty());
        assert!(!unregister_student(&conn, STUDENT, 101).unwrap());
    }

    #[test]
    fn registering_twice_keeps_one_row() {
        let conn = with_courses();
        assert!(register_student(&conn, STUDENT, 101).unwrap());
        assert!(!register_student(&conn, STUDENT, 101).unwrap());
        assert_eq!(
            fetch_registrations(&conn).unwrap(),
            vec![Registration {
                student_email: STUDENT.to_string(),
                course_id: 101,
            }]
        );
    }

    #[test]
    fn register_rejects_bad_email_and_bad_course_id() {
        let conn = with_courses();
        assert!(register_student(&conn, " ", 101).is_err());
        assert!(matches!(
            register_student(&conn, "bob", 101).unwrap_err(),
            crate::Error::InvalidField {
                field: Field::Email,
                ..
            }
        ));
        assert!(register_student(&conn, STUDENT, 0).is_err());
        assert!(fetch_registrations(&conn).unwrap().is_empty());
    }

    #[test]
    fn instructor_link_disappears_with_the_course() {
        let conn = with_courses();
        assign_instructor(&conn, 101, INSTRUCTOR).unwrap();
        assert_eq!(courses_for_instructor(&conn, INSTRUCTOR).unwrap(), vec![101]);

        delete_course(&conn, 101).unwrap();
        assert!(courses_for_instructor(&conn, INSTRUCTOR).unwrap().is_empty());
    }

    #[test]
    fn deleting_instructor_leaves_stale_course_assignment() {
        let conn = with_courses();
        create_instructor(&conn, Instructor::new("I", 40, INSTRUCTOR, 1).unwrap()).unwrap();
        assign_instructor(&conn, 101, INSTRUCTOR).unwrap();

        delete_instructor(&conn, 1).unwrap();
        assert_eq!(courses_for_instructor(&conn, INSTRUCTOR).unwrap(), vec![101]);
    }

    #[test]
    fn deleting_course_or_student_leaves_registrations() {
        let conn = with_courses();
        crate::db::create_student(
            &conn,
            crate::models::Student::new("S", 20, STUDENT, 5).unwrap(),
        )
        .unwrap();
        register_student(&conn, STUDENT, 101).unwrap();
        register_student(&conn, STUDENT, 202).unwrap();

        delete_course(&conn, 101).unwrap();
        assert_eq!(courses_for_student(&conn, STUDENT).unwrap(), vec![101, 202]);
        assert_eq!(
            course_names_for_student(&conn, STUDENT).unwrap(),
            vec!["Databases".to_string()]
        );

        delete_student(&conn, 5).unwrap();
        assert_eq!(students_for_course(&conn, 202).unwrap(), vec![STUDENT.to_string()]);
    }

    #[test]
    fn available_courses_exclude_existing_links() {
        let conn = with_courses();
        register_student(&conn, STUDENT, 101).unwrap();
        let open: Vec<i64> = available_courses_for_student(&conn, STUDENT)
            .unwrap()
            .iter()
            .map(Course::course_id)
            .collect();
        assert_eq!(open, vec![202]);

        assign_instructor(&conn, 202, INSTRUCTOR).unwrap();
        assign_instructor(&conn, 101, "other@mail.aub.edu").unwrap();
        let open: Vec<i64> = available_courses_for_instructor(&conn, INSTRUCTOR)
            .unwrap()
            .iter()
            .map(Course::course_id)
            .collect();
        assert_eq!(open, vec![101]);
        assert_eq!(
            course_names_for_instructor(&conn, INSTRUCTOR).unwrap(),
            vec!["Databases".to_string()]
        );
    }
}
