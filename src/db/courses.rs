use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{map_unique_constraint, row_exists, UniqueKey};
use crate::error::{EntityKind, Error, Field, Result};
use crate::models::Course;
use crate::validate::link_email;

fn row_to_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course::from_storage(row.get(0)?, row.get(1)?, row.get(2)?))
}

fn unique_keys(course: &Course) -> [UniqueKey; 1] {
    [UniqueKey::new("courseID", Field::CourseId, course.course_id())]
}

/// Insert a new course, failing with `DuplicateKey` when the course ID exists.
pub fn create_course(conn: &Connection, course: Course) -> Result<Course> {
    let tx = conn.unchecked_transaction()?;

    if row_exists(
        &tx,
        "SELECT 1 FROM courses WHERE courseID = ?1",
        params![course.course_id()],
    )? {
        return Err(Error::duplicate(
            EntityKind::Course,
            Field::CourseId,
            course.course_id(),
        ));
    }

    tx.execute(
        "INSERT INTO courses (courseID, courseName, instructor) VALUES (?1, ?2, ?3)",
        params![course.course_id(), course.course_name(), course.instructor()],
    )
    .map_err(|err| map_unique_constraint(err, EntityKind::Course, &unique_keys(&course)))?;
    tx.commit()?;

    info!(course_id = course.course_id(), "course created");
    Ok(course)
}

/// Upsert keyed on `courseID`; an unassigned instructor is stored as NULL.
pub fn save_course(conn: &Connection, course: &Course) -> Result<()> {
    conn.execute(
        "INSERT INTO courses (courseID, courseName, instructor) VALUES (?1, ?2, ?3)
         ON CONFLICT(courseID) DO UPDATE SET
             courseName = excluded.courseName,
             instructor = excluded.instructor",
        params![course.course_id(), course.course_name(), course.instructor()],
    )?;

    debug!(course_id = course.course_id(), "course saved");
    Ok(())
}

/// Overwrite name and instructor of an existing course.
pub fn update_course(conn: &Connection, course: &Course) -> Result<()> {
    let updated = conn.execute(
        "UPDATE courses SET courseName = ?1, instructor = ?2 WHERE courseID = ?3",
        params![course.course_name(), course.instructor(), course.course_id()],
    )?;

    if updated == 0 {
        Err(Error::NotFound {
            entity: EntityKind::Course,
            id: course.course_id(),
        })
    } else {
        debug!(course_id = course.course_id(), "course updated");
        Ok(())
    }
}

pub fn fetch_courses(conn: &Connection) -> Result<Vec<Course>> {
    let mut stmt = conn.prepare("SELECT courseID, courseName, instructor FROM courses ORDER BY id")?;

    let courses = stmt
        .query_map([], row_to_course)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(courses)
}

pub fn fetch_course(conn: &Connection, course_id: i64) -> Result<Option<Course>> {
    let course = conn
        .query_row(
            "SELECT courseID, courseName, instructor FROM courses WHERE courseID = ?1",
            params![course_id],
            row_to_course,
        )
        .optional()?;
    Ok(course)
}

/// Remove a course. Registrations for it stay behind and keep pointing at the
/// old course ID.
pub fn delete_course(conn: &Connection, course_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM courses WHERE courseID = ?1",
        params![course_id],
    )?;

    info!(course_id, deleted, "course delete");
    Ok(deleted > 0)
}

/// Point a course at an instructor email, replacing any previous assignment.
/// The email must pass the address check but does not have to belong to a
/// stored instructor.
pub fn assign_instructor(conn: &Connection, course_id: i64, email: &str) -> Result<()> {
    let email = link_email(email)?;

    let updated = conn.execute(
        "UPDATE courses SET instructor = ?1 WHERE courseID = ?2",
        params![email, course_id],
    )?;

    if updated == 0 {
        return Err(Error::NotFound {
            entity: EntityKind::Course,
            id: course_id,
        });
    }

    info!(course_id, email, "instructor assigned");
    Ok(())
}

pub fn unassign_instructor(conn: &Connection, course_id: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE courses SET instructor = NULL WHERE courseID = ?1",
        params![course_id],
    )?;

    if updated == 0 {
        return Err(Error::NotFound {
            entity: EntityKind::Course,
            id: course_id,
        });
    }

    info!(course_id, "instructor unassigned");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::open_in_memory;

    fn intro() -> Course {
        Course::new(101, "Intro to Programming", None).unwrap()
    }

    #[test]
    fn duplicate_course_id_is_rejected() {
        let conn = open_in_memory().unwrap();
        create_course(&conn, intro()).unwrap();

        let err = create_course(&conn, Course::new(101, "Other", None).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            Error::DuplicateKey {
                entity: EntityKind::Course,
                field: Field::CourseId,
                ..
            }
        ));
        assert_eq!(fetch_courses(&conn).unwrap(), vec![intro()]);
    }

    #[test]
    fn courses_load_in_storage_order() {
        let conn = open_in_memory().unwrap();
        let later = Course::new(300, "Compilers", None).unwrap();
        create_course(&conn, later.clone()).unwrap();
        create_course(&conn, intro()).unwrap();

        assert_eq!(fetch_courses(&conn).unwrap(), vec![later, intro()]);
    }

    #[test]
    fn save_and_update_replace_fields() {
        let conn = open_in_memory().unwrap();
        save_course(&conn, &intro()).unwrap();

        let renamed = Course::new(
            101,
            "Programming I",
            Some("i@mail.aub.edu".to_string()),
        )
        .unwrap();
        save_course(&conn, &renamed).unwrap();
        assert_eq!(fetch_course(&conn, 101).unwrap(), Some(renamed));

        update_course(&conn, &intro()).unwrap();
        assert_eq!(fetch_course(&conn, 101).unwrap(), Some(intro()));

        let missing = Course::new(999, "Nope", None).unwrap();
        assert!(matches!(
            update_course(&conn, &missing).unwrap_err(),
            Error::NotFound { id: 999, .. }
        ));
    }

    #[test]
    fn assign_and_unassign_instructor() {
        let conn = open_in_memory().unwrap();
        create_course(&conn, intro()).unwrap();

        assign_instructor(&conn, 101, "i@mail.aub.edu").unwrap();
        let course = fetch_course(&conn, 101).unwrap().unwrap();
        assert_eq!(course.instructor(), Some("i@mail.aub.edu"));

        unassign_instructor(&conn, 101).unwrap();
        let course = fetch_course(&conn, 101).unwrap().unwrap();
        assert_eq!(course.instructor(), None);

        assert!(matches!(
            assign_instructor(&conn, 202, "i@mail.aub.edu").unwrap_err(),
            Error::NotFound { id: 202, .. }
        ));
        assert!(matches!(
            assign_instructor(&conn, 101, "  ").unwrap_err(),
            Error::InvalidField {
                field: Field::Email,
                ..
            }
        ));
    }

    #[test]
    fn delete_is_idempotent() {
        let conn = open_in_memory().unwrap();
        create_course(&conn, intro()).unwrap();
        assert!(delete_course(&conn, 101).unwrap());
        assert!(!delete_course(&conn, 101).unwrap());
        assert!(fetch_courses(&conn).unwrap().is_empty());
    }
}
