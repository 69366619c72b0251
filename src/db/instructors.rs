use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{map_unique_constraint, row_exists, UniqueKey};
use crate::error::{EntityKind, Error, Field, Result};
use crate::models::Instructor;

fn row_to_instructor(row: &Row<'_>) -> rusqlite::Result<Instructor> {
    Ok(Instructor::from_storage(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
    ))
}

fn unique_keys(instructor: &Instructor) -> [UniqueKey; 2] {
    [
        UniqueKey::new("instructorID", Field::InstructorId, instructor.instructor_id()),
        UniqueKey::new("email", Field::Email, instructor.email()),
    ]
}

/// Insert a new instructor after checking the ID, then the email, for
/// collisions.
pub fn create_instructor(conn: &Connection, instructor: Instructor) -> Result<Instructor> {
    let tx = conn.unchecked_transaction()?;

    if row_exists(
        &tx,
        "SELECT 1 FROM instructors WHERE instructorID = ?1",
        params![instructor.instructor_id()],
    )? {
        return Err(Error::duplicate(
            EntityKind::Instructor,
            Field::InstructorId,
            instructor.instructor_id(),
        ));
    }

    if row_exists(
        &tx,
        "SELECT 1 FROM instructors WHERE email = ?1",
        params![instructor.email()],
    )? {
        return Err(Error::duplicate(
            EntityKind::Instructor,
            Field::Email,
            instructor.email(),
        ));
    }

    tx.execute(
        "INSERT INTO instructors (name, age, email, instructorID) VALUES (?1, ?2, ?3, ?4)",
        params![
            instructor.name(),
            instructor.age(),
            instructor.email(),
            instructor.instructor_id()
        ],
    )
    .map_err(|err| map_unique_constraint(err, EntityKind::Instructor, &unique_keys(&instructor)))?;
    tx.commit()?;

    info!(
        instructor_id = instructor.instructor_id(),
        email = instructor.email(),
        "instructor created"
    );
    Ok(instructor)
}

/// Upsert keyed on `instructorID`.
pub fn save_instructor(conn: &Connection, instructor: &Instructor) -> Result<()> {
    conn.execute(
        "INSERT INTO instructors (name, age, email, instructorID) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(instructorID) DO UPDATE SET
             name = excluded.name,
             age = excluded.age,
             email = excluded.email",
        params![
            instructor.name(),
            instructor.age(),
            instructor.email(),
            instructor.instructor_id()
        ],
    )
    .map_err(|err| map_unique_constraint(err, EntityKind::Instructor, &unique_keys(instructor)))?;

    debug!(instructor_id = instructor.instructor_id(), "instructor saved");
    Ok(())
}

/// Edit path used by the instructors tab; same rules as `update_student`. A
/// changed email follows the instructor onto every course assigned to them.
pub fn update_instructor(conn: &Connection, instructor: &Instructor) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    if row_exists(
        &tx,
        "SELECT 1 FROM instructors WHERE email = ?1 AND instructorID != ?2",
        params![instructor.email(), instructor.instructor_id()],
    )? {
        return Err(Error::duplicate(
            EntityKind::Instructor,
            Field::Email,
            instructor.email(),
        ));
    }

    let previous_email: String = tx
        .query_row(
            "SELECT email FROM instructors WHERE instructorID = ?1",
            params![instructor.instructor_id()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::NotFound {
            entity: EntityKind::Instructor,
            id: instructor.instructor_id(),
        })?;

    tx.execute(
        "UPDATE instructors SET name = ?1, age = ?2, email = ?3 WHERE instructorID = ?4",
        params![
            instructor.name(),
            instructor.age(),
            instructor.email(),
            instructor.instructor_id()
        ],
    )
    .map_err(|err| map_unique_constraint(err, EntityKind::Instructor, &unique_keys(instructor)))?;

    let mut moved = 0;
    if previous_email != instructor.email() {
        moved = tx.execute(
            "UPDATE courses SET instructor = ?1 WHERE instructor = ?2",
            params![instructor.email(), previous_email],
        )?;
    }

    tx.commit()?;
    debug!(
        instructor_id = instructor.instructor_id(),
        courses_moved = moved,
        "instructor updated"
    );
    Ok(())
}

pub fn fetch_instructors(conn: &Connection) -> Result<Vec<Instructor>> {
    let mut stmt =
        conn.prepare("SELECT name, age, email, instructorID FROM instructors ORDER BY id")?;

    let instructors = stmt
        .query_map([], row_to_instructor)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(instructors)
}

pub fn fetch_instructor(conn: &Connection, instructor_id: i64) -> Result<Option<Instructor>> {
    let instructor = conn
        .query_row(
            "SELECT name, age, email, instructorID FROM instructors WHERE instructorID = ?1",
            params![instructor_id],
            row_to_instructor,
        )
        .optional()?;
    Ok(instructor)
}

pub fn find_instructor_by_email(conn: &Connection, email: &str) -> Result<Option<Instructor>> {
    let instructor = conn
        .query_row(
            "SELECT name, age, email, instructorID FROM instructors WHERE email = ?1",
            params![email],
            row_to_instructor,
        )
        .optional()?;
    Ok(instructor)
}

/// Remove an instructor row, returning whether one existed. Courses that name
/// the instructor keep the email.
pub fn delete_instructor(conn: &Connection, instructor_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM instructors WHERE instructorID = ?1",
        params![instructor_id],
    )?;

    info!(instructor_id, deleted, "instructor delete");
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    fn grace() -> Instructor {
        Instructor::new("Grace", 45, "grace@mail.aub.edu", 7).unwrap()
    }

    #[test]
    fn email_change_follows_course_assignments() {
        use crate::db::{assign_instructor, courses_for_instructor, create_course};
        use crate::models::Course;

        let conn = open_in_memory().unwrap();
        create_instructor(&conn, grace()).unwrap();
        create_course(&conn, Course::new(101, "Intro", None).unwrap()).unwrap();
        create_course(
            &conn,
            Course::new(202, "Databases", Some("other@mail.aub.edu".to_string())).unwrap(),
        )
        .unwrap();
        assign_instructor(&conn, 101, "grace@mail.aub.edu").unwrap();

        let moved = Instructor::new("Grace", 45, "grace.h@mail.aub.edu", 7).unwrap();
        update_instructor(&conn, &moved).unwrap();

        assert_eq!(
            courses_for_instructor(&conn, "grace.h@mail.aub.edu").unwrap(),
            vec![101]
        );
        assert!(courses_for_instructor(&conn, "grace@mail.aub.edu")
            .unwrap()
            .is_empty());
        assert_eq!(
            courses_for_instructor(&conn, "other@mail.aub.edu").unwrap(),
            vec![202]
        );
    }

    #[test]
    fn create_rejects_taken_id_and_email() {
        let conn = open_in_memory().unwrap();
        create_instructor(&conn, grace()).unwrap();

        let same_id = Instructor::new("Other", 50, "other@mail.aub.edu", 7).unwrap();
        assert!(matches!(
            create_instructor(&conn, same_id).unwrap_err(),
            Error::DuplicateKey {
                entity: EntityKind::Instructor,
                field: Field::InstructorId,
                ..
            }
        ));

        let same_email = Instructor::new("Other", 50, "grace@mail.aub.edu", 8).unwrap();
        assert!(matches!(
            create_instructor(&conn, same_email).unwrap_err(),
            Error::DuplicateKey {
                field: Field::Email,
                ..
            }
        ));

        assert_eq!(fetch_instructors(&conn).unwrap(), vec![grace()]);
    }

    #[test]
    fn students_and_instructors_have_separate_email_spaces() {
        let conn = open_in_memory().unwrap();
        crate::db::create_student(
            &conn,
            crate::models::Student::new("Grace", 20, "grace@mail.aub.edu", 7).unwrap(),
        )
        .unwrap();
        create_instructor(&conn, grace()).unwrap();
        assert_eq!(fetch_instructors(&conn).unwrap().len(), 1);
    }

    #[test]
    fn save_update_and_delete() {
        let conn = open_in_memory().unwrap();
        save_instructor(&conn, &grace()).unwrap();

        let edited = Instructor::new("Grace H", 46, "grace@mail.aub.edu", 7).unwrap();
        update_instructor(&conn, &edited).unwrap();
        assert_eq!(fetch_instructor(&conn, 7).unwrap(), Some(edited.clone()));
        assert_eq!(
            find_instructor_by_email(&conn, "grace@mail.aub.edu").unwrap(),
            Some(edited)
        );

        assert!(delete_instructor(&conn, 7).unwrap());
        assert!(!delete_instructor(&conn, 7).unwrap());
        assert!(fetch_instructors(&conn).unwrap().is_empty());
    }
}
