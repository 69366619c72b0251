use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{map_unique_constraint, row_exists, UniqueKey};
use crate::error::{EntityKind, Error, Field, Result};
use crate::models::Student;

fn row_to_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student::from_storage(
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
    ))
}

fn unique_keys(student: &Student) -> [UniqueKey; 2] {
    [
        UniqueKey::new("studentID", Field::StudentId, student.student_id()),
        UniqueKey::new("email", Field::Email, student.email()),
    ]
}

/// Insert a brand new student. The ID is checked before the email so the
/// reported collision is deterministic when both are taken.
pub fn create_student(conn: &Connection, student: Student) -> Result<Student> {
    let tx = conn.unchecked_transaction()?;

    if row_exists(
        &tx,
        "SELECT 1 FROM students WHERE studentID = ?1",
        params![student.student_id()],
    )? {
        return Err(Error::duplicate(
            EntityKind::Student,
            Field::StudentId,
            student.student_id(),
        ));
    }

    if row_exists(
        &tx,
        "SELECT 1 FROM students WHERE email = ?1",
        params![student.email()],
    )? {
        return Err(Error::duplicate(
            EntityKind::Student,
            Field::Email,
            student.email(),
        ));
    }

    tx.execute(
        "INSERT INTO students (name, age, email, studentID) VALUES (?1, ?2, ?3, ?4)",
        params![
            student.name(),
            student.age(),
            student.email(),
            student.student_id()
        ],
    )
    .map_err(|err| map_unique_constraint(err, EntityKind::Student, &unique_keys(&student)))?;
    tx.commit()?;

    info!(
        student_id = student.student_id(),
        email = student.email(),
        "student created"
    );
    Ok(student)
}

/// Write the student's current values, replacing the row with the same
/// student ID or inserting one. Email uniqueness is left to the schema.
pub fn save_student(conn: &Connection, student: &Student) -> Result<()> {
    conn.execute(
        "INSERT INTO students (name, age, email, studentID) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(studentID) DO UPDATE SET
             name = excluded.name,
             age = excluded.age,
             email = excluded.email",
        params![
            student.name(),
            student.age(),
            student.email(),
            student.student_id()
        ],
    )
    .map_err(|err| map_unique_constraint(err, EntityKind::Student, &unique_keys(student)))?;

    debug!(student_id = student.student_id(), "student saved");
    Ok(())
}

/// Edit an existing student. Rejects an email already owned by a different
/// student and reports `NotFound` when the ID has no row. A changed email is
/// carried over to the student's registrations in the same transaction.
pub fn update_student(conn: &Connection, student: &Student) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    if row_exists(
        &tx,
        "SELECT 1 FROM students WHERE email = ?1 AND studentID != ?2",
        params![student.email(), student.student_id()],
    )? {
        return Err(Error::duplicate(
            EntityKind::Student,
            Field::Email,
            student.email(),
        ));
    }

    let previous_email: String = tx
        .query_row(
            "SELECT email FROM students WHERE studentID = ?1",
            params![student.student_id()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(Error::NotFound {
            entity: EntityKind::Student,
            id: student.student_id(),
        })?;

    tx.execute(
        "UPDATE students SET name = ?1, age = ?2, email = ?3 WHERE studentID = ?4",
        params![
            student.name(),
            student.age(),
            student.email(),
            student.student_id()
        ],
    )
    .map_err(|err| map_unique_constraint(err, EntityKind::Student, &unique_keys(student)))?;

    let mut moved = 0;
    if previous_email != student.email() {
        moved = tx.execute(
            "UPDATE registrations SET studentEmail = ?1 WHERE studentEmail = ?2",
            params![student.email(), previous_email],
        )?;
    }

    tx.commit()?;
    debug!(
        student_id = student.student_id(),
        registrations_moved = moved,
        "student updated"
    );
    Ok(())
}

/// Every student in storage order.
pub fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    let mut stmt =
        conn.prepare("SELECT name, age, email, studentID FROM students ORDER BY id")?;

    let students = stmt
        .query_map([], row_to_student)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(students)
}

pub fn fetch_student(conn: &Connection, student_id: i64) -> Result<Option<Student>> {
    let student = conn
        .query_row(
            "SELECT name, age, email, studentID FROM students WHERE studentID = ?1",
            params![student_id],
            row_to_student,
        )
        .optional()?;
    Ok(student)
}

pub fn find_student_by_email(conn: &Connection, email: &str) -> Result<Option<Student>> {
    let student = conn
        .query_row(
            "SELECT name, age, email, studentID FROM students WHERE email = ?1",
            params![email],
            row_to_student,
        )
        .optional()?;
    Ok(student)
}

/// Remove a student row. Missing IDs are not an error; the return value says
/// whether anything was deleted. Registrations keyed by the student's email
/// are left in place.
pub fn delete_student(conn: &Connection, student_id: i64) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM students WHERE studentID = ?1",
        params![student_id],
    )?;

    info!(student_id, deleted, "student delete");
    Ok(deleted > 0)
}
