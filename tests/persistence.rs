use pretty_assertions::assert_eq;
use school_manager::db::{
    course_names_for_student, create_course, create_instructor, create_student, delete_course,
    delete_student, fetch_courses, fetch_registrations, fetch_students, register_student,
    save_student, students_for_course,
};
use school_manager::roster::{course_roster, filter_rows, student_roster};
use school_manager::{
    open_database, AppConfig, Course, EntityKind, Error, Field, Instructor, Student,
};
use tempfile::TempDir;

fn alice() -> Student {
    Student::new("Alice", 20, "alice@mail.aub.edu", 1).unwrap()
}

#[test]
fn end_to_end_registration_flow() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig::in_dir(dir.path());
    let conn = open_database(&config.database_path).unwrap();

    create_student(&conn, alice()).unwrap();
    create_instructor(
        &conn,
        Instructor::new("Grace", 45, "grace@mail.aub.edu", 9).unwrap(),
    )
    .unwrap();
    create_course(
        &conn,
        Course::new(101, "Intro", Some("grace@mail.aub.edu".to_string())).unwrap(),
    )
    .unwrap();
    assert!(register_student(&conn, "alice@mail.aub.edu", 101).unwrap());

    assert_eq!(
        students_for_course(&conn, 101).unwrap(),
        vec!["alice@mail.aub.edu".to_string()]
    );
    assert_eq!(
        course_names_for_student(&conn, "alice@mail.aub.edu").unwrap(),
        vec!["Intro".to_string()]
    );

    let rows = course_roster(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].instructor_label(), "grace@mail.aub.edu");
    assert_eq!(rows[0].students, "alice@mail.aub.edu");
}

#[test]
fn data_survives_reopening_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("school_management.db");

    {
        let conn = open_database(&path).unwrap();
        create_student(&conn, alice()).unwrap();
        create_course(&conn, Course::new(101, "Intro", None).unwrap()).unwrap();
        register_student(&conn, "alice@mail.aub.edu", 101).unwrap();
    }

    let conn = open_database(&path).unwrap();
    assert_eq!(fetch_students(&conn).unwrap(), vec![alice()]);
    assert_eq!(fetch_courses(&conn).unwrap()[0].instructor(), None);
    assert_eq!(fetch_registrations(&conn).unwrap().len(), 1);
}

#[test]
fn rejected_entities_never_reach_storage() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("school.db")).unwrap();

    let err = Student::new("Bob", 20, "bob@gmail.com", 2).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidField {
            field: Field::Email,
            ..
        }
    ));
    assert!(Student::new("   ", 20, "bob@mail.aub.edu", 2).is_err());
    assert!(Student::new("Bob", -1, "bob@mail.aub.edu", 2).is_err());

    assert!(fetch_students(&conn).unwrap().is_empty());
}

#[test]
fn duplicates_are_reported_and_upsert_overwrites() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("school.db")).unwrap();
    create_student(&conn, alice()).unwrap();

    let err = create_student(
        &conn,
        Student::new("Other", 30, "alice@mail.aub.edu", 2).unwrap(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "Student email alice@mail.aub.edu already taken");
    assert!(matches!(
        err,
        Error::DuplicateKey {
            entity: EntityKind::Student,
            field: Field::Email,
            ..
        }
    ));

    let renamed = Student::new("Alice Smith", 21, "alice@mail.aub.edu", 1).unwrap();
    save_student(&conn, &renamed).unwrap();
    assert_eq!(fetch_students(&conn).unwrap(), vec![renamed]);
}

#[test]
fn deleting_missing_rows_is_a_no_op() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("school.db")).unwrap();
    create_student(&conn, alice()).unwrap();

    assert!(!delete_student(&conn, 99).unwrap());
    assert!(!delete_course(&conn, 99).unwrap());
    assert_eq!(fetch_students(&conn).unwrap().len(), 1);
}

#[test]
fn stale_registrations_stay_visible_in_the_roster() {
    let dir = TempDir::new().unwrap();
    let conn = open_database(&dir.path().join("school.db")).unwrap();
    create_student(&conn, alice()).unwrap();
    create_course(&conn, Course::new(101, "Intro", None).unwrap()).unwrap();
    create_course(&conn, Course::new(202, "Databases", None).unwrap()).unwrap();
    register_student(&conn, "alice@mail.aub.edu", 101).unwrap();
    register_student(&conn, "alice@mail.aub.edu", 202).unwrap();

    delete_course(&conn, 101).unwrap();
    assert_eq!(fetch_registrations(&conn).unwrap().len(), 2);

    let rows = student_roster(&conn).unwrap();
    assert_eq!(rows[0].courses, "Databases");
    assert_eq!(filter_rows(&rows, "DATA").len(), 1);
    assert!(filter_rows(&rows, "Intro").is_empty());
}
