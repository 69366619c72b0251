use std::collections::HashSet;

use anyhow::Result;
use rusqlite::Connection;

use crate::db::{
    assign_instructor, available_courses_for_instructor, available_courses_for_student,
    fetch_courses, fetch_instructors, fetch_students, register_student, unassign_instructor,
    unregister_student,
};
use crate::models::Course;
use crate::roster::{
    course_roster, filter_rows, instructor_roster, student_roster, CourseRow, InstructorRow,
    StudentRow,
};

use super::forms::PersonKind;

/// A selectable list backing each entity tab.
pub(crate) struct EntityList<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
}

impl<T> EntityList<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        Self { items, selected: 0 }
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.items.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Swap in freshly queried items, keeping the cursor on the first item that
    /// satisfies `focus` or clamping it into range.
    pub(crate) fn replace(&mut self, items: Vec<T>, focus: impl Fn(&T) -> bool) {
        self.items = items;
        if let Some(index) = self.items.iter().position(focus) {
            self.selected = index;
        } else if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }
}

/// Which side of the register tab has keyboard focus.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) enum RegisterPane {
    People,
    Courses,
}

/// A course plus whether the selected person is already linked to it.
pub(crate) struct CourseChoice {
    pub(crate) course: Course,
    pub(crate) linked: bool,
}

/// State of the register/assign tab: pick a student or instructor by email,
/// then flip course links on and off.
pub(crate) struct RegisterScreen {
    pub(crate) role: PersonKind,
    pub(crate) people: EntityList<String>,
    pub(crate) courses: EntityList<CourseChoice>,
    pub(crate) pane: RegisterPane,
}

impl RegisterScreen {
    pub(crate) fn load(conn: &Connection, role: PersonKind) -> Result<Self> {
        let mut screen = Self {
            role,
            people: EntityList::new(Vec::new()),
            courses: EntityList::new(Vec::new()),
            pane: RegisterPane::People,
        };
        screen.refresh(conn)?;
        Ok(screen)
    }

    pub(crate) fn current_email(&self) -> Option<&str> {
        self.people.current().map(String::as_str)
    }

    /// Re-query people and their course links, keeping the current selections
    /// where they still exist.
    pub(crate) fn refresh(&mut self, conn: &Connection) -> Result<()> {
        let previous = self.current_email().map(str::to_string);
        let emails: Vec<String> = match self.role {
            PersonKind::Student => fetch_students(conn)?
                .iter()
                .map(|student| student.email().to_string())
                .collect(),
            PersonKind::Instructor => fetch_instructors(conn)?
                .iter()
                .map(|instructor| instructor.email().to_string())
                .collect(),
        };
        self.people
            .replace(emails, |email| Some(email) == previous.as_ref());
        self.reload_courses(conn)
    }

    pub(crate) fn reload_courses(&mut self, conn: &Connection) -> Result<()> {
        let previous = self
            .courses
            .current()
            .map(|choice| choice.course.course_id());

        let Some(email) = self.current_email().map(str::to_string) else {
            self.courses.replace(Vec::new(), |_| false);
            return Ok(());
        };

        let available = match self.role {
            PersonKind::Student => available_courses_for_student(conn, &email)?,
            PersonKind::Instructor => available_courses_for_instructor(conn, &email)?,
        };
        let open: HashSet<i64> = available.iter().map(Course::course_id).collect();

        let choices = fetch_courses(conn)?
            .into_iter()
            .map(|course| CourseChoice {
                linked: !open.contains(&course.course_id()),
                course,
            })
            .collect();
        self.courses
            .replace(choices, |choice| Some(choice.course.course_id()) == previous);
        Ok(())
    }

    pub(crate) fn switch_role(&mut self, conn: &Connection) -> Result<()> {
        self.role = match self.role {
            PersonKind::Student => PersonKind::Instructor,
            PersonKind::Instructor => PersonKind::Student,
        };
        self.people = EntityList::new(Vec::new());
        self.pane = RegisterPane::People;
        self.refresh(conn)
    }

    pub(crate) fn move_selection(&mut self, conn: &Connection, delta: isize) -> Result<()> {
        match self.pane {
            RegisterPane::People => {
                self.people.move_selection(delta);
                self.reload_courses(conn)
            }
            RegisterPane::Courses => {
                self.courses.move_selection(delta);
                Ok(())
            }
        }
    }

    /// Flip the link between the selected person and course. Returns a status
    /// message describing what changed, or `None` when nothing is selected.
    pub(crate) fn toggle_current(&mut self, conn: &Connection) -> Result<Option<String>> {
        let Some(email) = self.current_email().map(str::to_string) else {
            return Ok(None);
        };
        let Some(choice) = self.courses.current() else {
            return Ok(None);
        };
        let course_id = choice.course.course_id();
        let course_name = choice.course.course_name().to_string();

        let message = match (self.role, choice.linked) {
            (PersonKind::Student, false) => {
                register_student(conn, &email, course_id)?;
                format!("Registered {email} for {course_name}.")
            }
            (PersonKind::Student, true) => {
                unregister_student(conn, &email, course_id)?;
                format!("Unregistered {email} from {course_name}.")
            }
            (PersonKind::Instructor, false) => {
                assign_instructor(conn, course_id, &email)?;
                format!("Assigned {email} to {course_name}.")
            }
            (PersonKind::Instructor, true) => {
                unassign_instructor(conn, course_id)?;
                format!("Unassigned {email} from {course_name}.")
            }
        };

        self.reload_courses(conn)?;
        Ok(Some(message))
    }
}

/// Entity kind listed on the View All tab.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum RosterKind {
    Students,
    Instructors,
    Courses,
}

impl RosterKind {
    pub(crate) fn title(self) -> &'static str {
        match self {
            RosterKind::Students => "Students",
            RosterKind::Instructors => "Instructors",
            RosterKind::Courses => "Courses",
        }
    }

    fn next(self, forward: bool) -> Self {
        match (self, forward) {
            (RosterKind::Students, true) => RosterKind::Instructors,
            (RosterKind::Instructors, true) => RosterKind::Courses,
            (RosterKind::Courses, true) => RosterKind::Students,
            (RosterKind::Students, false) => RosterKind::Courses,
            (RosterKind::Instructors, false) => RosterKind::Students,
            (RosterKind::Courses, false) => RosterKind::Instructors,
        }
    }
}

/// The read-only "View All" listing with its live search query.
pub(crate) struct ViewAllScreen {
    pub(crate) kind: RosterKind,
    pub(crate) students: Vec<StudentRow>,
    pub(crate) instructors: Vec<InstructorRow>,
    pub(crate) courses: Vec<CourseRow>,
    pub(crate) query: String,
    pub(crate) selected: usize,
}

impl ViewAllScreen {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let mut screen = Self {
            kind: RosterKind::Students,
            students: Vec::new(),
            instructors: Vec::new(),
            courses: Vec::new(),
            query: String::new(),
            selected: 0,
        };
        screen.reload(conn)?;
        Ok(screen)
    }

    pub(crate) fn reload(&mut self, conn: &Connection) -> Result<()> {
        self.students = student_roster(conn)?;
        self.instructors = instructor_roster(conn)?;
        self.courses = course_roster(conn)?;
        self.clamp();
        Ok(())
    }

    pub(crate) fn cycle_kind(&mut self, forward: bool) {
        self.kind = self.kind.next(forward);
        self.selected = 0;
    }

    pub(crate) fn set_query(&mut self, query: String) {
        self.query = query;
        self.clamp();
    }

    pub(crate) fn header(&self) -> &'static str {
        match self.kind {
            RosterKind::Students => "ID      Name                 Age  Email                          Courses",
            RosterKind::Instructors => "ID      Name                 Age  Email                          Courses",
            RosterKind::Courses => "ID      Name                      Instructor                     Students",
        }
    }

    /// Formatted rows that match the current query.
    pub(crate) fn visible_rows(&self) -> Vec<String> {
        match self.kind {
            RosterKind::Students => filter_rows(&self.students, &self.query)
                .into_iter()
                .map(|row| {
                    format!(
                        "{:<7} {:<20} {:<4} {:<30} {}",
                        row.student.student_id(),
                        row.student.name(),
                        row.student.age(),
                        row.student.email(),
                        row.courses
                    )
                })
                .collect(),
            RosterKind::Instructors => filter_rows(&self.instructors, &self.query)
                .into_iter()
                .map(|row| {
                    format!(
                        "{:<7} {:<20} {:<4} {:<30} {}",
                        row.instructor.instructor_id(),
                        row.instructor.name(),
                        row.instructor.age(),
                        row.instructor.email(),
                        row.courses
                    )
                })
                .collect(),
            RosterKind::Courses => filter_rows(&self.courses, &self.query)
                .into_iter()
                .map(|row| {
                    format!(
                        "{:<7} {:<25} {:<30} {}",
                        row.course.course_id(),
                        row.course.course_name(),
                        row.instructor_label(),
                        row.students
                    )
                })
                .collect(),
        }
    }

    pub(crate) fn move_selection(&mut self, delta: isize) {
        let len = self.visible_rows().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    fn clamp(&mut self) {
        let len = self.visible_rows().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}
