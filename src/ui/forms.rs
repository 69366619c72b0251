use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::error::EntityKind;
use crate::models::{Course, Instructor, Student};
use crate::validate::ValidationRules;

/// Which person table a [`PersonForm`] writes to.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum PersonKind {
    Student,
    Instructor,
}

impl PersonKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            PersonKind::Student => "Student",
            PersonKind::Instructor => "Instructor",
        }
    }
}

/// Render one `Label: value` line, highlighting the focused field.
fn field_line(label: &str, value: &str, is_active: bool, required: bool) -> Line<'static> {
    let placeholder = if required { "<required>" } else { "<optional>" };
    let display = if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(display, style),
    ])
}

fn parse_number(raw: &str, what: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(anyhow!("{what} is required."));
    }
    raw.parse::<i64>()
        .map_err(|_| anyhow!("{what} must be a whole number."))
}

/// Fields of the student/instructor form, in display order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum PersonField {
    #[default]
    Name,
    Age,
    Email,
    Id,
}

impl PersonField {
    const ORDER: [PersonField; 4] = [
        PersonField::Name,
        PersonField::Age,
        PersonField::Email,
        PersonField::Id,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            PersonField::Name => "Name",
            PersonField::Age => "Age",
            PersonField::Email => "Email",
            PersonField::Id => "ID",
        }
    }
}

/// Form state shared by the student and instructor tabs. When editing, the ID
/// is locked because it identifies the row being rewritten.
#[derive(Clone, Debug)]
pub(crate) struct PersonForm {
    pub(crate) kind: PersonKind,
    pub(crate) name: String,
    pub(crate) age: String,
    pub(crate) email: String,
    pub(crate) id: String,
    pub(crate) id_locked: bool,
    pub(crate) active: PersonField,
    pub(crate) error: Option<String>,
}

impl PersonForm {
    pub(crate) fn new(kind: PersonKind) -> Self {
        Self {
            kind,
            name: String::new(),
            age: String::new(),
            email: String::new(),
            id: String::new(),
            id_locked: false,
            active: PersonField::Name,
            error: None,
        }
    }

    pub(crate) fn from_student(student: &Student) -> Self {
        Self {
            name: student.name().to_string(),
            age: student.age().to_string(),
            email: student.email().to_string(),
            id: student.student_id().to_string(),
            id_locked: true,
            ..Self::new(PersonKind::Student)
        }
    }

    pub(crate) fn from_instructor(instructor: &Instructor) -> Self {
        Self {
            name: instructor.name().to_string(),
            age: instructor.age().to_string(),
            email: instructor.email().to_string(),
            id: instructor.instructor_id().to_string(),
            id_locked: true,
            ..Self::new(PersonKind::Instructor)
        }
    }

    fn editable_fields(&self) -> Vec<PersonField> {
        PersonField::ORDER
            .into_iter()
            .filter(|field| !(self.id_locked && *field == PersonField::Id))
            .collect()
    }

    /// Move focus forward (or backward) through the editable fields.
    pub(crate) fn cycle_field(&mut self, forward: bool) {
        let fields = self.editable_fields();
        let current = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.active = fields[next];
    }

    fn active_value(&mut self) -> &mut String {
        match self.active {
            PersonField::Name => &mut self.name,
            PersonField::Age => &mut self.age,
            PersonField::Email => &mut self.email,
            PersonField::Id => &mut self.id,
        }
    }

    /// Append a character to the active field. Age and ID only take digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let numeric = matches!(self.active, PersonField::Age | PersonField::Id);
        let accepted = if numeric {
            ch.is_ascii_digit()
        } else {
            !ch.is_control()
        };
        if accepted {
            self.active_value().push(ch);
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) {
        self.active_value().pop();
    }

    fn parse_numbers(&self) -> Result<(i64, i64)> {
        let age = parse_number(&self.age, "Age")?;
        let id = parse_number(&self.id, &format!("{} ID", self.kind.label()))?;
        Ok((age, id))
    }

    pub(crate) fn to_student(&self, rules: &ValidationRules) -> Result<Student> {
        let (age, id) = self.parse_numbers()?;
        Ok(Student::with_rules(rules, &self.name, age, &self.email, id)?)
    }

    pub(crate) fn to_instructor(&self, rules: &ValidationRules) -> Result<Instructor> {
        let (age, id) = self.parse_numbers()?;
        Ok(Instructor::with_rules(rules, &self.name, age, &self.email, id)?)
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        PersonField::ORDER
            .into_iter()
            .map(|field| {
                let value = match field {
                    PersonField::Name => &self.name,
                    PersonField::Age => &self.age,
                    PersonField::Email => &self.email,
                    PersonField::Id => &self.id,
                };
                let label = if field == PersonField::Id && self.id_locked {
                    "ID (fixed)"
                } else {
                    field.label()
                };
                field_line(label, value, self.active == field, true)
            })
            .collect()
    }

    /// Cursor offset `(column, row)` of the active field inside the form body.
    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = PersonField::ORDER
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        let (label, value) = match self.active {
            PersonField::Name => ("Name", &self.name),
            PersonField::Age => ("Age", &self.age),
            PersonField::Email => ("Email", &self.email),
            PersonField::Id => ("ID", &self.id),
        };
        (
            (label.len() + 2 + value.chars().count()) as u16,
            row as u16,
        )
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum CourseField {
    #[default]
    Id,
    Name,
    Instructor,
}

impl CourseField {
    const ORDER: [CourseField; 3] = [CourseField::Id, CourseField::Name, CourseField::Instructor];

    fn label(self) -> &'static str {
        match self {
            CourseField::Id => "Course ID",
            CourseField::Name => "Name",
            CourseField::Instructor => "Instructor email",
        }
    }
}

/// Form state for creating or editing a course.
#[derive(Clone, Debug, Default)]
pub(crate) struct CourseForm {
    pub(crate) course_id: String,
    pub(crate) name: String,
    pub(crate) instructor: String,
    pub(crate) id_locked: bool,
    pub(crate) active: CourseField,
    pub(crate) error: Option<String>,
}

impl CourseForm {
    pub(crate) fn from_course(course: &Course) -> Self {
        Self {
            course_id: course.course_id().to_string(),
            name: course.course_name().to_string(),
            instructor: course.instructor().unwrap_or_default().to_string(),
            id_locked: true,
            active: CourseField::Name,
            error: None,
        }
    }

    pub(crate) fn cycle_field(&mut self, forward: bool) {
        let fields: Vec<CourseField> = CourseField::ORDER
            .into_iter()
            .filter(|field| !(self.id_locked && *field == CourseField::Id))
            .collect();
        let current = fields
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.active = fields[next];
    }

    fn active_value(&mut self) -> &mut String {
        match self.active {
            CourseField::Id => &mut self.course_id,
            CourseField::Name => &mut self.name,
            CourseField::Instructor => &mut self.instructor,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let accepted = match self.active {
            CourseField::Id => ch.is_ascii_digit(),
            _ => !ch.is_control(),
        };
        if accepted {
            self.active_value().push(ch);
        }
        accepted
    }

    pub(crate) fn backspace(&mut self) {
        self.active_value().pop();
    }

    pub(crate) fn to_course(&self) -> Result<Course> {
        let course_id = parse_number(&self.course_id, "Course ID")?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Course name is required."));
        }
        let instructor = Some(self.instructor.trim().to_string());
        Ok(Course::new(course_id, name, instructor)?)
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        CourseField::ORDER
            .into_iter()
            .map(|field| {
                let value = match field {
                    CourseField::Id => &self.course_id,
                    CourseField::Name => &self.name,
                    CourseField::Instructor => &self.instructor,
                };
                field_line(
                    field.label(),
                    value,
                    self.active == field,
                    field != CourseField::Instructor,
                )
            })
            .collect()
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = CourseField::ORDER
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        let value = match self.active {
            CourseField::Id => &self.course_id,
            CourseField::Name => &self.name,
            CourseField::Instructor => &self.instructor,
        };
        (
            (self.active.label().len() + 2 + value.chars().count()) as u16,
            row as u16,
        )
    }
}

/// Pending deletion awaiting a Y/N answer.
#[derive(Clone, Debug)]
pub(crate) struct ConfirmDelete {
    pub(crate) entity: EntityKind,
    pub(crate) id: i64,
    pub(crate) label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(form: &mut PersonForm, text: &str) {
        for ch in text.chars() {
            form.push_char(ch);
        }
    }

    #[test]
    fn person_form_builds_student() {
        let mut form = PersonForm::new(PersonKind::Student);
        typed(&mut form, "Alice");
        form.cycle_field(true);
        typed(&mut form, "2x0");
        form.cycle_field(true);
        typed(&mut form, "alice@mail.aub.edu");
        form.cycle_field(true);
        typed(&mut form, "1");

        assert_eq!(form.age, "20");
        let student = form.to_student(&ValidationRules::default()).unwrap();
        assert_eq!(student.name(), "Alice");
        assert_eq!(student.student_id(), 1);
    }

    #[test]
    fn missing_numbers_are_reported() {
        let mut form = PersonForm::new(PersonKind::Instructor);
        form.name = "Grace".to_string();
        form.email = "grace@mail.aub.edu".to_string();
        form.age = "45".to_string();
        let err = form.to_instructor(&ValidationRules::default()).unwrap_err();
        assert_eq!(err.to_string(), "Instructor ID is required.");
    }

    #[test]
    fn validation_errors_pass_through() {
        let mut form = PersonForm::new(PersonKind::Student);
        form.name = "Alice".to_string();
        form.age = "0".to_string();
        form.email = "alice@mail.aub.edu".to_string();
        form.id = "1".to_string();
        let err = form.to_student(&ValidationRules::default()).unwrap_err();
        assert!(err.downcast_ref::<crate::Error>().is_some());
    }

    #[test]
    fn locked_id_is_skipped_when_cycling() {
        let student = Student::new("Alice", 20, "alice@mail.aub.edu", 1).unwrap();
        let mut form = PersonForm::from_student(&student);
        for _ in 0..6 {
            form.cycle_field(true);
            assert_ne!(form.active, PersonField::Id);
        }
        form.cycle_field(false);
        assert_ne!(form.active, PersonField::Id);
    }

    #[test]
    fn course_form_treats_blank_instructor_as_unassigned() {
        let form = CourseForm {
            course_id: "101".to_string(),
            name: "Intro".to_string(),
            instructor: "   ".to_string(),
            ..CourseForm::default()
        };
        let course = form.to_course().unwrap();
        assert_eq!(course.course_id(), 101);
        assert_eq!(course.instructor(), None);

        let unnamed = CourseForm {
            course_id: "101".to_string(),
            ..CourseForm::default()
        };
        assert!(unnamed.to_course().is_err());
    }
}
