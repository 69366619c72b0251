use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;
use tracing::warn;

use crate::db::{
    create_course, create_instructor, create_student, delete_course, delete_instructor,
    delete_student, fetch_courses, fetch_instructors, fetch_students, update_course,
    update_instructor, update_student,
};
use crate::error::EntityKind;
use crate::models::{Course, Instructor, Student};
use crate::validate::ValidationRules;

use super::forms::{ConfirmDelete, CourseForm, PersonForm, PersonKind};
use super::helpers::{centered_rect, key_hints, surface_error};
use super::screens::{EntityList, RegisterPane, RegisterScreen, ViewAllScreen};

/// Footer space reserved for the status message and key hints.
const FOOTER_HEIGHT: u16 = 4;
/// Rows skipped by PageUp/PageDown.
const PAGE: isize = 5;

/// Top-level tabs, in the order shown in the tab bar.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Tab {
    Students,
    Instructors,
    Courses,
    Register,
    ViewAll,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Students,
        Tab::Instructors,
        Tab::Courses,
        Tab::Register,
        Tab::ViewAll,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Students => "Students",
            Tab::Instructors => "Instructors",
            Tab::Courses => "Courses",
            Tab::Register => "Register/Assign",
            Tab::ViewAll => "View All",
        }
    }

    fn index(self) -> usize {
        Tab::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    fn offset(self, delta: isize) -> Tab {
        let len = Tab::ALL.len() as isize;
        let index = (self.index() as isize + delta).rem_euclid(len);
        Tab::ALL[index as usize]
    }
}

/// What the keyboard is currently driving.
enum Mode {
    Normal,
    AddingPerson(PersonForm),
    EditingPerson(PersonForm),
    AddingCourse(CourseForm),
    EditingCourse(CourseForm),
    ConfirmDelete(ConfirmDelete),
    Searching,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Apply a navigation key to a list. Returns `true` when the key was consumed.
fn navigate<T>(list: &mut EntityList<T>, code: KeyCode) -> bool {
    match code {
        KeyCode::Up => list.move_selection(-1),
        KeyCode::Down => list.move_selection(1),
        KeyCode::PageUp => list.move_selection(-PAGE),
        KeyCode::PageDown => list.move_selection(PAGE),
        KeyCode::Home => list.select_first(),
        KeyCode::End => list.select_last(),
        _ => return false,
    }
    true
}

fn person_line(id: i64, name: &str, age: i64, email: &str) -> String {
    format!("{id:<7} {name:<20} {age:<4} {email}")
}

/// Central application state. Every list is re-queried after a write or a tab
/// switch; nothing is cached across actions.
pub struct App {
    conn: Connection,
    rules: ValidationRules,
    tab: Tab,
    students: EntityList<Student>,
    instructors: EntityList<Instructor>,
    courses: EntityList<Course>,
    register: RegisterScreen,
    view_all: ViewAllScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, rules: ValidationRules) -> Result<Self> {
        let students = EntityList::new(fetch_students(&conn)?);
        let instructors = EntityList::new(fetch_instructors(&conn)?);
        let courses = EntityList::new(fetch_courses(&conn)?);
        let register = RegisterScreen::load(&conn, PersonKind::Student)?;
        let view_all = ViewAllScreen::load(&conn)?;

        Ok(Self {
            conn,
            rules,
            tab: Tab::Students,
            students,
            instructors,
            courses,
            register,
            view_all,
            mode: Mode::Normal,
            status: None,
        })
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    /// Failures are reported in the status line instead of ending the session.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let next = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingPerson(form) => self.handle_person_form(code, form, false),
            Mode::EditingPerson(form) => self.handle_person_form(code, form, true),
            Mode::AddingCourse(form) => self.handle_course_form(code, form, false),
            Mode::EditingCourse(form) => self.handle_course_form(code, form, true),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::Searching => self.handle_search(code),
        };

        self.mode = match next {
            Ok(mode) => mode,
            Err(err) => {
                warn!(error = %err, "action failed");
                self.set_status(surface_error(&err), StatusKind::Error);
                Mode::Normal
            }
        };
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Tab => {
                self.switch_tab(self.tab.offset(1))?;
                return Ok(Mode::Normal);
            }
            KeyCode::BackTab => {
                self.switch_tab(self.tab.offset(-1))?;
                return Ok(Mode::Normal);
            }
            KeyCode::Char(ch @ '1'..='5') => {
                let index = ch as usize - '1' as usize;
                self.switch_tab(Tab::ALL[index])?;
                return Ok(Mode::Normal);
            }
            _ => {}
        }

        match self.tab {
            Tab::Students => self.handle_students_key(code),
            Tab::Instructors => self.handle_instructors_key(code),
            Tab::Courses => self.handle_courses_key(code),
            Tab::Register => self.handle_register_key(code),
            Tab::ViewAll => self.handle_view_all_key(code),
        }
    }

    fn handle_students_key(&mut self, code: KeyCode) -> Result<Mode> {
        if navigate(&mut self.students, code) {
            return Ok(Mode::Normal);
        }
        match code {
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingPerson(PersonForm::new(PersonKind::Student)));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(student) = self.students.current() {
                    let form = PersonForm::from_student(student);
                    self.clear_status();
                    return Ok(Mode::EditingPerson(form));
                }
                self.set_status("No student selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(student) = self.students.current() {
                    return Ok(Mode::ConfirmDelete(ConfirmDelete {
                        entity: EntityKind::Student,
                        id: student.student_id(),
                        label: student.to_string(),
                    }));
                }
                self.set_status("No student selected to delete.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_instructors_key(&mut self, code: KeyCode) -> Result<Mode> {
        if navigate(&mut self.instructors, code) {
            return Ok(Mode::Normal);
        }
        match code {
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingPerson(PersonForm::new(PersonKind::Instructor)));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(instructor) = self.instructors.current() {
                    let form = PersonForm::from_instructor(instructor);
                    self.clear_status();
                    return Ok(Mode::EditingPerson(form));
                }
                self.set_status("No instructor selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(instructor) = self.instructors.current() {
                    return Ok(Mode::ConfirmDelete(ConfirmDelete {
                        entity: EntityKind::Instructor,
                        id: instructor.instructor_id(),
                        label: instructor.to_string(),
                    }));
                }
                self.set_status("No instructor selected to delete.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_courses_key(&mut self, code: KeyCode) -> Result<Mode> {
        if navigate(&mut self.courses, code) {
            return Ok(Mode::Normal);
        }
        match code {
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingCourse(CourseForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(course) = self.courses.current() {
                    let form = CourseForm::from_course(course);
                    self.clear_status();
                    return Ok(Mode::EditingCourse(form));
                }
                self.set_status("No course selected to edit.", StatusKind::Error);
            }
            KeyCode::Char('-') | KeyCode::Delete => {
                if let Some(course) = self.courses.current() {
                    return Ok(Mode::ConfirmDelete(ConfirmDelete {
                        entity: EntityKind::Course,
                        id: course.course_id(),
                        label: course.to_string(),
                    }));
                }
                self.set_status("No course selected to delete.", StatusKind::Error);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_register_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Up => self.register.move_selection(&self.conn, -1)?,
            KeyCode::Down => self.register.move_selection(&self.conn, 1)?,
            KeyCode::PageUp => self.register.move_selection(&self.conn, -PAGE)?,
            KeyCode::PageDown => self.register.move_selection(&self.conn, PAGE)?,
            KeyCode::Left => self.register.pane = RegisterPane::People,
            KeyCode::Right => self.register.pane = RegisterPane::Courses,
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.register.switch_role(&self.conn)?;
                self.set_status(
                    format!("Showing {}s.", self.register.role.label().to_lowercase()),
                    StatusKind::Info,
                );
            }
            KeyCode::Enter if self.register.pane == RegisterPane::People => {
                self.register.pane = RegisterPane::Courses;
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                match self.register.toggle_current(&self.conn)? {
                    Some(message) => self.set_status(message, StatusKind::Info),
                    None => self.set_status(
                        "Select a person and a course first.",
                        StatusKind::Error,
                    ),
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_view_all_key(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Left => self.view_all.cycle_kind(false),
            KeyCode::Right => self.view_all.cycle_kind(true),
            KeyCode::Up => self.view_all.move_selection(-1),
            KeyCode::Down => self.view_all.move_selection(1),
            KeyCode::PageUp => self.view_all.move_selection(-PAGE),
            KeyCode::PageDown => self.view_all.move_selection(PAGE),
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.clear_status();
                return Ok(Mode::Searching);
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.view_all.set_query(String::new());
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => self.view_all.move_selection(-1),
            KeyCode::Down => self.view_all.move_selection(1),
            KeyCode::Backspace => {
                let mut query = self.view_all.query.clone();
                query.pop();
                self.view_all.set_query(query);
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                let mut query = self.view_all.query.clone();
                query.push(ch);
                self.view_all.set_query(query);
            }
            _ => {}
        }
        Ok(Mode::Searching)
    }

    fn handle_person_form(
        &mut self,
        code: KeyCode,
        mut form: PersonForm,
        editing: bool,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if editing { "Edit cancelled." } else { "Add cancelled." };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.cycle_field(true),
            KeyCode::BackTab | KeyCode::Up => form.cycle_field(false),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.submit_person(&form, editing) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        Ok(match (keep_open, editing) {
            (false, _) => Mode::Normal,
            (true, true) => Mode::EditingPerson(form),
            (true, false) => Mode::AddingPerson(form),
        })
    }

    fn handle_course_form(
        &mut self,
        code: KeyCode,
        mut form: CourseForm,
        editing: bool,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if editing { "Edit cancelled." } else { "Add cancelled." };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.cycle_field(true),
            KeyCode::BackTab | KeyCode::Up => form.cycle_field(false),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.submit_course(&form, editing) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        Ok(match (keep_open, editing) {
            (false, _) => Mode::Normal,
            (true, true) => Mode::EditingCourse(form),
            (true, false) => Mode::AddingCourse(form),
        })
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    fn submit_person(&mut self, form: &PersonForm, editing: bool) -> Result<()> {
        let verb = if editing { "Updated" } else { "Added" };
        match form.kind {
            PersonKind::Student => {
                let student = form.to_student(&self.rules)?;
                let id = student.student_id();
                if editing {
                    update_student(&self.conn, &student)?;
                } else {
                    create_student(&self.conn, student)?;
                }
                self.reload_students(Some(id))?;
                self.set_status(format!("{verb} student {id}."), StatusKind::Info);
            }
            PersonKind::Instructor => {
                let instructor = form.to_instructor(&self.rules)?;
                let id = instructor.instructor_id();
                if editing {
                    update_instructor(&self.conn, &instructor)?;
                } else {
                    create_instructor(&self.conn, instructor)?;
                }
                self.reload_instructors(Some(id))?;
                self.set_status(format!("{verb} instructor {id}."), StatusKind::Info);
            }
        }
        Ok(())
    }

    fn submit_course(&mut self, form: &CourseForm, editing: bool) -> Result<()> {
        let course = form.to_course()?;
        let id = course.course_id();
        if editing {
            update_course(&self.conn, &course)?;
        } else {
            create_course(&self.conn, course)?;
        }
        self.reload_courses(Some(id))?;
        let verb = if editing { "Updated" } else { "Added" };
        self.set_status(format!("{verb} course {id}."), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmDelete) -> Result<()> {
        let removed = match confirm.entity {
            EntityKind::Student => {
                let removed = delete_student(&self.conn, confirm.id)?;
                self.reload_students(None)?;
                removed
            }
            EntityKind::Instructor => {
                let removed = delete_instructor(&self.conn, confirm.id)?;
                self.reload_instructors(None)?;
                removed
            }
            EntityKind::Course => {
                let removed = delete_course(&self.conn, confirm.id)?;
                self.reload_courses(None)?;
                removed
            }
        };

        if removed {
            self.set_status(format!("Deleted {}.", confirm.label), StatusKind::Info);
        } else {
            self.set_status(
                format!("{} was already removed.", confirm.label),
                StatusKind::Info,
            );
        }
        Ok(())
    }

    fn switch_tab(&mut self, tab: Tab) -> Result<()> {
        self.tab = tab;
        self.clear_status();
        match tab {
            Tab::Students => self.reload_students(None),
            Tab::Instructors => self.reload_instructors(None),
            Tab::Courses => self.reload_courses(None),
            Tab::Register => self.register.refresh(&self.conn),
            Tab::ViewAll => self.view_all.reload(&self.conn),
        }
    }

    fn reload_students(&mut self, focus_id: Option<i64>) -> Result<()> {
        let students = fetch_students(&self.conn)?;
        self.students
            .replace(students, |student| Some(student.student_id()) == focus_id);
        Ok(())
    }

    fn reload_instructors(&mut self, focus_id: Option<i64>) -> Result<()> {
        let instructors = fetch_instructors(&self.conn)?;
        self.instructors.replace(instructors, |instructor| {
            Some(instructor.instructor_id()) == focus_id
        });
        Ok(())
    }

    fn reload_courses(&mut self, focus_id: Option<i64>) -> Result<()> {
        let courses = fetch_courses(&self.conn)?;
        self.courses
            .replace(courses, |course| Some(course.course_id()) == focus_id);
        Ok(())
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tab_bar(frame, chunks[0]);
        match self.tab {
            Tab::Students => {
                let lines = self
                    .students
                    .items
                    .iter()
                    .map(|s| person_line(s.student_id(), s.name(), s.age(), s.email()))
                    .collect();
                render_list(
                    frame,
                    chunks[1],
                    "Students",
                    lines,
                    self.students.selected,
                    "No students yet. Press '+' to add one.",
                );
            }
            Tab::Instructors => {
                let lines = self
                    .instructors
                    .items
                    .iter()
                    .map(|i| person_line(i.instructor_id(), i.name(), i.age(), i.email()))
                    .collect();
                render_list(
                    frame,
                    chunks[1],
                    "Instructors",
                    lines,
                    self.instructors.selected,
                    "No instructors yet. Press '+' to add one.",
                );
            }
            Tab::Courses => {
                let lines = self
                    .courses
                    .items
                    .iter()
                    .map(|c| {
                        format!(
                            "{:<7} {:<25} {}",
                            c.course_id(),
                            c.course_name(),
                            c.instructor().unwrap_or("None")
                        )
                    })
                    .collect();
                render_list(
                    frame,
                    chunks[1],
                    "Courses",
                    lines,
                    self.courses.selected,
                    "No courses yet. Press '+' to add one.",
                );
            }
            Tab::Register => self.draw_register(frame, chunks[1]),
            Tab::ViewAll => self.draw_view_all(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingPerson(form) => {
                let title = format!("Add {}", form.kind.label());
                self.draw_person_form(frame, area, &title, form);
            }
            Mode::EditingPerson(form) => {
                let title = format!("Edit {}", form.kind.label());
                self.draw_person_form(frame, area, &title, form);
            }
            Mode::AddingCourse(form) => self.draw_course_form(frame, area, "Add Course", form),
            Mode::EditingCourse(form) => self.draw_course_form(frame, area, "Edit Course", form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Searching | Mode::Normal => {}
        }
    }

    fn draw_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<String> = Tab::ALL
            .iter()
            .enumerate()
            .map(|(index, tab)| format!("{} {}", index + 1, tab.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("School Manager"),
            )
            .select(self.tab.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_register(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let focused = Style::default().fg(Color::Yellow);
        let people_title = format!("{}s", self.register.role.label());
        let people: Vec<ListItem> = self
            .register
            .people
            .items
            .iter()
            .map(|email| ListItem::new(email.clone()))
            .collect();
        let mut people_block = Block::default().borders(Borders::ALL).title(people_title);
        if self.register.pane == RegisterPane::People {
            people_block = people_block.border_style(focused);
        }
        let people_list = List::new(people)
            .block(people_block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut people_state = ListState::default();
        if !self.register.people.items.is_empty() {
            people_state.select(Some(self.register.people.selected));
        }
        frame.render_stateful_widget(people_list, columns[0], &mut people_state);

        let courses_title = match self.register.current_email() {
            Some(email) => format!("Courses for {email}"),
            None => "Courses".to_string(),
        };
        let courses: Vec<ListItem> = self
            .register
            .courses
            .items
            .iter()
            .map(|choice| {
                let checkbox = if choice.linked { "[x]" } else { "[ ]" };
                ListItem::new(format!("{checkbox} {}", choice.course))
            })
            .collect();
        let mut courses_block = Block::default().borders(Borders::ALL).title(courses_title);
        if self.register.pane == RegisterPane::Courses {
            courses_block = courses_block.border_style(focused);
        }
        let courses_list = List::new(courses)
            .block(courses_block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut courses_state = ListState::default();
        if !self.register.courses.items.is_empty() {
            courses_state.select(Some(self.register.courses.selected));
        }
        frame.render_stateful_widget(courses_list, columns[1], &mut courses_state);
    }

    fn draw_view_all(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let searching = matches!(self.mode, Mode::Searching);
        let search_style = if searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let search_block = Block::default()
            .borders(Borders::ALL)
            .border_style(search_style)
            .title("Search");
        let search = Paragraph::new(format!("Search: {}", self.view_all.query))
            .block(search_block.clone());
        frame.render_widget(search, chunks[0]);
        if searching {
            let inner = search_block.inner(chunks[0]);
            let cursor_x =
                inner.x + "Search: ".len() as u16 + self.view_all.query.chars().count() as u16;
            frame.set_cursor_position((cursor_x, inner.y));
        }

        let rows = self.view_all.visible_rows();
        let title = format!(
            "{} ({} shown)  ◀ ▶ to switch",
            self.view_all.kind.title(),
            rows.len()
        );
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(chunks[1]);
        frame.render_widget(block, chunks[1]);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner);
        let header = Paragraph::new(Span::styled(
            self.view_all.header(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(header, parts[0]);

        if rows.is_empty() {
            let message = Paragraph::new("Nothing matches.").alignment(Alignment::Center);
            frame.render_widget(message, parts[1]);
            return;
        }

        let items: Vec<ListItem> = rows.into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");
        let mut state = ListState::default();
        state.select(Some(self.view_all.selected));
        frame.render_stateful_widget(list, parts[1], &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.mode, self.tab) {
            (Mode::AddingPerson(_) | Mode::EditingPerson(_), _)
            | (Mode::AddingCourse(_) | Mode::EditingCourse(_), _) => key_hints(&[
                ("Tab", "Next field"),
                ("Enter", "Save"),
                ("Esc", "Cancel"),
            ]),
            (Mode::ConfirmDelete(_), _) => key_hints(&[("Y", "Delete"), ("N/Esc", "Keep")]),
            (Mode::Searching, _) => key_hints(&[
                ("Type", "Filter"),
                ("Enter", "Keep filter"),
                ("Esc", "Clear"),
            ]),
            (Mode::Normal, Tab::Register) => key_hints(&[
                ("↑↓", "Navigate"),
                ("←→", "Pane"),
                ("Space", "Toggle link"),
                ("r", "Student/Instructor"),
                ("Tab", "Next tab"),
                ("q", "Quit"),
            ]),
            (Mode::Normal, Tab::ViewAll) => key_hints(&[
                ("←→", "Entity"),
                ("/", "Search"),
                ("Tab", "Next tab"),
                ("q", "Quit"),
            ]),
            (Mode::Normal, _) => key_hints(&[
                ("↑↓", "Navigate"),
                ("+", "Add"),
                ("e", "Edit"),
                ("-", "Delete"),
                ("Tab", "Next tab"),
                ("q", "Quit"),
            ]),
        }
    }

    fn draw_person_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &PersonForm) {
        let mut lines = form.lines();
        let (cursor_x, cursor_y) = form.cursor();
        let inner = draw_form_popup(frame, area, title, &mut lines, form.error.as_deref());
        frame.set_cursor_position((inner.x + cursor_x, inner.y + cursor_y));
    }

    fn draw_course_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &CourseForm) {
        let mut lines = form.lines();
        let (cursor_x, cursor_y) = form.cursor();
        let inner = draw_form_popup(frame, area, title, &mut lines, form.error.as_deref());
        frame.set_cursor_position((inner.x + cursor_x, inner.y + cursor_y));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let note = match confirm.entity {
            EntityKind::Course => "Registrations for this course are kept.",
            _ => "Registrations and course assignments are kept.",
        };
        let lines = vec![
            Line::from(format!("Remove {} {}?", confirm.entity, confirm.label)),
            Line::from(note),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: Vec<String>,
    selected: usize,
    empty_message: &str,
) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    if lines.is_empty() {
        let message = Paragraph::new(empty_message.to_string())
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(message, area);
        return;
    }

    let items: Vec<ListItem> = lines.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(Color::Yellow))
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw a modal form and return the inner area the field lines start in.
fn draw_form_popup(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    lines: &mut Vec<Line<'static>>,
    error: Option<&str>,
) -> Rect {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    lines.push(Line::from(""));
    match error {
        Some(error) => lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Enter to save • Tab to switch • Esc to cancel",
            Style::default().fg(Color::Gray),
        ))),
    }

    let paragraph = Paragraph::new(mem::take(lines)).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
    inner
}
