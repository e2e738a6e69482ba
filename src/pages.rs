//! Per-entity list pages: column sets and the business filters each page
//! applies before handing records to [`ListView`](crate::listing::ListView).

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use clap::ValueEnum;

use crate::listing::{Column, ListView, Rendered, Tone};
use crate::models::{
    Contact, Department, Priority, Role, Task, TaskStatus, TaskSubmission, Team, User, NONE_MARKER,
};

/// Option that clears a multi-select.
pub const ALL: &str = "All";

/// Checkbox group where selecting `All` clears the selection and an empty
/// selection matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiSelect {
    selected: Vec<String>,
}

impl MultiSelect {
    pub fn of<I, S>(values: I) -> MultiSelect
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut m = MultiSelect::default();
        for v in values {
            m.toggle(v.as_ref());
        }
        m
    }

    pub fn toggle(&mut self, option: &str) {
        if option == ALL {
            self.selected.clear();
        } else if let Some(pos) = self.selected.iter().position(|s| s == option) {
            self.selected.remove(pos);
        } else {
            self.selected.push(option.to_string());
        }
    }

    pub fn is_selected(&self, option: &str) -> bool {
        if option == ALL {
            self.selected.is_empty()
        } else {
            self.selected.iter().any(|s| s == option)
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn matches(&self, value: &str) -> bool {
        self.selected.is_empty() || self.selected.iter().any(|s| s == value)
    }
}

/// Relative date ranges offered by the deadline and created-at filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DateWindow {
    #[default]
    AnyDate,
    Today,
    Past7Days,
    ThisMonth,
    ThisYear,
}

impl DateWindow {
    /// Whether `date` falls in the window; an unknown date only matches `AnyDate`.
    pub fn matches(self, date: Option<NaiveDate>, today: NaiveDate) -> bool {
        let date = match (self, date) {
            (DateWindow::AnyDate, _) => return true,
            (_, None) => return false,
            (_, Some(d)) => d,
        };
        match self {
            DateWindow::AnyDate => true,
            DateWindow::Today => date == today,
            DateWindow::Past7Days => date <= today && date > today - Duration::days(7),
            DateWindow::ThisMonth => date.year() == today.year() && date.month() == today.month(),
            DateWindow::ThisYear => date.year() == today.year(),
        }
    }
}

/// Calendar date of an ISO timestamp, with or without offset.
pub fn timestamp_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        NONE_MARKER
    } else {
        s
    }
}

/// `All` followed by the sorted distinct values.
fn options_with_all<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::new();
    for v in values {
        if v != ALL && !distinct.iter().any(|d| d == v) {
            distinct.push(v.to_string());
        }
    }
    distinct.sort();
    let mut out = vec![ALL.to_string()];
    out.extend(distinct);
    out
}

/// `All`, the sorted real values, then `-` for unset.
fn options_with_none<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out = options_with_all(values.filter(|v| !v.is_empty() && *v != NONE_MARKER));
    out.push(NONE_MARKER.to_string());
    out
}

// Departments

pub fn department_columns() -> Vec<Column<Department>> {
    vec![
        Column::rendered("Department Name", "name", |d: &Department| Rendered::new(d.name.clone(), Tone::Strong)),
        Column::rendered("Parent Department", "parent", |d: &Department| {
            if d.has_parent() {
                Rendered::new(d.parent.clone(), Tone::Info)
            } else {
                Rendered::new(NONE_MARKER, Tone::Muted)
            }
        }),
        Column::new("Main Branch", "main_branch"),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct DepartmentFilters {
    pub parents: MultiSelect,
}

impl DepartmentFilters {
    pub fn matches(&self, d: &Department) -> bool {
        self.parents.matches(or_dash(&d.parent))
    }

    pub fn reset(&mut self) {
        self.parents.clear();
    }
}

/// Parent filter options: every parent value currently in use.
pub fn parent_filter_options(departments: &[Department]) -> Vec<String> {
    options_with_all(departments.iter().map(|d| or_dash(&d.parent)))
}

// Roles

fn yes_no(flag: bool) -> Rendered {
    if flag {
        Rendered::new("Yes", Tone::Good)
    } else {
        Rendered::new("No", Tone::Muted)
    }
}

pub fn role_columns() -> Vec<Column<Role>> {
    vec![
        Column::rendered("Name", "name", |r: &Role| Rendered::new(r.name.clone(), Tone::Strong)),
        Column::rendered("Description", "description", |r: &Role| Rendered::or_dash(&r.description, Tone::Muted)),
        Column::rendered("All Tasks", "canViewAllTasks", |r: &Role| yes_no(r.can_view_all_tasks)),
        Column::rendered("All Teams", "canViewAllTeams", |r: &Role| yes_no(r.can_view_all_teams)),
        Column::rendered("Team Lead", "isTeamLeadRole", |r: &Role| yes_no(r.is_team_lead_role)),
    ]
}

// Users

pub fn user_columns() -> Vec<Column<User>> {
    vec![
        Column::rendered("USERNAME", "username", |u: &User| Rendered::new(u.username.clone(), Tone::Info)),
        Column::rendered("ROLE", "role", |u: &User| Rendered::or_dash(&u.role, Tone::Plain)),
        Column::rendered("DEPARTMENT", "department", |u: &User| Rendered::or_dash(&u.department, Tone::Plain)),
        Column::rendered("STAFF STATUS", "staff_status", |u: &User| {
            if u.staff_status {
                Rendered::new("✓", Tone::Good)
            } else {
                Rendered::new("✗", Tone::Bad)
            }
        }),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct UserFilters {
    pub roles: MultiSelect,
    pub departments: MultiSelect,
    /// `Yes` and/or `No`.
    pub staff_status: MultiSelect,
}

impl UserFilters {
    pub fn matches(&self, u: &User) -> bool {
        let staff = if u.staff_status { "Yes" } else { "No" };
        self.roles.matches(or_dash(&u.role))
            && self.departments.matches(or_dash(&u.department))
            && self.staff_status.matches(staff)
    }

    pub fn reset(&mut self) {
        self.roles.clear();
        self.departments.clear();
        self.staff_status.clear();
    }
}

pub fn role_filter_options(users: &[User]) -> Vec<String> {
    options_with_none(users.iter().map(|u| u.role.as_str()))
}

pub fn department_filter_options(users: &[User]) -> Vec<String> {
    options_with_none(users.iter().map(|u| u.department.as_str()))
}

pub const STAFF_STATUS_OPTIONS: [&str; 3] = [ALL, "Yes", "No"];

// Teams

pub fn team_columns() -> Vec<Column<Team>> {
    vec![
        Column::rendered("NAME", "name", |t: &Team| Rendered::new(t.name.clone(), Tone::Info)),
        Column::rendered("DEPARTMENT", "department", |t: &Team| Rendered::or_dash(&t.department, Tone::Plain)),
        Column::rendered("LEAD", "lead", |t: &Team| Rendered::or_dash(&t.lead, Tone::Plain)),
        Column::rendered("MEMBERS", "members", |t: &Team| Rendered::plain(t.members.len().to_string())),
    ]
}

// Tasks

fn priority_tone(p: Priority) -> Tone {
    match p {
        Priority::Critical => Tone::Bad,
        Priority::High => Tone::Warn,
        Priority::Medium => Tone::Info,
        Priority::Low => Tone::Good,
    }
}

fn status_tone(s: TaskStatus) -> Tone {
    match s {
        TaskStatus::Completed => Tone::Good,
        TaskStatus::InProgress => Tone::Info,
        TaskStatus::Pending => Tone::Warn,
        TaskStatus::Overdue => Tone::Bad,
    }
}

/// `Jan 20, 2026`
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => NONE_MARKER.into(),
    }
}

/// `Jan 17 2026 10:47 AM`
pub fn format_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%b %-d %Y %-I:%M %p").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%b %-d %Y %-I:%M %p").to_string();
    }
    or_dash(raw).to_string()
}

pub fn task_columns() -> Vec<Column<Task>> {
    vec![
        Column::rendered("TITLE", "title", |t: &Task| Rendered::new(t.title.clone(), Tone::Info)),
        Column::rendered("ASSIGNED TO", "assigned_to", |t: &Task| Rendered::or_dash(&t.assigned_to, Tone::Plain)),
        Column::rendered("PRIORITY", "priority", |t: &Task| Rendered::new(t.priority.to_string(), priority_tone(t.priority))),
        Column::rendered("STATUS", "status", |t: &Task| Rendered::new(t.status.to_string(), status_tone(t.status))),
        Column::rendered("DEADLINE", "deadline", |t: &Task| Rendered::plain(format_date(t.deadline))),
        Column::rendered("ASSIGNED BY", "assigned_by", |t: &Task| Rendered::or_dash(&t.assigned_by, Tone::Plain)),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilters {
    /// Status display names, e.g. `In Progress`.
    pub status: MultiSelect,
    pub priority: MultiSelect,
    pub deadline: DateWindow,
}

impl TaskFilters {
    pub fn matches(&self, t: &Task, today: NaiveDate) -> bool {
        self.status.matches(&t.status.to_string())
            && self.priority.matches(&t.priority.to_string())
            && self.deadline.matches(t.deadline, today)
    }

    pub fn reset(&mut self) {
        *self = TaskFilters::default();
    }
}

pub const TASK_STATUS_OPTIONS: [&str; 5] = [ALL, "Pending", "In Progress", "Completed", "Overdue"];
pub const PRIORITY_OPTIONS: [&str; 5] = [ALL, "Low", "Medium", "High", "Critical"];

// Task submissions

pub fn submission_columns() -> Vec<Column<TaskSubmission>> {
    vec![
        Column::rendered("TASK", "task", |s: &TaskSubmission| Rendered::new(s.task.clone(), Tone::Info)),
        Column::rendered("SUBMITTED BY", "submitted_by", |s: &TaskSubmission| Rendered::or_dash(&s.submitted_by, Tone::Plain)),
        Column::rendered("SUBMISSION NOTE", "submission_note", |s: &TaskSubmission| Rendered::or_dash(&s.submission_note, Tone::Plain)),
        Column::rendered("FILE", "submission_file", |s: &TaskSubmission| {
            Rendered::or_dash(s.submission_file.as_deref().unwrap_or_default(), Tone::Muted)
        }),
        Column::rendered("CREATED AT", "created_at", |s: &TaskSubmission| Rendered::plain(format_timestamp(&s.created_at))),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionFilters {
    pub created_at: DateWindow,
    /// Priority of the task the submission belongs to.
    pub priority: MultiSelect,
}

impl SubmissionFilters {
    /// `tasks` resolves each submission's task title to its priority.
    pub fn matches(&self, s: &TaskSubmission, tasks: &[Task], today: NaiveDate) -> bool {
        let priority_ok = self.priority.selected().is_empty()
            || tasks
                .iter()
                .find(|t| t.title == s.task)
                .is_some_and(|t| self.priority.matches(&t.priority.to_string()));
        priority_ok && self.created_at.matches(timestamp_date(&s.created_at), today)
    }

    pub fn reset(&mut self) {
        *self = SubmissionFilters::default();
    }
}

// Contacts

pub fn contact_columns() -> Vec<Column<Contact>> {
    vec![
        Column::rendered("Name", "first_name", |c: &Contact| {
            Rendered::new(format!("{} {}", c.title, c.full_name()).trim().to_string(), Tone::Strong)
        }),
        Column::new("Email", "email"),
        Column::new("Phone", "phone"),
        Column::rendered("Location", "city", |c: &Contact| {
            let loc = [c.city.as_str(), c.country.as_str()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(", ");
            Rendered::or_dash(&loc, Tone::Plain)
        }),
        Column::rendered("Designation", "designation", |c: &Contact| Rendered::or_dash(&c.designation, Tone::Muted)),
    ]
}

/// Today's date in local time, the reference for every date window.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

// Page assembly

fn keep<E: Clone>(records: &[E], pred: impl Fn(&E) -> bool) -> Vec<E> {
    records.iter().filter(|r| pred(r)).cloned().collect()
}

pub fn department_page(records: &[Department], filters: &DepartmentFilters) -> ListView<Department> {
    ListView::new("Departments", department_columns(), keep(records, |d| filters.matches(d)))
        .with_subtitle("Manage your organization's department structure and hierarchy.")
}

pub fn role_page(records: &[Role]) -> ListView<Role> {
    ListView::new("Select role to change", role_columns(), records.to_vec())
}

pub fn user_page(records: &[User], filters: &UserFilters) -> ListView<User> {
    ListView::new("Select user to change", user_columns(), keep(records, |u| filters.matches(u)))
}

pub fn team_page(records: &[Team]) -> ListView<Team> {
    ListView::new("Select team to change", team_columns(), records.to_vec())
}

pub fn task_page(records: &[Task], filters: &TaskFilters, today: NaiveDate) -> ListView<Task> {
    ListView::new("Select task to change", task_columns(), keep(records, |t| filters.matches(t, today)))
}

pub fn submission_page(
    records: &[TaskSubmission],
    tasks: &[Task],
    filters: &SubmissionFilters,
    today: NaiveDate,
) -> ListView<TaskSubmission> {
    ListView::new(
        "Select task submission to change",
        submission_columns(),
        keep(records, |s| filters.matches(s, tasks, today)),
    )
}

pub fn contact_page(records: &[Contact]) -> ListView<Contact> {
    ListView::new("Contacts", contact_columns(), records.to_vec())
        .with_subtitle("Your address book.")
}
