use chrono::NaiveDate;

use ifinance::listing::{record_matches, Column, ListAction, ListView, Rendered, Tone};
use ifinance::models::{Department, Priority, Role, Task, TaskStatus, TaskSubmission, User};
use ifinance::pages::{
    self, DateWindow, DepartmentFilters, MultiSelect, SubmissionFilters, TaskFilters, UserFilters, ALL,
};
use ifinance::seeds;

fn user(id: u64, username: &str, role: &str) -> User {
    User {
        id,
        username: username.into(),
        role: role.into(),
        department: "-".into(),
        linked_contact: String::new(),
        staff_status: true,
    }
}

fn roles(n: u64) -> Vec<Role> {
    (1..=n).map(|id| Role { id, name: format!("role {}", id), ..Role::default() }).collect()
}

#[test]
fn test_search_is_case_insensitive() {
    let users = vec![user(1, "alice", "-"), user(2, "bob", "-")];
    let mut view = ListView::new("Users", pages::user_columns(), users);

    view.set_search("ali");
    let hits: Vec<&str> = view.filtered().iter().map(|u| u.username.as_str()).collect();
    assert_eq!(hits, vec!["alice"]);

    view.set_search("ALI");
    assert_eq!(view.total(), 1);
    assert_eq!(view.filtered()[0].username, "alice");
}

#[test]
fn test_search_covers_every_field() {
    let u = user(42, "carol", "Admin");
    assert!(record_matches(&u, "adm"));
    assert!(record_matches(&u, "42"));
    assert!(record_matches(&u, "TRUE"));
    assert!(!record_matches(&u, "zzz"));
    assert!(record_matches(&u, ""));
}

#[test]
fn test_delete_needs_confirmation() {
    let mut view = ListView::new("Roles", pages::role_columns(), roles(3));

    assert!(!view.request_delete(99));
    assert!(view.request_delete(2));
    assert_eq!(view.pending_delete(), Some(2));

    assert_eq!(view.confirm_delete(false), None);
    assert_eq!(view.pending_delete(), None);
    assert_eq!(view.confirm_delete(true), None);

    view.request_delete(2);
    assert_eq!(view.confirm_delete(true), Some(ListAction::Delete(2)));
    assert_eq!(view.total(), 3);
}

#[test]
fn test_add_edit_and_reset_actions() {
    let mut view = ListView::new("Roles", pages::role_columns(), roles(2));
    assert_eq!(view.request_add(), ListAction::Add);
    assert_eq!(view.request_edit(1), Some(ListAction::Edit(1)));
    assert_eq!(view.request_edit(9), None);

    view.set_search("role 1");
    assert_eq!(view.reset(), ListAction::ResetFilters);
    assert_eq!(view.search(), "");
    assert_eq!(view.total(), 2);
}

#[test]
fn test_pagination_windows() {
    let mut view = ListView::new("Roles", pages::role_columns(), roles(25));
    assert_eq!(view.page_count(), 3);
    assert_eq!(view.visible().len(), 10);
    assert_eq!(view.footer(), "Showing 25 entries | Page 1 of 3");

    assert!(view.next_page());
    assert!(view.next_page());
    assert!(!view.next_page());
    assert_eq!(view.page(), 3);
    assert_eq!(view.visible().len(), 5);
    assert_eq!(view.visible()[0].id, 21);

    view.set_search("role 2");
    assert_eq!(view.page(), 1);
    // "role 2" and "role 20".."role 25"
    assert_eq!(view.total(), 7);
    assert_eq!(view.page_count(), 1);
}

#[test]
fn test_page_size_and_empty_list() {
    let view = ListView::new("Roles", pages::role_columns(), roles(5)).with_page_size(2);
    assert_eq!(view.page_count(), 3);

    let empty = ListView::new("Roles", pages::role_columns(), Vec::new());
    assert_eq!(empty.page_count(), 1);
    assert!(empty.rows().is_empty());
    assert_eq!(empty.footer(), "Showing 0 entries | Page 1 of 1");
}

#[test]
fn test_renderer_takes_precedence() {
    let columns: Vec<Column<Department>> = vec![
        Column::new("Name", "name"),
        Column::rendered("Parent", "parent", |d: &Department| Rendered::new(format!("<{}>", d.parent), Tone::Info)),
    ];
    let view = ListView::new("Departments", columns, seeds::departments());
    let rows = view.rows();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1].0, 2);
    assert_eq!(rows[1].1[0], Rendered::plain("backend"));
    assert_eq!(rows[1].1[1], Rendered::new("<Development>", Tone::Info));

    let table = view.to_table().to_string();
    assert!(table.contains("backend"));
    assert!(table.contains("<Development>"));
}

#[test]
fn test_multi_select_all_clears() {
    let mut m = MultiSelect::of(["Development"]);
    assert!(m.matches("Development"));
    assert!(!m.matches("-"));
    m.toggle(ALL);
    assert!(m.is_selected(ALL));
    assert!(m.matches("-"));
}

#[test]
fn test_department_parent_filter() {
    let all = seeds::departments();
    assert_eq!(pages::parent_filter_options(&all), vec!["All", "-", "Development"]);

    let filters = DepartmentFilters { parents: MultiSelect::of(["-"]) };
    let view = pages::department_page(&all, &filters);
    let names: Vec<&str> = view.filtered().iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Designing", "Development"]);
}

#[test]
fn test_user_filters() {
    let users = seeds::users();
    let filters = UserFilters { roles: MultiSelect::of(["Admin"]), ..UserFilters::default() };
    let view = pages::user_page(&users, &filters);
    assert_eq!(view.total(), 1);
    assert_eq!(view.filtered()[0].username, "syedaalin");

    assert_eq!(pages::role_filter_options(&users), vec!["All", "Admin", "-"]);
}

fn task(id: u64, title: &str, priority: Priority, status: TaskStatus, deadline: Option<NaiveDate>) -> Task {
    Task {
        id,
        title: title.into(),
        description: String::new(),
        priority,
        status,
        deadline,
        assigned_to: String::new(),
        team: String::new(),
        assigned_by: String::new(),
        created_at: String::new(),
        updated_at: String::new(),
    }
}

#[test]
fn test_task_filters_and_date_windows() {
    let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
    let tasks = vec![
        task(1, "due today", Priority::High, TaskStatus::Pending, Some(today)),
        task(2, "last week", Priority::Low, TaskStatus::InProgress, NaiveDate::from_ymd_opt(2026, 3, 10)),
        task(3, "last year", Priority::High, TaskStatus::Completed, NaiveDate::from_ymd_opt(2025, 3, 15)),
        task(4, "no deadline", Priority::Medium, TaskStatus::Pending, None),
    ];

    let mut filters = TaskFilters { deadline: DateWindow::Past7Days, ..TaskFilters::default() };
    let view = pages::task_page(&tasks, &filters, today);
    let ids: Vec<u64> = view.filtered().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2]);

    filters.deadline = DateWindow::AnyDate;
    filters.priority = MultiSelect::of(["High"]);
    filters.status = MultiSelect::of(["In Progress", "Completed"]);
    let view = pages::task_page(&tasks, &filters, today);
    let ids: Vec<u64> = view.filtered().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![3]);

    assert!(DateWindow::ThisYear.matches(NaiveDate::from_ymd_opt(2026, 1, 1), today));
    assert!(!DateWindow::Today.matches(None, today));
}

#[test]
fn test_submission_priority_follows_task() {
    let today = NaiveDate::from_ymd_opt(2026, 1, 17).unwrap();
    let tasks = seeds::tasks();
    let subs: Vec<TaskSubmission> = seeds::submissions();

    let medium = SubmissionFilters { priority: MultiSelect::of(["Medium"]), ..SubmissionFilters::default() };
    assert_eq!(pages::submission_page(&subs, &tasks, &medium, today).total(), 1);

    let high = SubmissionFilters { priority: MultiSelect::of(["High"]), ..SubmissionFilters::default() };
    assert_eq!(pages::submission_page(&subs, &tasks, &high, today).total(), 0);

    let today_only = SubmissionFilters { created_at: DateWindow::Today, ..SubmissionFilters::default() };
    assert_eq!(pages::submission_page(&subs, &tasks, &today_only, today).total(), 1);
}

#[test]
fn test_date_formatting() {
    assert_eq!(pages::format_date(NaiveDate::from_ymd_opt(2026, 1, 20)), "Jan 20, 2026");
    assert_eq!(pages::format_date(None), "-");
    assert_eq!(pages::format_timestamp("2026-01-17T10:47:00"), "Jan 17 2026 10:47 AM");
}
