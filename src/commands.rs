use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::departments::cascade_department_references;
use crate::error::{AppError, StoreError};
use crate::forms::{
    ContactForm, DepartmentForm, EntityForm, FormController, RoleForm, SaveMode, SaveOutcome,
    SubmissionForm, TaskForm, TeamForm, UserForm,
};
use crate::listing::ListView;
use crate::lookups::{find_place, COUNTRIES};
use crate::models::{
    Contact, Department, Entity, Priority, Role, Task, TaskStatus, TaskSubmission, Team, User,
};
use crate::pages::{self, DateWindow, DepartmentFilters, MultiSelect, SubmissionFilters, TaskFilters, UserFilters};
use crate::repository::Repository;
use crate::session;
use crate::storage::KeyValueStore;

/// Search and paging flags shared by every `list` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Case-insensitive text matched against every field
    #[arg(short, long)]
    pub search: Option<String>,
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page
    #[arg(long, default_value_t = crate::listing::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,
}

impl ListArgs {
    fn apply<E: Entity>(&self, view: ListView<E>) -> ListView<E> {
        let mut view = view.with_page_size(self.page_size);
        if let Some(s) = &self.search {
            view.set_search(s.clone());
        }
        view.set_page(self.page);
        view
    }
}

fn print_view<E: Entity>(view: &ListView<E>) {
    println!("{}", view.title);
    if let Some(sub) = &view.subtitle {
        println!("{}", sub);
    }
    if view.total() == 0 {
        println!("No results found.");
    } else {
        println!("{}", view.to_table());
    }
    println!("{}", view.footer());
}

fn print_options(label: &str, options: &[String]) {
    println!("{}: {}", label, options.join(", "));
}

fn ask(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    io::stdin().read_line(&mut input).is_ok() && input.trim().eq_ignore_ascii_case("y")
}

// Lists

pub fn department_list(
    store: &dyn KeyValueStore,
    filters: &DepartmentFilters,
    args: &ListArgs,
) -> Result<ListView<Department>, StoreError> {
    let records = Repository::<Department>::new(store).load_all()?;
    Ok(args.apply(pages::department_page(&records, filters)))
}

/// Lists departments, optionally narrowed to the given parents.
pub fn cmd_department_list(
    store: &dyn KeyValueStore,
    parents: &[String],
    show_filters: bool,
    args: &ListArgs,
) -> Result<(), AppError> {
    let filters = DepartmentFilters { parents: MultiSelect::of(parents) };
    let view = department_list(store, &filters, args)?;
    if show_filters {
        let all = Repository::<Department>::new(store).load_all()?;
        print_options("Parent", &pages::parent_filter_options(&all));
    }
    print_view(&view);
    Ok(())
}

pub fn role_list(store: &dyn KeyValueStore, args: &ListArgs) -> Result<ListView<Role>, StoreError> {
    let records = Repository::<Role>::new(store).load_all()?;
    Ok(args.apply(pages::role_page(&records)))
}

pub fn cmd_role_list(store: &dyn KeyValueStore, args: &ListArgs) -> Result<(), AppError> {
    print_view(&role_list(store, args)?);
    Ok(())
}

pub fn user_list(
    store: &dyn KeyValueStore,
    filters: &UserFilters,
    args: &ListArgs,
) -> Result<ListView<User>, StoreError> {
    let records = Repository::<User>::new(store).load_all()?;
    Ok(args.apply(pages::user_page(&records, filters)))
}

pub fn cmd_user_list(
    store: &dyn KeyValueStore,
    filters: &UserFilters,
    show_filters: bool,
    args: &ListArgs,
) -> Result<(), AppError> {
    let view = user_list(store, filters, args)?;
    if show_filters {
        let all = Repository::<User>::new(store).load_all()?;
        print_options("Role", &pages::role_filter_options(&all));
        print_options("Department", &pages::department_filter_options(&all));
        print_options("Staff status", &pages::STAFF_STATUS_OPTIONS.map(String::from));
    }
    print_view(&view);
    Ok(())
}

pub fn team_list(store: &dyn KeyValueStore, args: &ListArgs) -> Result<ListView<Team>, StoreError> {
    let records = Repository::<Team>::new(store).load_all()?;
    Ok(args.apply(pages::team_page(&records)))
}

pub fn cmd_team_list(store: &dyn KeyValueStore, args: &ListArgs) -> Result<(), AppError> {
    print_view(&team_list(store, args)?);
    Ok(())
}

pub fn task_list(
    store: &dyn KeyValueStore,
    filters: &TaskFilters,
    args: &ListArgs,
) -> Result<ListView<Task>, StoreError> {
    let records = Repository::<Task>::new(store).load_all()?;
    Ok(args.apply(pages::task_page(&records, filters, pages::today())))
}

pub fn cmd_task_list(
    store: &dyn KeyValueStore,
    filters: &TaskFilters,
    show_filters: bool,
    args: &ListArgs,
) -> Result<(), AppError> {
    if show_filters {
        print_options("Status", &pages::TASK_STATUS_OPTIONS.map(String::from));
        print_options("Priority", &pages::PRIORITY_OPTIONS.map(String::from));
    }
    print_view(&task_list(store, filters, args)?);
    Ok(())
}

pub fn submission_list(
    store: &dyn KeyValueStore,
    filters: &SubmissionFilters,
    args: &ListArgs,
) -> Result<ListView<TaskSubmission>, StoreError> {
    let records = Repository::<TaskSubmission>::new(store).load_all()?;
    let tasks = Repository::<Task>::new(store).load_all()?;
    Ok(args.apply(pages::submission_page(&records, &tasks, filters, pages::today())))
}

pub fn cmd_submission_list(
    store: &dyn KeyValueStore,
    filters: &SubmissionFilters,
    args: &ListArgs,
) -> Result<(), AppError> {
    print_view(&submission_list(store, filters, args)?);
    Ok(())
}

pub fn contact_list(store: &dyn KeyValueStore, args: &ListArgs) -> Result<ListView<Contact>, StoreError> {
    let records = Repository::<Contact>::new(store).load_all()?;
    Ok(args.apply(pages::contact_page(&records)))
}

pub fn cmd_contact_list(store: &dyn KeyValueStore, args: &ListArgs) -> Result<(), AppError> {
    print_view(&contact_list(store, args)?);
    Ok(())
}

/// Task filters from list flags. Status and priority accept several values.
pub fn task_filters(status: &[TaskStatus], priority: &[Priority], deadline: DateWindow) -> TaskFilters {
    TaskFilters {
        status: MultiSelect::of(status.iter().map(|s| s.to_string())),
        priority: MultiSelect::of(priority.iter().map(|p| p.to_string())),
        deadline,
    }
}

// Forms

/// Opens the form for `id` (or a create form), lets `fill` change its fields,
/// then submits with `save`. An `id` with no row fails without writing.
pub fn cmd_save<F, Fill>(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    fill: Fill,
    save: SaveMode,
    silent: bool,
) -> Result<F::Record, AppError>
where
    F: EntityForm,
    Fill: FnOnce(&mut FormController<'_, F>) -> Result<(), AppError>,
{
    let mut form = FormController::<F>::open(store, id)?;
    if let Some(id) = id {
        if form.original().is_none() {
            return Err(StoreError::NotFound { entity: F::Record::LABEL, id }.into());
        }
    }
    fill(&mut form)?;
    let outcome = form.submit(save)?;
    let saved = form
        .last_saved()
        .cloned()
        .ok_or(StoreError::NotFound { entity: F::Record::LABEL, id: id.unwrap_or_default() })?;
    if !silent {
        println!("{} saved (id = {}).", F::Record::LABEL, saved.id());
        match outcome {
            SaveOutcome::ShowList => {}
            SaveOutcome::AddAnother => println!("Ready to add another {}.", F::Record::LABEL.to_lowercase()),
            SaveOutcome::ContinueEditing(id) => println!("Continue editing with `edit {}`.", id),
        }
    }
    Ok(saved)
}

/// Deletes record `id` through the list's two-step confirmation.
pub fn cmd_delete<E: Entity>(store: &dyn KeyValueStore, id: u64, yes: bool, silent: bool) -> Result<bool, AppError> {
    let repo = Repository::<E>::new(store);
    let mut view = ListView::new(E::LABEL, Vec::new(), repo.load_all()?);
    if !view.request_delete(id) {
        return Err(StoreError::NotFound { entity: E::LABEL, id }.into());
    }
    let confirmed = yes || ask(&format!("Are you sure you want to delete {} {}?", E::LABEL, id));
    match view.confirm_delete(confirmed) {
        Some(_) => {
            repo.remove(id)?;
            if !silent { println!("{} {} deleted.", E::LABEL, id); }
            Ok(true)
        }
        None => {
            if !silent { println!("Aborted."); }
            Ok(false)
        }
    }
}

/// Edit flags for departments. Unset flags leave the field as is.
#[derive(Args, Debug, Clone, Default)]
pub struct DepartmentArgs {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Parent department name; empty for top-level
    #[arg(short, long)]
    pub parent: Option<String>,
}

impl DepartmentArgs {
    pub fn apply(&self, f: &mut DepartmentForm) {
        if let Some(v) = &self.name { f.name = v.clone(); }
        if let Some(v) = &self.description { f.description = v.clone(); }
        if let Some(v) = &self.parent { f.parent = v.clone(); }
    }
}

pub fn cmd_department_save(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    args: &DepartmentArgs,
    save: SaveMode,
    silent: bool,
) -> Result<Department, AppError> {
    cmd_save::<DepartmentForm, _>(store, id, |form| {
        args.apply(form.fields_mut());
        Ok(())
    }, save, silent)
}

/// Renames a department; `references` also rewrites users and teams.
pub fn cmd_department_rename(
    store: &dyn KeyValueStore,
    old: &str,
    new: &str,
    references: bool,
    silent: bool,
) -> Result<(), AppError> {
    let report = Repository::<Department>::new(store).rename(old, new)?;
    if !silent {
        println!(
            "Department '{}' renamed to '{}' ({} sub-departments, {} branch references updated).",
            old, new.trim(), report.children, report.branches
        );
    }
    if references {
        let refs = cascade_department_references(store, old, new.trim())?;
        if !silent { println!("Updated {} users and {} teams.", refs.users, refs.teams); }
    }
    Ok(())
}

pub fn cmd_department_quick_add(store: &dyn KeyValueStore, name: &str, silent: bool) -> Result<Department, AppError> {
    let dept = Repository::<Department>::new(store).quick_add(name)?;
    if !silent { println!("Department '{}' added (id = {}).", dept.name, dept.id); }
    Ok(dept)
}

/// Shows the record of department `id`'s parent.
pub fn cmd_department_parent(store: &dyn KeyValueStore, id: u64, silent: bool) -> Result<Department, AppError> {
    let form = FormController::<DepartmentForm>::open(store, Some(id))?;
    if form.original().is_none() {
        return Err(StoreError::NotFound { entity: Department::LABEL, id }.into());
    }
    let parent = form.view_parent()?;
    if !silent {
        println!("{} (id = {}): {}", parent.name, parent.id, parent.description);
    }
    Ok(parent)
}

#[derive(Args, Debug, Clone, Default)]
pub struct RoleArgs {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(long)]
    pub view_all_tasks: Option<bool>,
    #[arg(long)]
    pub view_all_teams: Option<bool>,
    #[arg(long)]
    pub team_lead: Option<bool>,
}

impl RoleArgs {
    pub fn apply(&self, f: &mut RoleForm) {
        if let Some(v) = &self.name { f.name = v.clone(); }
        if let Some(v) = &self.description { f.description = v.clone(); }
        if let Some(v) = self.view_all_tasks { f.can_view_all_tasks = v; }
        if let Some(v) = self.view_all_teams { f.can_view_all_teams = v; }
        if let Some(v) = self.team_lead { f.is_team_lead_role = v; }
    }
}

pub fn cmd_role_save(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    args: &RoleArgs,
    save: SaveMode,
    silent: bool,
) -> Result<Role, AppError> {
    cmd_save::<RoleForm, _>(store, id, |form| {
        args.apply(form.fields_mut());
        Ok(())
    }, save, silent)
}

#[derive(Args, Debug, Clone, Default)]
pub struct UserArgs {
    #[arg(short, long)]
    pub username: Option<String>,
    /// Checked against --password-confirmation; never stored
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub password_confirmation: Option<String>,
    #[arg(short, long)]
    pub role: Option<String>,
    #[arg(short, long)]
    pub department: Option<String>,
    /// Full name of the linked contact
    #[arg(short, long)]
    pub contact: Option<String>,
    #[arg(long)]
    pub staff: Option<bool>,
}

impl UserArgs {
    pub fn apply(&self, f: &mut UserForm) {
        if let Some(v) = &self.username { f.username = v.clone(); }
        if let Some(v) = &self.password { f.password = v.clone(); }
        if let Some(v) = &self.password_confirmation { f.password_confirmation = v.clone(); }
        if let Some(v) = &self.role { f.role = v.clone(); }
        if let Some(v) = &self.department { f.department = v.clone(); }
        if let Some(v) = &self.contact { f.linked_contact = v.clone(); }
        if let Some(v) = self.staff { f.staff_status = v; }
    }
}

pub fn cmd_user_save(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    args: &UserArgs,
    save: SaveMode,
    silent: bool,
) -> Result<User, AppError> {
    cmd_save::<UserForm, _>(store, id, |form| {
        args.apply(form.fields_mut());
        Ok(())
    }, save, silent)
}

#[derive(Args, Debug, Clone, Default)]
pub struct TeamArgs {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub department: Option<String>,
    /// Username of the team lead
    #[arg(short, long)]
    pub lead: Option<String>,
    /// Username to add; repeatable
    #[arg(long = "add-member")]
    pub add_members: Vec<String>,
    /// Username to remove; repeatable
    #[arg(long = "remove-member")]
    pub remove_members: Vec<String>,
    /// Add every user whose label contains this text
    #[arg(long)]
    pub add_matching: Option<String>,
    /// Remove all members before applying additions
    #[arg(long)]
    pub clear_members: bool,
}

impl TeamArgs {
    pub fn apply(&self, form: &mut FormController<'_, TeamForm>) -> Result<(), AppError> {
        let known: Vec<String> = form.lookups().users.iter().map(|u| u.value.clone()).collect();
        let f = form.fields_mut();
        if let Some(v) = &self.name { f.name = v.clone(); }
        if let Some(v) = &self.department { f.department = v.clone(); }
        if let Some(v) = &self.lead { f.lead = v.clone(); }
        if self.clear_members {
            f.remove_all();
        }
        for name in &self.remove_members {
            if f.is_member(name) {
                f.toggle_chosen(name);
            }
        }
        f.move_left();
        for name in &self.add_members {
            if !known.contains(name) {
                return Err(AppError::MissingReference { entity: "User", name: name.clone() });
            }
            if !f.is_member(name) {
                f.toggle_available(name);
            }
        }
        f.move_right();
        if let Some(text) = &self.add_matching {
            f.available_search = text.clone();
            form.move_all_right();
            form.fields_mut().available_search.clear();
        }
        Ok(())
    }
}

pub fn cmd_team_save(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    args: &TeamArgs,
    save: SaveMode,
    silent: bool,
) -> Result<Team, AppError> {
    cmd_save::<TeamForm, _>(store, id, |form| args.apply(form), save, silent)
}

#[derive(Args, Debug, Clone, Default)]
pub struct TaskArgs {
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long, value_enum)]
    pub priority: Option<Priority>,
    #[arg(short, long, value_enum)]
    pub status: Option<TaskStatus>,
    /// YYYY-MM-DD, `today`, or empty to clear
    #[arg(long)]
    pub deadline: Option<String>,
    /// Username of the assignee
    #[arg(short, long)]
    pub assigned_to: Option<String>,
    #[arg(long)]
    pub team: Option<String>,
}

impl TaskArgs {
    pub fn apply(&self, f: &mut TaskForm) {
        if let Some(v) = &self.title { f.title = v.clone(); }
        if let Some(v) = &self.description { f.description = v.clone(); }
        if let Some(v) = self.priority { f.priority = v; }
        if let Some(v) = self.status { f.status = v; }
        match self.deadline.as_deref() {
            Some(d) if d.trim().eq_ignore_ascii_case("today") => f.set_deadline_today(),
            Some(d) => f.deadline = d.to_string(),
            None => {}
        }
        if let Some(v) = &self.assigned_to { f.assigned_to = v.clone(); }
        if let Some(v) = &self.team { f.team = v.clone(); }
    }
}

pub fn cmd_task_save(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    args: &TaskArgs,
    save: SaveMode,
    silent: bool,
) -> Result<Task, AppError> {
    cmd_save::<TaskForm, _>(store, id, |form| {
        args.apply(form.fields_mut());
        Ok(())
    }, save, silent)
}

#[derive(Args, Debug, Clone, Default)]
pub struct SubmissionArgs {
    /// Title of the task
    #[arg(short, long)]
    pub task: Option<String>,
    #[arg(short, long)]
    pub note: Option<String>,
    /// Attachment; only its file name is recorded
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

impl SubmissionArgs {
    pub fn apply(&self, f: &mut SubmissionForm) {
        if let Some(v) = &self.task { f.task = v.clone(); }
        if let Some(v) = &self.note { f.submission_note = v.clone(); }
        if let Some(p) = &self.file { f.attach(p); }
    }
}

pub fn cmd_submission_save(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    args: &SubmissionArgs,
    save: SaveMode,
    silent: bool,
) -> Result<TaskSubmission, AppError> {
    cmd_save::<SubmissionForm, _>(store, id, |form| {
        args.apply(form.fields_mut());
        Ok(())
    }, save, silent)
}

#[derive(Args, Debug, Clone, Default)]
pub struct ContactArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub first_name: Option<String>,
    #[arg(short, long)]
    pub last_name: Option<String>,
    #[arg(short, long)]
    pub gender: Option<String>,
    /// Digits are kept and formatted as #####-#######-#
    #[arg(long)]
    pub cnic: Option<String>,
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(short, long)]
    pub email: Option<String>,
    #[arg(short, long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub whatsapp: Option<bool>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(short, long)]
    pub address: Option<String>,
    #[arg(short, long)]
    pub designation: Option<String>,
}

impl ContactArgs {
    pub fn apply(&self, f: &mut ContactForm) -> Result<(), AppError> {
        if let Some(v) = &self.title { f.title = v.clone(); }
        if let Some(v) = &self.first_name { f.first_name = v.clone(); }
        if let Some(v) = &self.last_name { f.last_name = v.clone(); }
        if let Some(v) = &self.gender { f.gender = v.clone(); }
        if let Some(v) = &self.cnic { f.set_cnic(v); }
        if let Some(v) = &self.dob { f.dob = v.clone(); }
        if let Some(v) = &self.email { f.email = v.clone(); }
        if let Some(v) = &self.phone { f.phone = v.clone(); }
        if let Some(v) = self.whatsapp { f.is_whatsapp = v; }
        if let Some(v) = &self.address { f.address = v.clone(); }
        if let Some(v) = &self.designation { f.designation = v.clone(); }

        let missing = |entity: &'static str, name: &str| AppError::MissingReference { entity, name: name.to_string() };
        if let Some(name) = &self.country {
            let place = find_place(COUNTRIES, name).ok_or_else(|| missing("Country", name))?;
            f.set_country(Some(place.id));
        }
        if let Some(name) = &self.state {
            let place = find_place(f.states(), name).ok_or_else(|| missing("State", name))?;
            f.set_state(Some(place.id));
        }
        if let Some(name) = &self.city {
            let place = find_place(f.cities(), name).ok_or_else(|| missing("City", name))?;
            f.set_city(Some(place.id));
        }
        Ok(())
    }
}

pub fn cmd_contact_save(
    store: &dyn KeyValueStore,
    id: Option<u64>,
    args: &ContactArgs,
    save: SaveMode,
    silent: bool,
) -> Result<Contact, AppError> {
    cmd_save::<ContactForm, _>(store, id, |form| args.apply(form.fields_mut()), save, silent)
}

// Session and maintenance

pub fn cmd_login(store: &dyn KeyValueStore, email: &str, password: &str, silent: bool) -> Result<(), AppError> {
    session::login(store, email, password)?;
    if !silent { println!("Signed in as {}.", email.trim()); }
    Ok(())
}

pub fn cmd_logout(store: &dyn KeyValueStore, silent: bool) -> Result<(), AppError> {
    session::logout(store)?;
    if !silent { println!("Signed out."); }
    Ok(())
}

/// Clears every key, including id sequences and the session.
pub fn cmd_reset(store: &dyn KeyValueStore, force: bool, silent: bool) -> Result<bool, AppError> {
    if !force && !ask("Are you sure you want to delete all data? This cannot be undone.") {
        if !silent { println!("Aborted."); }
        return Ok(false);
    }
    store.clear()?;
    info!("cleared all stored data");
    if !silent { println!("All data cleared. Default records are restored on next use."); }
    Ok(true)
}
