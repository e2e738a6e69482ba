use ratatui::widgets::TableState;

use crate::error::{AppError, StoreError};
use crate::listing::{ListAction, ListView, Rendered};
use crate::models::{Contact, Department, Entity, Role, Task, TaskSubmission, Team, User};
use crate::pages::{self, DepartmentFilters, SubmissionFilters, TaskFilters, UserFilters};
use crate::repository::Repository;
use crate::storage::KeyValueStore;

/// One tab of the console: a list page over one collection.
pub trait Screen {
    fn title(&self) -> String;
    /// CLI subcommand that manages this collection.
    fn command(&self) -> &'static str;
    fn headers(&self) -> Vec<&'static str>;
    fn rows(&self) -> Vec<(u64, Vec<Rendered>)>;
    fn footer(&self) -> String;
    fn search(&self) -> String;
    fn set_search(&mut self, text: String);
    fn next_page(&mut self) -> bool;
    fn prev_page(&mut self) -> bool;
    fn reset(&mut self);
    fn request_delete(&mut self, id: u64) -> bool;
    fn pending_delete(&self) -> Option<u64>;
    /// Resolves a pending delete; returns the deleted id when confirmed.
    fn confirm_delete(&mut self, store: &dyn KeyValueStore, confirmed: bool) -> Result<Option<u64>, AppError>;
    fn reload(&mut self, store: &dyn KeyValueStore) -> Result<(), StoreError>;
}

pub struct EntityScreen<E: Entity> {
    command: &'static str,
    view: ListView<E>,
}

impl<E: Entity> EntityScreen<E> {
    pub fn new(command: &'static str, view: ListView<E>) -> Self {
        EntityScreen { command, view }
    }
}

impl<E: Entity> Screen for EntityScreen<E> {
    fn title(&self) -> String {
        self.view.title.clone()
    }

    fn command(&self) -> &'static str {
        self.command
    }

    fn headers(&self) -> Vec<&'static str> {
        self.view.headers()
    }

    fn rows(&self) -> Vec<(u64, Vec<Rendered>)> {
        self.view.rows()
    }

    fn footer(&self) -> String {
        self.view.footer()
    }

    fn search(&self) -> String {
        self.view.search().to_string()
    }

    fn set_search(&mut self, text: String) {
        self.view.set_search(text);
    }

    fn next_page(&mut self) -> bool {
        self.view.next_page()
    }

    fn prev_page(&mut self) -> bool {
        self.view.prev_page()
    }

    fn reset(&mut self) {
        self.view.reset();
    }

    fn request_delete(&mut self, id: u64) -> bool {
        self.view.request_delete(id)
    }

    fn pending_delete(&self) -> Option<u64> {
        self.view.pending_delete()
    }

    fn confirm_delete(&mut self, store: &dyn KeyValueStore, confirmed: bool) -> Result<Option<u64>, AppError> {
        match self.view.confirm_delete(confirmed) {
            Some(ListAction::Delete(id)) => {
                Repository::<E>::new(store).remove(id)?;
                self.reload(store)?;
                Ok(Some(id))
            }
            _ => Ok(None),
        }
    }

    fn reload(&mut self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let records = Repository::<E>::new(store).load_all()?;
        self.view.set_records(records);
        Ok(())
    }
}

fn screen<E: Entity + 'static>(command: &'static str, view: ListView<E>) -> Box<dyn Screen> {
    Box::new(EntityScreen::new(command, view))
}

/// Builds every tab over the current contents of `store`.
pub fn screens(store: &dyn KeyValueStore) -> Result<Vec<Box<dyn Screen>>, StoreError> {
    let today = pages::today();
    let departments = Repository::<Department>::new(store).load_all()?;
    let roles = Repository::<Role>::new(store).load_all()?;
    let users = Repository::<User>::new(store).load_all()?;
    let teams = Repository::<Team>::new(store).load_all()?;
    let tasks = Repository::<Task>::new(store).load_all()?;
    let submissions = Repository::<TaskSubmission>::new(store).load_all()?;
    let contacts = Repository::<Contact>::new(store).load_all()?;
    Ok(vec![
        screen("departments", pages::department_page(&departments, &DepartmentFilters::default())),
        screen("roles", pages::role_page(&roles)),
        screen("users", pages::user_page(&users, &UserFilters::default())),
        screen("teams", pages::team_page(&teams)),
        screen("tasks", pages::task_page(&tasks, &TaskFilters::default(), today)),
        screen(
            "submissions",
            pages::submission_page(&submissions, &tasks, &SubmissionFilters::default(), today),
        ),
        screen("contacts", pages::contact_page(&contacts)),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Searching,
    ConfirmDelete,
}

pub struct App<'s> {
    store: &'s dyn KeyValueStore,
    pub screens: Vec<Box<dyn Screen>>,
    pub tab: usize,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub status: Option<String>,
}

impl<'s> App<'s> {
    /// Creates the console and loads every collection.
    pub fn new(store: &'s dyn KeyValueStore) -> Result<App<'s>, StoreError> {
        let mut app = App {
            store,
            screens: screens(store)?,
            tab: 0,
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            status: None,
        };
        app.clamp_selection();
        Ok(app)
    }

    pub fn current(&self) -> &dyn Screen {
        &*self.screens[self.tab]
    }

    fn current_mut(&mut self) -> &mut dyn Screen {
        &mut *self.screens[self.tab]
    }

    fn row_count(&self) -> usize {
        self.current().rows().len()
    }

    fn clamp_selection(&mut self) {
        let n = self.row_count();
        if n == 0 {
            self.state.select(None);
        } else {
            let i = self.state.selected().unwrap_or(0).min(n - 1);
            self.state.select(Some(i));
        }
    }

    pub fn selected_id(&self) -> Option<u64> {
        let i = self.state.selected()?;
        self.current().rows().get(i).map(|(id, _)| *id)
    }

    pub fn next_tab(&mut self) {
        self.tab = (self.tab + 1) % self.screens.len();
        self.state.select(Some(0));
        self.clamp_selection();
    }

    pub fn prev_tab(&mut self) {
        self.tab = (self.tab + self.screens.len() - 1) % self.screens.len();
        self.state.select(Some(0));
        self.clamp_selection();
    }

    /// Selects the next row, wrapping around.
    pub fn next(&mut self) {
        let n = self.row_count();
        if n == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < n => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let n = self.row_count();
        if n == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => n - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn next_page(&mut self) {
        if self.current_mut().next_page() {
            self.state.select(Some(0));
        }
    }

    pub fn prev_page(&mut self) {
        if self.current_mut().prev_page() {
            self.state.select(Some(0));
        }
    }

    pub fn start_search(&mut self) {
        self.input_buffer = self.current().search();
        self.input_mode = InputMode::Searching;
    }

    /// Applies the search buffer as the user types.
    pub fn update_search(&mut self) {
        let text = self.input_buffer.clone();
        self.current_mut().set_search(text);
        self.clamp_selection();
    }

    pub fn finish_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    pub fn reset(&mut self) {
        self.current_mut().reset();
        self.state.select(Some(0));
        self.clamp_selection();
        self.status = Some("Filters cleared.".to_string());
    }

    /// First key of a delete: asks for confirmation.
    pub fn start_delete(&mut self) {
        if let Some(id) = self.selected_id() {
            if self.current_mut().request_delete(id) {
                self.input_mode = InputMode::ConfirmDelete;
            }
        }
    }

    pub fn confirm_delete(&mut self, confirmed: bool) {
        self.input_mode = InputMode::Normal;
        let store = self.store;
        self.status = match self.current_mut().confirm_delete(store, confirmed) {
            Ok(Some(id)) => Some(format!("Deleted record {}.", id)),
            Ok(None) => Some("Delete cancelled.".to_string()),
            Err(e) => Some(format!("Delete failed: {}", e)),
        };
        self.clamp_selection();
    }

    /// Points at the CLI command for adding to the current collection.
    pub fn hint_add(&mut self) {
        self.status = Some(format!("Add with: ifinance {} add --help", self.current().command()));
    }

    pub fn hint_edit(&mut self) {
        self.status = match self.selected_id() {
            Some(id) => Some(format!("Edit with: ifinance {} edit {} --help", self.current().command(), id)),
            None => Some("Nothing selected.".to_string()),
        };
    }

    /// Re-reads every collection from the store.
    pub fn reload(&mut self) {
        let store = self.store;
        for screen in self.screens.iter_mut() {
            if let Err(e) = screen.reload(store) {
                self.status = Some(format!("Reload failed: {}", e));
            }
        }
        self.clamp_selection();
    }
}
