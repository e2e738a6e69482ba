use super::{required, EntityForm, FormController};
use crate::error::{StoreError, ValidationError};
use crate::lookups::{self, SelectOption};
use crate::models::Team;
use crate::storage::KeyValueStore;

/// Team form with a two-pane member picker.
///
/// The left pane lists users not yet in `members`, the right pane the ones
/// that are. Each pane has its own search and its own highlighted rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamForm {
    pub name: String,
    pub department: String,
    pub lead: String,
    pub members: Vec<String>,
    pub available_search: String,
    pub chosen_search: String,
    selected_available: Vec<String>,
    selected_chosen: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TeamLookups {
    pub departments: Vec<String>,
    pub users: Vec<SelectOption>,
}

fn label_matches(option: &SelectOption, search: &str) -> bool {
    option.label.to_lowercase().contains(&search.to_lowercase())
}

fn toggle(list: &mut Vec<String>, value: &str) {
    if let Some(pos) = list.iter().position(|v| v == value) {
        list.remove(pos);
    } else {
        list.push(value.to_string());
    }
}

impl TeamForm {
    pub fn is_member(&self, username: &str) -> bool {
        self.members.iter().any(|m| m == username)
    }

    /// Left pane: non-members passing the available search.
    pub fn available<'u>(&self, users: &'u [SelectOption]) -> Vec<&'u SelectOption> {
        users
            .iter()
            .filter(|u| !self.is_member(&u.value) && label_matches(u, &self.available_search))
            .collect()
    }

    /// Right pane: members passing the chosen search.
    pub fn chosen<'u>(&self, users: &'u [SelectOption]) -> Vec<&'u SelectOption> {
        users
            .iter()
            .filter(|u| self.is_member(&u.value) && label_matches(u, &self.chosen_search))
            .collect()
    }

    pub fn toggle_available(&mut self, username: &str) {
        toggle(&mut self.selected_available, username);
    }

    pub fn toggle_chosen(&mut self, username: &str) {
        toggle(&mut self.selected_chosen, username);
    }

    pub fn selected_available(&self) -> &[String] {
        &self.selected_available
    }

    pub fn selected_chosen(&self) -> &[String] {
        &self.selected_chosen
    }

    fn add_members<I: IntoIterator<Item = String>>(&mut self, usernames: I) {
        for name in usernames {
            if !self.is_member(&name) {
                self.members.push(name);
            }
        }
    }

    /// Moves the highlighted left-pane users into the team.
    pub fn move_right(&mut self) {
        let picked = std::mem::take(&mut self.selected_available);
        self.add_members(picked);
    }

    /// Removes the highlighted right-pane users from the team.
    pub fn move_left(&mut self) {
        let picked = std::mem::take(&mut self.selected_chosen);
        self.members.retain(|m| !picked.contains(m));
    }

    /// Adds every user the left pane currently shows.
    pub fn move_all_right(&mut self, users: &[SelectOption]) {
        let shown: Vec<String> = self.available(users).into_iter().map(|u| u.value.clone()).collect();
        self.add_members(shown);
    }

    pub fn remove_all(&mut self) {
        self.members.clear();
        self.selected_chosen.clear();
    }
}

impl EntityForm for TeamForm {
    type Record = Team;
    type Lookups = TeamLookups;

    fn blank() -> Self {
        TeamForm::default()
    }

    fn from_record(t: &Team) -> Self {
        TeamForm {
            name: t.name.clone(),
            department: t.department.clone(),
            lead: t.lead.clone(),
            members: t.members.clone(),
            ..TeamForm::default()
        }
    }

    fn load_lookups(store: &dyn KeyValueStore) -> Result<TeamLookups, StoreError> {
        Ok(TeamLookups {
            departments: lookups::department_names(store)?,
            users: lookups::user_options(store)?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }

    fn build(&self, existing: Option<&Team>) -> Team {
        Team {
            id: existing.map_or(0, |t| t.id),
            name: self.name.trim().to_string(),
            department: self.department.trim().to_string(),
            lead: self.lead.trim().to_string(),
            members: self.members.clone(),
        }
    }
}

impl<'s> FormController<'s, TeamForm> {
    /// Adds every user the left pane currently shows, using the loaded user list.
    pub fn move_all_right(&mut self) {
        let users = self.lookups.users.clone();
        self.fields.move_all_right(&users);
    }
}
