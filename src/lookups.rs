//! Option lists that forms offer in their selects.

use crate::error::StoreError;
use crate::models::{Contact, Department, Role, Task, Team, User, NONE_MARKER};
use crate::repository::Repository;
use crate::storage::KeyValueStore;

/// A select option: what the user sees and what gets stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn same(text: &str) -> SelectOption {
        SelectOption { label: text.to_string(), value: text.to_string() }
    }
}

pub fn role_names(store: &dyn KeyValueStore) -> Result<Vec<String>, StoreError> {
    Ok(Repository::<Role>::new(store).load_all()?.into_iter().map(|r| r.name).collect())
}

pub fn department_names(store: &dyn KeyValueStore) -> Result<Vec<String>, StoreError> {
    let departments = Repository::<Department>::new(store).load_all()?;
    Ok(crate::departments::name_options(&departments))
}

/// `username (Role)` labels valued by username.
pub fn user_options(store: &dyn KeyValueStore) -> Result<Vec<SelectOption>, StoreError> {
    Ok(Repository::<User>::new(store)
        .load_all()?
        .into_iter()
        .map(|u| {
            let role = if u.role.is_empty() || u.role == NONE_MARKER { "No Role" } else { u.role.as_str() };
            SelectOption { label: format!("{} ({})", u.username, role), value: u.username }
        })
        .collect())
}

pub fn team_names(store: &dyn KeyValueStore) -> Result<Vec<String>, StoreError> {
    Ok(Repository::<Team>::new(store).load_all()?.into_iter().map(|t| t.name).collect())
}

pub fn task_titles(store: &dyn KeyValueStore) -> Result<Vec<String>, StoreError> {
    Ok(Repository::<Task>::new(store).load_all()?.into_iter().map(|t| t.title).collect())
}

pub fn contact_names(store: &dyn KeyValueStore) -> Result<Vec<String>, StoreError> {
    Ok(Repository::<Contact>::new(store)
        .load_all()?
        .iter()
        .map(Contact::full_name)
        .collect())
}

/// Entry of the static location tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Place {
    pub id: u32,
    pub name: &'static str,
}

const fn place(id: u32, name: &'static str) -> Place {
    Place { id, name }
}

pub const COUNTRIES: &[Place] = &[place(1, "Pakistan"), place(2, "USA")];

const STATES: &[(u32, &[Place])] = &[
    (1, &[place(101, "Punjab"), place(102, "Sindh")]),
    (2, &[place(201, "New York"), place(202, "California")]),
];

const CITIES: &[(u32, &[Place])] = &[
    (101, &[place(1001, "Lahore"), place(1002, "Faisalabad")]),
    (102, &[place(1003, "Karachi"), place(1004, "Hyderabad")]),
    (201, &[place(2001, "New York City"), place(2002, "Buffalo")]),
    (202, &[place(2003, "Los Angeles"), place(2004, "San Francisco")]),
];

fn children(table: &'static [(u32, &'static [Place])], parent: u32) -> &'static [Place] {
    table
        .iter()
        .find(|(id, _)| *id == parent)
        .map(|(_, places)| *places)
        .unwrap_or(&[])
}

pub fn states_of(country_id: u32) -> &'static [Place] {
    children(STATES, country_id)
}

pub fn cities_of(state_id: u32) -> &'static [Place] {
    children(CITIES, state_id)
}

/// Finds a place by name (case-insensitive) among `places`.
pub fn find_place(places: &[Place], name: &str) -> Option<Place> {
    places.iter().copied().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}
