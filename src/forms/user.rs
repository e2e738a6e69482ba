use super::{required, EntityForm};
use crate::error::{StoreError, ValidationError};
use crate::lookups::{self, SelectOption};
use crate::models::{User, NONE_MARKER};
use crate::storage::KeyValueStore;

/// Account form. The password pair is checked but never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub username: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: String,
    pub department: String,
    pub linked_contact: String,
    pub staff_status: bool,
}

impl Default for UserForm {
    fn default() -> Self {
        UserForm {
            username: String::new(),
            password: String::new(),
            password_confirmation: String::new(),
            role: String::new(),
            department: String::new(),
            linked_contact: String::new(),
            staff_status: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserLookups {
    pub roles: Vec<SelectOption>,
    pub departments: Vec<SelectOption>,
    pub contacts: Vec<SelectOption>,
}

fn unset_as_empty(value: &str) -> String {
    if value == NONE_MARKER {
        String::new()
    } else {
        value.to_string()
    }
}

fn empty_as_unset(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        NONE_MARKER.to_string()
    } else {
        value.to_string()
    }
}

impl EntityForm for UserForm {
    type Record = User;
    type Lookups = UserLookups;

    fn blank() -> Self {
        UserForm::default()
    }

    fn from_record(u: &User) -> Self {
        UserForm {
            username: u.username.clone(),
            role: unset_as_empty(&u.role),
            department: unset_as_empty(&u.department),
            linked_contact: u.linked_contact.clone(),
            staff_status: u.staff_status,
            ..UserForm::default()
        }
    }

    fn load_lookups(store: &dyn KeyValueStore) -> Result<UserLookups, StoreError> {
        let options = |names: Vec<String>| -> Vec<SelectOption> {
            names.iter().map(|n| SelectOption::same(n)).collect()
        };
        Ok(UserLookups {
            roles: options(lookups::role_names(store)?),
            departments: options(lookups::department_names(store)?),
            contacts: options(lookups::contact_names(store)?),
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("username", &self.username)?;
        if !self.password.is_empty() && self.password != self.password_confirmation {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }

    fn build(&self, existing: Option<&User>) -> User {
        User {
            id: existing.map_or(0, |u| u.id),
            username: self.username.trim().to_string(),
            role: empty_as_unset(&self.role),
            department: empty_as_unset(&self.department),
            linked_contact: self.linked_contact.trim().to_string(),
            staff_status: self.staff_status,
        }
    }
}
