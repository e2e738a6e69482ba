use super::{required, EntityForm};
use crate::error::{StoreError, ValidationError};
use crate::models::Role;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleForm {
    pub name: String,
    pub description: String,
    pub can_view_all_tasks: bool,
    pub can_view_all_teams: bool,
    pub is_team_lead_role: bool,
}

impl EntityForm for RoleForm {
    type Record = Role;
    type Lookups = ();

    fn blank() -> Self {
        RoleForm::default()
    }

    fn from_record(r: &Role) -> Self {
        RoleForm {
            name: r.name.clone(),
            description: r.description.clone(),
            can_view_all_tasks: r.can_view_all_tasks,
            can_view_all_teams: r.can_view_all_teams,
            is_team_lead_role: r.is_team_lead_role,
        }
    }

    fn load_lookups(_store: &dyn KeyValueStore) -> Result<(), StoreError> {
        Ok(())
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }

    fn build(&self, existing: Option<&Role>) -> Role {
        Role {
            id: existing.map_or(0, |r| r.id),
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            can_view_all_tasks: self.can_view_all_tasks,
            can_view_all_teams: self.can_view_all_teams,
            is_team_lead_role: self.is_team_lead_role,
        }
    }
}
