use tracing::info;

use super::{required, EntityForm, FormController, FormMode};
use crate::departments::{apply_rename, main_branch_for, name_options, normalize_parent};
use crate::error::{AppError, StoreError, ValidationError};
use crate::models::{Department, NONE_MARKER};
use crate::repository::Repository;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentForm {
    pub name: String,
    pub description: String,
    /// Parent name; empty for a top-level department.
    pub parent: String,
}

/// Names offered by the parent select.
#[derive(Debug, Clone, Default)]
pub struct DepartmentLookups {
    pub parents: Vec<String>,
}

impl EntityForm for DepartmentForm {
    type Record = Department;
    type Lookups = DepartmentLookups;

    fn blank() -> Self {
        DepartmentForm::default()
    }

    fn from_record(d: &Department) -> Self {
        DepartmentForm {
            name: d.name.clone(),
            description: d.description.clone(),
            parent: if d.parent == NONE_MARKER { String::new() } else { d.parent.clone() },
        }
    }

    fn load_lookups(store: &dyn KeyValueStore) -> Result<DepartmentLookups, StoreError> {
        let departments = Repository::<Department>::new(store).load_all()?;
        Ok(DepartmentLookups { parents: name_options(&departments) })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)
    }

    fn build(&self, existing: Option<&Department>) -> Department {
        let name = self.name.trim().to_string();
        let parent = normalize_parent(&self.parent);
        Department {
            id: existing.map_or(0, |d| d.id),
            main_branch: main_branch_for(&name, &parent),
            name,
            description: self.description.trim().to_string(),
            parent,
        }
    }

    /// Saves the row; a changed name is cascaded to children in the same write.
    fn persist(
        &self,
        repo: &Repository<'_, Department>,
        record: Department,
        existing: Option<&Department>,
    ) -> Result<Department, AppError> {
        let Some(old) = existing else {
            let taken = repo
                .load_all()?
                .iter()
                .any(|d| d.name.eq_ignore_ascii_case(&record.name));
            if taken {
                return Err(ValidationError::Duplicate { entity: "Department", name: record.name }.into());
            }
            return Ok(repo.upsert(record, false)?);
        };

        repo.mutate(|records| {
            let clash = records
                .iter()
                .any(|d| d.id != record.id && d.name.eq_ignore_ascii_case(&record.name));
            if clash {
                return Err(AppError::from(ValidationError::Duplicate {
                    entity: "Department",
                    name: record.name.clone(),
                }));
            }
            if old.name != record.name {
                let report = apply_rename(records, &old.name, &record.name);
                info!(old = %old.name, new = %record.name, children = report.children, "renamed department");
            }
            let slot = records
                .iter_mut()
                .find(|d| d.id == record.id)
                .ok_or(StoreError::NotFound { entity: "Department", id: record.id })?;
            *slot = record.clone();
            Ok(record)
        })
    }
}

impl<'s> FormController<'s, DepartmentForm> {
    fn refresh_after_parent_change(&mut self) -> Result<(), AppError> {
        self.lookups = DepartmentForm::load_lookups(self.repo.store())?;
        if let FormMode::Edit(id) = self.mode {
            self.original = self.repo.get(id)?;
        }
        Ok(())
    }

    /// Creates a top-level department and selects it as the parent.
    pub fn quick_add_parent(&mut self, name: &str) -> Result<Department, AppError> {
        let created = self.repo.quick_add(name)?;
        self.refresh_after_parent_change()?;
        self.fields.parent = created.name.clone();
        Ok(created)
    }

    /// Renames the selected parent department everywhere it is referenced.
    pub fn rename_parent(&mut self, new_name: &str) -> Result<(), AppError> {
        let old = self.fields.parent.trim().to_string();
        if old.is_empty() {
            return Err(ValidationError::Required { field: "parent" }.into());
        }
        self.repo.rename(&old, new_name)?;
        self.refresh_after_parent_change()?;
        self.fields.parent = new_name.trim().to_string();
        Ok(())
    }

    /// The selected parent's record, for navigating to its edit form.
    pub fn view_parent(&self) -> Result<Department, AppError> {
        self.repo.find_by_name(self.fields.parent.trim())
    }

    pub fn clear_parent(&mut self) {
        self.fields.parent.clear();
    }
}
