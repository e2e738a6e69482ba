//! Department-specific repository operations.
//!
//! Departments reference each other by *name*: `parent` holds the parent's
//! name (or `-`) and `main_branch` holds the top-level branch name. A
//! rename therefore has to rewrite every row that mentions the old name,
//! and must do so in one write so no half-renamed collection is persisted.

use tracing::info;

use crate::error::{AppError, StoreError, ValidationError};
use crate::models::{Department, Team, User, NONE_MARKER};
use crate::repository::Repository;
use crate::storage::KeyValueStore;

/// Description given to departments created from the parent quick-add.
pub const QUICK_ADD_DESCRIPTION: &str = "Created via Quick Add";

/// Maps an empty parent selection to the `-` marker.
pub fn normalize_parent(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        NONE_MARKER.to_string()
    } else {
        trimmed.to_string()
    }
}

/// A department's main branch is its parent, or itself when top-level.
pub fn main_branch_for(name: &str, parent: &str) -> String {
    if parent.is_empty() || parent == NONE_MARKER {
        name.to_string()
    } else {
        parent.to_string()
    }
}

/// Counts of rows touched by a rename.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameReport {
    pub renamed: usize,
    pub children: usize,
    pub branches: usize,
}

/// Rewrites `old` to `new` in names, then parents, then main branches.
pub fn apply_rename(records: &mut [Department], old: &str, new: &str) -> RenameReport {
    let mut report = RenameReport::default();
    for d in records.iter_mut() {
        if d.name == old {
            d.name = new.to_string();
            report.renamed += 1;
        }
    }
    for d in records.iter_mut() {
        if d.parent == old {
            d.parent = new.to_string();
            report.children += 1;
        }
    }
    for d in records.iter_mut() {
        if d.main_branch == old {
            d.main_branch = new.to_string();
            report.branches += 1;
        }
    }
    report
}

/// Distinct department names in collection order, for parent selects.
pub fn name_options(records: &[Department]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for d in records {
        if !names.contains(&d.name) {
            names.push(d.name.clone());
        }
    }
    names
}

fn name_taken(records: &[Department], name: &str, except: Option<&str>) -> bool {
    records
        .iter()
        .filter(|d| Some(d.name.as_str()) != except)
        .any(|d| d.name.to_lowercase() == name.to_lowercase())
}

impl<'s> Repository<'s, Department> {
    /// Renames a department and cascades the new name to every row referencing it.
    pub fn rename(&self, old: &str, new: &str) -> Result<RenameReport, AppError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        let report = self.mutate(|records| {
            if !records.iter().any(|d| d.name == old) {
                return Err(AppError::MissingReference { entity: "Department", name: old.to_string() });
            }
            if new != old && name_taken(records, new, Some(old)) {
                return Err(ValidationError::Duplicate { entity: "Department", name: new.to_string() }.into());
            }
            Ok(apply_rename(records, old, new))
        })?;
        info!(old, new, children = report.children, "renamed department");
        Ok(report)
    }

    /// Creates a top-level department from the parent picker's quick-add.
    pub fn quick_add(&self, name: &str) -> Result<Department, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        if name_taken(&self.load_all()?, name, None) {
            return Err(ValidationError::Duplicate { entity: "Department", name: name.to_string() }.into());
        }
        let dept = Department {
            id: 0,
            name: name.to_string(),
            description: QUICK_ADD_DESCRIPTION.to_string(),
            parent: NONE_MARKER.to_string(),
            main_branch: name.to_string(),
        };
        Ok(self.upsert(dept, false)?)
    }

    /// Looks a department up by name, as the "view parent" action does.
    pub fn find_by_name(&self, name: &str) -> Result<Department, AppError> {
        self.load_all()?
            .into_iter()
            .find(|d| d.name == name)
            .ok_or_else(|| AppError::MissingReference { entity: "Department", name: name.to_string() })
    }
}

/// Rows outside the department collection rewritten by a reference cascade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceReport {
    pub users: usize,
    pub teams: usize,
}

/// Rewrites `User.department` and `Team.department` from `old` to `new`.
///
/// A department rename alone leaves these stale; callers opt into this step explicitly.
pub fn cascade_department_references(
    store: &dyn KeyValueStore,
    old: &str,
    new: &str,
) -> Result<ReferenceReport, StoreError> {
    let users = Repository::<User>::new(store).mutate(|users| {
        let mut n = 0;
        for u in users.iter_mut().filter(|u| u.department == old) {
            u.department = new.to_string();
            n += 1;
        }
        Ok::<_, StoreError>(n)
    })?;
    let teams = Repository::<Team>::new(store).mutate(|teams| {
        let mut n = 0;
        for t in teams.iter_mut().filter(|t| t.department == old) {
            t.department = new.to_string();
            n += 1;
        }
        Ok::<_, StoreError>(n)
    })?;
    info!(old, new, users, teams, "cascaded department rename to references");
    Ok(ReferenceReport { users, teams })
}
