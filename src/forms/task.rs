use chrono::NaiveDate;

use super::{now_timestamp, required, EntityForm};
use crate::error::{StoreError, ValidationError};
use crate::lookups::{self, SelectOption};
use crate::models::{Priority, Task, TaskStatus};
use crate::pages::today;
use crate::storage::KeyValueStore;

/// Signed-in user recorded as the assigner of new tasks.
pub const DEFAULT_ASSIGNED_BY: &str = "Admin (admin)";

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Raw date input: `YYYY-MM-DD`, `today`, or empty.
    pub deadline: String,
    pub assigned_to: String,
    pub team: String,
    pub assigned_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct TaskLookups {
    pub users: Vec<SelectOption>,
    pub teams: Vec<String>,
}

/// Parses a deadline input. Empty means no deadline.
pub fn parse_deadline(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    if input.eq_ignore_ascii_case("today") {
        return Ok(Some(today()));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate { input: input.to_string() })
}

impl TaskForm {
    /// The calendar's "Today" shortcut.
    pub fn set_deadline_today(&mut self) {
        self.deadline = today().format("%Y-%m-%d").to_string();
    }
}

impl EntityForm for TaskForm {
    type Record = Task;
    type Lookups = TaskLookups;

    /// Opening a create form stamps its creation time.
    fn blank() -> Self {
        TaskForm {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            deadline: String::new(),
            assigned_to: String::new(),
            team: String::new(),
            assigned_by: DEFAULT_ASSIGNED_BY.to_string(),
            created_at: now_timestamp(),
        }
    }

    fn from_record(t: &Task) -> Self {
        TaskForm {
            title: t.title.clone(),
            description: t.description.clone(),
            priority: t.priority,
            status: t.status,
            deadline: t.deadline.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            assigned_to: t.assigned_to.clone(),
            team: t.team.clone(),
            assigned_by: t.assigned_by.clone(),
            created_at: t.created_at.clone(),
        }
    }

    fn load_lookups(store: &dyn KeyValueStore) -> Result<TaskLookups, StoreError> {
        Ok(TaskLookups {
            users: lookups::user_options(store)?,
            teams: lookups::team_names(store)?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        parse_deadline(&self.deadline)?;
        Ok(())
    }

    /// `updated_at` is refreshed on every save.
    fn build(&self, existing: Option<&Task>) -> Task {
        Task {
            id: existing.map_or(0, |t| t.id),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority,
            status: self.status,
            deadline: parse_deadline(&self.deadline).ok().flatten(),
            assigned_to: self.assigned_to.trim().to_string(),
            team: self.team.trim().to_string(),
            assigned_by: self.assigned_by.trim().to_string(),
            created_at: self.created_at.clone(),
            updated_at: now_timestamp(),
        }
    }
}
