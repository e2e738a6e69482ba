use std::path::Path;

use super::{now_timestamp, required, EntityForm};
use crate::error::{StoreError, ValidationError};
use crate::lookups;
use crate::models::TaskSubmission;
use crate::storage::KeyValueStore;

pub const DEFAULT_SUBMITTED_BY: &str = "syedaalin (Admin)";

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionForm {
    /// Title of the task being submitted against.
    pub task: String,
    pub submission_note: String,
    pub submission_file: Option<String>,
    pub submitted_by: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionLookups {
    pub tasks: Vec<String>,
}

impl SubmissionForm {
    /// Records the attachment's file name. The file itself is not read or copied.
    pub fn attach(&mut self, path: &Path) {
        self.submission_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .filter(|name| !name.is_empty());
    }
}

impl EntityForm for SubmissionForm {
    type Record = TaskSubmission;
    type Lookups = SubmissionLookups;

    fn blank() -> Self {
        SubmissionForm {
            task: String::new(),
            submission_note: String::new(),
            submission_file: None,
            submitted_by: DEFAULT_SUBMITTED_BY.to_string(),
            created_at: now_timestamp(),
        }
    }

    fn from_record(s: &TaskSubmission) -> Self {
        SubmissionForm {
            task: s.task.clone(),
            submission_note: s.submission_note.clone(),
            submission_file: s.submission_file.clone(),
            submitted_by: s.submitted_by.clone(),
            created_at: s.created_at.clone(),
        }
    }

    fn load_lookups(store: &dyn KeyValueStore) -> Result<SubmissionLookups, StoreError> {
        Ok(SubmissionLookups { tasks: lookups::task_titles(store)? })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("task", &self.task)
    }

    fn build(&self, existing: Option<&TaskSubmission>) -> TaskSubmission {
        TaskSubmission {
            id: existing.map_or(0, |s| s.id),
            task: self.task.trim().to_string(),
            submission_note: self.submission_note.trim().to_string(),
            submission_file: self.submission_file.clone(),
            submitted_by: self.submitted_by.trim().to_string(),
            created_at: self.created_at.clone(),
        }
    }
}
