//! Create/edit forms for every entity.
//!
//! Each entity provides an [`EntityForm`]: its editable fields, the lookup
//! lists its selects need, validation and the mapping back to a record.
//! [`FormController`] drives the shared lifecycle around it:
//!
//! ```text
//! LoadingLookups -> Populated (create | edit) -> Submitting -> Populated
//! ```
//!
//! and applies the three save modes after a successful write.

pub mod contact;
pub mod department;
pub mod role;
pub mod submission;
pub mod task;
pub mod team;
pub mod user;

use chrono::{SecondsFormat, Utc};
use clap::ValueEnum;
use tracing::{debug, warn};

use crate::error::{AppError, StoreError, ValidationError};
use crate::models::Entity;
use crate::repository::Repository;
use crate::storage::KeyValueStore;

pub use contact::ContactForm;
pub use department::DepartmentForm;
pub use role::RoleForm;
pub use submission::SubmissionForm;
pub use task::TaskForm;
pub use team::TeamForm;
pub use user::UserForm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    LoadingLookups,
    Populated,
    Submitting,
}

/// What happens after a successful save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SaveMode {
    /// Return to the list.
    #[default]
    SaveAndList,
    /// Reset to an empty create form.
    SaveAndAddAnother,
    /// Stay on the saved record in edit mode.
    SaveAndContinue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    ShowList,
    AddAnother,
    ContinueEditing(u64),
}

/// Current time as an ISO 8601 UTC timestamp with milliseconds.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Trims `value` and fails with `Required` when nothing is left.
pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required { field })
    } else {
        Ok(())
    }
}

/// Field state of one entity's form.
pub trait EntityForm: Sized {
    type Record: Entity;
    /// Option lists the form's selects offer.
    type Lookups;

    /// Defaults of a fresh create form.
    fn blank() -> Self;

    fn from_record(record: &Self::Record) -> Self;

    fn load_lookups(store: &dyn KeyValueStore) -> Result<Self::Lookups, StoreError>;

    fn validate(&self) -> Result<(), ValidationError>;

    /// Builds the record to store. `existing` is the row being edited, if any.
    fn build(&self, existing: Option<&Self::Record>) -> Self::Record;

    /// Writes `record`. Forms with side effects on other rows override this.
    fn persist(
        &self,
        repo: &Repository<'_, Self::Record>,
        record: Self::Record,
        existing: Option<&Self::Record>,
    ) -> Result<Self::Record, AppError> {
        Ok(repo.upsert(record, existing.is_some())?)
    }
}

pub struct FormController<'s, F: EntityForm> {
    repo: Repository<'s, F::Record>,
    fields: F,
    lookups: F::Lookups,
    mode: FormMode,
    phase: FormPhase,
    original: Option<F::Record>,
    saved: Option<F::Record>,
    notice: Option<String>,
}

impl<'s, F: EntityForm> FormController<'s, F> {
    /// Opens a create form (`id` absent) or an edit form pre-filled from row `id`.
    ///
    /// An id with no row leaves a notice and falls back to a create form.
    pub fn open(store: &'s dyn KeyValueStore, id: Option<u64>) -> Result<Self, AppError> {
        let repo = Repository::<F::Record>::new(store);
        let mut phase = FormPhase::LoadingLookups;
        debug!(entity = F::Record::LABEL, ?phase, "opening form");
        let lookups = F::load_lookups(store)?;

        let mut notice = None;
        let (fields, mode, original) = match id {
            None => (F::blank(), FormMode::Create, None),
            Some(id) => match repo.get(id)? {
                Some(record) => (F::from_record(&record), FormMode::Edit(id), Some(record)),
                None => {
                    warn!(entity = F::Record::LABEL, id, "edit target missing, opening create form");
                    notice = Some(format!("{} {} not found; creating a new one", F::Record::LABEL, id));
                    (F::blank(), FormMode::Create, None)
                }
            },
        };
        phase = FormPhase::Populated;

        Ok(FormController { repo, fields, lookups, mode, phase, original, saved: None, notice })
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut F {
        &mut self.fields
    }

    pub fn lookups(&self) -> &F::Lookups {
        &self.lookups
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// The row being edited, as last loaded or saved.
    pub fn original(&self) -> Option<&F::Record> {
        self.original.as_ref()
    }

    /// The record written by the last successful submit.
    pub fn last_saved(&self) -> Option<&F::Record> {
        self.saved.as_ref()
    }

    pub fn repository(&self) -> &Repository<'s, F::Record> {
        &self.repo
    }

    /// One-shot message left by `open`; returns it once.
    pub fn take_notice(&mut self) -> Option<String> {
        self.notice.take()
    }

    /// Validates, writes, then moves to the state `save` asks for.
    ///
    /// On any error the fields are left as the user entered them.
    pub fn submit(&mut self, save: SaveMode) -> Result<SaveOutcome, AppError> {
        self.fields.validate()?;

        self.phase = FormPhase::Submitting;
        let record = self.fields.build(self.original.as_ref());
        let result = self.fields.persist(&self.repo, record, self.original.as_ref());
        self.phase = FormPhase::Populated;
        let saved = result?;
        debug!(entity = F::Record::LABEL, id = saved.id(), ?save, "saved form");

        let outcome = match save {
            SaveMode::SaveAndList => SaveOutcome::ShowList,
            SaveMode::SaveAndAddAnother => {
                self.fields = F::blank();
                self.mode = FormMode::Create;
                self.original = None;
                SaveOutcome::AddAnother
            }
            SaveMode::SaveAndContinue => {
                let id = saved.id();
                self.fields = F::from_record(&saved);
                self.mode = FormMode::Edit(id);
                self.original = Some(saved.clone());
                SaveOutcome::ContinueEditing(id)
            }
        };
        self.saved = Some(saved);
        Ok(outcome)
    }
}
