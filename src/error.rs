use std::io;

use thiserror::Error;

/// Errors raised by the key/value store and the repositories on top of it.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a backing file failed.
    #[error("storage I/O failed for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// A record could not be turned into JSON.
    #[error("failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The text stored under a key is not valid JSON for its collection.
    #[error("stored data under '{key}' is malformed: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// An edit targeted an id that is not in the collection.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
}

/// Field-level input problems. These block persistence and are fixed by re-editing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("{entity} '{name}' already exists")]
    Duplicate { entity: &'static str, name: String },

    #[error("invalid date '{input}': use YYYY-MM-DD or 'today'")]
    InvalidDate { input: String },
}

/// Top-level error for commands and forms.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A name reference points at a record that no longer exists.
    #[error("{entity} record '{name}' not found")]
    MissingReference { entity: &'static str, name: String },

    #[error("not signed in; run `ifinance login <email> <password>` first")]
    NotSignedIn,
}

impl AppError {
    /// True for errors the user fixes by changing input rather than by retrying.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
