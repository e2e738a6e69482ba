//! Mock sign-in: any non-empty email and password pair is accepted.

use tracing::info;

use crate::error::{AppError, StoreError, ValidationError};
use crate::storage::KeyValueStore;

/// Store key of the signed-in flag.
pub const AUTH_KEY: &str = "isAuthenticated";

/// Marks the session as signed in. Credentials are not checked or stored.
pub fn login(store: &dyn KeyValueStore, email: &str, password: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required { field: "email" }.into());
    }
    if password.is_empty() {
        return Err(ValidationError::Required { field: "password" }.into());
    }
    store.set(AUTH_KEY, "true")?;
    info!(email = email.trim(), "signed in");
    Ok(())
}

pub fn logout(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.remove(AUTH_KEY)?;
    info!("signed out");
    Ok(())
}

pub fn is_authenticated(store: &dyn KeyValueStore) -> Result<bool, StoreError> {
    Ok(store.get(AUTH_KEY)?.as_deref().map(str::trim) == Some("true"))
}

/// Fails with `NotSignedIn` unless a session is active.
pub fn require_auth(store: &dyn KeyValueStore) -> Result<(), AppError> {
    if is_authenticated(store)? {
        Ok(())
    } else {
        Err(AppError::NotSignedIn)
    }
}
