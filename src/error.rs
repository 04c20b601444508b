use thiserror::Error;

use crate::models::EntryKind;

/// Failures reported by the document store collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("no document to update: {collection}/{id}")]
    NotFound { collection: &'static str, id: String },
    #[error("corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },
    #[cfg(test)]
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures reported by the identity collaborator.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("password should be at least {0} characters")]
    WeakPassword(usize),
    #[error("email already in use: {0}")]
    EmailInUse(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("identity database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("identity service misconfigured: {0}")]
    Misconfigured(String),
}

/// Client-side input problems. These never reach the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),
    #[error("amount must be a number, got '{0}'")]
    InvalidAmount(String),
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not signed in")]
    NotSignedIn,
    #[error("no active project")]
    NoActiveProject,
    #[error("unknown project: {0}")]
    UnknownProject(String),
    #[error("unknown {}: {id}", .kind.as_str().to_lowercase())]
    UnknownEntry { kind: EntryKind, id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
