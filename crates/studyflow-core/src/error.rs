//! Core error types for studyflow-core.
//!
//! This module defines the error hierarchy using thiserror. The taxonomy
//! mirrors how failures surface to callers:
//! - [`ConfigurationError`]: user-fixable setup problems (no availability set)
//! - [`ValidationError`]: bad input from the caller, never retried
//! - [`NotFoundError`]: referenced record absent
//! - [`StoreError`]: storage-layer failures
//!
//! Degenerate arithmetic inputs (zero estimated hours when scoring, zero
//! remaining weight when solving a target grade) are not errors; those paths
//! return an absent value instead.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Setup problems the user can fix
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Invalid caller input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Storage-layer failures
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The weekly availability has no hours on any day
    #[error("availability not set")]
    AvailabilityNotSet,

    /// Failed to load the config file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save the config file
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// `actual_hours` is required when reporting partial progress
    #[error("actual_hours is required when status is partial")]
    MissingActualHours,

    /// A numeric field is outside its allowed range
    #[error("Invalid value for '{field}': {message}")]
    OutOfRange { field: &'static str, message: String },

    /// A required name field is empty
    #[error("{0} must not be empty")]
    EmptyName(&'static str),

    /// Progress can only be reported against a planned session
    #[error("Session '{session_id}' is already {status}, progress can only be reported once")]
    SessionNotPlanned { session_id: String, status: String },

    /// A progress event cannot carry the planned status
    #[error("Progress status must be one of completed, partial, missed")]
    InvalidProgressStatus,
}

/// Missing-record errors.
#[derive(Error, Debug)]
pub enum NotFoundError {
    #[error("Session '{0}' not found")]
    Session(String),

    #[error("Deliverable '{0}' not found")]
    Deliverable(String),

    #[error("Course '{0}' not found")]
    Course(String),
}

/// Storage-layer errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// The data directory could not be resolved or created
    #[error("Failed to prepare data directory: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(StoreError::Query(err))
    }
}
