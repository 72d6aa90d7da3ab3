//! Error types for Formwright
//!
//! This module provides unified error handling across the engine. Note that
//! a user typing an invalid value into a form is *not* an error here: those
//! outcomes are plain data produced by the validation engine. `FormError`
//! covers rejected operations, I/O and malformed files.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Formwright
#[derive(Debug, Error)]
pub enum FormError {
    // ========================================================================
    // Structure Editing Errors
    // ========================================================================
    /// A field cannot be added without a label
    #[error("Field label cannot be empty")]
    EmptyLabel,

    /// No field with the given id exists in the structure
    #[error("Field '{field}' not found in structure '{structure}'")]
    FieldNotFound { structure: String, field: String },

    /// A field id is used twice within one structure
    #[error("Duplicate field id: '{field}' already exists in structure '{structure}'")]
    DuplicateFieldId { structure: String, field: String },

    /// General structure validation error
    #[error("Structure validation error: {0}")]
    Validation(String),

    // ========================================================================
    // Host State Errors
    // ========================================================================
    /// The operation is only available in another host mode
    #[error("Operation '{operation}' requires {expected} mode")]
    WrongMode {
        operation: &'static str,
        expected: &'static str,
    },

    /// Structure editing is disabled for this host
    #[error("Structure editing is disabled for '{0}'")]
    EditingDisabled(String),

    /// A submission is still completing
    #[error("A submission is already in progress")]
    SubmitInFlight,

    /// An import is still being read
    #[error("An import is already in progress")]
    ImportInFlight,

    /// The host has been closed
    #[error("Host '{0}' is closed")]
    HostClosed(String),

    /// Document generation was requested before any data was submitted
    #[error("Please fill out the form before generating documents")]
    NothingToGenerate,

    /// An external collaborator reported a failure
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Structure file not found
    #[error("Structure file not found at path: {0}")]
    StructureNotFound(PathBuf),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file does not describe a structure
    #[error("Invalid structure file: {0}")]
    InvalidStructureFile(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Operation cancelled
    #[error("Operation cancelled")]
    Cancelled,
}

impl FormError {
    /// Create a structure validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        FormError::Validation(msg.into())
    }

    /// Create a field-not-found error
    pub fn field_not_found(structure: impl Into<String>, field: impl Into<String>) -> Self {
        FormError::FieldNotFound {
            structure: structure.into(),
            field: field.into(),
        }
    }

    /// Create a collaborator failure
    pub fn collaborator(collaborator: &'static str, msg: impl Into<String>) -> Self {
        FormError::Collaborator {
            collaborator,
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        FormError::Internal(msg.into())
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FormError::FieldNotFound { .. } | FormError::StructureNotFound(_)
        )
    }
}

/// Result type alias using FormError
pub type FormResult<T> = Result<T, FormError>;

// ============================================================================
// Tests
// ============================================================================
