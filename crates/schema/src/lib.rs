//! # Formwright Schema
//!
//! The form data model and everything that operates on it without a UI:
//!
//! - **Field**: a single typed, orderable input descriptor
//! - **Structure**: the ordered collection of fields plus metadata for one form
//! - **Validation engine**: `validate_field` / `validate_form`, which turn a
//!   candidate value into zero or one user-facing message
//! - **Lint**: authoring checks over a whole structure
//! - **Serialization**: JSON export, file save/load, and host import
//!

pub mod field;
pub mod lint;
pub mod serialization;
pub mod structure;
pub mod validation;

pub use field::{Field, FieldPatch, FieldRules, parse_options};
pub use lint::{
    ValidationError, ValidationErrorCode, ValidationResult, ValidationRule, ValidationWarning,
    ValidationWarningCode, Validator, lint_structure,
};
pub use serialization::{
    export_file_name, export_structure, import_structure, load_structure, parse_structure,
    save_structure,
};
pub use structure::Structure;
pub use validation::{FieldError, validate_field, validate_form};

// Re-export core types that are commonly used with structures
pub use formwright_core::{
    Category, Clock, FieldType, FieldValue, FileRef, FormData, FormError, FormResult, Timestamped,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Category, Field, FieldError, FieldPatch, FieldRules, FieldType, FieldValue, FormData,
        FormError, FormResult, Structure, Timestamped, Validator, validate_field, validate_form,
    };
}
