//! # Formwright Core
//!
//! Core types, traits, and error handling for Formwright.
//!
//! This crate provides the foundational building blocks used throughout
//! the Formwright crates, including:
//!
//! - **Types**: the closed `FieldType` set, dynamic `FieldValue`s and `FormData`
//! - **Traits**: `Validatable`, `Timestamped`, and the
//!   injectable `Clock` and `IdGenerator`
//! - **Errors**: Unified error handling with `FormError` and `FormResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{FormError, FormResult};
pub use traits::{
    Clock, IdGenerator, ManualClock, SequentialIds, SystemClock, Timestamped,
    UuidIds, Validatable,
};
pub use types::{Category, FieldType, FieldValue, FileRef, FormData};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
