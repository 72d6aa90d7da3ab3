//! # Formwright UI
//!
//! Headless form host for Formwright.
//!
//! Nothing here draws pixels. Each component produces plain view models a
//! front end can render, and takes user actions as method calls.
//!
//! ## Components
//!
//! - **Renderer**: structure plus form state in, one control per field out
//! - **Editor**: add, update, delete and move fields on a working copy
//! - **Host**: view/edit-structure modes, submit, export/import, documents
//!

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod documents;
pub mod editor;
pub mod file_ops;
pub mod host;
pub mod renderer;
pub mod state;
pub mod submit;

// ============================================================================
// Re-exports
// ============================================================================

// Re-export internal crates for convenience
pub use formwright_core;
pub use formwright_schema;

pub use config::HostConfig;
pub use documents::{DocumentEntry, DocumentGenerator, DocumentRequest, TextTemplates};
pub use editor::{Direction, NewFieldDraft, StructureEditor, sequential_ids_for};
pub use file_ops::{read_structure_file, write_export};
pub use host::{
    EditorRow, EditorView, ExportedStructure, HostBody, HostBuilder, HostController, HostView,
    SubmitOutcome,
};
pub use renderer::{
    Button, Control, InputKind, RenderOptions, RenderedField, RenderedForm, SelectOption,
    render_form,
};
pub use state::{FormState, ModalSize, Mode, Notice, StatusLevel};
pub use submit::SubmitTask;

// ============================================================================
// Constants
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
