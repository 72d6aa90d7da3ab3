//! Form host controller
//!
//! Owns the committed `Structure`, the form state and the host mode, and
//! orchestrates the renderer, the structure editor, export/import and the
//! external collaborators (submit, save, close, document generation).
//!
//! The editor works on its own copy. Entering edit mode loads the committed
//! structure into it, `save_edits` commits the copy and calls `on_save`, and
//! leaving edit mode any other way discards it. Export always writes the
//! committed structure.

use crate::config::HostConfig;
use crate::documents::{DocumentGenerator, DocumentRequest};
use crate::editor::{StructureEditor, sequential_ids_for};
use crate::file_ops;
use crate::renderer::{RenderOptions, RenderedForm, render_form};
use crate::state::{FormState, ModalSize, Mode, Notice};
use crate::submit::SubmitTask;
use formwright_core::{
    Category, Clock, FieldType, FieldValue, FormData, FormError, FormResult, IdGenerator,
    SystemClock, Validatable,
};
use formwright_schema::serialization::{
    INVALID_FILE_NOTICE, export_file_name_with_suffix, import_structure, import_structure_bytes,
};
use formwright_schema::{Field, FieldError, Structure, export_structure};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fallback hint lines shown when a structure has no fields
pub const EMPTY_HINT: [&str; 2] = [
    "No custom fields defined.",
    "Click the edit button to add fields and customize this modal.",
];

/// Notice when documents are requested with nothing submitted
pub const NOTHING_TO_GENERATE_NOTICE: &str = "Please fill out the form before generating documents";

/// Notice when no template matches the host
pub const NO_TEMPLATE_NOTICE: &str = "No document template available for this form type";

/// Notice when the generator fails
pub const GENERATION_FAILED_NOTICE: &str = "Error generating document. Please try again.";

pub type SubmitCallback = Box<dyn FnMut(&FormData) + Send>;
pub type SaveCallback = Box<dyn FnMut(&Structure) + Send>;
pub type CloseCallback = Box<dyn FnMut() + Send>;

// ============================================================================
// Outcomes and views
// ============================================================================

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Values were handed to `on_submit`; the host closes after the delay
    Accepted(FormData),
    /// Validation failed; these errors are now visible
    Invalid(Vec<FieldError>),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }
}

/// An exported structure ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedStructure {
    pub file_name: String,
    pub json: String,
}

/// One row of the editor's field list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorRow {
    pub id: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub order: i64,
    pub expanded: bool,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

/// The editor as it should be drawn; rows follow array position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorView {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub rows: Vec<EditorRow>,
}

impl EditorView {
    fn new(editor: &StructureEditor) -> Self {
        let structure = editor.structure();
        let last = structure.field_count().saturating_sub(1);
        let rows = structure
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| EditorRow {
                id: field.id.clone(),
                label: field.label.clone(),
                field_type: field.field_type,
                required: field.required,
                order: field.order,
                expanded: editor.editing() == Some(field.id.as_str()),
                can_move_up: index > 0,
                can_move_down: index < last,
            })
            .collect();

        Self {
            title: structure.title.clone(),
            description: structure.description.clone(),
            category: structure.category.clone(),
            rows,
        }
    }
}

/// Main content of the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "body", rename_all = "camelCase")]
pub enum HostBody {
    Form {
        description: Option<String>,
        form: RenderedForm,
    },
    Fallback {
        description: Option<String>,
        content: Option<String>,
        hint: Option<[&'static str; 2]>,
    },
    Editor(EditorView),
}

/// Everything a front end needs to draw the host
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostView {
    pub title: String,
    pub size: ModalSize,
    pub mode: Mode,
    pub show_mode_toggle: bool,
    pub show_generate_document: bool,
    pub loading: bool,
    pub body: HostBody,
    pub notice: Option<Notice>,
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`HostController`]
pub struct HostBuilder {
    id: String,
    title: String,
    category: String,
    description: Option<String>,
    fields: Vec<Field>,
    initial_data: FormData,
    config: HostConfig,
    ids: Option<Box<dyn IdGenerator>>,
    clock: Arc<dyn Clock>,
    on_submit: Option<SubmitCallback>,
    on_save: Option<SaveCallback>,
    on_close: Option<CloseCallback>,
    generator: Option<Arc<dyn DocumentGenerator>>,
    fallback: Option<String>,
}

impl HostBuilder {
    fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: Category::DEFAULT_KEY.to_string(),
            description: None,
            fields: Vec::new(),
            initial_data: FormData::new(),
            config: HostConfig::default(),
            ids: None,
            clock: Arc::new(SystemClock),
            on_submit: None,
            on_save: None,
            on_close: None,
            generator: None,
            fallback: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn initial_data(mut self, data: FormData) -> Self {
        self.initial_data = data;
        self
    }

    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn on_submit(mut self, f: impl FnMut(&FormData) + Send + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    pub fn on_save(mut self, f: impl FnMut(&Structure) + Send + 'static) -> Self {
        self.on_save = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn document_generator(mut self, generator: impl DocumentGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Content shown in view mode while the structure has no fields
    pub fn fallback(mut self, content: impl Into<String>) -> Self {
        self.fallback = Some(content.into());
        self
    }

    /// Build an open host in view mode
    pub fn build(self) -> FormResult<HostController> {
        let mut structure = Structure::new(&self.id, &self.title)
            .with_category(self.category)
            .with_fields(self.fields)
            .with_last_modified(self.clock.now());
        structure.description = self.description;
        structure.validate()?;

        let ids = self
            .ids
            .unwrap_or_else(|| Box::new(sequential_ids_for(&structure)));
        let editor = StructureEditor::with_sources(structure.clone(), ids, self.clock.clone());
        debug!(host = %structure.id, fields = structure.field_count(), "Built host");

        Ok(HostController {
            form: FormState::new(self.initial_data.clone()),
            data: self.initial_data,
            structure,
            editor,
            mode: Mode::View,
            open: true,
            loading: false,
            importing: false,
            notice: None,
            config: self.config,
            clock: self.clock,
            submit_task: SubmitTask::default(),
            on_submit: self.on_submit,
            on_save: self.on_save,
            on_close: self.on_close,
            generator: self.generator,
            fallback: self.fallback,
        })
    }
}

// ============================================================================
// HostController
// ============================================================================

/// Two-mode form host
pub struct HostController {
    structure: Structure,
    editor: StructureEditor,
    mode: Mode,
    form: FormState,
    /// Initial data, then the last accepted submission
    data: FormData,
    open: bool,
    loading: bool,
    importing: bool,
    notice: Option<Notice>,
    config: HostConfig,
    clock: Arc<dyn Clock>,
    submit_task: SubmitTask,
    on_submit: Option<SubmitCallback>,
    on_save: Option<SaveCallback>,
    on_close: Option<CloseCallback>,
    generator: Option<Arc<dyn DocumentGenerator>>,
    fallback: Option<String>,
}

impl HostController {
    pub fn builder(id: impl Into<String>, title: impl Into<String>) -> HostBuilder {
        HostBuilder::new(id, title)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.structure.id
    }

    /// The committed structure
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Initial data, or the last accepted submission
    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_importing(&self) -> bool {
        self.importing
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    fn ensure_open(&self) -> FormResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(FormError::HostClosed(self.structure.id.clone()))
        }
    }

    fn ensure_mode(&self, operation: &'static str, expected: Mode) -> FormResult<()> {
        self.ensure_open()?;
        if self.mode == expected {
            Ok(())
        } else {
            Err(FormError::WrongMode {
                operation,
                expected: expected.as_str(),
            })
        }
    }

    fn ensure_idle(&self) -> FormResult<()> {
        if self.loading {
            Err(FormError::SubmitInFlight)
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Reopen in view mode with the form reset to the current data
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        self.mode = Mode::View;
        self.form.reset(self.data.clone());
        debug!(host = %self.structure.id, "Opened host");
    }

    /// Close the host, aborting a pending submit completion
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.submit_task.abort();
        self.loading = false;
        self.open = false;
        self.importing = false;
        if let Some(on_close) = self.on_close.as_mut() {
            on_close();
        }
        debug!(host = %self.structure.id, "Closed host");
    }

    // ========================================================================
    // Mode
    // ========================================================================

    /// Switch between view and edit-structure.
    ///
    /// Leaving edit mode this way discards unsaved edits.
    pub fn toggle_mode(&mut self) -> FormResult<Mode> {
        self.ensure_open()?;
        if !self.config.can_toggle_mode() {
            warn!(host = %self.structure.id, "Mode toggle is disabled");
            return Err(FormError::EditingDisabled(self.structure.id.clone()));
        }
        self.ensure_idle()?;

        self.mode = self.mode.toggled();
        if self.mode == Mode::EditStructure {
            self.editor.load(self.structure.clone());
        }
        self.importing = false;
        debug!(host = %self.structure.id, mode = %self.mode, "Switched mode");
        Ok(self.mode)
    }

    pub fn set_mode(&mut self, mode: Mode) -> FormResult<Mode> {
        if self.mode == mode {
            self.ensure_open()?;
            return Ok(mode);
        }
        self.toggle_mode()
    }

    // ========================================================================
    // Structure editing
    // ========================================================================

    pub fn editor(&self) -> FormResult<&StructureEditor> {
        self.ensure_mode("edit structure", Mode::EditStructure)?;
        Ok(&self.editor)
    }

    pub fn editor_mut(&mut self) -> FormResult<&mut StructureEditor> {
        self.ensure_mode("edit structure", Mode::EditStructure)?;
        Ok(&mut self.editor)
    }

    /// Commit the editor's copy, call `on_save` and return to view mode
    pub fn save_edits(&mut self) -> FormResult<()> {
        self.ensure_mode("save structure", Mode::EditStructure)?;
        let structure = self.editor.structure().clone();
        structure.validate()?;

        if let Some(on_save) = self.on_save.as_mut() {
            on_save(&structure);
        }
        info!(
            host = %structure.id,
            fields = structure.field_count(),
            "Saved structure"
        );
        self.structure = structure;
        self.mode = Mode::View;
        Ok(())
    }

    /// Drop unsaved edits and return to view mode
    pub fn cancel_edits(&mut self) -> FormResult<()> {
        self.ensure_mode("cancel edits", Mode::EditStructure)?;
        self.editor.load(self.structure.clone());
        self.mode = Mode::View;
        self.importing = false;
        Ok(())
    }

    // ========================================================================
    // Form
    // ========================================================================

    pub fn set_value(&mut self, field_id: &str, value: impl Into<FieldValue>) -> FormResult<()> {
        self.ensure_mode("set value", Mode::View)?;
        self.ensure_idle()?;
        self.form.set_value(field_id, value);
        Ok(())
    }

    /// Validate and, when clean, hand the values to `on_submit` and start
    /// the delayed close.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit(&mut self) -> FormResult<SubmitOutcome> {
        self.ensure_mode("submit", Mode::View)?;
        self.ensure_idle()?;

        let Some(data) = self.form.submit(&self.structure) else {
            debug!(
                host = %self.structure.id,
                errors = self.form.errors.len(),
                "Submit rejected by validation"
            );
            return Ok(SubmitOutcome::Invalid(self.form.errors.clone()));
        };

        self.submit_task = SubmitTask::delay(self.config.submit_delay())?;
        self.loading = true;
        self.data = data.clone();
        if let Some(on_submit) = self.on_submit.as_mut() {
            on_submit(&data);
        }
        info!(host = %self.structure.id, values = data.len(), "Submitted form");
        Ok(SubmitOutcome::Accepted(data))
    }

    /// Wait for the submit delay, then clear loading and close
    pub async fn finish_submit(&mut self) -> FormResult<()> {
        self.submit_task.wait().await?;
        self.loading = false;
        self.close();
        Ok(())
    }

    // ========================================================================
    // Export / import
    // ========================================================================

    /// Serialize the committed structure
    pub fn export(&self) -> FormResult<ExportedStructure> {
        self.ensure_mode("export", Mode::EditStructure)?;
        Ok(ExportedStructure {
            file_name: export_file_name_with_suffix(&self.structure.id, &self.config.export_suffix),
            json: export_structure(&self.structure)?,
        })
    }

    /// Export into `dir`, returning the written path
    pub async fn export_to_dir(&self, dir: &Path) -> FormResult<PathBuf> {
        let exported = self.export()?;
        file_ops::write_export(dir, &exported.file_name, &exported.json).await
    }

    /// Replace the structure with a JSON document, keeping the host id.
    ///
    /// On failure the structure is unchanged and an error notice is set.
    pub fn import_json(&mut self, json: &str) -> FormResult<()> {
        self.ensure_mode("import", Mode::EditStructure)?;
        let imported = import_structure(json, &self.structure.id, self.clock.as_ref());
        self.apply_import(imported)
    }

    /// Mark an import as started
    pub fn begin_import(&mut self) -> FormResult<()> {
        self.ensure_mode("import", Mode::EditStructure)?;
        if self.importing {
            return Err(FormError::ImportInFlight);
        }
        self.importing = true;
        Ok(())
    }

    /// Complete a started import with the bytes that were read
    pub fn finish_import(&mut self, bytes: &[u8]) -> FormResult<()> {
        if !self.importing {
            return Err(FormError::internal("no import in progress"));
        }
        self.importing = false;
        self.ensure_mode("import", Mode::EditStructure)?;
        let imported = import_structure_bytes(bytes, &self.structure.id, self.clock.as_ref());
        self.apply_import(imported)
    }

    /// Read and import a structure file
    pub async fn import_file(&mut self, path: &Path) -> FormResult<()> {
        self.begin_import()?;
        match file_ops::read_structure_file(path).await {
            Ok(bytes) => self.finish_import(&bytes),
            Err(e) => {
                self.importing = false;
                warn!(host = %self.structure.id, error = %e, "Could not read structure file");
                self.notice = Some(Notice::error(INVALID_FILE_NOTICE));
                Err(e)
            }
        }
    }

    fn apply_import(&mut self, imported: FormResult<Structure>) -> FormResult<()> {
        match imported {
            Ok(structure) => {
                info!(
                    host = %structure.id,
                    fields = structure.field_count(),
                    "Imported structure"
                );
                self.editor.load(structure.clone());
                self.structure = structure;
                Ok(())
            }
            Err(e) => {
                warn!(host = %self.structure.id, error = %e, "Rejected structure import");
                self.notice = Some(Notice::error(INVALID_FILE_NOTICE));
                Err(e)
            }
        }
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Ask the document generator for a document built from the current data.
    ///
    /// `Ok(None)` means no template applies; a notice says so.
    pub fn generate_document(&mut self) -> FormResult<Option<String>> {
        self.ensure_mode("generate document", Mode::View)?;
        if self.data.is_empty() {
            self.notice = Some(Notice::warning(NOTHING_TO_GENERATE_NOTICE));
            return Err(FormError::NothingToGenerate);
        }

        let host_id = self.structure.id.as_str();
        let template = self
            .generator
            .as_ref()
            .and_then(|g| g.template_for(host_id).map(|t| (g.clone(), t)));
        let Some((generator, template)) = template else {
            debug!(host = %host_id, "No document template");
            self.notice = Some(Notice::warning(NO_TEMPLATE_NOTICE));
            return Ok(None);
        };

        let request = DocumentRequest::new(&self.structure, &self.data);
        match generator.generate(&template, &request) {
            Ok(document) => {
                info!(host = %host_id, entries = request.entries.len(), "Generated document");
                Ok(Some(document))
            }
            Err(message) => {
                warn!(host = %host_id, error = %message, "Document generation failed");
                self.notice = Some(Notice::error(GENERATION_FAILED_NOTICE));
                Err(FormError::collaborator("document generator", message))
            }
        }
    }

    // ========================================================================
    // View
    // ========================================================================

    /// What to draw, or `None` while closed
    pub fn view(&self) -> Option<HostView> {
        if !self.open {
            return None;
        }

        let description = self.structure.description.clone();
        let body = match self.mode {
            Mode::EditStructure => HostBody::Editor(EditorView::new(&self.editor)),
            Mode::View if self.structure.is_empty() => HostBody::Fallback {
                description,
                content: self.fallback.clone(),
                hint: self.config.allow_edit.then_some(EMPTY_HINT),
            },
            Mode::View => HostBody::Form {
                description,
                form: render_form(
                    &self.structure,
                    &self.form,
                    &RenderOptions {
                        submit_label: self.config.submit_label.clone(),
                        cancel_label: self.config.cancel_label.clone(),
                        loading: self.loading,
                    },
                ),
            },
        };

        Some(HostView {
            title: self.structure.title.clone(),
            size: self.config.size,
            mode: self.mode,
            show_mode_toggle: self.config.can_toggle_mode(),
            show_generate_document: self.mode == Mode::View && !self.data.is_empty(),
            loading: self.loading,
            body,
            notice: self.notice.clone(),
        })
    }
}

impl std::fmt::Debug for HostController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostController")
            .field("id", &self.structure.id)
            .field("mode", &self.mode)
            .field("open", &self.open)
            .field("loading", &self.loading)
            .field("importing", &self.importing)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
