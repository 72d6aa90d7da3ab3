//! Structure editor
//!
//! Works on a private copy of a `Structure`. Every structural change bumps
//! `lastModified` through the injected clock; nothing reaches the host until
//! the copy is saved.
//!
//! Order policy: delete leaves gaps, move renumbers every field to its array
//! index, and add always lands after the current maximum so a new field is
//! last both in the array and on screen.

use formwright_core::{
    Clock, FieldType, FormError, FormResult, IdGenerator, SequentialIds, SystemClock, Timestamped,
};
use formwright_schema::{Field, FieldPatch, Structure, parse_options};
use std::sync::Arc;
use tracing::{debug, warn};

// ============================================================================
// Draft and direction
// ============================================================================

/// The "add new field" inputs
#[derive(Debug, Clone, PartialEq)]
pub struct NewFieldDraft {
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    /// Newline-separated options, used for select fields
    pub options_text: String,
}

impl Default for NewFieldDraft {
    fn default() -> Self {
        Self {
            field_type: FieldType::Text,
            label: String::new(),
            placeholder: String::new(),
            required: false,
            options_text: String::new(),
        }
    }
}

impl NewFieldDraft {
    pub fn new(field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            field_type,
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_options_text(mut self, text: impl Into<String>) -> Self {
        self.options_text = text.into();
        self
    }
}

/// Direction of a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("Unknown direction '{}' (expected up or down)", other)),
        }
    }
}

// ============================================================================
// StructureEditor
// ============================================================================

/// Sequential ids that never reissue a `field_N` at or below those in use
pub fn sequential_ids_for(structure: &Structure) -> SequentialIds {
    SequentialIds::default().resume_after(structure.fields.iter().map(|f| f.id.as_str()))
}

/// Mutates a working copy of a structure
pub struct StructureEditor {
    structure: Structure,
    ids: Box<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    editing: Option<String>,
    draft: NewFieldDraft,
}

impl StructureEditor {
    /// Edit `structure` with sequential ids and the system clock.
    ///
    /// Numbering resumes after the highest `field_N` already present.
    pub fn new(structure: Structure) -> Self {
        let ids = sequential_ids_for(&structure);
        Self::with_sources(structure, Box::new(ids), Arc::new(SystemClock))
    }

    /// Edit `structure` with injected id and time sources
    pub fn with_sources(
        structure: Structure,
        ids: Box<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            structure,
            ids,
            clock,
            editing: None,
            draft: NewFieldDraft::default(),
        }
    }

    /// Replace the working copy, discarding unsaved edits
    pub fn load(&mut self, structure: Structure) {
        self.structure = structure;
        self.editing = None;
    }

    /// The working copy
    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Take the working copy
    pub fn into_structure(self) -> Structure {
        self.structure
    }

    fn touch(&mut self) {
        self.structure.touch(self.clock.as_ref());
    }

    // ========================================================================
    // Structure metadata
    // ========================================================================

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.structure.title = title.into();
        self.touch();
    }

    /// Set the description; an empty string clears it
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        self.structure.description = (!description.is_empty()).then_some(description);
        self.touch();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.structure.category = category.into();
        self.touch();
    }

    // ========================================================================
    // New field draft
    // ========================================================================

    pub fn draft(&self) -> &NewFieldDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut NewFieldDraft {
        &mut self.draft
    }

    pub fn set_draft(&mut self, draft: NewFieldDraft) {
        self.draft = draft;
    }

    fn fresh_id(&mut self) -> String {
        loop {
            let id = self.ids.next_id();
            if !self.structure.has_field(&id) {
                return id;
            }
            debug!(id = %id, "Generated id already in use, skipping");
        }
    }

    /// Append a field built from the draft and reset the draft.
    ///
    /// Returns the new field's id. A blank label is rejected and the draft
    /// is kept so the user can fix it.
    pub fn add_field(&mut self) -> FormResult<String> {
        if self.draft.label.trim().is_empty() {
            warn!(structure = %self.structure.id, "Rejected field without label");
            return Err(FormError::EmptyLabel);
        }

        if !self.structure.has_order_headroom() {
            warn!(structure = %self.structure.id, "Order values exhausted, renumbering fields");
            self.structure.renormalize_order();
        }

        let draft = std::mem::take(&mut self.draft);
        let mut field = Field::new(self.fresh_id(), draft.field_type, draft.label)
            .with_order(self.structure.next_order());
        if draft.required {
            field = field.required();
        }
        if !draft.placeholder.is_empty() {
            field = field.with_placeholder(draft.placeholder);
        }
        if draft.field_type.uses_options() {
            field = field.with_options(parse_options(&draft.options_text));
        }

        let id = field.id.clone();
        self.structure.push_field(field)?;
        self.touch();
        debug!(structure = %self.structure.id, field = %id, "Added field");
        Ok(id)
    }

    /// Set the draft and add it in one step
    pub fn add(&mut self, draft: NewFieldDraft) -> FormResult<String> {
        self.draft = draft;
        self.add_field()
    }

    /// Merge `patch` into the field with `field_id`; order is untouched
    pub fn update_field(&mut self, field_id: &str, patch: &FieldPatch) -> FormResult<()> {
        let structure_id = self.structure.id.clone();
        let field = self
            .structure
            .get_field_mut(field_id)
            .ok_or_else(|| FormError::field_not_found(structure_id, field_id))?;
        patch.apply(field);
        self.touch();
        debug!(structure = %self.structure.id, field = %field_id, "Updated field");
        Ok(())
    }

    /// Remove a field; the remaining orders keep their gaps
    pub fn delete_field(&mut self, field_id: &str) -> FormResult<Field> {
        let removed = self
            .structure
            .remove_field(field_id)
            .ok_or_else(|| FormError::field_not_found(&self.structure.id, field_id))?;
        if self.editing.as_deref() == Some(field_id) {
            self.editing = None;
        }
        self.touch();
        debug!(structure = %self.structure.id, field = %field_id, "Deleted field");
        Ok(removed)
    }

    /// Swap a field with its array neighbour and renumber every order.
    ///
    /// Returns `false` without changing anything when the field is already
    /// at the boundary in that direction.
    pub fn move_field(&mut self, field_id: &str, direction: Direction) -> FormResult<bool> {
        let index = self
            .structure
            .position_of(field_id)
            .ok_or_else(|| FormError::field_not_found(&self.structure.id, field_id))?;

        let target = match direction {
            Direction::Up if index == 0 => return Ok(false),
            Direction::Up => index - 1,
            Direction::Down if index + 1 >= self.structure.field_count() => return Ok(false),
            Direction::Down => index + 1,
        };

        self.structure.swap_fields(index, target);
        self.touch();
        debug!(structure = %self.structure.id, field = %field_id, ?direction, "Moved field");
        Ok(true)
    }

    // ========================================================================
    // Field panel
    // ========================================================================

    /// Expand one field's detail panel
    pub fn begin_edit(&mut self, field_id: &str) -> FormResult<()> {
        if !self.structure.has_field(field_id) {
            return Err(FormError::field_not_found(&self.structure.id, field_id));
        }
        self.editing = Some(field_id.to_string());
        Ok(())
    }

    /// Collapse the detail panel
    pub fn finish_edit(&mut self) {
        self.editing = None;
    }

    /// Id of the expanded field, if any
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }
}

impl std::fmt::Debug for StructureEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructureEditor")
            .field("structure", &self.structure.id)
            .field("fields", &self.structure.field_count())
            .field("editing", &self.editing)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
