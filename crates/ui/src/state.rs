//! Explicit UI state
//!
//! Everything a form host would otherwise keep in framework-local component
//! state lives here as plain data with pure update methods: the host mode,
//! per-form values with their touched set and recorded errors, the size
//! hint, and the blocking notice slot.

use formwright_core::{FieldValue, FormData};
use formwright_schema::{FieldError, Structure, validate_form};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Mode
// ============================================================================

/// Host modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Fill in and submit the form
    #[default]
    View,
    /// Change the form's fields
    EditStructure,
}

impl Mode {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::View => "view",
            Mode::EditStructure => "edit-structure",
        }
    }

    /// Label of the button that switches into this mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::View => "Form View",
            Mode::EditStructure => "Edit Structure",
        }
    }

    /// The other mode
    pub fn toggled(self) -> Self {
        match self {
            Mode::View => Mode::EditStructure,
            Mode::EditStructure => Mode::View,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ModalSize
// ============================================================================

/// Size hint for the host container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalSize {
    Sm,
    #[default]
    Md,
    Lg,
    Xl,
}

impl ModalSize {
    /// Maximum container width in pixels
    pub fn max_width_px(&self) -> u32 {
        match self {
            ModalSize::Sm => 400,
            ModalSize::Md => 600,
            ModalSize::Lg => 800,
            ModalSize::Xl => 1200,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModalSize::Sm => "sm",
            ModalSize::Md => "md",
            ModalSize::Lg => "lg",
            ModalSize::Xl => "xl",
        }
    }
}

impl FromStr for ModalSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sm" => Ok(ModalSize::Sm),
            "md" => Ok(ModalSize::Md),
            "lg" => Ok(ModalSize::Lg),
            "xl" => Ok(ModalSize::Xl),
            other => Err(format!("Unknown size '{}' (expected sm, md, lg or xl)", other)),
        }
    }
}

impl fmt::Display for ModalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Notices
// ============================================================================

/// Blocking message shown to the user until dismissed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub text: String,
    pub level: StatusLevel,
}

impl Notice {
    pub fn new(text: impl Into<String>, level: StatusLevel) -> Self {
        Self {
            text: text.into(),
            level,
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(text, StatusLevel::Warning)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text, StatusLevel::Error)
    }
}

/// Notice severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Warning,
    Error,
}

// ============================================================================
// FormState
// ============================================================================

/// Values, touched set and recorded errors for one form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    /// Current values keyed by field id
    pub data: FormData,

    /// Fields the user has changed or tried to submit
    pub touched: BTreeSet<String>,

    /// Errors recorded by the last submit attempt, minus cleared ones
    pub errors: Vec<FieldError>,
}

impl FormState {
    /// Start from caller-supplied initial values
    pub fn new(initial: FormData) -> Self {
        Self {
            data: initial,
            touched: BTreeSet::new(),
            errors: Vec::new(),
        }
    }

    /// Record a value change.
    ///
    /// Marks the field touched and drops any error recorded for it; the
    /// value is not re-validated until the next submit attempt.
    pub fn set_value(&mut self, field_id: &str, value: impl Into<FieldValue>) {
        self.data.set(field_id, value);
        self.touched.insert(field_id.to_string());
        self.errors.retain(|e| e.field_id != field_id);
    }

    /// Current value of a field
    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.data.get(field_id)
    }

    /// Mark a single field touched
    pub fn touch(&mut self, field_id: &str) {
        self.touched.insert(field_id.to_string());
    }

    /// Replace the touched set with every field of `structure`
    pub fn mark_all_touched(&mut self, structure: &Structure) {
        self.touched = structure.fields.iter().map(|f| f.id.clone()).collect();
    }

    pub fn is_touched(&self, field_id: &str) -> bool {
        self.touched.contains(field_id)
    }

    /// Recorded error for a field, whether or not it is visible
    pub fn error(&self, field_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field_id == field_id)
            .map(|e| e.message.as_str())
    }

    /// Error to show for a field: only once the field is touched
    pub fn visible_error(&self, field_id: &str) -> Option<&str> {
        if self.is_touched(field_id) {
            self.error(field_id)
        } else {
            None
        }
    }

    /// Errors currently shown to the user
    pub fn visible_errors(&self) -> Vec<&FieldError> {
        self.errors
            .iter()
            .filter(|e| self.is_touched(&e.field_id))
            .collect()
    }

    /// Run validation without a submit attempt, recording the result
    pub fn validate(&mut self, structure: &Structure) -> bool {
        self.errors = validate_form(structure, &self.data);
        self.errors.is_empty()
    }

    /// Attempt a submit: touch everything, validate, and hand back the
    /// values when there is nothing to report.
    pub fn submit(&mut self, structure: &Structure) -> Option<FormData> {
        self.mark_all_touched(structure);
        if self.validate(structure) {
            Some(self.data.clone())
        } else {
            None
        }
    }

    /// Start over from `initial`
    pub fn reset(&mut self, initial: FormData) {
        *self = Self::new(initial);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_core::FieldType;
    use formwright_schema::Field;

    fn structure() -> Structure {
        Structure::new("s", "S")
            .with_field(Field::new("name", FieldType::Text, "Name").required().with_order(0))
            .with_field(Field::new("email", FieldType::Email, "Email").with_order(1))
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(Mode::default(), Mode::View);
        assert_eq!(Mode::View.toggled(), Mode::EditStructure);
        assert_eq!(Mode::EditStructure.toggled(), Mode::View);
        assert_eq!(Mode::EditStructure.to_string(), "edit-structure");
        assert_eq!(
            serde_json::to_value(Mode::EditStructure).unwrap(),
            serde_json::json!("edit-structure")
        );
    }

    #[test]
    fn test_modal_size() {
        assert_eq!(ModalSize::default(), ModalSize::Md);
        assert_eq!("XL".parse::<ModalSize>(), Ok(ModalSize::Xl));
        assert!("huge".parse::<ModalSize>().is_err());
        assert_eq!(ModalSize::Sm.max_width_px(), 400);
    }

    #[test]
    fn test_errors_hidden_until_touched() {
        let mut state = FormState::default();
        assert!(!state.validate(&structure()));
        assert_eq!(state.error("name"), Some("Name is required"));
        assert_eq!(state.visible_error("name"), None);

        state.touch("name");
        assert_eq!(state.visible_error("name"), Some("Name is required"));
    }

    #[test]
    fn test_submit_marks_everything_touched() {
        let mut state = FormState::default();
        assert!(state.submit(&structure()).is_none());
        assert!(state.is_touched("name"));
        assert!(state.is_touched("email"));
        assert_eq!(state.visible_errors().len(), 1);
    }

    #[test]
    fn test_set_value_clears_error_without_revalidating() {
        let mut state = FormState::default();
        state.set_value("email", "bad");
        state.submit(&structure());
        assert_eq!(state.errors.len(), 2);

        state.set_value("email", "still bad");
        assert_eq!(state.error("email"), None);
        assert_eq!(state.errors.len(), 1);
        assert!(state.is_touched("email"));
    }

    #[test]
    fn test_submit_returns_data_when_valid() {
        let mut state = FormState::new(FormData::new().with("name", "Ada"));
        let data = state.submit(&structure()).unwrap();
        assert_eq!(data.get("name"), Some(&FieldValue::from("Ada")));
        assert!(state.errors.is_empty());

        state.reset(FormData::new());
        assert!(state.touched.is_empty());
        assert!(state.data.is_empty());
    }

    #[test]
    fn test_notice_constructors() {
        let notice = Notice::warning("careful");
        assert_eq!(notice.level, StatusLevel::Warning);
        assert_eq!(notice.text, "careful");
    }
}
