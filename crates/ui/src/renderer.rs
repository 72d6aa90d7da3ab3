//! Headless form renderer
//!
//! Turns a `Structure` plus a `FormState` into a view model: one
//! `RenderedField` per field in display order, each carrying a `Control`
//! chosen by exhaustive match on the field type. A front end only has to
//! draw what it is given.

use crate::state::FormState;
use formwright_core::{FieldType, FieldValue};
use formwright_schema::{Field, Structure};
use serde::Serialize;

/// Leading entry of every select control
pub const SELECT_PROMPT: &str = "Select an option...";

/// File control text when nothing is selected
pub const FILE_PROMPT: &str = "Click to upload file or drag and drop";

/// Submit button text while the host is busy
pub const PROCESSING_LABEL: &str = "Processing...";

/// Step for currency inputs
pub const CURRENCY_STEP: f64 = 0.01;

// ============================================================================
// Controls
// ============================================================================

/// Kind of single-line input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Email,
    Tel,
    Number,
    Date,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Text => "text",
            InputKind::Email => "email",
            InputKind::Tel => "tel",
            InputKind::Number => "number",
            InputKind::Date => "date",
        }
    }
}

/// One entry of a select control
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Type-appropriate input control
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "lowercase")]
pub enum Control {
    Input {
        kind: InputKind,
        value: String,
        placeholder: Option<String>,
        step: Option<f64>,
    },
    TextArea {
        value: String,
        placeholder: Option<String>,
    },
    Select {
        prompt: &'static str,
        options: Vec<SelectOption>,
        value: String,
    },
    Checkbox {
        checked: bool,
        caption: String,
    },
    File {
        file_name: Option<String>,
        prompt: String,
    },
}

impl Control {
    /// Build the control for a field and its current value
    pub fn for_field(field: &Field, value: Option<&FieldValue>) -> Self {
        let text = || value.map(|v| v.as_text().into_owned()).unwrap_or_default();
        let input = |kind, step| Control::Input {
            kind,
            value: text(),
            placeholder: field.placeholder.clone(),
            step,
        };

        match field.field_type {
            FieldType::Text => input(InputKind::Text, None),
            FieldType::Email => input(InputKind::Email, None),
            FieldType::Phone => input(InputKind::Tel, None),
            FieldType::Number => input(InputKind::Number, None),
            FieldType::Currency => input(InputKind::Number, Some(CURRENCY_STEP)),
            FieldType::Date => input(InputKind::Date, None),
            FieldType::Textarea => Control::TextArea {
                value: text(),
                placeholder: field.placeholder.clone(),
            },
            FieldType::Select => {
                let current = text();
                Control::Select {
                    prompt: SELECT_PROMPT,
                    options: field
                        .options()
                        .iter()
                        .map(|option| SelectOption {
                            value: option.clone(),
                            label: option.clone(),
                            selected: *option == current,
                        })
                        .collect(),
                    value: current,
                }
            }
            FieldType::Checkbox => Control::Checkbox {
                checked: value.is_some_and(FieldValue::is_truthy),
                caption: field.caption().to_string(),
            },
            FieldType::File => {
                let file_name = value.and_then(FieldValue::as_file).map(|f| f.name.clone());
                Control::File {
                    prompt: file_name.clone().unwrap_or_else(|| FILE_PROMPT.to_string()),
                    file_name,
                }
            }
        }
    }
}

// ============================================================================
// Rendered form
// ============================================================================

/// One field as it should be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedField {
    pub id: String,
    /// Separate label; checkboxes carry their caption inside the control
    pub label: Option<String>,
    pub required: bool,
    /// Layout columns (textarea spans two)
    pub span: u8,
    pub control: Control,
    /// Error shown under the control, only once the field is touched
    pub error: Option<String>,
    pub disabled: bool,
}

/// A button in the form footer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    pub label: String,
    pub disabled: bool,
}

/// The whole form as it should be drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedForm {
    pub fields: Vec<RenderedField>,
    pub cancel: Button,
    pub submit: Button,
}

impl RenderedForm {
    /// Look up a rendered field by id
    pub fn field(&self, id: &str) -> Option<&RenderedField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Ids in the order they are drawn
    pub fn field_ids(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }

    /// Errors currently drawn, in display order
    pub fn visible_errors(&self) -> Vec<(&str, &str)> {
        self.fields
            .iter()
            .filter_map(|f| f.error.as_deref().map(|e| (f.id.as_str(), e)))
            .collect()
    }
}

/// Footer labels and busy flag for a render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub submit_label: String,
    pub cancel_label: String,
    pub loading: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            submit_label: "Save".to_string(),
            cancel_label: "Cancel".to_string(),
            loading: false,
        }
    }
}

/// Render `structure` with the values and errors in `state`
pub fn render_form(structure: &Structure, state: &FormState, options: &RenderOptions) -> RenderedForm {
    let fields = structure
        .sorted_fields()
        .into_iter()
        .map(|field| RenderedField {
            id: field.id.clone(),
            label: (field.field_type != FieldType::Checkbox).then(|| field.label.clone()),
            required: field.required,
            span: field.layout_span(),
            control: Control::for_field(field, state.value(&field.id)),
            error: state.visible_error(&field.id).map(str::to_string),
            disabled: options.loading,
        })
        .collect();

    RenderedForm {
        fields,
        cancel: Button {
            label: options.cancel_label.clone(),
            disabled: options.loading,
        },
        submit: Button {
            label: if options.loading {
                PROCESSING_LABEL.to_string()
            } else {
                options.submit_label.clone()
            },
            disabled: options.loading,
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
