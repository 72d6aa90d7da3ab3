//! Field definitions for form structures
//!
//! This module contains the `Field` struct, its optional value constraints
//! (`FieldRules`), and `FieldPatch`, the partial update applied by the
//! structure editor.

use formwright_core::{FieldType, FormError, FormResult, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// Field
// ============================================================================

/// A single typed, orderable input descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Identifier, unique within its structure
    pub id: String,

    /// Input type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Human-readable label
    pub label: String,

    /// Placeholder text for the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Whether a value must be supplied
    #[serde(default)]
    pub required: bool,

    /// Choices for select fields; ignored for every other type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,

    /// Value constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldRules>,

    /// Display sequence (lower numbers appear first)
    #[serde(default)]
    pub order: i64,
}

impl Field {
    /// Create a new optional field
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            placeholder: None,
            required: false,
            options: None,
            validation: None,
            order: 0,
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the select options
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    /// Set the minimum numeric value
    pub fn with_min(mut self, min: f64) -> Self {
        self.validation.get_or_insert_with(FieldRules::default).min = Some(min);
        self
    }

    /// Set the maximum numeric value
    pub fn with_max(mut self, max: f64) -> Self {
        self.validation.get_or_insert_with(FieldRules::default).max = Some(max);
        self
    }

    /// Set a regex the value must match
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.validation.get_or_insert_with(FieldRules::default).pattern = Some(pattern.into());
        self
    }

    /// Set the display order
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Select options, empty when absent
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Minimum constraint, if set
    pub fn min(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.min)
    }

    /// Maximum constraint, if set
    pub fn max(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.max)
    }

    /// Pattern constraint, if set and non-empty
    pub fn pattern(&self) -> Option<&str> {
        self.validation
            .as_ref()
            .and_then(|v| v.pattern.as_deref())
            .filter(|p| !p.is_empty())
    }

    /// Text shown next to a checkbox (placeholder, else label)
    pub fn caption(&self) -> &str {
        match self.placeholder.as_deref() {
            Some(p) if !p.is_empty() => p,
            _ => &self.label,
        }
    }

    /// Number of layout columns the field occupies
    pub fn layout_span(&self) -> u8 {
        if self.field_type == FieldType::Textarea {
            2
        } else {
            1
        }
    }
}

impl Validatable for Field {
    fn validate(&self) -> FormResult<()> {
        if self.id.trim().is_empty() {
            return Err(FormError::validation("Field id cannot be empty"));
        }

        if self.label.trim().is_empty() {
            return Err(FormError::validation(format!(
                "Field '{}' has an empty label",
                self.id
            )));
        }

        if let Some(pattern) = self.pattern() {
            if let Err(e) = regex::Regex::new(pattern) {
                return Err(FormError::validation(format!(
                    "Field '{}' has an invalid pattern: {}",
                    self.id, e
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// FieldRules
// ============================================================================

/// Optional value constraints for a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRules {
    /// Minimum numeric value (number and currency fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Maximum numeric value (number and currency fields)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Regex the value must match, for any field type.
    ///
    /// Uses `regex` crate syntax, matched unanchored. Look-around and
    /// backreferences are not supported; such a pattern fails to compile,
    /// is reported by the lint and by `Validatable`, and otherwise rejects
    /// every value with "Invalid format".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldRules {
    /// Check if no constraint is set
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none() && self.pattern.is_none()
    }
}

// ============================================================================
// FieldPatch
// ============================================================================

/// Partial update merged into an existing field.
///
/// `id` and `order` are deliberately absent: an update never renames or
/// reorders a field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldPatch {
    pub field_type: Option<FieldType>,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
    pub validation: Option<FieldRules>,
}

impl FieldPatch {
    /// Create an empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the type
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Change the label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Change the placeholder
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Change whether the field is required
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Replace the select options
    pub fn options(mut self, options: Vec<String>) -> Self {
        self.options = Some(options);
        self
    }

    /// Replace the select options from newline-separated text
    pub fn options_text(self, text: &str) -> Self {
        self.options(parse_options(text))
    }

    /// Replace the value constraints
    pub fn validation(mut self, rules: FieldRules) -> Self {
        self.validation = Some(rules);
        self
    }

    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the supplied attributes into `field`
    pub fn apply(&self, field: &mut Field) {
        if let Some(field_type) = self.field_type {
            field.field_type = field_type;
        }
        if let Some(label) = &self.label {
            field.label = label.clone();
        }
        if let Some(placeholder) = &self.placeholder {
            field.placeholder = Some(placeholder.clone());
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(options) = &self.options {
            field.options = Some(options.clone());
        }
        if let Some(rules) = &self.validation {
            field.validation = if rules.is_empty() {
                None
            } else {
                Some(rules.clone())
            };
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Split newline-separated option text, dropping blank lines
pub fn parse_options(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_new() {
        let field = Field::new("email", FieldType::Email, "Email");
        assert_eq!(field.id, "email");
        assert_eq!(field.field_type, FieldType::Email);
        assert!(!field.required);
        assert!(field.options().is_empty());
        assert_eq!(field.order, 0);
    }

    #[test]
    fn test_field_builder() {
        let field = Field::new("budget", FieldType::Currency, "Budget")
            .required()
            .with_min(0.0)
            .with_max(1_000_000.0)
            .with_order(3);

        assert!(field.required);
        assert_eq!(field.min(), Some(0.0));
        assert_eq!(field.max(), Some(1_000_000.0));
        assert_eq!(field.pattern(), None);
        assert_eq!(field.order, 3);
    }

    #[test]
    fn test_field_json_shape() {
        let field = Field::new("status", FieldType::Select, "Status")
            .with_options(["Open", "Closed"])
            .with_order(1);

        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "status",
                "type": "select",
                "label": "Status",
                "required": false,
                "options": ["Open", "Closed"],
                "order": 1
            })
        );
    }

    #[test]
    fn test_field_tolerates_missing_optionals() {
        let field: Field =
            serde_json::from_str(r#"{"id":"n","type":"number","label":"N","required":true,"order":0}"#)
                .unwrap();
        assert!(field.options.is_none());
        assert!(field.validation.is_none());
        assert!(field.required);
    }

    #[test]
    fn test_caption_falls_back_to_label() {
        let field = Field::new("agree", FieldType::Checkbox, "Terms");
        assert_eq!(field.caption(), "Terms");

        let field = field.with_placeholder("I accept the terms");
        assert_eq!(field.caption(), "I accept the terms");
    }

    #[test]
    fn test_layout_span() {
        assert_eq!(Field::new("notes", FieldType::Textarea, "Notes").layout_span(), 2);
        assert_eq!(Field::new("name", FieldType::Text, "Name").layout_span(), 1);
    }

    #[test]
    fn test_field_validation() {
        assert!(Field::new("name", FieldType::Text, "Name").validate().is_ok());
        assert!(Field::new("", FieldType::Text, "Name").validate().is_err());
        assert!(Field::new("name", FieldType::Text, "  ").validate().is_err());
        assert!(
            Field::new("code", FieldType::Text, "Code")
                .with_pattern("([a-z")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_lookaround_pattern_is_rejected() {
        let err = Field::new("code", FieldType::Text, "Code")
            .with_pattern("^(?=.*[0-9]).+$")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("invalid pattern"));
        assert!(
            Field::new("pair", FieldType::Text, "Pair")
                .with_pattern(r"(a)\1")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_patch_merges_only_supplied_attributes() {
        let mut field = Field::new("name", FieldType::Text, "Name").with_order(4);
        FieldPatch::new()
            .label("Full name")
            .required(true)
            .apply(&mut field);

        assert_eq!(field.label, "Full name");
        assert!(field.required);
        assert_eq!(field.field_type, FieldType::Text);
        assert_eq!(field.order, 4);
    }

    #[test]
    fn test_patch_with_empty_rules_clears_validation() {
        let mut field = Field::new("age", FieldType::Number, "Age").with_min(18.0);
        FieldPatch::new()
            .validation(FieldRules::default())
            .apply(&mut field);
        assert!(field.validation.is_none());
    }

    #[test]
    fn test_parse_options() {
        assert_eq!(
            parse_options("Red\n\n  \nGreen\r\nBlue"),
            vec!["Red".to_string(), "Green".to_string(), "Blue".to_string()]
        );
        assert!(parse_options("").is_empty());
        assert!(FieldPatch::new().is_empty());
    }
}
