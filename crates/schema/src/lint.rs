//! Structure lint
//!
//! Checks a `Structure` for authoring mistakes that the validation engine
//! would otherwise only surface at submit time (or never): duplicate ids,
//! unlabelled fields, patterns that do not compile, contradictory bounds,
//! and order values the editor would not have produced.

use crate::structure::Structure;
use formwright_core::{FieldType, FormError, FormResult};
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of linting a structure
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the lint passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a passing result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert to FormResult (fails if any errors)
    pub fn to_result(self) -> FormResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(|e| e.message.clone())
                .collect::<Vec<_>>()
                .join("; ");
            Err(FormError::validation(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationError / ValidationWarning
// ============================================================================

/// A lint error
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub message: String,
    /// Path to the problematic element (e.g. "fields.email.validation")
    pub path: Option<String>,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            suggestion: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] {}", path, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Error codes for lint errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    EmptyStructureId,
    EmptyFieldId,
    DuplicateFieldId,
    EmptyFieldLabel,
    InvalidPattern,
    Custom,
}

/// A lint warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub code: ValidationWarningCode,
    pub message: String,
    pub path: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: ValidationWarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "[{}] Warning: {}", path, self.message),
            None => write!(f, "Warning: {}", self.message),
        }
    }
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    EmptyTitle,
    UnknownCategory,
    MinAboveMax,
    BoundsOnNonNumeric,
    SelectWithoutOptions,
    UnusedOptions,
    OrderGap,
    DuplicateOrder,
    Custom,
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// A single lint check over a structure
pub trait ValidationRule {
    /// Short machine name
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// Check a structure
    fn validate(&self, structure: &Structure) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Runs a set of lint rules over a structure
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with the built-in rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(StructureMetaRule));
        validator.add_rule(Box::new(FieldIdentityRule));
        validator.add_rule(Box::new(FieldRulesRule));
        validator.add_rule(Box::new(OptionsRule));
        validator.add_rule(Box::new(OrderRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Lint a structure with every rule
    pub fn validate(&self, structure: &Structure) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for rule in &self.rules {
            result.merge(rule.validate(structure));
        }
        result
    }

    /// Lint and return Result
    pub fn validate_result(&self, structure: &Structure) -> FormResult<()> {
        self.validate(structure).to_result()
    }
}

/// Lint a structure with the built-in rules
pub fn lint_structure(structure: &Structure) -> ValidationResult {
    Validator::with_default_rules().validate(structure)
}

fn field_path(id: &str) -> String {
    format!("fields.{id}")
}

// ============================================================================
// Built-in Rules
// ============================================================================

/// Rule: structure id, title and category
pub struct StructureMetaRule;

impl ValidationRule for StructureMetaRule {
    fn name(&self) -> &'static str {
        "structure_meta"
    }

    fn description(&self) -> &'static str {
        "Checks the structure id, title and category"
    }

    fn validate(&self, structure: &Structure) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if structure.id.trim().is_empty() {
            result.add_error(ValidationError::new(
                ValidationErrorCode::EmptyStructureId,
                "Structure id cannot be empty",
            ));
        }

        if structure.title.trim().is_empty() {
            result.add_warning(
                ValidationWarning::new(ValidationWarningCode::EmptyTitle, "Structure has no title")
                    .with_path("title"),
            );
        }

        if structure.known_category().is_none() {
            result.add_warning(
                ValidationWarning::new(
                    ValidationWarningCode::UnknownCategory,
                    format!("Unknown category '{}'", structure.category),
                )
                .with_path("category"),
            );
        }

        result
    }
}

/// Rule: field ids and labels
pub struct FieldIdentityRule;

impl ValidationRule for FieldIdentityRule {
    fn name(&self) -> &'static str {
        "field_identity"
    }

    fn description(&self) -> &'static str {
        "Validates that field ids are present and unique and labels are not blank"
    }

    fn validate(&self, structure: &Structure) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen: HashSet<&str> = HashSet::new();

        for (index, field) in structure.fields.iter().enumerate() {
            if field.id.trim().is_empty() {
                result.add_error(
                    ValidationError::new(ValidationErrorCode::EmptyFieldId, "Field id cannot be empty")
                        .with_path(format!("fields[{index}]")),
                );
                continue;
            }

            if !seen.insert(field.id.as_str()) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateFieldId,
                        format!("Duplicate field id: '{}'", field.id),
                    )
                    .with_path(field_path(&field.id)),
                );
            }

            if field.label.trim().is_empty() {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::EmptyFieldLabel,
                        format!("Field '{}' has no label", field.id),
                    )
                    .with_path(field_path(&field.id))
                    .with_suggestion("Give the field a label; it is used in error messages"),
                );
            }
        }

        result
    }
}

/// Rule: value constraints
pub struct FieldRulesRule;

impl ValidationRule for FieldRulesRule {
    fn name(&self) -> &'static str {
        "field_rules"
    }

    fn description(&self) -> &'static str {
        "Validates patterns and numeric bounds"
    }

    fn validate(&self, structure: &Structure) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for field in &structure.fields {
            let path = format!("{}.validation", field_path(&field.id));

            if let Some(pattern) = field.pattern() {
                if let Err(e) = regex::Regex::new(pattern) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::InvalidPattern,
                            format!("Field '{}' has an invalid pattern: {}", field.id, e),
                        )
                        .with_path(&path)
                        .with_suggestion("Every value will fail with \"Invalid format\" until fixed"),
                    );
                }
            }

            if let (Some(min), Some(max)) = (field.min(), field.max()) {
                if min > max {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::MinAboveMax,
                            format!("Field '{}' has min {} above max {}", field.id, min, max),
                        )
                        .with_path(&path),
                    );
                }
            }

            if !field.field_type.is_numeric() && (field.min().is_some() || field.max().is_some()) {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::BoundsOnNonNumeric,
                        format!(
                            "Field '{}' is {} so min/max are never checked",
                            field.id, field.field_type
                        ),
                    )
                    .with_path(&path),
                );
            }
        }

        result
    }
}

/// Rule: select options
pub struct OptionsRule;

impl ValidationRule for OptionsRule {
    fn name(&self) -> &'static str {
        "options"
    }

    fn description(&self) -> &'static str {
        "Checks that select fields have options and other fields do not"
    }

    fn validate(&self, structure: &Structure) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for field in &structure.fields {
            let has_options = !field.options().is_empty();
            match field.field_type {
                FieldType::Select if !has_options => {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::SelectWithoutOptions,
                            format!("Select field '{}' has no options", field.id),
                        )
                        .with_path(field_path(&field.id)),
                    );
                }
                FieldType::Select => {}
                _ if has_options => {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::UnusedOptions,
                            format!("Options on {} field '{}' are ignored", field.field_type, field.id),
                        )
                        .with_path(field_path(&field.id)),
                    );
                }
                _ => {}
            }
        }

        result
    }
}

/// Rule: order values
pub struct OrderRule;

impl ValidationRule for OrderRule {
    fn name(&self) -> &'static str {
        "order"
    }

    fn description(&self) -> &'static str {
        "Reports duplicate order values and gaps in the display sequence"
    }

    fn validate(&self, structure: &Structure) -> ValidationResult {
        let mut result = ValidationResult::ok();

        let mut by_order: BTreeMap<i64, Vec<&str>> = BTreeMap::new();
        for field in &structure.fields {
            by_order.entry(field.order).or_default().push(field.id.as_str());
        }

        for (order, ids) in &by_order {
            if ids.len() > 1 {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::DuplicateOrder,
                        format!("Fields {} share order {}", ids.join(", "), order),
                    )
                    .with_path("fields"),
                );
            }
        }

        let distinct: Vec<i64> = by_order.keys().copied().collect();
        let dense = distinct
            .iter()
            .enumerate()
            .all(|(index, order)| *order == index as i64);
        if !dense {
            result.add_warning(
                ValidationWarning::new(
                    ValidationWarningCode::OrderGap,
                    "Order values are not contiguous from 0; moving any field renumbers them",
                )
                .with_path("fields"),
            );
        }

        result
    }
}

// ============================================================================
// Tests
// ============================================================================
