//! Validation engine for submitted form values
//!
//! `validate_field` maps one field and its candidate value to at most one
//! message; `validate_form` runs it over every field of a structure and
//! collects every violation. Neither ever fails: a rejected value is data.

use crate::field::Field;
use crate::structure::Structure;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use formwright_core::{FieldType, FieldValue, FormData};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

// ============================================================================
// Messages
// ============================================================================

/// User-facing messages produced by the engine
pub mod messages {
    pub const INVALID_EMAIL: &str = "Please enter a valid email address";
    pub const INVALID_PHONE: &str = "Please enter a valid phone number";
    pub const INVALID_NUMBER: &str = "Please enter a valid number";
    pub const INVALID_DATE: &str = "Please enter a valid date";
    pub const INVALID_FORMAT: &str = "Invalid format";

    pub fn required(label: &str) -> String {
        format!("{label} is required")
    }

    pub fn must_be_checked(label: &str) -> String {
        format!("{label} must be checked")
    }

    pub fn minimum(min: f64) -> String {
        format!("Minimum value is {min}")
    }

    pub fn maximum(max: f64) -> String {
        format!("Maximum value is {max}")
    }
}

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

static PHONE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^[+]?[(]?[+]?[0-9]{0,3}[)]?[-\s.]?[0-9]{3,4}[-\s.]?[0-9]{4,6}$").ok()
});

fn is_match(re: &Option<Regex>, text: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(text))
}

// ============================================================================
// FieldError
// ============================================================================

/// One violation reported for a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_id: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field_id, self.message)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Validate one candidate value against a field.
///
/// Checks run in a fixed sequence and the first failure wins: required,
/// then the type-specific check, then the pattern. An optional field with a
/// falsy value always passes.
pub fn validate_field(field: &Field, value: Option<&FieldValue>) -> Option<String> {
    if field.required {
        if value.is_none_or(FieldValue::is_blank) {
            return Some(messages::required(&field.label));
        }
        if field.field_type == FieldType::Checkbox && !value.is_some_and(FieldValue::is_truthy) {
            return Some(messages::must_be_checked(&field.label));
        }
    }

    let value = match value {
        Some(v) if field.required || v.is_truthy() => v,
        _ => return None,
    };

    if let Some(message) = check_type(field, value) {
        return Some(message);
    }

    check_pattern(field, value)
}

/// Validate every field of `structure` against `data`, in array order
pub fn validate_form(structure: &Structure, data: &FormData) -> Vec<FieldError> {
    structure
        .fields
        .iter()
        .filter_map(|field| {
            validate_field(field, data.get(&field.id)).map(|message| FieldError::new(&field.id, message))
        })
        .collect()
}

fn check_type(field: &Field, value: &FieldValue) -> Option<String> {
    match field.field_type {
        FieldType::Email => {
            (!is_match(&EMAIL_RE, &value.as_text())).then(|| messages::INVALID_EMAIL.to_string())
        }
        FieldType::Phone => {
            let compact: String = value.as_text().chars().filter(|c| !c.is_whitespace()).collect();
            (!is_match(&PHONE_RE, &compact)).then(|| messages::INVALID_PHONE.to_string())
        }
        FieldType::Number | FieldType::Currency => {
            let Some(number) = numeric_value(value) else {
                return Some(messages::INVALID_NUMBER.to_string());
            };
            if let Some(min) = field.min() {
                if number < min {
                    return Some(messages::minimum(min));
                }
            }
            if let Some(max) = field.max() {
                if number > max {
                    return Some(messages::maximum(max));
                }
            }
            None
        }
        FieldType::Date => {
            (!is_valid_date(&value.as_text())).then(|| messages::INVALID_DATE.to_string())
        }
        FieldType::Text
        | FieldType::Textarea
        | FieldType::Select
        | FieldType::Checkbox
        | FieldType::File => None,
    }
}

fn check_pattern(field: &Field, value: &FieldValue) -> Option<String> {
    let pattern = field.pattern()?;
    match Regex::new(pattern) {
        Ok(re) if re.is_match(&value.as_text()) => None,
        Ok(_) => Some(messages::INVALID_FORMAT.to_string()),
        Err(e) => {
            warn!(field = %field.id, error = %e, "Invalid validation pattern");
            Some(messages::INVALID_FORMAT.to_string())
        }
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

/// Interpret a value as a finite number.
///
/// Text is trimmed first; blank text counts as zero. Hex (`0x`), binary
/// (`0b`) and octal (`0o`) literals are accepted.
pub fn numeric_value(value: &FieldValue) -> Option<f64> {
    let number = match value {
        FieldValue::Null => 0.0,
        FieldValue::Bool(b) => f64::from(u8::from(*b)),
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => parse_number(s)?,
        FieldValue::File(_) => return None,
    };
    number.is_finite().then_some(number)
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0b", 2), ("0o", 8)] {
        let lower = text.get(..2).map(str::to_ascii_lowercase);
        if lower.as_deref() == Some(prefix) {
            return u64::from_str_radix(&text[2..], radix).ok().map(|n| n as f64);
        }
    }

    // Rust accepts "inf"/"nan" spellings that are not numbers here
    if text.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return None;
    }

    text.parse::<f64>().ok()
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Check if text names a calendar date
pub fn is_valid_date(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    if DateTime::parse_from_rfc3339(text).is_ok() || DateTime::parse_from_rfc2822(text).is_ok() {
        return true;
    }

    if DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(text, format).is_ok())
    {
        return true;
    }

    if DATETIME_FORMATS
        .iter()
        .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
    {
        return true;
    }

    // Year-month and bare year
    NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").is_ok()
        || (text.len() == 4
            && text.chars().all(|c| c.is_ascii_digit())
            && NaiveDate::parse_from_str(&format!("{text}-01-01"), "%Y-%m-%d").is_ok())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_core::FileRef;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> FieldValue {
        FieldValue::from(s)
    }

    #[test]
    fn test_required_empty_fails_for_every_type() {
        for field_type in FieldType::all() {
            let field = Field::new("f", *field_type, "Thing").required();
            assert_eq!(
                validate_field(&field, Some(&text(""))),
                Some("Thing is required".to_string()),
                "type {field_type}"
            );
            assert_eq!(
                validate_field(&field, None),
                Some("Thing is required".to_string())
            );
            assert_eq!(
                validate_field(&field, Some(&FieldValue::Null)),
                Some("Thing is required".to_string())
            );
        }
    }

    #[test]
    fn test_optional_empty_passes_despite_constraints() {
        for field_type in FieldType::all() {
            let field = Field::new("f", *field_type, "Thing")
                .with_min(10.0)
                .with_pattern("^x$");
            assert_eq!(validate_field(&field, Some(&text(""))), None);
            assert_eq!(validate_field(&field, None), None);
        }
    }

    #[test]
    fn test_required_checkbox() {
        let field = Field::new("agree", FieldType::Checkbox, "Terms").required();
        assert_eq!(
            validate_field(&field, Some(&FieldValue::Bool(false))),
            Some("Terms must be checked".to_string())
        );
        assert_eq!(validate_field(&field, Some(&FieldValue::Bool(true))), None);
    }

    #[test]
    fn test_email() {
        let field = Field::new("email", FieldType::Email, "Email").required();
        assert_eq!(
            validate_field(&field, Some(&text("not-an-email"))),
            Some(messages::INVALID_EMAIL.to_string())
        );
        assert_eq!(validate_field(&field, Some(&text("a@b.co"))), None);
        assert!(validate_field(&field, Some(&text("a b@c.de"))).is_some());
    }

    #[test]
    fn test_phone_ignores_whitespace() {
        let field = Field::new("phone", FieldType::Phone, "Phone");
        assert_eq!(validate_field(&field, Some(&text("+1 (555) 123-4567"))), None);
        assert_eq!(validate_field(&field, Some(&text("555 123 4567"))), None);
        assert_eq!(
            validate_field(&field, Some(&text("call me"))),
            Some(messages::INVALID_PHONE.to_string())
        );
    }

    #[test]
    fn test_phone_rejects_non_ascii_digits() {
        let field = Field::new("phone", FieldType::Phone, "Phone");
        assert_eq!(
            validate_field(&field, Some(&text("٥٥٥ ١٢٣ ٤٥٦٧"))),
            Some(messages::INVALID_PHONE.to_string())
        );
    }

    #[test]
    fn test_number_bounds() {
        let field = Field::new("qty", FieldType::Number, "Qty")
            .with_min(1.0)
            .with_max(10.0);
        assert_eq!(validate_field(&field, Some(&text("5"))), None);
        assert_eq!(
            validate_field(&field, Some(&text("0.5"))),
            Some("Minimum value is 1".to_string())
        );
        assert_eq!(
            validate_field(&field, Some(&FieldValue::Number(11.0))),
            Some("Maximum value is 10".to_string())
        );
        assert_eq!(
            validate_field(&field, Some(&text("abc"))),
            Some(messages::INVALID_NUMBER.to_string())
        );
    }

    #[test]
    fn test_min_reported_before_max() {
        let field = Field::new("n", FieldType::Currency, "N")
            .with_min(10.0)
            .with_max(5.0);
        assert_eq!(
            validate_field(&field, Some(&text("3"))),
            Some("Minimum value is 10".to_string())
        );
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(numeric_value(&text(" 42 ")), Some(42.0));
        assert_eq!(numeric_value(&text("1e3")), Some(1000.0));
        assert_eq!(numeric_value(&text("0x1A")), Some(26.0));
        assert_eq!(numeric_value(&text("   ")), Some(0.0));
        assert_eq!(numeric_value(&text("inf")), None);
        assert_eq!(numeric_value(&text("1,000")), None);
        assert_eq!(numeric_value(&FieldValue::Number(f64::INFINITY)), None);
        assert_eq!(numeric_value(&FieldValue::File(FileRef::new("a.pdf"))), None);
    }

    #[test]
    fn test_date() {
        let field = Field::new("due", FieldType::Date, "Due");
        assert_eq!(validate_field(&field, Some(&text("2024-02-29"))), None);
        assert_eq!(validate_field(&field, Some(&text("2024-03-01T10:00:00Z"))), None);
        assert_eq!(validate_field(&field, Some(&text("2024"))), None);
        assert_eq!(
            validate_field(&field, Some(&text("2023-02-29"))),
            Some(messages::INVALID_DATE.to_string())
        );
        assert_eq!(
            validate_field(&field, Some(&text("someday"))),
            Some(messages::INVALID_DATE.to_string())
        );
    }

    #[test]
    fn test_pattern_runs_after_type_check() {
        let field = Field::new("code", FieldType::Number, "Code").with_pattern("^\\d{3}$");
        assert_eq!(
            validate_field(&field, Some(&text("x"))),
            Some(messages::INVALID_NUMBER.to_string())
        );
        assert_eq!(
            validate_field(&field, Some(&text("1234"))),
            Some(messages::INVALID_FORMAT.to_string())
        );
        assert_eq!(validate_field(&field, Some(&text("123"))), None);
    }

    #[test]
    fn test_pattern_is_unanchored() {
        let field = Field::new("sku", FieldType::Text, "SKU").with_pattern("[A-Z]{2}");
        assert_eq!(validate_field(&field, Some(&text("xxAByy"))), None);
    }

    #[test]
    fn test_invalid_pattern_fails_closed() {
        let field = Field::new("sku", FieldType::Text, "SKU").with_pattern("([A-Z");
        assert_eq!(
            validate_field(&field, Some(&text("AB"))),
            Some(messages::INVALID_FORMAT.to_string())
        );
    }

    #[test]
    fn test_validate_form_collects_every_violation() {
        let structure = Structure::new("s", "S")
            .with_field(Field::new("name", FieldType::Text, "Name").required())
            .with_field(Field::new("email", FieldType::Email, "Email"))
            .with_field(Field::new("age", FieldType::Number, "Age").with_min(18.0))
            .with_field(Field::new("notes", FieldType::Textarea, "Notes"));

        let data = FormData::new().with("email", "nope").with("age", "12");
        let errors = validate_form(&structure, &data);
        assert_eq!(
            errors,
            vec![
                FieldError::new("name", "Name is required"),
                FieldError::new("email", messages::INVALID_EMAIL),
                FieldError::new("age", "Minimum value is 18"),
            ]
        );

        let data = FormData::new().with("name", "Ada").with("age", "30");
        assert!(validate_form(&structure, &data).is_empty());
    }

    #[test]
    fn test_field_error_json_shape() {
        let json = serde_json::to_value(FieldError::new("email", "bad")).unwrap();
        assert_eq!(json, serde_json::json!({"fieldId": "email", "message": "bad"}));
    }
}
