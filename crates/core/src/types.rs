//! Core type definitions for Formwright
//!
//! This module contains the closed set of field types, the dynamic value
//! carried by a form field, the `FormData` map handed to submit callbacks,
//! and the known structure categories.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Field Types
// ============================================================================

/// The closed set of input types a form field can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line free text
    Text,
    /// Email address
    Email,
    /// Phone number
    Phone,
    /// Plain number
    Number,
    /// Monetary amount
    Currency,
    /// Calendar date
    Date,
    /// Multi-line free text
    Textarea,
    /// One choice out of `options`
    Select,
    /// Boolean tick box
    Checkbox,
    /// File upload
    File,
}

impl FieldType {
    /// All field types, in the order editors offer them
    pub fn all() -> &'static [FieldType] {
        &[
            FieldType::Text,
            FieldType::Email,
            FieldType::Phone,
            FieldType::Number,
            FieldType::Currency,
            FieldType::Date,
            FieldType::Textarea,
            FieldType::Select,
            FieldType::Checkbox,
            FieldType::File,
        ]
    }

    /// Wire name used in structure files
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Currency => "currency",
            FieldType::Date => "date",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::File => "file",
        }
    }

    /// Get the display name for this type
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Email => "Email",
            FieldType::Phone => "Phone",
            FieldType::Number => "Number",
            FieldType::Currency => "Currency",
            FieldType::Date => "Date",
            FieldType::Textarea => "Textarea",
            FieldType::Select => "Select",
            FieldType::Checkbox => "Checkbox",
            FieldType::File => "File Upload",
        }
    }

    /// Check if values of this type are parsed as numbers
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Currency)
    }

    /// Check if `options` carries meaning for this type
    pub fn uses_options(&self) -> bool {
        matches!(self, FieldType::Select)
    }
}

impl Default for FieldType {
    fn default() -> Self {
        FieldType::Text
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown field type: '{}'", s))
    }
}

// ============================================================================
// Field Values
// ============================================================================

/// A file picked for an upload field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    /// File name as shown to the user
    pub name: String,

    /// Size in bytes, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// MIME type, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

impl FileRef {
    /// Create a file reference from a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            mime: None,
        }
    }
}

/// The dynamic value a user entered for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    File(FileRef),
}

impl FieldValue {
    /// Empty for the purpose of the required check (`null` or `""`)
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Loose truthiness: `false`, `0`, `NaN`, `""` and `null` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::File(_) => true,
        }
    }

    /// String form used by pattern and format checks
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Null => Cow::Borrowed(""),
            FieldValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
            FieldValue::File(file) => Cow::Borrowed(file.name.as_str()),
        }
    }

    /// Get the file reference, if this is an upload
    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            FieldValue::File(file) => Some(file),
            _ => None,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Null
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            other => f.write_str(&other.as_text()),
        }
    }
}

// ============================================================================
// Form Data
// ============================================================================

/// Submitted values keyed by field id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(BTreeMap<String, FieldValue>);

impl FormData {
    /// Create an empty data map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the value for a field
    pub fn get(&self, field_id: &str) -> Option<&FieldValue> {
        self.0.get(field_id)
    }

    /// Set the value for a field, returning the previous one
    pub fn set(&mut self, field_id: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(field_id.into(), value.into())
    }

    /// Remove the value for a field
    pub fn remove(&mut self, field_id: &str) -> Option<FieldValue> {
        self.0.remove(field_id)
    }

    /// Builder-style setter
    pub fn with(mut self, field_id: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field_id, value);
        self
    }

    /// Check if no field has a value
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with a value
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over `(field id, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, FieldValue)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        FormData(iter.into_iter().collect())
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Business areas a structure can be filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Crm,
    Accounting,
    Hr,
    Project,
    Inventory,
    Documents,
    Other,
}

impl Category {
    /// Category key stored in structures when nothing else is given
    pub const DEFAULT_KEY: &'static str = "other";

    /// All known categories
    pub fn all() -> &'static [Category] {
        &[
            Category::Crm,
            Category::Accounting,
            Category::Hr,
            Category::Project,
            Category::Inventory,
            Category::Documents,
            Category::Other,
        ]
    }

    /// Key stored in the structure's `category` attribute
    pub fn key(&self) -> &'static str {
        match self {
            Category::Crm => "crm",
            Category::Accounting => "accounting",
            Category::Hr => "hr",
            Category::Project => "project",
            Category::Inventory => "inventory",
            Category::Documents => "documents",
            Category::Other => "other",
        }
    }

    /// Get the display name for this category
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Crm => "CRM",
            Category::Accounting => "Accounting",
            Category::Hr => "Human Resources",
            Category::Project => "Project Management",
            Category::Inventory => "Inventory",
            Category::Documents => "Documents",
            Category::Other => "Other",
        }
    }

    /// Look up a known category by key
    pub fn from_key(key: &str) -> Option<Category> {
        Category::all().iter().copied().find(|c| c.key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
