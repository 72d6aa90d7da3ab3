//! Document generation hook
//!
//! The host does not produce documents itself. It gathers the last
//! submitted values into a `DocumentRequest` and hands them to whatever
//! `DocumentGenerator` the caller plugged in.

use chrono::NaiveDate;
use formwright_core::{FieldType, FieldValue, FormData};
use formwright_schema::{Field, Structure};
use serde::Serialize;
use std::collections::BTreeMap;

/// External document producer
pub trait DocumentGenerator: Send + Sync {
    /// Template registered for a host, if any
    fn template_for(&self, host_id: &str) -> Option<String>;

    /// Fill `template` with the request's values
    fn generate(&self, template: &str, request: &DocumentRequest) -> Result<String, String>;
}

/// One labelled, formatted value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentEntry {
    pub field_id: String,
    pub label: String,
    pub value: String,
}

/// What the host passes to a generator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub host_id: String,
    pub title: String,
    /// Non-blank values of document fields, in display order
    pub entries: Vec<DocumentEntry>,
    /// Raw submitted values
    pub data: FormData,
}

impl DocumentRequest {
    pub fn new(structure: &Structure, data: &FormData) -> Self {
        Self {
            host_id: structure.id.clone(),
            title: structure.title.clone(),
            entries: document_entries(structure, data),
            data: data.clone(),
        }
    }

    /// Entries as `Label: value` lines
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}: {}\n", e.label, e.value))
            .collect()
    }
}

/// Formatted entries for every document field with a non-blank value
pub fn document_entries(structure: &Structure, data: &FormData) -> Vec<DocumentEntry> {
    structure
        .document_fields()
        .into_iter()
        .filter_map(|field| {
            let value = data.get(&field.id).filter(|v| !v.is_blank())?;
            Some(DocumentEntry {
                field_id: field.id.clone(),
                label: field.label.clone(),
                value: format_value(field, value),
            })
        })
        .collect()
}

/// Format a value the way documents show it
pub fn format_value(field: &Field, value: &FieldValue) -> String {
    let text = value.as_text();
    match field.field_type {
        FieldType::Phone => format_phone(&text),
        FieldType::Currency => format_currency(&text),
        FieldType::Date => format_date(&text),
        _ => text.into_owned(),
    }
}

/// `(xxx) xxx-xxxx` for ten-digit numbers, otherwise unchanged
pub fn format_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        phone.to_string()
    }
}

/// Strip everything but digits, `.` and `-`, then show two decimals
pub fn format_currency(amount: &str) -> String {
    let cleaned: String = amount
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value = cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0);
    format!("{:.2}", value)
}

/// ISO dates as `m/d/Y`, anything else unchanged
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

// ============================================================================
// Plain text generator
// ============================================================================

/// Generator backed by in-memory text templates.
///
/// Templates may use `{{title}}`, `{{host}}` and `{{entries}}`.
#[derive(Debug, Clone, Default)]
pub struct TextTemplates {
    templates: BTreeMap<String, String>,
}

impl TextTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, host_id: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(host_id.into(), template.into());
        self
    }
}

impl DocumentGenerator for TextTemplates {
    fn template_for(&self, host_id: &str) -> Option<String> {
        self.templates.get(host_id).cloned()
    }

    fn generate(&self, template: &str, request: &DocumentRequest) -> Result<String, String> {
        if request.entries.is_empty() {
            return Err(format!("no printable values for '{}'", request.host_id));
        }
        Ok(template
            .replace("{{title}}", &request.title)
            .replace("{{host}}", &request.host_id)
            .replace("{{entries}}", request.summary().trim_end()))
    }
}
