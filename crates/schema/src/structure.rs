//! Structure definitions
//!
//! A `Structure` is the ordered collection of fields plus the metadata that
//! describes one editable form. Mutations here are low level and never bump
//! `lastModified`; the structure editor does that with its injected clock.

use crate::field::Field;
use chrono::{DateTime, Utc};
use formwright_core::{Category, FieldType, FormError, FormResult, Timestamped, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

fn default_category() -> String {
    Category::DEFAULT_KEY.to_string()
}

// ============================================================================
// Structure
// ============================================================================

/// The editable description of one form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    /// Identifier of the owning host
    pub id: String,

    /// Form title
    pub title: String,

    /// Text shown above the form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields in insertion order, not necessarily sorted by `order`
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Category key (see [`Category`] for the known ones)
    #[serde(default = "default_category")]
    pub category: String,

    /// Last structural modification
    pub last_modified: DateTime<Utc>,

    /// Unrecognised top-level keys, kept so export/import is lossless
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Structure {
    /// Create an empty structure in the default category
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            fields: Vec::new(),
            category: default_category(),
            last_modified: Utc::now(),
            extra: BTreeMap::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the category key
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the modification time
    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = at;
        self
    }

    /// Append a field exactly as given
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Append several fields exactly as given
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a field by id
    pub fn get_field(&self, field_id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    /// Get a mutable field by id
    pub fn get_field_mut(&mut self, field_id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == field_id)
    }

    /// Array position of a field
    pub fn position_of(&self, field_id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == field_id)
    }

    /// Check if a field id is in use
    pub fn has_field(&self, field_id: &str) -> bool {
        self.position_of(field_id).is_some()
    }

    /// Number of fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Check if the structure has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in display order. Ties keep their array order.
    pub fn sorted_fields(&self) -> Vec<&Field> {
        let mut fields: Vec<_> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    /// Fields that carry data into generated documents, in display order
    pub fn document_fields(&self) -> Vec<&Field> {
        self.sorted_fields()
            .into_iter()
            .filter(|f| !matches!(f.field_type, FieldType::Checkbox | FieldType::File))
            .collect()
    }

    /// Highest order value, if any field exists
    pub fn max_order(&self) -> Option<i64> {
        self.fields.iter().map(|f| f.order).max()
    }

    /// Order for a field appended at the end.
    ///
    /// Normally the field count; raised past the current maximum when
    /// deletions left gaps that would otherwise cause a collision. Saturates
    /// at `i64::MAX`; callers renormalize first when `has_order_headroom`
    /// is false.
    pub fn next_order(&self) -> i64 {
        let count = self.fields.len() as i64;
        match self.max_order() {
            Some(max) if max >= count => max.saturating_add(1),
            _ => count,
        }
    }

    /// Check that a field can still be appended after the current maximum
    pub fn has_order_headroom(&self) -> bool {
        self.max_order().is_none_or(|max| max < i64::MAX)
    }

    /// Check if orders are exactly `0..N` in array order
    pub fn is_order_dense(&self) -> bool {
        self.fields
            .iter()
            .enumerate()
            .all(|(index, field)| field.order == index as i64)
    }

    /// Resolve a category key to a known category
    pub fn known_category(&self) -> Option<Category> {
        Category::from_key(&self.category)
    }

    // ========================================================================
    // Low-level mutations
    // ========================================================================

    /// Append a field, rejecting a duplicate id
    pub fn push_field(&mut self, field: Field) -> FormResult<()> {
        if self.has_field(&field.id) {
            return Err(FormError::DuplicateFieldId {
                structure: self.id.clone(),
                field: field.id,
            });
        }
        self.fields.push(field);
        Ok(())
    }

    /// Remove a field by id, leaving the other orders untouched
    pub fn remove_field(&mut self, field_id: &str) -> Option<Field> {
        let index = self.position_of(field_id)?;
        Some(self.fields.remove(index))
    }

    /// Swap two array positions and renormalize every order to its index
    pub fn swap_fields(&mut self, a: usize, b: usize) -> bool {
        if a >= self.fields.len() || b >= self.fields.len() {
            return false;
        }
        self.fields.swap(a, b);
        self.renormalize_order();
        true
    }

    /// Set every field's order to its array index
    pub fn renormalize_order(&mut self) {
        for (index, field) in self.fields.iter_mut().enumerate() {
            field.order = index as i64;
        }
    }
}

impl Timestamped for Structure {
    fn modified_at(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn set_modified_at(&mut self, at: DateTime<Utc>) {
        self.last_modified = at;
    }
}

impl Validatable for Structure {
    fn validate(&self) -> FormResult<()> {
        if self.id.trim().is_empty() {
            return Err(FormError::validation("Structure id cannot be empty"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.id.trim().is_empty() {
                return Err(FormError::validation("Field id cannot be empty"));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(FormError::DuplicateFieldId {
                    structure: self.id.clone(),
                    field: field.id.clone(),
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Structure {
        Structure::new("add-customer", "Add Customer")
            .with_category("crm")
            .with_field(Field::new("name", FieldType::Text, "Name").with_order(2))
            .with_field(Field::new("email", FieldType::Email, "Email").with_order(0))
            .with_field(Field::new("agree", FieldType::Checkbox, "Agree").with_order(1))
            .with_field(Field::new("notes", FieldType::Textarea, "Notes").with_order(1))
    }

    fn ids<'a>(fields: impl IntoIterator<Item = &'a Field>) -> Vec<&'a str> {
        fields.into_iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_structure_new_defaults() {
        let structure = Structure::new("s", "Title");
        assert_eq!(structure.category, "other");
        assert!(structure.is_empty());
        assert!(structure.description.is_none());
        assert!(structure.extra.is_empty());
    }

    #[test]
    fn test_sorted_fields_is_stable() {
        let structure = sample();
        assert_eq!(
            ids(structure.sorted_fields()),
            vec!["email", "agree", "notes", "name"]
        );
    }

    #[test]
    fn test_document_fields_skip_checkbox_and_file() {
        let structure = sample()
            .with_field(Field::new("upload", FieldType::File, "Upload").with_order(9));
        assert_eq!(
            ids(structure.document_fields()),
            vec!["email", "notes", "name"]
        );
    }

    #[test]
    fn test_push_field_rejects_duplicate() {
        let mut structure = sample();
        let err = structure
            .push_field(Field::new("name", FieldType::Text, "Other"))
            .unwrap_err();
        assert!(matches!(err, FormError::DuplicateFieldId { .. }));
        assert_eq!(structure.field_count(), 4);
    }

    #[test]
    fn test_remove_field_keeps_gaps() {
        let mut structure = Structure::new("s", "S")
            .with_field(Field::new("a", FieldType::Text, "A").with_order(0))
            .with_field(Field::new("b", FieldType::Text, "B").with_order(1))
            .with_field(Field::new("c", FieldType::Text, "C").with_order(2));

        let removed = structure.remove_field("b").unwrap();
        assert_eq!(removed.id, "b");
        let orders: Vec<_> = structure.fields.iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![0, 2]);
        assert!(structure.remove_field("missing").is_none());
    }

    #[test]
    fn test_next_order_skips_past_gaps() {
        let mut structure = Structure::new("s", "S");
        assert_eq!(structure.next_order(), 0);

        structure.fields.push(Field::new("a", FieldType::Text, "A").with_order(0));
        structure.fields.push(Field::new("c", FieldType::Text, "C").with_order(2));
        assert_eq!(structure.next_order(), 3);

        structure.fields[1].order = 1;
        assert_eq!(structure.next_order(), 2);
    }

    #[test]
    fn test_next_order_at_max_does_not_overflow() {
        let structure = Structure::new("h", "H")
            .with_field(Field::new("a", FieldType::Text, "A").with_order(i64::MAX));
        assert_eq!(structure.next_order(), i64::MAX);
        assert!(!structure.has_order_headroom());
        assert!(Structure::new("e", "E").has_order_headroom());
    }

    #[test]
    fn test_swap_fields_renormalizes() {
        let mut structure = sample();
        assert!(structure.swap_fields(0, 1));
        assert_eq!(ids(&structure.fields), vec!["email", "name", "agree", "notes"]);
        assert!(structure.is_order_dense());
        assert!(!structure.swap_fields(3, 4));
    }

    #[test]
    fn test_structure_validation() {
        assert!(sample().validate().is_ok());

        let dup = sample().with_field(Field::new("email", FieldType::Email, "Again"));
        assert!(matches!(
            dup.validate(),
            Err(FormError::DuplicateFieldId { .. })
        ));
    }

    #[test]
    fn test_json_keeps_unknown_keys() {
        let json = r#"{
            "id": "s",
            "title": "S",
            "fields": [],
            "category": "hr",
            "lastModified": "2024-03-01T12:00:00Z",
            "owner": "ops"
        }"#;
        let structure: Structure = serde_json::from_str(json).unwrap();
        assert_eq!(
            structure.last_modified,
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(structure.extra.get("owner"), Some(&serde_json::json!("ops")));
        assert_eq!(structure.known_category(), Some(Category::Hr));

        let back = serde_json::to_value(&structure).unwrap();
        assert_eq!(back["owner"], "ops");
        assert_eq!(back["lastModified"], "2024-03-01T12:00:00Z");
    }
}
