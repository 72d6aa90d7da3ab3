//! Structure files
//!
//! Export writes a `Structure` as pretty JSON; import reads one back and
//! rebinds it to the importing host. Import is all-or-nothing: any failure
//! leaves the caller's current structure untouched because nothing is
//! returned but the error.

use crate::structure::Structure;
use chrono::{DateTime, Utc};
use formwright_core::{Clock, FormError, FormResult, Timestamped, Validatable};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ============================================================================
// Constants
// ============================================================================

/// File extension for structure files
pub const STRUCTURE_EXTENSION: &str = "json";

/// Suffix appended to the host id to name an exported file
pub const EXPORT_SUFFIX: &str = "_structure.json";

/// Message shown when an import is rejected
pub const INVALID_FILE_NOTICE: &str = "Invalid structure file. Please check the file format.";

// ============================================================================
// Export
// ============================================================================

/// Serialize a structure to pretty JSON
pub fn export_structure(structure: &Structure) -> FormResult<String> {
    serde_json::to_string_pretty(structure).map_err(|e| FormError::FileWrite {
        path: PathBuf::from(export_file_name(&structure.id)),
        message: format!("Failed to serialize structure: {}", e),
    })
}

/// Save a structure to a file, creating parent directories as needed
pub fn save_structure(structure: &Structure, path: impl AsRef<Path>) -> FormResult<()> {
    let path = path.as_ref();
    let json = export_structure(structure)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| FormError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| FormError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    info!(structure = %structure.id, path = %path.display(), "Saved structure");
    Ok(())
}

// ============================================================================
// Load
// ============================================================================

/// Parse a structure exactly as written, checking its invariants
pub fn parse_structure(json: &str) -> FormResult<Structure> {
    let structure: Structure =
        serde_json::from_str(json).map_err(|e| FormError::InvalidStructureFile(e.to_string()))?;
    structure.validate()?;
    Ok(structure)
}

/// Load a structure from a file without rebinding it
pub fn load_structure(path: impl AsRef<Path>) -> FormResult<Structure> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FormError::StructureNotFound(path.to_path_buf()));
    }

    let json = std::fs::read_to_string(path).map_err(|e| FormError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    parse_structure(&json)
}

// ============================================================================
// Import
// ============================================================================

/// Import a structure file into the host identified by `host_id`.
///
/// Every top-level key is taken from the file except `id`, which becomes
/// `host_id`, and `lastModified`, which is regenerated from `clock` and is
/// strictly later than the imported value.
pub fn import_structure(json: &str, host_id: &str, clock: &dyn Clock) -> FormResult<Structure> {
    let mut value: Value =
        serde_json::from_str(json).map_err(|e| FormError::InvalidStructureFile(e.to_string()))?;

    let Some(object) = value.as_object_mut() else {
        return Err(FormError::InvalidStructureFile(
            "expected a JSON object".to_string(),
        ));
    };

    let previous = object
        .get("lastModified")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    object.insert("id".to_string(), Value::String(host_id.to_string()));
    object.insert(
        "lastModified".to_string(),
        serde_json::to_value(previous.unwrap_or(DateTime::<Utc>::UNIX_EPOCH))?,
    );

    let mut structure: Structure =
        serde_json::from_value(value).map_err(|e| FormError::InvalidStructureFile(e.to_string()))?;
    structure.validate()?;
    structure.touch(clock);

    debug!(previous = ?previous, now = %structure.last_modified, "Regenerated lastModified");
    info!(
        structure = %structure.id,
        fields = structure.field_count(),
        "Imported structure"
    );
    Ok(structure)
}

/// Import from raw bytes
pub fn import_structure_bytes(bytes: &[u8], host_id: &str, clock: &dyn Clock) -> FormResult<Structure> {
    let json = std::str::from_utf8(bytes)
        .map_err(|e| FormError::InvalidStructureFile(format!("Invalid UTF-8: {}", e)))?;
    import_structure(json, host_id, clock)
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Name of the exported file for a host
pub fn export_file_name(host_id: &str) -> String {
    export_file_name_with_suffix(host_id, EXPORT_SUFFIX)
}

/// Name of the exported file for a host with a custom suffix
pub fn export_file_name_with_suffix(host_id: &str, suffix: &str) -> String {
    let safe_id: String = host_id
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!("{}{}", safe_id, suffix)
}

/// Ensure a path has the structure extension
pub fn ensure_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if path.extension().is_none_or(|e| e != STRUCTURE_EXTENSION) {
        let mut new_path = path.to_path_buf();
        new_path.set_extension(STRUCTURE_EXTENSION);
        new_path
    } else {
        path.to_path_buf()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use chrono::{TimeDelta, TimeZone};
    use formwright_core::{FieldType, ManualClock};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn sample() -> Structure {
        Structure::new("add-customer", "Add Customer")
            .with_description("New CRM contact")
            .with_category("crm")
            .with_last_modified(at(9))
            .with_field(Field::new("name", FieldType::Text, "Name").required().with_order(0))
            .with_field(
                Field::new("tier", FieldType::Select, "Tier")
                    .with_options(["Gold", "Silver"])
                    .with_order(1),
            )
            .with_field(
                Field::new("budget", FieldType::Currency, "Budget")
                    .with_min(0.0)
                    .with_order(3),
            )
    }

    #[test]
    fn test_export_import_round_trip() {
        let clock = ManualClock::new(at(12));
        let original = sample();

        let json = export_structure(&original).unwrap();
        let imported = import_structure(&json, "add-customer", &clock).unwrap();

        assert!(imported.last_modified > original.last_modified);
        let mut expected = original.clone();
        expected.last_modified = imported.last_modified;
        assert_eq!(imported, expected);
    }

    #[test]
    fn test_import_is_strictly_later_even_with_stale_clock() {
        let clock = ManualClock::new(at(1));
        let json = export_structure(&sample()).unwrap();
        let imported = import_structure(&json, "x", &clock).unwrap();
        assert_eq!(imported.last_modified, at(9) + TimeDelta::milliseconds(1));
    }

    #[test]
    fn test_import_keeps_host_id_and_unknown_keys() {
        let clock = ManualClock::new(at(12));
        let json = r#"{
            "id": "someone-else",
            "title": "Shared",
            "fields": [{"id": "a", "type": "date", "label": "When", "required": false, "order": 0}],
            "category": "project",
            "lastModified": "2020-01-01T00:00:00Z",
            "version": 3
        }"#;

        let imported = import_structure(json, "my-host", &clock).unwrap();
        assert_eq!(imported.id, "my-host");
        assert_eq!(imported.title, "Shared");
        assert_eq!(imported.last_modified, at(12));
        assert_eq!(imported.extra.get("version"), Some(&serde_json::json!(3)));
    }

    #[test]
    fn test_import_without_last_modified() {
        let clock = ManualClock::new(at(12));
        let imported = import_structure(r#"{"title": "Bare"}"#, "h", &clock).unwrap();
        assert_eq!(imported.category, "other");
        assert!(imported.fields.is_empty());
        assert_eq!(imported.last_modified, at(12));
    }

    #[test]
    fn test_import_rejects_bad_input() {
        let clock = ManualClock::new(at(12));
        for bad in [
            "not json",
            "[1, 2]",
            r#"{"title": "T", "fields": [{"id": "a", "type": "rating", "label": "R", "order": 0}]}"#,
            r#"{"fields": []}"#,
        ] {
            let err = import_structure(bad, "h", &clock).unwrap_err();
            assert!(matches!(err, FormError::InvalidStructureFile(_)), "{bad}: {err}");
        }

        let dup = r#"{"title": "T", "fields": [
            {"id": "a", "type": "text", "label": "A", "order": 0},
            {"id": "a", "type": "text", "label": "B", "order": 1}
        ]}"#;
        assert!(matches!(
            import_structure(dup, "h", &clock),
            Err(FormError::DuplicateFieldId { .. })
        ));
    }

    #[test]
    fn test_import_bytes_rejects_invalid_utf8() {
        let clock = ManualClock::new(at(12));
        let err = import_structure_bytes(&[0xff, 0xfe], "h", &clock).unwrap_err();
        assert!(err.to_string().contains("Invalid UTF-8"));
    }

    #[test]
    fn test_save_and_load_structure() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("form.json");

        save_structure(&sample(), &path).unwrap();
        assert!(path.exists());

        let loaded = load_structure(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_missing_structure() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_structure(temp_dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("add-customer"), "add-customer_structure.json");
        assert_eq!(export_file_name("a b/c"), "a_b_c_structure.json");
        assert_eq!(export_file_name_with_suffix("x", ".form.json"), "x.form.json");
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(ensure_extension("form"), PathBuf::from("form.json"));
        assert_eq!(ensure_extension("form.json"), PathBuf::from("form.json"));
        assert_eq!(ensure_extension("form.txt"), PathBuf::from("form.json"));
    }
}
