//! File operations for structure export and import
//!
//! Async counterparts of the browser download/upload used by a form host:
//! export writes a JSON file into a directory, import reads one back as
//! bytes. Parsing and rebinding happen in the host, not here.

use formwright_core::{FormError, FormResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Largest structure file accepted for import
pub const MAX_IMPORT_BYTES: u64 = 4 * 1024 * 1024;

// ============================================================================
// Export
// ============================================================================

/// Write an exported structure as `dir/file_name`, creating `dir` if needed
pub async fn write_export(dir: &Path, file_name: &str, json: &str) -> FormResult<PathBuf> {
    if !dir.as_os_str().is_empty() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| FormError::FileWrite {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
    }

    let path = dir.join(file_name);
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| FormError::FileWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;

    info!(path = %path.display(), bytes = json.len(), "Exported structure");
    Ok(path)
}

// ============================================================================
// Import
// ============================================================================

/// Read a structure file for import
pub async fn read_structure_file(path: &Path) -> FormResult<Vec<u8>> {
    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            FormError::StructureNotFound(path.to_path_buf())
        } else {
            FormError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
    })?;

    if metadata.len() > MAX_IMPORT_BYTES {
        return Err(FormError::InvalidStructureFile(format!(
            "{} is {} bytes; the limit is {}",
            display_name(path),
            metadata.len(),
            MAX_IMPORT_BYTES
        )));
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| FormError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), bytes = bytes.len(), "Read structure file");
    Ok(bytes)
}

// ============================================================================
// Utility Functions
// ============================================================================

/// File name for display, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("exports");

        let path = write_export(&dir, "host_structure.json", "{\"title\":\"T\"}")
            .await
            .unwrap();
        assert_eq!(path, dir.join("host_structure.json"));

        let bytes = read_structure_file(&path).await.unwrap();
        assert_eq!(bytes, b"{\"title\":\"T\"}");
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_structure_file(&temp_dir.path().join("gone.json"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_read_rejects_oversized_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.json");
        std::fs::write(&path, vec![b' '; (MAX_IMPORT_BYTES + 1) as usize]).unwrap();

        let err = read_structure_file(&path).await.unwrap_err();
        assert!(matches!(err, FormError::InvalidStructureFile(_)));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/a/form.json")), "form.json");
        assert_eq!(display_name(Path::new("/")), "/");
    }
}
