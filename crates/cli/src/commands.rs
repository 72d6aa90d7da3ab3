//! Command handlers

use crate::output;
use crate::{FieldChanges, FieldCommands};
use anyhow::{Context, Result, bail};
use formwright_core::{FormData, SystemClock, UuidIds};
use formwright_schema::serialization::{
    ensure_extension, export_file_name_with_suffix, import_structure_bytes,
};
use formwright_schema::{
    FieldPatch, FieldRules, Structure, export_structure, lint_structure, load_structure,
    save_structure, validate_form,
};
use formwright_ui::{
    Direction, FormState, HostConfig, NewFieldDraft, RenderOptions, StructureEditor, read_structure_file,
    render_form, write_export,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

fn load(path: &Path) -> Result<Structure> {
    load_structure(path).with_context(|| format!("Could not load structure '{}'", path.display()))
}

fn load_data(path: &Path) -> Result<FormData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read form data '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Form data '{}' must be a JSON object", path.display()))
}

// ============================================================================
// Structure commands
// ============================================================================

pub fn new_structure(
    id: &str,
    title: &str,
    category: &str,
    description: Option<String>,
    output: Option<PathBuf>,
    force: bool,
) -> Result<ExitCode> {
    let path = ensure_extension(output.unwrap_or_else(|| PathBuf::from(id)));
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let mut structure = Structure::new(id, title).with_category(category);
    structure.description = description.filter(|d| !d.is_empty());
    save_structure(&structure, &path)?;

    output::success(&format!("Created {} at {}", structure.id, path.display()));
    Ok(ExitCode::SUCCESS)
}

pub fn info(path: &Path, json: bool) -> Result<ExitCode> {
    let structure = load(path)?;
    if json {
        println!("{}", export_structure(&structure)?);
        return Ok(ExitCode::SUCCESS);
    }

    output::structure_summary(&structure);
    println!();
    let lint = lint_structure(&structure);
    output::lint_report(&lint);

    Ok(if lint.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

pub fn validate(structure_path: &Path, data_path: &Path) -> Result<ExitCode> {
    let structure = load(structure_path)?;
    let data = load_data(data_path)?;

    let errors = validate_form(&structure, &data);
    debug!(structure = %structure.id, errors = errors.len(), "Validated form data");
    if errors.is_empty() {
        output::success("Form data is valid");
        Ok(ExitCode::SUCCESS)
    } else {
        output::field_errors(&errors);
        Ok(ExitCode::FAILURE)
    }
}

pub fn render(
    structure_path: &Path,
    data_path: Option<&Path>,
    touch_all: bool,
    json: bool,
    config: &HostConfig,
) -> Result<ExitCode> {
    let structure = load(structure_path)?;
    let data = match data_path {
        Some(path) => load_data(path)?,
        None => FormData::new(),
    };

    let mut state = FormState::new(data);
    if touch_all {
        state.submit(&structure);
    } else {
        state.validate(&structure);
    }

    let options = RenderOptions {
        submit_label: config.submit_label.clone(),
        cancel_label: config.cancel_label.clone(),
        loading: false,
    };
    let form = render_form(&structure, &state, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&form)?);
    } else {
        output::heading(&structure.title);
        if let Some(description) = &structure.description {
            println!("{}", description);
        }
        println!();
        output::rendered_form(&form);
    }

    Ok(if form.visible_errors().is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

// ============================================================================
// Field commands
// ============================================================================

pub fn field(action: FieldCommands) -> Result<ExitCode> {
    match action {
        FieldCommands::Add {
            file,
            label,
            field_type,
            placeholder,
            required,
            options,
            random_id,
        } => {
            let mut draft = NewFieldDraft::new(field_type, label).with_options_text(options.join("\n"));
            if let Some(placeholder) = placeholder {
                draft = draft.with_placeholder(placeholder);
            }
            if required {
                draft = draft.required();
            }

            let structure = load(&file)?;
            let mut editor = if random_id {
                StructureEditor::with_sources(structure, Box::new(UuidIds), Arc::new(SystemClock))
            } else {
                StructureEditor::new(structure)
            };
            let id = editor.add(draft)?;
            save_structure(editor.structure(), &file)?;
            output::success(&format!("Added field {}", id));
        }
        FieldCommands::Update { file, id, changes } => {
            let mut editor = StructureEditor::new(load(&file)?);
            let current = editor
                .structure()
                .get_field(&id)
                .and_then(|f| f.validation.clone())
                .unwrap_or_default();
            let patch = build_patch(changes, current);
            if patch.is_empty() {
                bail!("Nothing to update for field {}", id);
            }

            editor.update_field(&id, &patch)?;
            save_structure(editor.structure(), &file)?;
            output::success(&format!("Updated field {}", id));
        }
        FieldCommands::Delete { file, id } => {
            let mut editor = StructureEditor::new(load(&file)?);
            let removed = editor.delete_field(&id)?;
            save_structure(editor.structure(), &file)?;
            output::success(&format!("Deleted field {} ({})", removed.id, removed.label));
        }
        FieldCommands::Move { file, id, direction } => {
            let mut editor = StructureEditor::new(load(&file)?);
            if editor.move_field(&id, direction)? {
                save_structure(editor.structure(), &file)?;
                let word = match direction {
                    Direction::Up => "up",
                    Direction::Down => "down",
                };
                output::success(&format!("Moved field {} {}", id, word));
            } else {
                println!("Field {} is already at the boundary", id);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Turn command-line changes into a patch; rule flags merge into `current`
fn build_patch(changes: FieldChanges, current: FieldRules) -> FieldPatch {
    let mut patch = FieldPatch::new();
    if let Some(label) = changes.label {
        patch = patch.label(label);
    }
    if let Some(field_type) = changes.field_type {
        patch = patch.field_type(field_type);
    }
    if let Some(placeholder) = changes.placeholder {
        patch = patch.placeholder(placeholder);
    }
    if let Some(required) = changes.required {
        patch = patch.required(required);
    }
    if !changes.options.is_empty() {
        patch = patch.options(changes.options);
    }

    if changes.clear_validation {
        patch = patch.validation(FieldRules::default());
    } else if changes.min.is_some() || changes.max.is_some() || changes.pattern.is_some() {
        patch = patch.validation(FieldRules {
            min: changes.min.or(current.min),
            max: changes.max.or(current.max),
            pattern: changes.pattern.or(current.pattern),
        });
    }
    patch
}

// ============================================================================
// Import / export
// ============================================================================

pub async fn import(structure_path: &Path, from: &Path) -> Result<ExitCode> {
    let target = load(structure_path)?;
    let bytes = read_structure_file(from).await?;
    let imported = import_structure_bytes(&bytes, &target.id, &SystemClock)
        .with_context(|| format!("Could not import '{}'", from.display()))?;
    save_structure(&imported, structure_path)?;

    info!(structure = %imported.id, from = %from.display(), "Imported structure file");
    output::success(&format!(
        "Imported {} fields into {}",
        imported.field_count(),
        imported.id
    ));
    Ok(ExitCode::SUCCESS)
}

pub async fn export(structure_path: &Path, dir: &Path, config: &HostConfig) -> Result<ExitCode> {
    let structure = load(structure_path)?;
    let file_name = export_file_name_with_suffix(&structure.id, &config.export_suffix);
    let path = write_export(dir, &file_name, &export_structure(&structure)?).await?;
    output::success(&format!("Exported to {}", path.display()));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formwright_core::{FieldType, Timestamped};
    use tempfile::TempDir;

    fn new_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("customer.json");
        new_structure("customer", "Customer", "crm", None, Some(path.clone()), false).unwrap();
        path
    }

    fn add(path: &Path, label: &str, field_type: FieldType) {
        field(FieldCommands::Add {
            file: path.to_path_buf(),
            label: label.to_string(),
            field_type,
            placeholder: None,
            required: true,
            options: Vec::new(),
            random_id: false,
        })
        .unwrap();
    }

    #[test]
    fn test_new_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);
        assert!(new_structure("customer", "Again", "crm", None, Some(path.clone()), false).is_err());
        assert!(new_structure("customer", "Again", "crm", None, Some(path.clone()), true).is_ok());
        assert_eq!(load(&path).unwrap().title, "Again");
    }

    #[test]
    fn test_field_lifecycle() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);

        add(&path, "Name", FieldType::Text);
        add(&path, "Email", FieldType::Email);
        add(&path, "Age", FieldType::Number);
        let structure = load(&path).unwrap();
        let ids: Vec<_> = structure.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["field_1", "field_2", "field_3"]);

        field(FieldCommands::Delete {
            file: path.clone(),
            id: "field_2".to_string(),
        })
        .unwrap();
        let orders: Vec<_> = load(&path).unwrap().fields.iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![0, 2]);

        field(FieldCommands::Move {
            file: path.clone(),
            id: "field_3".to_string(),
            direction: Direction::Up,
        })
        .unwrap();
        let structure = load(&path).unwrap();
        assert_eq!(structure.fields[0].id, "field_3");
        assert!(structure.is_order_dense());
    }

    #[test]
    fn test_add_with_random_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);
        add(&path, "Name", FieldType::Text);

        field(FieldCommands::Add {
            file: path.clone(),
            label: "Notes".to_string(),
            field_type: FieldType::Textarea,
            placeholder: None,
            required: false,
            options: Vec::new(),
            random_id: true,
        })
        .unwrap();

        let structure = load(&path).unwrap();
        let notes = &structure.fields[1];
        assert!(notes.id.starts_with("field_"));
        assert_ne!(notes.id, "field_2");
        assert_eq!(notes.order, 1);
    }

    #[test]
    fn test_update_merges_rules() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);
        add(&path, "Age", FieldType::Number);

        let update = |changes: FieldChanges| {
            field(FieldCommands::Update {
                file: path.clone(),
                id: "field_1".to_string(),
                changes,
            })
        };

        update(FieldChanges {
            min: Some(18.0),
            ..FieldChanges::default()
        })
        .unwrap();
        update(FieldChanges {
            max: Some(99.0),
            label: Some("Age (years)".to_string()),
            ..FieldChanges::default()
        })
        .unwrap();

        let age = load(&path).unwrap().fields.remove(0);
        assert_eq!(age.label, "Age (years)");
        assert_eq!(age.min(), Some(18.0));
        assert_eq!(age.max(), Some(99.0));

        update(FieldChanges {
            clear_validation: true,
            ..FieldChanges::default()
        })
        .unwrap();
        assert!(load(&path).unwrap().fields[0].validation.is_none());

        assert!(update(FieldChanges::default()).is_err());
    }

    #[test]
    fn test_validate_exit_codes() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);
        add(&path, "Email", FieldType::Email);

        let data = temp_dir.path().join("data.json");
        std::fs::write(&data, r#"{"field_1": "not-an-email"}"#).unwrap();
        assert_eq!(validate(&path, &data).unwrap(), ExitCode::FAILURE);

        std::fs::write(&data, r#"{"field_1": "ada@example.com"}"#).unwrap();
        assert_eq!(validate(&path, &data).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_render_hides_errors_until_touched() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);
        add(&path, "Name", FieldType::Text);
        let config = HostConfig::default();

        assert_eq!(
            render(&path, None, false, true, &config).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            render(&path, None, true, true, &config).unwrap(),
            ExitCode::FAILURE
        );
    }

    #[tokio::test]
    async fn test_import_keeps_target_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);
        let other = Structure::new("other", "Other")
            .with_field(formwright_schema::Field::new("x", FieldType::Date, "When"));
        let from = temp_dir.path().join("other.json");
        save_structure(&other, &from).unwrap();

        import(&path, &from).await.unwrap();
        let imported = load(&path).unwrap();
        assert_eq!(imported.id, "customer");
        assert_eq!(imported.title, "Other");
        assert_eq!(imported.field_count(), 1);
        assert!(imported.modified_at() > other.modified_at());
    }

    #[tokio::test]
    async fn test_export_uses_config_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let path = new_file(&temp_dir);
        let config = HostConfig {
            export_suffix: "_form.json".to_string(),
            ..HostConfig::default()
        };

        let out = temp_dir.path().join("out");
        export(&path, &out, &config).await.unwrap();
        assert!(out.join("customer_form.json").exists());
    }
}
