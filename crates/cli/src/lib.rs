//! # Formwright CLI
//!
//! Command-line interface for Formwright.
//!
//! Lets structures be created, inspected, edited and checked without a
//! front end.
//!
//! ## Commands
//!
//! - `new` - Create an empty structure file
//! - `info` - Show a structure's fields and lint report
//! - `validate` - Check form data against a structure
//! - `render` - Print the headless render of a form
//! - `field` - Add, update, delete or move a field
//! - `import` - Replace a structure with another file, keeping its id
//! - `export` - Write a structure under its export file name
//!

use clap::{Args, Parser, Subcommand};
use formwright_core::FieldType;
use formwright_ui::{Direction, HostConfig};
use std::path::PathBuf;
use std::process::ExitCode;

pub mod commands;
pub mod output;

// Re-export dependencies for use in main.rs
pub use formwright_core;
pub use formwright_schema;
pub use formwright_ui;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "formwright")]
#[command(version, about = "Dynamic form structures: validate, render and edit", long_about = None)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Host configuration file (TOML)
    #[arg(long, global = true, env = "FORMWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an empty structure file
    New {
        /// Structure id
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long)]
        description: Option<String>,
        /// Output file (defaults to <ID>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show a structure's fields and lint report
    Info {
        file: PathBuf,
        /// Print the structure as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Check form data (a JSON object) against a structure
    Validate { structure: PathBuf, data: PathBuf },
    /// Print the form as a front end would draw it
    Render {
        structure: PathBuf,
        /// Form data (a JSON object)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Mark every field touched, as a submit attempt does
        #[arg(long)]
        touch_all: bool,
        /// Print the view model as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit the fields of a structure file in place
    Field {
        #[command(subcommand)]
        action: FieldCommands,
    },
    /// Replace a structure with another file, keeping its id
    Import { structure: PathBuf, from: PathBuf },
    /// Write a structure under its export file name
    Export {
        structure: PathBuf,
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum FieldCommands {
    /// Append a new field
    Add {
        file: PathBuf,
        #[arg(long)]
        label: String,
        #[arg(long = "type", default_value = "text")]
        field_type: FieldType,
        #[arg(long)]
        placeholder: Option<String>,
        #[arg(long)]
        required: bool,
        /// Select option (repeatable)
        #[arg(long = "option")]
        options: Vec<String>,
        /// Give the field a random `field_<uuid>` id instead of the next `field_N`
        #[arg(long)]
        random_id: bool,
    },
    /// Change attributes of an existing field
    Update {
        file: PathBuf,
        id: String,
        #[command(flatten)]
        changes: FieldChanges,
    },
    /// Remove a field
    Delete { file: PathBuf, id: String },
    /// Move a field one place up or down
    Move {
        file: PathBuf,
        id: String,
        direction: Direction,
    },
}

/// Attributes `field update` can change
#[derive(Debug, Clone, Default, Args)]
pub struct FieldChanges {
    #[arg(long)]
    pub label: Option<String>,
    #[arg(long = "type")]
    pub field_type: Option<FieldType>,
    #[arg(long)]
    pub placeholder: Option<String>,
    #[arg(long)]
    pub required: Option<bool>,
    /// Replace the select options (repeatable)
    #[arg(long = "option")]
    pub options: Vec<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,
    #[arg(long)]
    pub pattern: Option<String>,
    /// Drop min, max and pattern
    #[arg(long, conflicts_with_all = ["min", "max", "pattern"])]
    pub clear_validation: bool,
}

// ============================================================================
// Entry point
// ============================================================================

/// Run a parsed command line.
///
/// Returns a failing exit code when the command ran but found problems,
/// such as invalid form data.
pub async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => HostConfig::load(path)?,
        None => HostConfig::default(),
    };

    match cli.command {
        Commands::New {
            id,
            title,
            category,
            description,
            output,
            force,
        } => commands::new_structure(&id, &title, &category, description, output, force),
        Commands::Info { file, json } => commands::info(&file, json),
        Commands::Validate { structure, data } => commands::validate(&structure, &data),
        Commands::Render {
            structure,
            data,
            touch_all,
            json,
        } => commands::render(&structure, data.as_deref(), touch_all, json, &config),
        Commands::Field { action } => commands::field(action),
        Commands::Import { structure, from } => commands::import(&structure, &from).await,
        Commands::Export { structure, dir } => commands::export(&structure, &dir, &config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_parse_field_add() {
        let cli = Cli::try_parse_from([
            "formwright",
            "field",
            "add",
            "form.json",
            "--label",
            "Tier",
            "--type",
            "select",
            "--option",
            "Gold",
            "--option",
            "Silver",
        ])
        .unwrap();

        match cli.command {
            Commands::Field {
                action:
                    FieldCommands::Add {
                        field_type, options, ..
                    },
            } => {
                assert_eq!(field_type, FieldType::Select);
                assert_eq!(options, vec!["Gold", "Silver"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_add_random_id() {
        let cli = Cli::try_parse_from([
            "formwright", "field", "add", "f.json", "--label", "Notes", "--random-id",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Field {
                action: FieldCommands::Add { random_id: true, .. }
            }
        ));
    }

    #[test]
    fn test_parse_move_direction() {
        let cli = Cli::try_parse_from(["formwright", "field", "move", "f.json", "email", "up"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Field {
                action: FieldCommands::Move {
                    direction: Direction::Up,
                    ..
                }
            }
        ));
        assert!(Cli::try_parse_from(["formwright", "field", "move", "f.json", "email", "left"]).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let result = Cli::try_parse_from([
            "formwright", "field", "add", "f.json", "--label", "X", "--type", "slider",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_clear_validation_conflicts_with_min() {
        let result = Cli::try_parse_from([
            "formwright",
            "field",
            "update",
            "f.json",
            "age",
            "--min",
            "1",
            "--clear-validation",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "formwright",
            "info",
            "f.json",
            "--verbose",
            "--config",
            "host.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("host.toml")));
    }
}
