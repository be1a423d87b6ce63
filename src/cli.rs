//! Command-line interface module for fancy-organizer.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing (clap derive)
//! - Resolving settings and the category configuration root
//! - Organization and dry-run orchestration
//! - Configuration store housekeeping (add, install, uninstall)

use crate::category_config::{AddOutcome, CategoryStore};
use crate::file_organizer::{FileOrganizer, FileOutcome, OrganizeReport, PlannedMove};
use crate::log_sink::TracingSink;
use crate::output::OutputFormatter;
use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Fancy File Organizer: sort a directory's files into category folders.
#[derive(Debug, Parser)]
#[command(name = "fancy-organizer", version, about)]
pub struct Cli {
    /// Directory to organize
    #[arg(default_value = ".", conflicts_with_all = ["add", "install", "uninstall"])]
    pub directory: PathBuf,

    /// Also sort into sub-category folders inside each category
    #[arg(short, long)]
    pub extreme: bool,

    /// Show where files would go without moving anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Add a file extension to a category, optionally with a sub-category
    #[arg(
        long,
        num_args = 2..=3,
        value_names = ["EXT", "CATEGORY", "SUBCATEGORY"],
        conflicts_with_all = ["install", "uninstall", "dry_run", "extreme"]
    )]
    pub add: Option<Vec<String>>,

    /// Write the default categories into the configuration directory
    #[arg(long, conflicts_with_all = ["uninstall", "dry_run", "extreme"])]
    pub install: bool,

    /// With --install, replace category files that already exist
    #[arg(long, requires = "install")]
    pub force: bool,

    /// Remove the category files, and the configuration directory once empty
    #[arg(long, conflicts_with_all = ["dry_run", "extreme"])]
    pub uninstall: bool,

    /// Directory holding the <category>_config.json files
    #[arg(long, value_name = "PATH")]
    pub config_dir: Option<PathBuf>,

    /// Settings file to use instead of the default lookup
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors and hide the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Every candidate file failed to move.
    AllFilesFailed,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::AllFilesFailed => ExitCode::FAILURE,
        }
    }
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize {
        directory: PathBuf,
        extreme: bool,
        /// If true, simulate the operation without making changes.
        dry_run: bool,
    },
    /// Append an extension to a category.
    AddExtension {
        extension: String,
        category: String,
        sub_category: Option<String>,
    },
    /// Seed the configuration directory with the default categories.
    Install { overwrite: bool },
    /// Remove the category files from the configuration directory.
    Uninstall,
}

impl Cli {
    /// Turns parsed arguments into a command, applying settings defaults.
    pub fn to_command(&self, settings: &Settings) -> OrganizeCommand {
        if let Some(add) = &self.add {
            return OrganizeCommand::AddExtension {
                extension: add.first().cloned().unwrap_or_default(),
                category: add.get(1).cloned().unwrap_or_default(),
                sub_category: add.get(2).cloned(),
            };
        }
        if self.install {
            return OrganizeCommand::Install {
                overwrite: self.force,
            };
        }
        if self.uninstall {
            return OrganizeCommand::Uninstall;
        }
        OrganizeCommand::Organize {
            directory: self.directory.clone(),
            extreme: self.extreme || settings.extreme,
            dry_run: self.dry_run,
        }
    }
}

/// Runs the application for parsed arguments.
///
/// # Errors
///
/// Returns an error for invalid settings, an unreadable configuration store,
/// an invalid target directory, or a failed configuration update.
pub fn run(cli: &Cli) -> Result<RunStatus> {
    let settings = Settings::load(cli.settings.as_deref()).context("loading settings")?;
    let store = CategoryStore::new(settings.resolve_categories_dir(cli.config_dir.as_deref()));
    run_cli(cli.to_command(&settings), &store, !cli.quiet)
}

/// Runs one command against a configuration store.
pub fn run_cli(
    command: OrganizeCommand,
    store: &CategoryStore,
    show_progress: bool,
) -> Result<RunStatus> {
    match command {
        OrganizeCommand::Organize {
            directory,
            extreme,
            dry_run,
        } => {
            if dry_run {
                organize_directory_dry_run(&directory, store, extreme)
            } else {
                organize_directory(&directory, store, extreme, show_progress)
            }
        }
        OrganizeCommand::AddExtension {
            extension,
            category,
            sub_category,
        } => add_extension(store, &extension, &category, sub_category.as_deref()),
        OrganizeCommand::Install { overwrite } => install(store, overwrite),
        OrganizeCommand::Uninstall => uninstall(store),
    }
}

/// Organizes the top-level files of `directory` into category folders.
///
/// This function:
/// 1. Loads the category configuration (fails before touching files)
/// 2. Validates the directory and plans every move
/// 3. Moves files one at a time, continuing past per-file failures
/// 4. Prints each result and a summary table
pub fn organize_directory(
    directory: &Path,
    store: &CategoryStore,
    extreme: bool,
    show_progress: bool,
) -> Result<RunStatus> {
    let directory = absolute(directory);
    OutputFormatter::info(&format!("Organizing files in: {}", directory.display()));

    let configuration = load_configuration(store)?;
    let organizer = FileOrganizer::new(&configuration, extreme, &TracingSink);
    let planned = organizer.plan(&directory)?;

    if planned.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(RunStatus::Success);
    }

    let pb = OutputFormatter::create_progress_bar(planned.len() as u64, show_progress);
    let mut report = OrganizeReport::new(directory.clone());
    for item in &planned {
        pb.set_message(file_name(&item.source));
        report.push(organizer.execute(item));
        pb.inc(1);
    }
    pb.finish_and_clear();

    print_report(&report);

    if report.all_failed() {
        return Ok(RunStatus::AllFilesFailed);
    }
    Ok(RunStatus::Success)
}

/// Shows where every file would go without creating folders or moving files.
pub fn organize_directory_dry_run(
    directory: &Path,
    store: &CategoryStore,
    extreme: bool,
) -> Result<RunStatus> {
    let directory = absolute(directory);
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", directory.display()));

    let configuration = load_configuration(store)?;
    let organizer = FileOrganizer::new(&configuration, extreme, &TracingSink);
    let planned = organizer.plan(&directory)?;

    if planned.is_empty() {
        OutputFormatter::plain("No files found to organize.");
        return Ok(RunStatus::Success);
    }

    OutputFormatter::header("Files would be organized as follows:");
    for item in &planned {
        let name = file_name(&item.source);
        if item.is_in_place() {
            OutputFormatter::plain(&format!(" - {} (already in {}/)", name, item.label()));
        } else {
            OutputFormatter::plain(&format!(" - {} → {}/", name, item.label()));
        }
    }

    OutputFormatter::summary_table(&planned_counts(&planned), planned.len());
    OutputFormatter::dry_run_notice("No files were modified.");
    Ok(RunStatus::Success)
}

fn add_extension(
    store: &CategoryStore,
    extension: &str,
    category: &str,
    sub_category: Option<&str>,
) -> Result<RunStatus> {
    let outcome = store
        .add_extension(extension, category, sub_category)
        .with_context(|| format!("adding '{}' to '{}'", extension, category))?;

    match outcome {
        AddOutcome::Added => {
            OutputFormatter::success(&format!("Added '{}' to '{}' category.", extension, category))
        }
        AddOutcome::AlreadyPresent => OutputFormatter::warning(&format!(
            "'{}' already exists in '{}' category.",
            extension, category
        )),
        AddOutcome::CreatedCategory => OutputFormatter::success(&format!(
            "Created new category '{}' and added '{}' to it.",
            category, extension
        )),
    }
    Ok(RunStatus::Success)
}

fn install(store: &CategoryStore, overwrite: bool) -> Result<RunStatus> {
    let written = store.install(overwrite).with_context(|| {
        format!("installing default categories into {}", store.root().display())
    })?;

    if written.is_empty() {
        OutputFormatter::plain(&format!(
            "All default categories already exist in {} (use --force to replace them).",
            store.root().display()
        ));
    } else {
        for path in &written {
            OutputFormatter::success(&format!("Wrote {}", path.display()));
        }
    }
    Ok(RunStatus::Success)
}

fn uninstall(store: &CategoryStore) -> Result<RunStatus> {
    let removed = store
        .uninstall()
        .with_context(|| format!("removing categories from {}", store.root().display()))?;

    if removed {
        OutputFormatter::success(&format!("Removed categories from {}", store.root().display()));
    } else {
        OutputFormatter::plain(&format!("Nothing to remove at {}", store.root().display()));
    }
    Ok(RunStatus::Success)
}

fn load_configuration(store: &CategoryStore) -> Result<crate::category_config::Configuration> {
    let configuration = store
        .load()
        .with_context(|| format!("loading categories from {}", store.root().display()))?;
    if configuration.is_empty() {
        OutputFormatter::warning(&format!(
            "No categories configured in {}; every file goes to misc/. Run with --install to add the defaults.",
            store.root().display()
        ));
    }
    Ok(configuration)
}

fn print_report(report: &OrganizeReport) {
    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Moved(op) => OutputFormatter::success(&format!(
                "Moved {} to {}/",
                file_name(&op.original_path),
                op.label
            )),
            FileOutcome::Skipped { path, label } => OutputFormatter::plain(&format!(
                "  {} is already in {}/",
                file_name(path),
                label
            )),
            FileOutcome::Failed { path, error, .. } => {
                OutputFormatter::error(&format!("{}: {}", file_name(path), error))
            }
        }
    }

    OutputFormatter::summary_table(&report.label_counts(), report.total() - report.failed());
    OutputFormatter::info(&run_summary(report));

    if report.failed() > 0 {
        OutputFormatter::warning(&format!(
            "{} of {} files could not be organized. Please review the errors above.",
            report.failed(),
            report.total()
        ));
    } else {
        OutputFormatter::success("File organization complete!");
    }
}

/// One-line account of a run: where, when, and how each file ended up.
fn run_summary(report: &OrganizeReport) -> String {
    format!(
        "Run started {} in {}: {} moved, {} already in place, {} failed.",
        report.started_at,
        report.base_path.display(),
        report.moved(),
        report.skipped(),
        report.failed()
    )
}

fn planned_counts(planned: &[PlannedMove]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for item in planned {
        *counts.entry(item.label()).or_insert(0) += 1;
    }
    counts
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fancy-organizer").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_organizes_current_dir() {
        let cli = parse(&[]);
        assert_eq!(
            cli.to_command(&Settings::default()),
            OrganizeCommand::Organize {
                directory: PathBuf::from("."),
                extreme: false,
                dry_run: false,
            }
        );
    }

    #[test]
    fn test_settings_enable_extreme() {
        let cli = parse(&["downloads"]);
        let settings = Settings {
            extreme: true,
            ..Settings::default()
        };
        assert!(matches!(
            cli.to_command(&settings),
            OrganizeCommand::Organize { extreme: true, .. }
        ));
    }

    #[test]
    fn test_add_with_and_without_sub_category() {
        let cli = parse(&["--add", ".xyz", "docs"]);
        assert_eq!(
            cli.to_command(&Settings::default()),
            OrganizeCommand::AddExtension {
                extension: ".xyz".to_string(),
                category: "docs".to_string(),
                sub_category: None,
            }
        );

        let cli = parse(&["--add", ".pdf", "docs", "reports"]);
        assert!(matches!(
            cli.to_command(&Settings::default()),
            OrganizeCommand::AddExtension { sub_category: Some(ref s), .. } if s == "reports"
        ));
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        let args = ["fancy-organizer", "--install", "--uninstall"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["fancy-organizer", "--force"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["fancy-organizer", "-v", "-q"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_directory_rejected_with_config_actions() {
        let args = ["fancy-organizer", "somedir", "--install"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["fancy-organizer", "somedir", "--uninstall"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["fancy-organizer", "somedir", "--add", ".xyz", "docs"];
        assert!(Cli::try_parse_from(args).is_err());

        // Without a positional the default "." does not count as a conflict.
        assert_eq!(
            parse(&["--uninstall"]).to_command(&Settings::default()),
            OrganizeCommand::Uninstall
        );
    }

    #[test]
    fn test_run_summary_reports_timestamp_and_skipped() {
        let base = PathBuf::from("/data/inbox");
        let mut report = OrganizeReport::new(base.clone());
        report.push(FileOutcome::Moved(crate::file_organizer::Operation {
            original_path: base.join("a.pdf"),
            new_path: base.join("docs/a.pdf"),
            label: "docs".to_string(),
        }));
        report.push(FileOutcome::Skipped {
            path: base.join("docs/b.pdf"),
            label: "docs".to_string(),
        });

        assert!(chrono::DateTime::parse_from_rfc3339(&report.started_at).is_ok());
        let summary = run_summary(&report);
        assert!(summary.contains(&report.started_at));
        assert!(summary.contains(&base.display().to_string()));
        assert!(summary.ends_with("1 moved, 1 already in place, 0 failed."), "{summary}");
    }

    #[test]
    fn test_run_cli_invalid_directory_is_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CategoryStore::new(temp_dir.path().join("config"));
        let command = OrganizeCommand::Organize {
            directory: temp_dir.path().join("missing"),
            extreme: false,
            dry_run: false,
        };
        assert!(run_cli(command, &store, false).is_err());
    }

    #[test]
    fn test_run_cli_add_then_organize() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CategoryStore::new(temp_dir.path().join("config"));
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("notes.xyz"), "xyz").unwrap();

        let add = OrganizeCommand::AddExtension {
            extension: "xyz".to_string(),
            category: "docs".to_string(),
            sub_category: None,
        };
        assert_eq!(run_cli(add, &store, false).unwrap(), RunStatus::Success);

        let organize = OrganizeCommand::Organize {
            directory: target.clone(),
            extreme: false,
            dry_run: false,
        };
        assert_eq!(run_cli(organize, &store, false).unwrap(), RunStatus::Success);
        assert!(target.join("docs/notes.xyz").is_file());
    }

    #[test]
    fn test_dry_run_moves_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CategoryStore::new(temp_dir.path().join("config"));
        store.install(false).unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("photo.png"), "png").unwrap();

        let command = OrganizeCommand::Organize {
            directory: target.clone(),
            extreme: true,
            dry_run: true,
        };
        assert_eq!(run_cli(command, &store, false).unwrap(), RunStatus::Success);
        assert!(target.join("photo.png").is_file());
        assert!(!target.join("images").exists());
    }

    #[test]
    fn test_corrupt_config_aborts_before_moving() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_dir = temp_dir.path().join("config");
        fs::create_dir(&config_dir).unwrap();
        fs::write(config_dir.join("docs_config.json"), "not json").unwrap();
        let target = temp_dir.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("a.pdf"), "pdf").unwrap();

        let command = OrganizeCommand::Organize {
            directory: target.clone(),
            extreme: false,
            dry_run: false,
        };
        assert!(run_cli(command, &CategoryStore::new(config_dir), false).is_err());
        assert!(target.join("a.pdf").is_file());
        assert!(!target.join("misc").exists());
    }

    #[test]
    fn test_uninstall_command() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CategoryStore::new(temp_dir.path().join("config"));
        run_cli(OrganizeCommand::Install { overwrite: false }, &store, false).unwrap();
        assert!(store.root().is_dir());

        run_cli(OrganizeCommand::Uninstall, &store, false).unwrap();
        assert!(!store.root().exists());
    }
}
