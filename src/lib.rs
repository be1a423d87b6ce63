//! fancy-organizer - sort a directory's files into category folders
//!
//! This library provides the category configuration store (one JSON file of
//! extensions per category), the file organizer that classifies and moves the
//! top-level files of a directory, and the CLI glue around them.

pub mod category_config;
pub mod cli;
pub mod default_categories;
pub mod file_organizer;
pub mod log_sink;
pub mod output;
pub mod settings;

pub use category_config::{
    AddOutcome, CategoryKey, CategoryStore, ConfigLoadError, ConfigWriteError, Configuration,
    ExtensionList,
};
pub use file_organizer::{
    FileOrganizer, FileOutcome, OrganizeError, OrganizeReport, PlannedMove, organize,
};
pub use log_sink::{LogSink, TracingSink};
pub use settings::{Settings, SettingsError};

pub use cli::{OrganizeCommand, run_cli};
