//! Tool settings loaded from TOML.
//!
//! Settings hold defaults that would otherwise have to be passed on every run:
//!
//! ```toml
//! categories_dir = "/home/me/.config/fancy-organizer/categories"
//! extreme = false
//! ```
//!
//! Lookup order, first hit wins:
//! 1. an explicit `--settings` path
//! 2. `.fancy-organizer.toml` in the current directory
//! 3. `~/.config/fancy-organizer/settings.toml`
//! 4. built-in defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the category configuration root.
pub const CONFIG_DIR_ENV: &str = "FANCY_ORGANIZER_CONFIG_DIR";

const APP_DIR: &str = "fancy-organizer";
const LOCAL_SETTINGS_FILE: &str = ".fancy-organizer.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Directory holding the `<category>_config.json` files.
    #[serde(default)]
    pub categories_dir: Option<PathBuf>,

    /// Sort into sub-category folders without passing `--extreme`.
    #[serde(default)]
    pub extreme: bool,
}

impl Settings {
    /// Load settings, falling back to defaults when no file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any file
    /// found cannot be read or parsed.
    pub fn load(settings_path: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = settings_path {
            return Self::load_from_file(path);
        }

        let local = PathBuf::from(LOCAL_SETTINGS_FILE);
        if local.is_file() {
            return Self::load_from_file(&local);
        }

        if let Some(app_dir) = app_config_dir() {
            let home_settings = app_dir.join("settings.toml");
            if home_settings.is_file() {
                return Self::load_from_file(&home_settings);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Picks the category configuration root.
    ///
    /// Order: the CLI flag, [`CONFIG_DIR_ENV`], `categories_dir` from these
    /// settings, `~/.config/fancy-organizer/categories`, then `./config`.
    pub fn resolve_categories_dir(&self, cli_override: Option<&Path>) -> PathBuf {
        let env_override = std::env::var_os(CONFIG_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        self.resolve_categories_dir_with(cli_override, env_override, app_config_dir())
    }

    fn resolve_categories_dir_with(
        &self,
        cli_override: Option<&Path>,
        env_override: Option<PathBuf>,
        app_dir: Option<PathBuf>,
    ) -> PathBuf {
        cli_override
            .map(Path::to_path_buf)
            .or(env_override)
            .or_else(|| self.categories_dir.clone())
            .or_else(|| app_dir.map(|dir| dir.join("categories")))
            .unwrap_or_else(|| PathBuf::from("config"))
    }
}

/// `~/.config/fancy-organizer`, if `HOME` is set.
fn app_config_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(|home| PathBuf::from(home).join(".config").join(APP_DIR))
}
