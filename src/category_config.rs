//! Category configuration store.
//!
//! Categories live in a configuration root as one JSON file each, named
//! `<category>_config.json`. A file holds either a list of extensions or an
//! object mapping each extension to its sub-category label:
//!
//! ```json
//! [".jpg", ".png"]
//! ```
//!
//! ```json
//! { ".pdf": "reports", ".txt": "notes" }
//! ```
//!
//! Loading is all-or-nothing: one unparseable file fails the whole load.
//! Updates are written to a temporary file next to the target and renamed
//! over it, so an interrupted write never leaves a truncated config behind.

use crate::default_categories::DEFAULT_CATEGORIES;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Fallback category for unmatched extensions. Never configured, never split.
pub const MISC_CATEGORY: &str = "misc";

/// Sub-category used in extreme mode when an extension has no label.
pub const DEFAULT_SUB_CATEGORY: &str = "other";

const CONFIG_SUFFIX: &str = "_config";
const CONFIG_FILE_EXTENSION: &str = "json";

/// Errors raised while loading the configuration store.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("invalid config root pattern for {path}: {source}")]
    Pattern {
        path: PathBuf,
        source: glob::PatternError,
    },
    #[error("failed to read config entry {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not a list of extension strings: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path} maps '{extension}' to invalid sub-category '{label}'")]
    InvalidSubCategory {
        path: PathBuf,
        extension: String,
        label: String,
    },
}

/// Errors raised while updating the configuration store.
#[derive(Debug, Error)]
pub enum ConfigWriteError {
    #[error("invalid extension '{0}'")]
    InvalidExtension(String),
    #[error("invalid category name '{0}': use letters, digits or '-', and not 'misc'")]
    InvalidCategory(String),
    #[error("invalid sub-category name '{0}'")]
    InvalidSubCategory(String),
    #[error("existing config could not be read: {0}")]
    Existing(#[from] ConfigLoadError),
    #[error("failed to create config root {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The identity of a category config file, parsed once from its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryKey {
    /// File stem, suffix retained (`"images_config"`).
    pub config_name: String,
    /// Folder name (`"images"`).
    pub base_category: String,
}

impl CategoryKey {
    /// Parses `<category>_config.json` into a key.
    ///
    /// The base category is the part of the stem before its first `_`.
    ///
    /// ```
    /// use fancy_organizer::category_config::CategoryKey;
    ///
    /// let key = CategoryKey::from_file_name("images_config.json").unwrap();
    /// assert_eq!(key.config_name, "images_config");
    /// assert_eq!(key.base_category, "images");
    /// assert!(CategoryKey::from_file_name("notes.json").is_none());
    /// ```
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_suffix(CONFIG_FILE_EXTENSION)?
            .strip_suffix('.')?;
        let prefix = stem.strip_suffix(CONFIG_SUFFIX)?;
        if prefix.contains(['/', '\\']) {
            return None;
        }
        let base = prefix.split_once('_').map_or(prefix, |(base, _)| base);
        if base.is_empty() {
            return None;
        }
        Some(Self {
            config_name: stem.to_string(),
            base_category: base.to_string(),
        })
    }

    /// Builds the key for a base category name.
    pub fn for_category(category: &str) -> Self {
        Self {
            config_name: format!("{}{}", category, CONFIG_SUFFIX),
            base_category: category.to_string(),
        }
    }

    /// Returns the file name this key is stored under.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.config_name, CONFIG_FILE_EXTENSION)
    }
}

/// The extensions of one category, in either on-disk shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtensionList {
    /// `[".jpg", ".png"]`
    Plain(Vec<String>),
    /// `{".pdf": "reports"}`
    Labeled(BTreeMap<String, String>),
}

impl Default for ExtensionList {
    fn default() -> Self {
        ExtensionList::Plain(Vec::new())
    }
}

impl ExtensionList {
    /// Iterates the extensions of this category.
    pub fn extensions(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            ExtensionList::Plain(list) => Box::new(list.iter().map(String::as_str)),
            ExtensionList::Labeled(map) => Box::new(map.keys().map(String::as_str)),
        }
    }

    pub fn contains(&self, extension: &str) -> bool {
        match self {
            ExtensionList::Plain(list) => list.iter().any(|e| e == extension),
            ExtensionList::Labeled(map) => map.contains_key(extension),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ExtensionList::Plain(list) => list.len(),
            ExtensionList::Labeled(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the sub-category label configured for `extension`, if any.
    pub fn sub_category(&self, extension: &str) -> Option<&str> {
        match self {
            ExtensionList::Plain(_) => None,
            ExtensionList::Labeled(map) => map.get(extension).map(String::as_str),
        }
    }

    /// Adds `extension`, optionally labeled. Returns true if the list changed.
    ///
    /// A label upgrades a plain list to the labeled shape; the extensions
    /// already present map to the default sub-category.
    pub fn insert(&mut self, extension: &str, sub_category: Option<&str>) -> bool {
        if let (ExtensionList::Plain(list), Some(_)) = (&*self, sub_category) {
            let upgraded = list
                .iter()
                .map(|ext| (ext.clone(), DEFAULT_SUB_CATEGORY.to_string()))
                .collect();
            *self = ExtensionList::Labeled(upgraded);
        }

        match self {
            ExtensionList::Plain(list) => {
                if list.iter().any(|e| e == extension) {
                    return false;
                }
                list.push(extension.to_string());
                true
            }
            ExtensionList::Labeled(map) => match sub_category {
                Some(label) => {
                    let previous = map.insert(extension.to_string(), label.to_string());
                    previous.as_deref() != Some(label)
                }
                None if map.contains_key(extension) => false,
                None => {
                    map.insert(extension.to_string(), DEFAULT_SUB_CATEGORY.to_string());
                    true
                }
            },
        }
    }

    /// Lowercases every extension, merging duplicates.
    fn normalised(self) -> Self {
        match self {
            ExtensionList::Plain(list) => {
                let mut out: Vec<String> = Vec::with_capacity(list.len());
                for ext in list {
                    let ext = ext.to_lowercase();
                    if !out.contains(&ext) {
                        out.push(ext);
                    }
                }
                ExtensionList::Plain(out)
            }
            ExtensionList::Labeled(map) => ExtensionList::Labeled(
                map.into_iter()
                    .map(|(ext, label)| (ext.to_lowercase(), label))
                    .collect(),
            ),
        }
    }
}

/// One configured category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    pub key: CategoryKey,
    pub extensions: ExtensionList,
}

/// Every category loaded from a configuration root, keyed by config name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    entries: BTreeMap<String, CategoryEntry>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `key`.
    pub fn insert(&mut self, key: CategoryKey, extensions: ExtensionList) {
        self.entries.insert(
            key.config_name.clone(),
            CategoryEntry { key, extensions },
        );
    }

    /// Builder form of [`Configuration::insert`] for a plain category.
    pub fn with_category(mut self, category: &str, extensions: &[&str]) -> Self {
        self.insert(
            CategoryKey::for_category(category),
            ExtensionList::Plain(extensions.iter().map(|e| e.to_string()).collect()),
        );
        self
    }

    /// Builder form of [`Configuration::insert`] for a labeled category.
    pub fn with_labeled_category(mut self, category: &str, labels: &[(&str, &str)]) -> Self {
        self.insert(
            CategoryKey::for_category(category),
            ExtensionList::Labeled(
                labels
                    .iter()
                    .map(|(ext, label)| (ext.to_string(), label.to_string()))
                    .collect(),
            ),
        );
        self
    }

    /// Looks up the extension list stored under `config_name` (`"docs_config"`).
    pub fn get(&self, config_name: &str) -> Option<&ExtensionList> {
        self.entries.get(config_name).map(|entry| &entry.extensions)
    }

    /// Iterates entries in config name order.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of [`CategoryStore::add_extension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The extension was appended to an existing category.
    Added,
    /// The extension was already listed; nothing was written.
    AlreadyPresent,
    /// The category did not exist and was created with this extension.
    CreatedCategory,
}

/// Handle to a configuration root directory.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    root: PathBuf,
}

impl CategoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the config file for a base category.
    pub fn config_path(&self, category: &str) -> PathBuf {
        self.root.join(CategoryKey::for_category(category).file_name())
    }

    /// Loads every `<category>_config.json` under the root.
    ///
    /// A missing root yields an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigLoadError`] if any matching file cannot be read or is
    /// not a list of strings. Nothing is returned in that case.
    pub fn load(&self) -> Result<Configuration, ConfigLoadError> {
        let mut configuration = Configuration::new();
        for (path, key) in self.config_files()? {
            let extensions = read_extension_list(&path)?;
            configuration.insert(key, extensions);
        }
        Ok(configuration)
    }

    /// Lists the regular files under the root named `<category>_config.json`.
    fn config_files(&self) -> Result<Vec<(PathBuf, CategoryKey)>, ConfigLoadError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/*{}.{}",
            glob::Pattern::escape(&self.root.to_string_lossy()),
            CONFIG_SUFFIX,
            CONFIG_FILE_EXTENSION
        );
        let paths = glob::glob(&pattern).map_err(|source| ConfigLoadError::Pattern {
            path: self.root.clone(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| ConfigLoadError::Read {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }
            let Some(key) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(CategoryKey::from_file_name)
            else {
                continue;
            };
            files.push((path, key));
        }
        Ok(files)
    }

    /// Adds `extension` to `category`, creating the category if needed.
    ///
    /// `extension` may be given with or without its leading dot and in any
    /// case; it is stored as `.ext` in lowercase. Calling this again with the
    /// same arguments reports [`AddOutcome::AlreadyPresent`] and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigWriteError`] for invalid input, an unreadable
    /// existing file, or a failed write. A failed write leaves the previous
    /// file contents in place.
    pub fn add_extension(
        &self,
        extension: &str,
        category: &str,
        sub_category: Option<&str>,
    ) -> Result<AddOutcome, ConfigWriteError> {
        let extension = normalise_extension(extension)?;
        validate_category(category)?;
        if let Some(label) = sub_category
            && !is_valid_label(label)
        {
            return Err(ConfigWriteError::InvalidSubCategory(label.to_string()));
        }

        let path = self.config_path(category);
        if path.is_file() {
            let mut extensions = read_extension_list(&path)?;
            if !extensions.insert(&extension, sub_category) {
                return Ok(AddOutcome::AlreadyPresent);
            }
            write_extension_list(&path, &extensions)?;
            Ok(AddOutcome::Added)
        } else {
            self.ensure_root()?;
            let mut extensions = ExtensionList::default();
            extensions.insert(&extension, sub_category);
            write_extension_list(&path, &extensions)?;
            Ok(AddOutcome::CreatedCategory)
        }
    }

    /// Seeds the root with the built-in categories.
    ///
    /// Existing category files are kept unless `overwrite` is set. Returns the
    /// paths that were written.
    pub fn install(&self, overwrite: bool) -> Result<Vec<PathBuf>, ConfigWriteError> {
        self.ensure_root()?;
        let mut written = Vec::new();
        for category in DEFAULT_CATEGORIES {
            let path = self.config_path(category.name);
            if path.exists() && !overwrite {
                continue;
            }
            write_extension_list(&path, &ExtensionList::Labeled(category.sub_categories()))?;
            written.push(path);
        }
        Ok(written)
    }

    /// Removes every category file, then the root if nothing else is left in it.
    ///
    /// Files that are not `<category>_config.json` are never touched. Returns
    /// false if there was nothing to remove.
    pub fn uninstall(&self) -> Result<bool, ConfigWriteError> {
        let files = self.config_files()?;
        for (path, _) in &files {
            fs::remove_file(path).map_err(|source| ConfigWriteError::Remove {
                path: path.clone(),
                source,
            })?;
        }

        let root_is_empty = fs::read_dir(&self.root).is_ok_and(|mut it| it.next().is_none());
        if root_is_empty {
            fs::remove_dir(&self.root).map_err(|source| ConfigWriteError::Remove {
                path: self.root.clone(),
                source,
            })?;
        }

        Ok(!files.is_empty() || root_is_empty)
    }

    fn ensure_root(&self) -> Result<(), ConfigWriteError> {
        fs::create_dir_all(&self.root).map_err(|source| ConfigWriteError::CreateRoot {
            path: self.root.clone(),
            source,
        })
    }
}

/// Normalises user input into `.ext` lowercase form.
///
/// ```
/// use fancy_organizer::category_config::normalise_extension;
///
/// assert_eq!(normalise_extension("PDF").unwrap(), ".pdf");
/// assert_eq!(normalise_extension(" .Tar ").unwrap(), ".tar");
/// assert!(normalise_extension(".").is_err());
/// ```
pub fn normalise_extension(extension: &str) -> Result<String, ConfigWriteError> {
    let trimmed = extension.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if bare.is_empty() || bare.contains(['.', '/', '\\']) || bare.chars().any(char::is_whitespace)
    {
        return Err(ConfigWriteError::InvalidExtension(extension.to_string()));
    }
    Ok(format!(".{}", bare.to_lowercase()))
}

fn validate_category(category: &str) -> Result<(), ConfigWriteError> {
    let valid = !category.is_empty()
        && category != MISC_CATEGORY
        && category
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigWriteError::InvalidCategory(category.to_string()))
    }
}

/// Sub-category labels become folder names, so they must be a single component.
fn is_valid_label(label: &str) -> bool {
    !label.is_empty() && label != "." && label != ".." && !label.contains(['/', '\\'])
}

fn read_extension_list(path: &Path) -> Result<ExtensionList, ConfigLoadError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let list: ExtensionList =
        serde_json::from_str(&content).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    if let ExtensionList::Labeled(map) = &list
        && let Some((extension, label)) = map.iter().find(|(_, label)| !is_valid_label(label))
    {
        return Err(ConfigLoadError::InvalidSubCategory {
            path: path.to_path_buf(),
            extension: extension.clone(),
            label: label.clone(),
        });
    }

    Ok(list.normalised())
}

fn write_extension_list(path: &Path, list: &ExtensionList) -> Result<(), ConfigWriteError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write_err = |source| ConfigWriteError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut tmp, formatter);
    list.serialize(&mut serializer)
        .map_err(|source| ConfigWriteError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    tmp.write_all(b"\n").map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
