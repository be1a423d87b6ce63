/// File organization system for moving files into category directories.
///
/// Files directly inside a target directory are classified by extension
/// against a loaded [`Configuration`] and moved into `<category>/`, or into
/// `<category>/<sub-category>/` when extreme sorting is on. Files with no
/// configured extension go to `misc/`, which is never subdivided.
///
/// The target directory is validated before anything is touched. Once moves
/// start, a failure affects only the file it happened on; the rest of the
/// batch still runs and every outcome is recorded in an [`OrganizeReport`].
use crate::category_config::{
    CategoryEntry, Configuration, DEFAULT_SUB_CATEGORY, MISC_CATEGORY,
};
use crate::log_sink::{LogSink, TracingSink};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

/// Errors that can occur during file organization operations.
#[derive(Debug, Error)]
pub enum OrganizeError {
    /// The target path is missing or is not a directory.
    #[error("'{}' is not a valid directory: {source}", path.display())]
    InvalidDirectory { path: PathBuf, source: io::Error },
    /// A category or sub-category folder could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    CreateDirectory { path: PathBuf, source: io::Error },
    /// A file could not be moved into its destination.
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Extension → category lookup, built once per run.
#[derive(Debug)]
pub struct ExtensionIndex<'a> {
    by_extension: HashMap<&'a str, &'a CategoryEntry>,
}

impl<'a> ExtensionIndex<'a> {
    /// Indexes every extension of every category.
    ///
    /// Entries are visited in config name order. When two categories list
    /// the same extension the later one wins and a warning is logged.
    pub fn build(configuration: &'a Configuration, sink: &dyn LogSink) -> Self {
        let mut by_extension: HashMap<&'a str, &'a CategoryEntry> = HashMap::new();
        for entry in configuration.iter() {
            for extension in entry.extensions.extensions() {
                if let Some(previous) = by_extension.insert(extension, entry)
                    && previous.key != entry.key
                {
                    sink.log(
                        Level::WARN,
                        &format!(
                            "'{}' is listed by both {} and {}; using {}",
                            extension,
                            previous.key.config_name,
                            entry.key.config_name,
                            entry.key.base_category
                        ),
                    );
                }
            }
        }
        Self { by_extension }
    }

    /// Resolves the base category and, in extreme mode, the sub-category.
    ///
    /// ```
    /// use fancy_organizer::category_config::Configuration;
    /// use fancy_organizer::file_organizer::ExtensionIndex;
    /// use fancy_organizer::log_sink::NullSink;
    ///
    /// let config = Configuration::new()
    ///     .with_labeled_category("docs", &[(".pdf", "reports")])
    ///     .with_category("images", &[".jpg"]);
    /// let index = ExtensionIndex::build(&config, &NullSink);
    ///
    /// assert_eq!(index.classify(".pdf", true), ("docs", Some("reports")));
    /// assert_eq!(index.classify(".jpg", true), ("images", Some("other")));
    /// assert_eq!(index.classify(".jpg", false), ("images", None));
    /// assert_eq!(index.classify(".xyz", true), ("misc", None));
    /// ```
    pub fn classify(&self, extension: &str, extreme_sort: bool) -> (&'a str, Option<&'a str>) {
        match self.by_extension.get(extension).copied() {
            None => (MISC_CATEGORY, None),
            Some(entry) => {
                let category = entry.key.base_category.as_str();
                let sub_category = extreme_sort.then(|| {
                    entry
                        .extensions
                        .sub_category(extension)
                        .unwrap_or(DEFAULT_SUB_CATEGORY)
                });
                (category, sub_category)
            }
        }
    }
}

/// Returns the lowercase extension of a file name, leading dot included.
///
/// Names without an extension, including dot-files like `.bashrc` and names
/// ending in a bare dot, yield an empty string.
///
/// ```
/// use fancy_organizer::file_organizer::extension_of;
/// use std::path::Path;
///
/// assert_eq!(extension_of(Path::new("Report.PDF")), ".pdf");
/// assert_eq!(extension_of(Path::new("archive.tar.gz")), ".gz");
/// assert_eq!(extension_of(Path::new(".bashrc")), "");
/// assert_eq!(extension_of(Path::new("Makefile")), "");
/// ```
pub fn extension_of(path: &Path) -> String {
    match path.extension() {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_string_lossy().to_lowercase()),
        _ => String::new(),
    }
}

/// Where one file is going, computed without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// Current location of the file.
    pub source: PathBuf,
    /// Extension used for classification (may be empty).
    pub extension: String,
    /// Base category folder name.
    pub category: String,
    /// Sub-category folder name, only in extreme mode and never for `misc`.
    pub sub_category: Option<String>,
    /// The target directory being organized.
    pub base_path: PathBuf,
}

impl PlannedMove {
    /// The base category folder.
    pub fn category_dir(&self) -> PathBuf {
        self.base_path.join(&self.category)
    }

    /// The folder the file ends up in.
    pub fn destination_dir(&self) -> PathBuf {
        match &self.sub_category {
            Some(sub) => self.category_dir().join(sub),
            None => self.category_dir(),
        }
    }

    /// The full path of the file after the move.
    pub fn destination(&self) -> PathBuf {
        match self.source.file_name() {
            Some(name) => self.destination_dir().join(name),
            None => self.destination_dir(),
        }
    }

    /// `category` or `category/sub-category`, for display and summaries.
    pub fn label(&self) -> String {
        match &self.sub_category {
            Some(sub) => format!("{}/{}", self.category, sub),
            None => self.category.clone(),
        }
    }

    /// True if the file already sits in its destination folder.
    pub fn is_in_place(&self) -> bool {
        self.source.parent() == Some(self.destination_dir().as_path())
    }
}

/// Records a completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// The original path of the file before organization.
    pub original_path: PathBuf,
    /// The new path of the file after organization.
    pub new_path: PathBuf,
    /// `category` or `category/sub-category`.
    pub label: String,
}

/// What happened to one file.
#[derive(Debug)]
pub enum FileOutcome {
    Moved(Operation),
    /// Already in its destination folder.
    Skipped { path: PathBuf, label: String },
    Failed {
        path: PathBuf,
        label: String,
        error: OrganizeError,
    },
}

impl FileOutcome {
    pub fn label(&self) -> &str {
        match self {
            FileOutcome::Moved(op) => &op.label,
            FileOutcome::Skipped { label, .. } | FileOutcome::Failed { label, .. } => label,
        }
    }
}

/// Outcome of a whole organize run.
#[derive(Debug)]
pub struct OrganizeReport {
    /// ISO 8601 timestamp of when the run started.
    pub started_at: String,
    /// The directory that was organized.
    pub base_path: PathBuf,
    /// One entry per candidate file, in processing order.
    pub outcomes: Vec<FileOutcome>,
}

impl OrganizeReport {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            started_at: chrono::Utc::now().to_rfc3339(),
            base_path,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: FileOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn moved(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Moved(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Failed { .. }))
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// True if there were candidates and every one of them failed.
    pub fn all_failed(&self) -> bool {
        self.total() > 0 && self.failed() == self.total()
    }

    /// Files per destination label, counting moved and already-placed files.
    pub fn label_counts(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for outcome in &self.outcomes {
            if !matches!(outcome, FileOutcome::Failed { .. }) {
                *counts.entry(outcome.label().to_string()).or_insert(0) += 1;
            }
        }
        counts
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Organizes files by moving them into category subdirectories.
pub struct FileOrganizer<'a> {
    index: ExtensionIndex<'a>,
    extreme_sort: bool,
    sink: &'a dyn LogSink,
}

impl<'a> FileOrganizer<'a> {
    /// Builds the extension index for `configuration`.
    pub fn new(
        configuration: &'a Configuration,
        extreme_sort: bool,
        sink: &'a dyn LogSink,
    ) -> Self {
        Self {
            index: ExtensionIndex::build(configuration, sink),
            extreme_sort,
            sink,
        }
    }

    /// Computes the destination of every top-level regular file in `base_path`.
    ///
    /// Symlinks are followed: a link to a regular file is moved as a link,
    /// while directories, links to directories and dangling links are left
    /// out. Files are returned sorted by path so runs are reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`OrganizeError::InvalidDirectory`] if `base_path` does not
    /// exist, is not a directory, or cannot be listed.
    pub fn plan(&self, base_path: &Path) -> OrganizeResult<Vec<PlannedMove>> {
        let invalid = |source| OrganizeError::InvalidDirectory {
            path: base_path.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(base_path).map_err(invalid)?;
        if !metadata.is_dir() {
            return Err(invalid(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a directory",
            )));
        }

        let entries = fs::read_dir(base_path).map_err(invalid)?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| fs::metadata(entry.path()).is_ok_and(|m| m.is_file()))
            .map(|entry| entry.path())
            .collect();
        files.sort();

        Ok(files
            .into_iter()
            .map(|source| {
                let extension = extension_of(&source);
                let (category, sub_category) = self.index.classify(&extension, self.extreme_sort);
                PlannedMove {
                    source,
                    category: category.to_string(),
                    sub_category: sub_category.map(str::to_string),
                    extension,
                    base_path: base_path.to_path_buf(),
                }
            })
            .collect())
    }

    /// Ensures the destination folders exist and moves one file.
    ///
    /// Never fails: errors are logged and returned as [`FileOutcome::Failed`].
    pub fn execute(&self, planned: &PlannedMove) -> FileOutcome {
        let label = planned.label();

        if planned.is_in_place() {
            self.sink.log(
                Level::DEBUG,
                &format!("{} is already in {}", planned.source.display(), label),
            );
            return FileOutcome::Skipped {
                path: planned.source.clone(),
                label,
            };
        }

        match self.move_planned(planned) {
            Ok(new_path) => {
                self.sink.log(
                    Level::INFO,
                    &format!("Moved {} to {}", planned.source.display(), new_path.display()),
                );
                FileOutcome::Moved(Operation {
                    original_path: planned.source.clone(),
                    new_path,
                    label,
                })
            }
            Err(error) => {
                self.sink.log(Level::WARN, &error.to_string());
                FileOutcome::Failed {
                    path: planned.source.clone(),
                    label,
                    error,
                }
            }
        }
    }

    /// Plans and executes a full run over `base_path`.
    ///
    /// # Errors
    ///
    /// Only an invalid `base_path` is an error. Per-file failures are
    /// reported in the returned [`OrganizeReport`].
    pub fn organize(&self, base_path: &Path) -> OrganizeResult<OrganizeReport> {
        let planned = self.plan(base_path)?;
        let mut report = OrganizeReport::new(base_path.to_path_buf());
        for item in &planned {
            report.push(self.execute(item));
        }
        Ok(report)
    }

    fn move_planned(&self, planned: &PlannedMove) -> OrganizeResult<PathBuf> {
        self.ensure_dir(&planned.category_dir())?;
        let destination_dir = planned.destination_dir();
        if planned.sub_category.is_some() {
            self.ensure_dir(&destination_dir)?;
        }

        let destination = planned.destination();
        move_file(&planned.source, &destination).map_err(|source| OrganizeError::FileMove {
            from: planned.source.clone(),
            to: destination.clone(),
            source,
        })?;
        Ok(destination)
    }

    fn ensure_dir(&self, path: &Path) -> OrganizeResult<()> {
        if path.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(path).map_err(|source| OrganizeError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        })?;
        self.sink
            .log(Level::DEBUG, &format!("Created folder {}", path.display()));
        Ok(())
    }
}

/// Moves `source` to `destination`, replacing any file already there.
///
/// Uses a rename when both paths are on the same filesystem and falls back to
/// copy + delete across filesystems.
pub fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        Err(e) => Err(e),
    }
}

/// Organizes `directory` with the given configuration, logging through `tracing`.
///
/// # Examples
///
/// ```no_run
/// use fancy_organizer::category_config::CategoryStore;
/// use fancy_organizer::file_organizer::organize;
/// use std::path::Path;
///
/// let configuration = CategoryStore::new("/home/me/.config/fancy-organizer/categories")
///     .load()
///     .expect("config should load");
/// let report = organize(Path::new("/home/me/Downloads"), &configuration, false)
///     .expect("directory should exist");
/// println!("moved {} files", report.moved());
/// ```
pub fn organize(
    directory: &Path,
    configuration: &Configuration,
    extreme_sort: bool,
) -> OrganizeResult<OrganizeReport> {
    FileOrganizer::new(configuration, extreme_sort, &TracingSink).organize(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_sink::{MemorySink, NullSink};
    use tempfile::TempDir;

    fn sample_config() -> Configuration {
        Configuration::new()
            .with_category("docs", &[".pdf", ".txt"])
            .with_category("images", &[".jpg"])
    }

    #[test]
    fn test_extension_of_edge_cases() {
        assert_eq!(extension_of(Path::new("a.PDF")), ".pdf");
        assert_eq!(extension_of(Path::new("trailing.")), "");
        assert_eq!(extension_of(Path::new("noext")), "");
        assert_eq!(extension_of(Path::new(".hidden.txt")), ".txt");
    }

    #[test]
    fn test_index_conflict_last_wins_with_warning() {
        let config = Configuration::new()
            .with_category("audio", &[".ogg"])
            .with_category("videos", &[".ogg"]);
        let sink = MemorySink::new();
        let index = ExtensionIndex::build(&config, &sink);

        // "videos_config" sorts after "audio_config"
        assert_eq!(index.classify(".ogg", false), ("videos", None));
        let warnings = sink.messages_at(Level::WARN);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(".ogg"));
    }

    #[test]
    fn test_index_misc_never_subdivided() {
        let config = sample_config();
        let index = ExtensionIndex::build(&config, &NullSink);
        assert_eq!(index.classify("", true), (MISC_CATEGORY, None));
        assert_eq!(index.classify(".xyz", true), (MISC_CATEGORY, None));
    }

    #[test]
    fn test_plan_rejects_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = sample_config();
        let organizer = FileOrganizer::new(&config, false, &NullSink);

        let result = organizer.plan(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(OrganizeError::InvalidDirectory { .. })));
    }

    #[test]
    fn test_plan_rejects_regular_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file_path = temp_dir.path().join("a.pdf");
        fs::write(&file_path, "pdf").unwrap();
        let config = sample_config();
        let organizer = FileOrganizer::new(&config, false, &NullSink);

        let result = organizer.plan(&file_path);
        assert!(matches!(result, Err(OrganizeError::InvalidDirectory { .. })));
        assert!(file_path.exists());
    }

    #[test]
    fn test_plan_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.pdf"), "pdf").unwrap();
        fs::create_dir(temp_dir.path().join("folder.jpg")).unwrap();
        let config = sample_config();
        let organizer = FileOrganizer::new(&config, false, &NullSink);

        let planned = organizer.plan(temp_dir.path()).unwrap();
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].label(), "docs");
        assert_eq!(planned[0].destination(), temp_dir.path().join("docs/a.pdf"));
        assert!(!temp_dir.path().join("docs").exists());
    }

    #[test]
    fn test_execute_moves_and_logs() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("b.jpg"), "jpg").unwrap();
        let config = sample_config();
        let sink = MemorySink::new();
        let organizer = FileOrganizer::new(&config, true, &sink);

        let report = organizer.organize(temp_dir.path()).unwrap();
        assert_eq!(report.moved(), 1);
        assert!(temp_dir.path().join("images/other/b.jpg").is_file());

        let debug = sink.messages_at(Level::DEBUG);
        assert!(debug.iter().any(|m| m.starts_with("Created folder")));
        assert_eq!(sink.messages_at(Level::INFO).len(), 1);
    }

    #[test]
    fn test_execute_skips_file_already_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let docs = temp_dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("a.pdf"), "pdf").unwrap();

        let planned = PlannedMove {
            source: docs.join("a.pdf"),
            extension: ".pdf".to_string(),
            category: "docs".to_string(),
            sub_category: None,
            base_path: temp_dir.path().to_path_buf(),
        };
        let config = sample_config();
        let organizer = FileOrganizer::new(&config, false, &NullSink);

        assert!(planned.is_in_place());
        assert!(matches!(
            organizer.execute(&planned),
            FileOutcome::Skipped { .. }
        ));
        assert!(docs.join("a.pdf").is_file());
    }

    #[test]
    fn test_move_overwrites_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let docs = temp_dir.path().join("docs");
        fs::create_dir(&docs).unwrap();
        fs::write(docs.join("a.pdf"), "old").unwrap();
        fs::write(temp_dir.path().join("a.pdf"), "new").unwrap();

        let config = sample_config();
        let report = FileOrganizer::new(&config, false, &NullSink)
            .organize(temp_dir.path())
            .unwrap();

        assert_eq!(report.moved(), 1);
        assert_eq!(fs::read_to_string(docs.join("a.pdf")).unwrap(), "new");
        assert!(!temp_dir.path().join("a.pdf").exists());
    }

    #[test]
    fn test_failure_is_isolated() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        // A file named "images" blocks creation of the images folder.
        fs::write(temp_dir.path().join("images"), "not a folder").unwrap();
        fs::write(temp_dir.path().join("b.jpg"), "jpg").unwrap();
        fs::write(temp_dir.path().join("a.pdf"), "pdf").unwrap();

        let config = sample_config();
        let sink = MemorySink::new();
        let report = FileOrganizer::new(&config, false, &sink)
            .organize(temp_dir.path())
            .unwrap();

        assert_eq!(report.total(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.moved(), 2);
        assert!(!report.all_failed());
        assert!(temp_dir.path().join("b.jpg").is_file());
        assert!(temp_dir.path().join("docs/a.pdf").is_file());
        assert!(temp_dir.path().join("misc/images").is_file());
        assert_eq!(sink.messages_at(Level::WARN).len(), 1);
    }

    #[test]
    fn test_report_label_counts() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in ["a.pdf", "b.txt", "c.jpg", "d"] {
            fs::write(temp_dir.path().join(name), name).unwrap();
        }
        let config = sample_config();
        let report = FileOrganizer::new(&config, false, &NullSink)
            .organize(temp_dir.path())
            .unwrap();

        let counts = report.label_counts();
        assert_eq!(counts.get("docs"), Some(&2));
        assert_eq!(counts.get("images"), Some(&1));
        assert_eq!(counts.get("misc"), Some(&1));
    }

    #[test]
    fn test_empty_directory_reports_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = sample_config();
        let report = organize(temp_dir.path(), &config, true).unwrap();
        assert_eq!(report.total(), 0);
        assert!(!report.all_failed());
    }
}
