/// Built-in categories used to seed an empty configuration store.
///
/// Each default category is written as an object-shaped config file whose
/// sub-category labels are the bare extension names, so extreme sorting
/// groups files by individual extension out of the box.
///
/// # Examples
///
/// ```
/// use fancy_organizer::default_categories::{DefaultCategory, DEFAULT_CATEGORIES};
///
/// let images = DEFAULT_CATEGORIES.iter().find(|c| c.name == "images").unwrap();
/// assert!(images.extensions.contains(&".png"));
/// assert_eq!(DefaultCategory::sub_category_for(".png"), "png");
/// ```
use std::collections::BTreeMap;

/// A category shipped with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultCategory {
    /// Base category name, also the folder name.
    pub name: &'static str,
    /// Extensions routed to this category, lowercase with the leading dot.
    pub extensions: &'static [&'static str],
}

impl DefaultCategory {
    /// Returns the sub-category label a default entry uses for `extension`.
    pub fn sub_category_for(extension: &str) -> &str {
        extension.trim_start_matches('.')
    }

    /// Returns the extension → sub-category map written to disk.
    pub fn sub_categories(&self) -> BTreeMap<String, String> {
        self.extensions
            .iter()
            .map(|ext| (ext.to_string(), Self::sub_category_for(ext).to_string()))
            .collect()
    }
}

pub const DEFAULT_CATEGORIES: &[DefaultCategory] = &[
    DefaultCategory {
        name: "images",
        extensions: &[
            ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".bmp", ".tiff", ".ico", ".heic",
        ],
    },
    DefaultCategory {
        name: "audio",
        extensions: &[".mp3", ".wav", ".ogg", ".flac", ".aac", ".m4a", ".wma"],
    },
    DefaultCategory {
        name: "videos",
        extensions: &[".mp4", ".mkv", ".avi", ".mov", ".flv", ".wmv", ".webm", ".3gp"],
    },
    DefaultCategory {
        name: "documents",
        extensions: &[
            ".pdf", ".txt", ".doc", ".docx", ".html", ".htm", ".md", ".rtf", ".odt",
        ],
    },
    DefaultCategory {
        name: "archives",
        extensions: &[".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"],
    },
    DefaultCategory {
        name: "code",
        extensions: &[
            ".py", ".java", ".c", ".cpp", ".h", ".hpp", ".js", ".ts", ".rs", ".go", ".sh",
            ".bash", ".json", ".xml", ".yaml", ".yml", ".toml",
        ],
    },
    DefaultCategory {
        name: "spreadsheets",
        extensions: &[".csv", ".xls", ".xlsx", ".ods"],
    },
    DefaultCategory {
        name: "presentations",
        extensions: &[".ppt", ".pptx", ".odp"],
    },
    DefaultCategory {
        name: "fonts",
        extensions: &[".ttf", ".otf", ".woff", ".woff2"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_extensions_are_unique() {
        let mut seen = HashSet::new();
        for category in DEFAULT_CATEGORIES {
            for ext in category.extensions {
                assert!(seen.insert(*ext), "{} appears in two categories", ext);
            }
        }
    }

    #[test]
    fn test_default_extensions_are_normalised() {
        for category in DEFAULT_CATEGORIES {
            for ext in category.extensions {
                assert!(ext.starts_with('.'));
                assert_eq!(*ext, ext.to_lowercase());
            }
        }
    }

    #[test]
    fn test_default_names_are_valid_keys() {
        for category in DEFAULT_CATEGORIES {
            assert!(!category.name.contains('_'));
            assert_ne!(category.name, "misc");
        }
    }

    #[test]
    fn test_sub_categories_use_bare_extension() {
        let fonts = DEFAULT_CATEGORIES
            .iter()
            .find(|c| c.name == "fonts")
            .unwrap();
        let subs = fonts.sub_categories();
        assert_eq!(subs.get(".woff2").map(String::as_str), Some("woff2"));
        assert_eq!(subs.len(), fonts.extensions.len());
    }
}
