//! Output formatting and styling module.
//!
//! Everything the CLI prints for the user goes through [`OutputFormatter`].
//! Diagnostic events go to the log sink instead; see [`crate::log_sink`].

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use fancy_organizer::output::OutputFormatter;
    /// OutputFormatter::success("Moved a.pdf to docs/");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` files.
    ///
    /// The bar is hidden when `visible` is false, so callers can keep one code
    /// path for quiet and interactive runs.
    pub fn create_progress_bar(total: u64, visible: bool) -> ProgressBar {
        let pb = ProgressBar::new(total);
        if !visible {
            pb.set_draw_target(ProgressDrawTarget::hidden());
            return pb;
        }
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints a summary table of files per destination folder.
    ///
    /// Rows are sorted by folder name. `total_files` is printed in the footer
    /// and may differ from the row sum when some files failed.
    ///
    /// ```no_run
    /// use fancy_organizer::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let mut counts = HashMap::new();
    /// counts.insert("docs/reports".to_string(), 3);
    /// counts.insert("misc".to_string(), 1);
    /// OutputFormatter::summary_table(&counts, 4);
    /// ```
    pub fn summary_table(category_counts: &HashMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");
        for line in Self::summary_lines(category_counts, total_files) {
            println!("{}", line);
        }
    }

    fn summary_lines(category_counts: &HashMap<String, usize>, total_files: usize) -> Vec<String> {
        let mut categories: Vec<_> = category_counts.iter().collect();
        categories.sort_by_key(|&(name, _)| name);

        let width = categories
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Folder".len());

        let mut lines = Vec::with_capacity(categories.len() + 4);
        lines.push(format!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = width
        ));
        lines.push("-".repeat(width + 10));
        for (category, count) in &categories {
            lines.push(format!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                plural(**count),
                width = width
            ));
        }
        lines.push("-".repeat(width + 10));
        lines.push(format!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            plural(total_files),
            width = width
        ));
        lines
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_sorted() {
        colored::control::set_override(false);
        let mut counts = HashMap::new();
        counts.insert("misc".to_string(), 1);
        counts.insert("docs/reports".to_string(), 2);

        let lines = OutputFormatter::summary_lines(&counts, 3);
        assert_eq!(lines.len(), 6);
        assert!(lines[2].starts_with("docs/reports"));
        assert!(lines[2].ends_with("2 files"));
        assert!(lines[3].starts_with("misc"));
        assert!(lines[3].ends_with("1 file"));
        assert!(lines[5].ends_with("3 files"));
    }

    #[test]
    fn test_hidden_progress_bar() {
        let pb = OutputFormatter::create_progress_bar(3, false);
        pb.inc(3);
        assert_eq!(pb.position(), 3);
        pb.finish_and_clear();
    }
}
