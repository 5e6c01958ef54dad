//! Directory scan and per-file processing for code renaming.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use walkdir::WalkDir;

use crate::code_rename::{CodeRenameConfig, Decision, FileError, Outcome, RunStats, extract_code_match};
use crate::{file_name, format_size, print_bold, print_error, print_warning};

/// Print a progress line after this many scanned files.
const PROGRESS_INTERVAL: usize = 100;

const NAME_FORMAT: &str = "PREFIX-NUMBER or PREFIX-NUMBER-C";

/// Rename video files under a root path to their product code.
#[derive(Debug)]
pub struct CodeRename {
    root: PathBuf,
    config: CodeRenameConfig,
}

impl CodeRename {
    /// Create a new instance for the given input path.
    /// Uses the current working directory if no path is given.
    ///
    /// # Errors
    /// Returns an error if the input path does not exist.
    pub fn new(path: Option<&Path>, config: CodeRenameConfig) -> Result<Self> {
        let root = crate::resolve_root(path)?;
        Ok(Self { root, config })
    }

    /// Scan files, ask for confirmation and process every file.
    ///
    /// Errors for single files are reported and counted, they do not stop the run.
    ///
    /// # Errors
    /// Returns an error if reading the confirmation answer fails.
    pub fn run(&self) -> Result<RunStats> {
        if self.config.debug {
            println!("{self}");
        }

        self.print_header();
        if !self.config.dryrun && !self.config.auto {
            let prompt = format!("Rename video files in {}? (y/N): ", self.root.display());
            if !confirm(&prompt)? {
                println!("Cancelled");
                return Ok(RunStats::default());
            }
        }

        println!("Scanning files...");
        let groups = self.gather_files();
        let stats = self.process_groups(&groups);
        stats.print_summary(self.config.dryrun);
        Ok(stats)
    }

    fn print_header(&self) {
        if self.config.dryrun {
            print_bold!("Preview mode: no files will be changed");
            println!("Target directory: {}", self.root.display());
            println!("Name format: {NAME_FORMAT}");
            println!("Extensions: {}", self.config.extensions.join(", "));
        } else {
            print_warning!("About to rename video files in {}", self.root.display());
            println!("Name format: {NAME_FORMAT}");
        }
    }

    /// Collect video files grouped by their parent directory.
    fn gather_files(&self) -> BTreeMap<PathBuf, Vec<PathBuf>> {
        let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

        if self.root.is_file() {
            if self.config.is_video_file(&self.root) {
                let parent = self.root.parent().map(Path::to_path_buf).unwrap_or_default();
                groups.entry(parent).or_default().push(self.root.clone());
            }
            return groups;
        }

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !crate::is_hidden(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.config.is_video_file(entry.path()) {
                        let parent = entry.path().parent().map(Path::to_path_buf).unwrap_or_default();
                        groups.entry(parent).or_default().push(entry.into_path());
                    }
                }
                Err(error) => print_warning!("Failed to read directory entry: {error}"),
            }
        }

        groups
    }

    fn process_groups(&self, groups: &BTreeMap<PathBuf, Vec<PathBuf>>) -> RunStats {
        let start = Instant::now();
        let mut stats = RunStats::default();

        for (directory, files) in groups {
            print_bold!(
                "Directory: {} ({} video files)",
                crate::relative_display(directory, &self.root),
                files.len()
            );
            for file in files {
                let outcome = self.process_file(file);
                stats.add_outcome(&outcome);
                if stats.total() % PROGRESS_INTERVAL == 0 {
                    println!(
                        "Scanned {} files in {}",
                        stats.total(),
                        crate::format_duration(start.elapsed())
                    );
                }
            }
        }

        stats.duration = start.elapsed();
        stats
    }

    /// Handle a single file, converting any error into a failed outcome.
    pub fn process_file(&self, path: &Path) -> Outcome {
        match self.try_process_file(path) {
            Ok(outcome) => outcome,
            Err(error) => {
                let error = FileError::from(&error);
                print_error!("{} ({}): {error}", file_name(path), error.kind);
                Outcome::Failed(error)
            }
        }
    }

    fn try_process_file(&self, path: &Path) -> Result<Outcome> {
        let filename = file_name(path);
        if self.config.debug
            && let Some(found) = extract_code_match(&filename)
        {
            println!(
                "{filename}: matched '{}' with {} pattern #{} -> {}",
                found.matched,
                found.form,
                found.pattern_index + 1,
                found.code
            );
        }

        let decision = Decision::for_file(path).with_context(|| format!("Failed to inspect {filename}"))?;
        self.print_decision(&filename, &decision);
        decision.execute(path, self.config.dryrun, self.config.trash)
    }

    fn print_decision(&self, filename: &str, decision: &Decision) {
        match decision {
            Decision::SkipUnrecognized => {
                if self.config.verbose {
                    println!("{} {filename}", "Skip (unrecognized):".dimmed());
                }
            }
            Decision::SkipAlreadyCorrect => {
                if self.config.verbose {
                    println!("{} {filename}", "Skip (already named):".dimmed());
                }
            }
            Decision::Rename { destination, case_only } => {
                let label = if *case_only { "Rename (case only)" } else { "Rename" };
                println!("{}", self.heading(label));
                crate::print_name_diff(filename, &file_name(destination));
            }
            Decision::DeleteSource {
                destination,
                source_size,
                destination_size,
            } => {
                println!(
                    "{} {filename} ({} < {} {})",
                    self.heading("Delete smaller file"),
                    format_size(*source_size),
                    format_size(*destination_size),
                    file_name(destination)
                );
            }
            Decision::ReplaceDestination {
                destination,
                source_size,
                destination_size,
            } => {
                let label = if source_size == destination_size {
                    "Replace same size file"
                } else {
                    "Replace smaller file"
                };
                println!(
                    "{} {} ({} >= {})",
                    self.heading(label),
                    file_name(destination),
                    format_size(*source_size),
                    format_size(*destination_size)
                );
                crate::print_name_diff(filename, &file_name(destination));
            }
        }
    }

    fn heading(&self, action: &str) -> ColoredString {
        if self.config.dryrun {
            format!("Dryrun {action}:").cyan().bold()
        } else {
            format!("{action}:").magenta().bold()
        }
    }
}

impl fmt::Display for CodeRename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Root: {}", self.root.display())?;
        write!(f, "{}", self.config)
    }
}

/// Ask a yes/no question on stdin. Only `y` counts as yes.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt.magenta());
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("Failed to read confirmation")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temp dir")
    }

    fn create_file(dir: &Path, name: &str, size: usize) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, vec![0_u8; size]).expect("Failed to create file");
        path
    }

    fn auto_config() -> CodeRenameConfig {
        CodeRenameConfig {
            auto: true,
            ..CodeRenameConfig::default()
        }
    }

    fn renamer(dir: &Path, config: CodeRenameConfig) -> CodeRename {
        CodeRename::new(Some(dir), config).expect("Failed to create renamer")
    }

    #[test]
    fn gather_files_filters_by_extension() {
        let dir = create_test_dir();
        create_file(dir.path(), "ADN-566.mp4", 1);
        create_file(dir.path(), "ADN-566.srt", 1);
        create_file(dir.path(), "DMAT044F.MKV", 1);
        create_file(dir.path(), "notes.txt", 1);

        let groups = renamer(dir.path(), auto_config()).gather_files();
        let files: Vec<String> = groups.values().flatten().map(|p| file_name(p)).collect();
        assert_eq!(files, vec!["ADN-566.mp4", "DMAT044F.MKV"]);
    }

    #[test]
    fn gather_files_recurses_and_groups_by_directory() {
        let dir = create_test_dir();
        create_file(dir.path(), "ADN-566.mp4", 1);
        let subdir = dir.path().join("sub");
        fs::create_dir(&subdir).unwrap();
        create_file(&subdir, "ABP-123.mp4", 1);
        create_file(&subdir, "ABP-124.mp4", 1);

        let renamer = renamer(dir.path(), auto_config());
        let groups = renamer.gather_files();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&renamer.root].len(), 1);
        assert_eq!(groups[&renamer.root.join("sub")].len(), 2);
    }

    #[test]
    fn gather_files_skips_hidden_entries() {
        let dir = create_test_dir();
        create_file(dir.path(), "._ADN-566.mp4", 1);
        let hidden = dir.path().join(".hidden");
        fs::create_dir(&hidden).unwrap();
        create_file(&hidden, "ABP-123.mp4", 1);

        let groups = renamer(dir.path(), auto_config()).gather_files();
        assert!(groups.is_empty());
    }

    #[test]
    fn gather_files_accepts_single_file() {
        let dir = create_test_dir();
        let file = create_file(dir.path(), "xxxx.com@ADN-566.mp4", 1);

        let groups = renamer(&file, auto_config()).gather_files();
        assert_eq!(groups.values().flatten().count(), 1);
    }

    #[test]
    fn process_file_reports_failure_without_panicking() {
        let dir = create_test_dir();
        let renamer = renamer(dir.path(), auto_config());

        let outcome = renamer.process_file(&dir.path().join("xxxx.com@ADN-566.mp4"));
        assert!(matches!(outcome, Outcome::Failed(FileError { kind: crate::code_rename::FailureKind::Race, .. })));
    }

    #[test]
    fn run_renames_and_counts() {
        let dir = create_test_dir();
        create_file(dir.path(), "xxxx.com@ADN-566.mp4", 10);
        create_file(dir.path(), "ABP-123.mp4", 10);
        create_file(dir.path(), "home_video_2023.mp4", 10);
        create_file(dir.path(), "DMAT044F_raw.mkv", 50);
        create_file(dir.path(), "DMAT-044F.mkv", 30);

        let stats = renamer(dir.path(), auto_config()).run().unwrap();
        assert_eq!(stats.total(), 5);
        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.replaced, 1);
        assert_eq!(stats.skipped_unrecognized, 1);
        assert_eq!(stats.skipped_correct, 2);
        assert_eq!(stats.failed, 0);
        assert!(dir.path().join("ADN-566.mp4").exists());
        assert_eq!(fs::metadata(dir.path().join("DMAT-044F.mkv")).unwrap().len(), 50);
    }

    #[test]
    fn run_in_dryrun_changes_nothing() {
        let dir = create_test_dir();
        create_file(dir.path(), "xxxx.com@ADN-566.mp4", 10);
        create_file(dir.path(), "DMAT044F_raw.mkv", 10);
        create_file(dir.path(), "DMAT-044F.mkv", 30);

        let config = CodeRenameConfig {
            dryrun: true,
            ..CodeRenameConfig::default()
        };
        let stats = renamer(dir.path(), config).run().unwrap();
        assert_eq!(stats.renamed, 1);
        assert_eq!(stats.deleted, 1);
        assert!(dir.path().join("xxxx.com@ADN-566.mp4").exists());
        assert!(dir.path().join("DMAT044F_raw.mkv").exists());
        assert!(!dir.path().join("ADN-566.mp4").exists());
    }
}
