pub mod code_rename;
pub mod config;

pub use config::config_path;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Command;
use clap_complete::Shell;
use colored::Colorize;
use difference::{Changeset, Difference};

/// Shortest common run of characters used to line up a stacked name diff.
const DIFF_ANCHOR_LEN: usize = 3;

/// Dot files and directories, including macOS `._` resource forks.
#[must_use]
pub fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().first() == Some(&b'.')
}

/// Resolve the directory or file to scan into an absolute path.
///
/// A missing or blank path means the current working directory.
///
/// # Errors
/// Returns an error if the path does not exist.
pub fn resolve_root(path: Option<&Path>) -> Result<PathBuf> {
    let root = match path.filter(|p| !p.to_string_lossy().trim().is_empty()) {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().context("Failed to get current working directory")?,
    };
    if !root.exists() {
        anyhow::bail!("Input path does not exist or is not accessible: '{}'", root.display());
    }
    // Mapped network drives can fail to canonicalize on Windows
    Ok(dunce::canonicalize(&root).unwrap_or(root))
}

/// Directory path relative to the scan root, `.` for the root itself.
#[must_use]
pub fn relative_display(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => ".".to_string(),
        Ok(relative) => relative.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

/// File name as a string, lossy for invalid Unicode.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().into_owned()
}

/// File extension as written, without the dot.
#[must_use]
pub fn file_extension(path: &Path) -> String {
    path.extension().unwrap_or_default().to_string_lossy().into_owned()
}

#[inline]
pub fn print_error(message: &str) {
    eprintln!("{}", format!("Error: {message}").red());
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        $crate::print_error(&format!($($arg)*))
    };
}

#[inline]
pub fn print_warning(message: &str) {
    eprintln!("{}", message.yellow());
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        $crate::print_warning(&format!($($arg)*))
    };
}

#[inline]
pub fn print_bold(message: &str) {
    println!("{}", message.bold());
}

#[macro_export]
macro_rules! print_bold {
    ($($arg:tt)*) => {
        $crate::print_bold(&format!($($arg)*))
    };
}

/// Colour removed characters red and added characters green.
///
/// The shorter name is left-padded so the first shared run lines up
/// when the two are printed on top of each other:
/// ```text
/// xxxx.com@ADN-566.mp4
///          ADN-566.mp4
/// ```
#[must_use]
pub fn name_diff(old: &str, new: &str) -> (String, String) {
    let changeset = Changeset::new(old, new, "");
    let mut old_diff = String::new();
    let mut new_diff = String::new();

    for diff in &changeset.diffs {
        match diff {
            Difference::Same(text) => {
                old_diff.push_str(text);
                new_diff.push_str(text);
            }
            Difference::Rem(text) => old_diff.push_str(&text.red().to_string()),
            Difference::Add(text) => new_diff.push_str(&text.green().to_string()),
        }
    }

    let anchor = changeset.diffs.iter().find_map(|diff| match diff {
        Difference::Same(text) if text.chars().count() >= DIFF_ANCHOR_LEN => Some(text.as_str()),
        _ => None,
    });
    if let Some(anchor) = anchor
        && let (Some(old_index), Some(new_index)) = (old.find(anchor), new.find(anchor))
    {
        let old_offset = old[..old_index].chars().count();
        let new_offset = new[..new_index].chars().count();
        let padding = " ".repeat(old_offset.abs_diff(new_offset));
        if old_offset > new_offset {
            new_diff.insert_str(0, &padding);
        } else {
            old_diff.insert_str(0, &padding);
        }
    }

    (old_diff, new_diff)
}

/// Print the old name with the new name aligned below it.
pub fn print_name_diff(old: &str, new: &str) {
    let (old_diff, new_diff) = name_diff(old, new);
    println!("{old_diff}");
    println!("{new_diff}");
}

/// Human-readable file size using binary units.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", UNITS[unit])
}

#[must_use]
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

/// Write a completion script for the given shell to stdout.
pub fn print_completion(shell: Shell, mut command: Command) {
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
}

/// Check if a path is on a network share.
///
/// Network shares have no trash, so deletion there is always permanent.
#[cfg(windows)]
#[must_use]
pub fn is_network_path(path: &Path) -> bool {
    use std::path::{Component, Prefix};
    use windows_sys::Win32::Storage::FileSystem::GetDriveTypeW;

    const DRIVE_REMOTE: u32 = 4;

    let Some(Component::Prefix(prefix)) = path.components().next() else {
        return false;
    };
    match prefix.kind() {
        Prefix::UNC(..) | Prefix::VerbatimUNC(..) => true,
        Prefix::Disk(letter) | Prefix::VerbatimDisk(letter) => {
            let drive_root = [u16::from(letter), u16::from(b':'), u16::from(b'\\'), 0];
            // SAFETY: `drive_root` is a null-terminated wide string that outlives the call
            #[allow(unsafe_code)]
            let drive_type = unsafe { GetDriveTypeW(drive_root.as_ptr()) };
            drive_type == DRIVE_REMOTE
        }
        _ => false,
    }
}

#[cfg(not(windows))]
#[must_use]
pub const fn is_network_path(_path: &Path) -> bool {
    false
}

/// Delete a file, or move it to the trash when requested.
///
/// # Errors
/// Returns an error if the file cannot be removed.
pub fn trash_or_delete(path: &Path, use_trash: bool) -> Result<()> {
    if use_trash && !is_network_path(path) {
        trash::delete(path).with_context(|| format!("Failed to move file to trash: {}", path.display()))
    } else {
        std::fs::remove_file(path).with_context(|| format!("Failed to delete file: {}", path.display()))
    }
}

/// Check if two paths point to the same file on disk.
///
/// True for a case-insensitive filesystem match as well as for hard links.
#[cfg(unix)]
#[must_use]
pub fn is_same_file(first: &Path, second: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::metadata(first), std::fs::metadata(second)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

/// Check if two paths point to the same file on disk.
///
/// True for a case-insensitive filesystem match as well as for hard links.
#[cfg(not(unix))]
#[must_use]
pub fn is_same_file(first: &Path, second: &Path) -> bool {
    match (dunce::canonicalize(first), dunce::canonicalize(second)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    use std::fs::{self, File};
    use std::time::Duration;

    use tempfile::tempdir;
    use walkdir::WalkDir;

    fn find_entry(dir: &Path, name: &str) -> walkdir::DirEntry {
        WalkDir::new(dir)
            .into_iter()
            .filter_map(Result::ok)
            .find(|e| e.file_name().to_string_lossy() == name)
            .unwrap()
    }

    #[test]
    fn test_is_hidden() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("._ADN-566.mp4")).unwrap();
        File::create(dir.path().join("ADN-566.mp4")).unwrap();

        assert!(is_hidden(&find_entry(dir.path(), "._ADN-566.mp4")));
        assert!(!is_hidden(&find_entry(dir.path(), "ADN-566.mp4")));
    }

    #[test]
    fn test_resolve_root_existing_dir() {
        let dir = tempdir().unwrap();
        let resolved = resolve_root(Some(dir.path())).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.is_dir());
    }

    #[test]
    fn test_resolve_root_missing_is_error() {
        let error = resolve_root(Some(Path::new("does-not-exist"))).unwrap_err();
        assert!(error.to_string().starts_with("Input path does not exist or is not accessible"));
    }

    #[test]
    fn test_resolve_root_blank_uses_current_dir() {
        let current = dunce::canonicalize(env::current_dir().unwrap()).unwrap();
        assert_eq!(resolve_root(Some(Path::new("  \n"))).unwrap(), current);
        assert_eq!(resolve_root(None).unwrap(), current);
    }

    #[test]
    fn test_relative_display() {
        let root = Path::new("/videos");
        assert_eq!(relative_display(root, root), ".");
        assert_eq!(relative_display(&root.join("studio"), root), "studio");
        assert_eq!(relative_display(Path::new("/elsewhere"), root), "/elsewhere");
    }

    #[test]
    fn test_file_name_and_extension() {
        let path = Path::new("/videos/ADN-566.MP4");
        assert_eq!(file_name(path), "ADN-566.MP4");
        assert_eq!(file_extension(path), "MP4");
        assert_eq!(file_extension(Path::new("no_extension")), "");
    }

    #[test]
    fn test_name_diff_aligns_code() {
        colored::control::set_override(false);
        let (old, new) = name_diff("xxxx.com@ADN-566.mp4", "ADN-566.mp4");
        assert_eq!(old, "xxxx.com@ADN-566.mp4");
        assert_eq!(new, "         ADN-566.mp4");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(30 * 1024), "30.00 KB");
        assert_eq!(format_size(30 * 1024 * 1024), "30.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
        assert_eq!(format_duration(Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1h 02m 05s");
    }

    #[test]
    fn test_trash_or_delete_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ADN-566.mp4");
        File::create(&path).unwrap();

        trash_or_delete(&path, false).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_trash_or_delete_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(trash_or_delete(&dir.path().join("missing.mp4"), false).is_err());
    }

    #[test]
    fn test_is_same_file() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.mp4");
        let second = dir.path().join("second.mp4");
        fs::write(&first, b"first").unwrap();
        fs::write(&second, b"second").unwrap();

        assert!(is_same_file(&first, &first));
        assert!(!is_same_file(&first, &second));
        assert!(!is_same_file(&first, &dir.path().join("missing.mp4")));
    }
}
