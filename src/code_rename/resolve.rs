//! Rename decisions and collision handling for a single file.

use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use anyhow::{Context, Result};

use crate::code_rename::extract_code;

/// Windows error codes for unavailable network paths:
/// `ERROR_REM_NOT_LIST`, `ERROR_BAD_NETPATH`, `ERROR_UNEXP_NET_ERR`,
/// `ERROR_NETNAME_DELETED`, `ERROR_BAD_NET_NAME`, `ERROR_NETWORK_UNREACHABLE`.
const WINDOWS_NETWORK_ERRORS: [i32; 6] = [51, 53, 59, 64, 67, 1231];

/// What should happen to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No product code found in the name
    SkipUnrecognized,
    /// File already has the canonical name
    SkipAlreadyCorrect,
    /// Move the file to the canonical name
    Rename {
        destination: PathBuf,
        /// Destination is the source itself with different letter case
        case_only: bool,
    },
    /// Destination is larger, so the source gets deleted
    DeleteSource {
        destination: PathBuf,
        source_size: u64,
        destination_size: u64,
    },
    /// Destination is smaller or the same size, so it gets replaced by the source
    ReplaceDestination {
        destination: PathBuf,
        source_size: u64,
        destination_size: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Unrecognized,
    AlreadyCorrect,
}

/// Result of handling a single file.
///
/// In preview mode this is what would have happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Renamed,
    Deleted,
    Replaced,
    Failed(FileError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// Source or destination changed between inspection and the operation
    Race,
    PermissionDenied,
    NotFound,
    /// Network path unavailable
    Transport,
    Other,
}

/// A recoverable error for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileError {
    pub kind: FailureKind,
    pub message: String,
}

impl Decision {
    /// Inspect the file and its canonical destination.
    ///
    /// # Errors
    /// Returns an error if the source has disappeared or file metadata cannot be read.
    pub fn for_file(source: &Path) -> Result<Self> {
        let filename = crate::file_name(source);
        let Some(code) = extract_code(&filename) else {
            return Ok(Self::SkipUnrecognized);
        };

        let extension = crate::file_extension(source);
        let new_name = code.file_name(&extension);
        if new_name == filename {
            return Ok(Self::SkipAlreadyCorrect);
        }

        ensure_exists(source, "Source file")?;
        let source_metadata = fs::symlink_metadata(source)
            .with_context(|| format!("Failed to read file metadata: {}", source.display()))?;
        if !source_metadata.is_file() {
            anyhow::bail!("Source is not a regular file: {}", source.display());
        }

        let destination = source.with_file_name(&new_name);
        let destination_exists = destination
            .try_exists()
            .with_context(|| format!("Failed to check destination: {}", destination.display()))?;

        if !destination_exists {
            return Ok(Self::Rename {
                destination,
                case_only: false,
            });
        }
        // A hard link under another name is a regular collision
        if new_name.to_lowercase() == filename.to_lowercase() && crate::is_same_file(source, &destination) {
            return Ok(Self::Rename {
                destination,
                case_only: true,
            });
        }

        let source_size = source_metadata.len();
        let destination_metadata = fs::metadata(&destination)
            .with_context(|| format!("Failed to read destination metadata: {}", destination.display()))?;
        if !destination_metadata.is_file() {
            anyhow::bail!("Destination exists and is not a file: {}", destination.display());
        }
        let destination_size = destination_metadata.len();

        if source_size < destination_size {
            Ok(Self::DeleteSource {
                destination,
                source_size,
                destination_size,
            })
        } else {
            Ok(Self::ReplaceDestination {
                destination,
                source_size,
                destination_size,
            })
        }
    }

    /// Destination path for decisions that have one.
    #[must_use]
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::SkipUnrecognized | Self::SkipAlreadyCorrect => None,
            Self::Rename { destination, .. }
            | Self::DeleteSource { destination, .. }
            | Self::ReplaceDestination { destination, .. } => Some(destination),
        }
    }

    /// Carry out the decision, or only report the outcome when `dryrun` is set.
    ///
    /// Each filesystem operation re-checks its target right before acting,
    /// so files changed by someone else in the meantime fail with [`FailureKind::Race`].
    ///
    /// # Errors
    /// Returns an error if a check or filesystem operation fails.
    pub fn execute(&self, source: &Path, dryrun: bool, use_trash: bool) -> Result<Outcome> {
        match self {
            Self::SkipUnrecognized => Ok(Outcome::Skipped(SkipReason::Unrecognized)),
            Self::SkipAlreadyCorrect => Ok(Outcome::Skipped(SkipReason::AlreadyCorrect)),
            Self::Rename { destination, case_only } => {
                if !dryrun {
                    ensure_exists(source, "Source file")?;
                    if !case_only {
                        ensure_absent(destination)?;
                    }
                    rename_file(source, destination)?;
                }
                Ok(Outcome::Renamed)
            }
            Self::DeleteSource { destination, .. } => {
                if !dryrun {
                    ensure_exists(destination, "Larger destination file")?;
                    ensure_exists(source, "Source file")?;
                    crate::trash_or_delete(source, use_trash)?;
                }
                Ok(Outcome::Deleted)
            }
            Self::ReplaceDestination { destination, .. } => {
                if !dryrun {
                    replace_file(source, destination, |path| crate::trash_or_delete(path, use_trash))?;
                }
                Ok(Outcome::Replaced)
            }
        }
    }
}

impl FailureKind {
    /// Classify a standard IO error.
    #[must_use]
    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => Self::PermissionDenied,
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::NetworkDown
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::TimedOut
            | io::ErrorKind::StaleNetworkFileHandle => Self::Transport,
            _ if is_network_error(error) => Self::Transport,
            _ => Self::Other,
        }
    }
}

impl FileError {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn race(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Race, message)
    }
}

impl From<&anyhow::Error> for FileError {
    fn from(error: &anyhow::Error) -> Self {
        let kind = error.downcast_ref::<Self>().map_or_else(
            || {
                error
                    .chain()
                    .find_map(|cause| cause.downcast_ref::<io::Error>())
                    .map_or(FailureKind::Other, FailureKind::from_io)
            },
            |file_error| file_error.kind,
        );
        Self::new(kind, format!("{error:#}"))
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Race => "changed during processing",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::Transport => "network error",
            Self::Other => "IO error",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FileError {}

fn is_network_error(error: &io::Error) -> bool {
    if cfg!(windows)
        && error
            .raw_os_error()
            .is_some_and(|code| WINDOWS_NETWORK_ERRORS.contains(&code))
    {
        return true;
    }
    error.to_string().to_lowercase().contains("network")
}

/// Remove the destination with `remove`, then move the source in its place.
fn replace_file(source: &Path, destination: &Path, remove: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    ensure_exists(source, "Source file")?;
    ensure_exists(destination, "Destination file")?;
    remove(destination)?;
    ensure_exists(source, "Source file").context("Destination was removed but the rename was skipped")?;
    rename_file(source, destination)
}

fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    let exists = path
        .try_exists()
        .with_context(|| format!("Failed to check path: {}", path.display()))?;
    if exists {
        Ok(())
    } else {
        Err(FileError::race(format!("{what} no longer exists: {}", path.display())).into())
    }
}

fn ensure_absent(path: &Path) -> Result<()> {
    let exists = path
        .try_exists()
        .with_context(|| format!("Failed to check path: {}", path.display()))?;
    if exists {
        Err(FileError::race(format!("Destination appeared during processing: {}", path.display())).into())
    } else {
        Ok(())
    }
}

fn rename_file(source: &Path, destination: &Path) -> Result<()> {
    fs::rename(source, destination).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            crate::file_name(source),
            crate::file_name(destination)
        )
    })
}
