//! Rename video files to the product code found in their name.
//!
//! Extraction finds a code like `ADN-566` in a noisy filename,
//! the resolver decides between renaming, deleting the smaller duplicate
//! or replacing a smaller existing file, and the runner walks a directory tree
//! and keeps count of every outcome.

mod config;
mod extract;
mod rename;
mod resolve;
mod stats;

pub use config::{CliOptions, CodeRenameConfig, DEFAULT_EXTENSIONS, VcodeConfig};
pub use extract::{CodeForm, CodeMatch, ProductCode, extract_code, extract_code_match};
pub use rename::CodeRename;
pub use resolve::{Decision, FailureKind, FileError, Outcome, SkipReason};
pub use stats::RunStats;
