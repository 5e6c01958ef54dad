//! Configuration for code rename operations.
//!
//! Settings come from CLI arguments and the user config file
//! (`~/.config/video-code-rename.toml`). CLI arguments take priority.
//!
//! # Example config file section
//!
//! ```toml
//! [vcode]
//! auto = false
//! dryrun = true
//! extensions = ["mp4", "mkv", "avi"]
//! trash = false
//! verbose = false
//! ```

use std::path::Path;
use std::{fmt, fs};

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;

/// Video file extensions processed by default.
pub const DEFAULT_EXTENSIONS: [&str; 8] = ["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"];

/// Config from the user config file.
#[derive(Debug, Default, Deserialize)]
pub struct VcodeConfig {
    #[serde(default)]
    pub auto: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub dryrun: bool,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub trash: bool,
    #[serde(default)]
    pub verbose: bool,
}

/// Wrapper needed for parsing the config section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    vcode: VcodeConfig,
}

/// Options given on the command line.
#[derive(Debug, Default, Clone)]
pub struct CliOptions {
    pub auto: bool,
    pub debug: bool,
    pub extensions: Vec<String>,
    pub print: bool,
    pub trash: bool,
    pub verbose: bool,
}

/// Final config created from CLI arguments and user config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeRenameConfig {
    /// Skip the confirmation prompt
    pub auto: bool,
    pub debug: bool,
    /// Preview mode: report decisions without touching files
    pub dryrun: bool,
    /// Lowercase extensions without the leading dot
    pub extensions: Vec<String>,
    /// Move deleted files to trash instead of deleting them
    pub trash: bool,
    pub verbose: bool,
}

impl VcodeConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> anyhow::Result<Self> {
        let Some(path) = crate::config_path() else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse config file {}:\n{e}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {error}",
                path.display()
            )),
        }
    }

    /// Parse config from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.vcode)
            .context("Failed to parse vcode config TOML")
    }
}

impl CodeRenameConfig {
    /// Create config from given command line options and the user config file.
    ///
    /// # Errors
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_cli(cli: CliOptions) -> anyhow::Result<Self> {
        let user_config = VcodeConfig::get_user_config()?;
        Ok(Self::merge(cli, user_config))
    }

    /// Combine CLI options with user config.
    /// Extensions are taken from args first, then config, then defaults.
    #[must_use]
    pub fn merge(cli: CliOptions, user_config: VcodeConfig) -> Self {
        let extensions = Some(normalize_extensions(&cli.extensions))
            .filter(|extensions| !extensions.is_empty())
            .or_else(|| Some(normalize_extensions(&user_config.extensions)).filter(|e| !e.is_empty()))
            .unwrap_or_else(|| DEFAULT_EXTENSIONS.iter().map(std::string::ToString::to_string).collect());

        Self {
            auto: cli.auto || user_config.auto,
            debug: cli.debug || user_config.debug,
            dryrun: cli.print || user_config.dryrun,
            extensions,
            trash: cli.trash || user_config.trash,
            verbose: cli.verbose || user_config.verbose,
        }
    }

    /// Check if the file extension is one of the configured video extensions.
    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let extension = crate::file_extension(path).to_lowercase();
        !extension.is_empty() && self.extensions.contains(&extension)
    }
}

impl Default for CodeRenameConfig {
    fn default() -> Self {
        Self::merge(CliOptions::default(), VcodeConfig::default())
    }
}

impl fmt::Display for CodeRenameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config:")?;
        writeln!(f, "  auto:       {}", self.auto)?;
        writeln!(f, "  debug:      {}", self.debug)?;
        writeln!(f, "  dryrun:     {}", self.dryrun)?;
        writeln!(f, "  extensions: {}", self.extensions.join(", "))?;
        writeln!(f, "  trash:      {}", self.trash)?;
        write!(f, "  verbose:    {}", self.verbose)
    }
}

/// Lowercase, strip leading dots and drop empty and duplicate extensions.
fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|extension| extension.trim().trim_start_matches('.').to_lowercase())
        .filter(|extension| !extension.is_empty())
        .unique()
        .collect()
}

#[cfg(test)]
mod vcode_config_tests {
    use super::*;

    #[test]
    fn from_toml_str_parses_empty_config() {
        let config = VcodeConfig::from_toml_str("").unwrap();
        assert!(!config.auto);
        assert!(!config.dryrun);
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn from_toml_str_parses_vcode_section() {
        let toml = r#"
[vcode]
auto = true
dryrun = true
extensions = ["mp4", "MKV"]
trash = true
verbose = true
"#;
        let config = VcodeConfig::from_toml_str(toml).unwrap();
        assert!(config.auto);
        assert!(config.dryrun);
        assert!(config.trash);
        assert!(config.verbose);
        assert_eq!(config.extensions, vec!["mp4", "MKV"]);
    }

    #[test]
    fn from_toml_str_ignores_other_sections() {
        let toml = r"
[dots]
verbose = false

[vcode]
verbose = true
";
        let config = VcodeConfig::from_toml_str(toml).unwrap();
        assert!(config.verbose);
        assert!(!config.auto);
    }

    #[test]
    fn from_toml_str_invalid_toml_returns_error() {
        assert!(VcodeConfig::from_toml_str("this is not valid toml {{{").is_err());
    }

    #[test]
    fn from_toml_str_wrong_type_returns_error() {
        assert!(VcodeConfig::from_toml_str("[vcode]\nauto = \"yes\"").is_err());
    }
}
