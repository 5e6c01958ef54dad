//! Product code extraction from noisy video filenames.
//!
//! A product code is a short letter prefix followed by a three or four digit number,
//! for example `ADN-566`, `DMAT-044F` or `DMAT-044-C`.
//! Release sites wrap these in all kinds of noise (`xxxx.com@ADN-566`, `SITE.DMAT044.C`),
//! so extraction runs an ordered list of patterns against the uppercased file stem
//! and normalizes the first match.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `PREFIX-NUMBER` with an optional `-C` / `.C` marker or trailing letters.
const HYPHENATED: &str = r"(?P<prefix>[A-Z]{2,6})-(?P<number>[0-9]{3,4})(?:(?P<marker>[-.]C)|(?P<letters>[A-Z]+))?";

/// `PREFIXNUMBER` with an optional `-C` / `.C` marker or a single trailing letter.
const COMPACT: &str = r"(?P<prefix>[A-Z]{2,6})(?P<number>[0-9]{3,4})(?:(?P<marker>[-.]C)|(?P<letters>[A-Z]))?";

/// Patterns in priority order. Later patterns are broader, so the order must not change.
static MATCHERS: LazyLock<Vec<Matcher>> = LazyLock::new(|| {
    vec![
        Matcher::new(HYPHENATED, "", CodeForm::Hyphenated),
        Matcher::new(COMPACT, "", CodeForm::Compact),
        Matcher::new(HYPHENATED, "@", CodeForm::Hyphenated),
        Matcher::new(COMPACT, "@", CodeForm::Compact),
        Matcher::new(HYPHENATED, r"[._\s]", CodeForm::Hyphenated),
        Matcher::new(COMPACT, r"[._\s]", CodeForm::Compact),
    ]
});

/// Canonical product code such as `ADN-566`, `DMAT-044F` or `DMAT-044-C`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductCode(String);

/// The written form a code was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeForm {
    /// Prefix and number separated by a hyphen: `ADN-566`
    Hyphenated,
    /// Prefix directly followed by the number: `DMAT044F`
    Compact,
}

/// A successful extraction with the raw text it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMatch {
    pub code: ProductCode,
    /// Matched text from the uppercased file stem, before normalization.
    pub matched: String,
    pub form: CodeForm,
    /// Index of the pattern that matched, in priority order.
    pub pattern_index: usize,
}

struct Matcher {
    regex: Regex,
    form: CodeForm,
}

impl Matcher {
    fn new(code_pattern: &str, lead: &str, form: CodeForm) -> Self {
        let regex = Regex::new(&format!("{lead}(?P<code>{code_pattern})"))
            .expect("Failed to create regex pattern for product code");
        Self { regex, form }
    }
}

impl CodeForm {
    /// Build the canonical code from the named capture groups.
    fn normalize(self, captures: &Captures) -> ProductCode {
        let prefix = &captures["prefix"];
        let number = &captures["number"];
        let letters = captures.name("letters").map(|m| m.as_str());

        let suffix = if captures.name("marker").is_some() {
            "-C"
        } else {
            match (self, letters) {
                (_, Some("C")) => "-C",
                // A run like `HD` after the number is noise, not a suffix
                (Self::Hyphenated, Some(letters)) if letters.len() > 1 => "",
                (_, Some(letter)) => letter,
                (_, None) => "",
            }
        };

        ProductCode(format!("{prefix}-{number}{suffix}"))
    }
}

impl ProductCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename for this code with the given extension (without the leading dot).
    #[must_use]
    pub fn file_name(&self, extension: &str) -> String {
        if extension.is_empty() {
            self.0.clone()
        } else {
            format!("{}.{extension}", self.0)
        }
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ProductCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CodeForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hyphenated => write!(f, "hyphenated"),
            Self::Compact => write!(f, "compact"),
        }
    }
}

/// Extract the product code from a filename.
///
/// ```rust
/// use video_code_rename::code_rename::extract_code;
///
/// let code = extract_code("xxxx.com@ADN-566.mp4").unwrap();
/// assert_eq!(code.as_str(), "ADN-566");
/// assert!(extract_code("home_video_2023.mp4").is_none());
/// ```
#[must_use]
pub fn extract_code(filename: &str) -> Option<ProductCode> {
    extract_code_match(filename).map(|found| found.code)
}

/// Extract the product code from a filename together with details of the match.
#[must_use]
pub fn extract_code_match(filename: &str) -> Option<CodeMatch> {
    let stem = Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
        .to_uppercase();

    MATCHERS.iter().enumerate().find_map(|(pattern_index, matcher)| {
        matcher.regex.captures(&stem).map(|captures| CodeMatch {
            code: matcher.form.normalize(&captures),
            matched: captures["code"].to_string(),
            form: matcher.form,
            pattern_index,
        })
    })
}
