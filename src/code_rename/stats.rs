//! Per-run counters and the summary printed at the end of a run.

use std::collections::BTreeMap;
use std::time::Duration;

use colored::Colorize;

use crate::code_rename::{FailureKind, Outcome, SkipReason};

/// Counters for one run.
///
/// Every outcome increments exactly one of the outcome counters,
/// so they always add up to the number of scanned files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub skipped_unrecognized: usize,
    pub skipped_correct: usize,
    pub renamed: usize,
    pub replaced: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Breakdown of `failed` by error kind
    pub failures: BTreeMap<FailureKind, usize>,
    pub duration: Duration,
}

impl RunStats {
    pub fn add_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Skipped(SkipReason::Unrecognized) => self.skipped_unrecognized += 1,
            Outcome::Skipped(SkipReason::AlreadyCorrect) => self.skipped_correct += 1,
            Outcome::Renamed => self.renamed += 1,
            Outcome::Replaced => self.replaced += 1,
            Outcome::Deleted => self.deleted += 1,
            Outcome::Failed(error) => {
                self.failed += 1;
                *self.failures.entry(error.kind).or_default() += 1;
            }
        }
    }

    /// Number of files scanned.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.skipped() + self.processed()
    }

    /// Number of files that needed an action.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.renamed + self.replaced + self.deleted + self.failed
    }

    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped_unrecognized + self.skipped_correct
    }

    pub fn print_summary(&self, dryrun: bool) {
        let (renamed, replaced, deleted) = if dryrun {
            ("Would rename:", "Would replace:", "Would delete:")
        } else {
            ("Renamed:", "Replaced:", "Deleted:")
        };

        println!("{}", "\n--- Summary ---".bold().magenta());
        println!("Files scanned:          {}", self.total());
        println!("Files needing action:   {}", self.processed());
        println!("Files skipped:          {}", self.skipped());
        if self.skipped() > 0 {
            println!("  - Unrecognized:       {}", self.skipped_unrecognized);
            println!("  - Already named:      {}", self.skipped_correct);
        }
        println!("{renamed:<24}{}", self.renamed);
        println!("{replaced:<24}{}", self.replaced);
        println!("{deleted:<24}{}", self.deleted);
        println!(
            "Failed:                 {}",
            if self.failed > 0 {
                self.failed.to_string().red()
            } else {
                "0".normal()
            }
        );
        for (kind, count) in &self.failures {
            println!("  - {:<20}{count}", format!("{kind}:"));
        }
        println!("Total time:             {}", crate::format_duration(self.duration));
    }
}
