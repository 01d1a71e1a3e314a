//! Download-directory assertions
//!
//! The browser drops artifacts (registration YAML, ISO images, zip
//! bundles) into a known directory; the suite only ever asserts that a
//! file matching a pattern shows up within a budget. File contents are
//! never inspected here.

use std::path::Path;

use regex::Regex;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::poll::{poll_until, PollBudget};

/// What a downloaded file name must look like.
#[derive(Debug, Clone)]
pub enum FilePattern {
    /// Exact file name
    Name(String),
    /// File name suffix, e.g. ".iso"
    Suffix(String),
    /// Regex over the file name
    Matches(Regex),
}

impl FilePattern {
    pub fn name(name: impl Into<String>) -> Self {
        FilePattern::Name(name.into())
    }

    pub fn suffix(suffix: impl Into<String>) -> Self {
        FilePattern::Suffix(suffix.into())
    }

    fn matches(&self, file_name: &str) -> bool {
        match self {
            FilePattern::Name(n) => file_name == n,
            FilePattern::Suffix(s) => file_name.ends_with(s.as_str()),
            FilePattern::Matches(re) => re.is_match(file_name),
        }
    }

    fn describe(&self) -> String {
        match self {
            FilePattern::Name(n) => n.clone(),
            FilePattern::Suffix(s) => format!("*{s}"),
            FilePattern::Matches(re) => format!("/{re}/"),
        }
    }
}

fn scan(dir: &Path, pattern: &FilePattern) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .any(|e| pattern.matches(&e.file_name().to_string_lossy()))
}

/// Assert a file matching `pattern` appears under `dir` within the budget.
pub async fn wait_for(dir: &Path, pattern: &FilePattern, budget: PollBudget) -> Result<()> {
    if !dir.exists() {
        // The directory is created by the browser on first download; a
        // missing directory just means nothing arrived yet.
        debug!(dir = %dir.display(), "download directory not present yet");
    }
    let what = format!("download {} in {}", pattern.describe(), dir.display());
    poll_until(&what, budget, move || async move { Ok(scan(dir, pattern)) })
        .await
        .map_err(|e| match e {
            Error::Timeout { .. } => Error::Download {
                pattern: pattern.describe(),
                dir: dir.to_path_buf(),
            },
            other => other,
        })
}
